//! Ordered list wrappers with the bookkeeping the launcher needs.
//!
//! Every operation is total: "not found" is a `false` return, never an
//! error.

use std::collections::HashSet;

use crate::model::{ButtonRecord, InstallationPath};

/// Ordered collection of launcher buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonRecords {
    items: Vec<ButtonRecord>,
}

/// Ordered collection of installation paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationPaths {
    items: Vec<InstallationPath>,
}

macro_rules! list_ops {
    ($list:ty, $item:ty) => {
        impl $list {
            pub fn new(items: Vec<$item>) -> Self {
                Self { items }
            }

            pub fn items(&self) -> &[$item] {
                &self.items
            }

            pub fn into_inner(self) -> Vec<$item> {
                self.items
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.items.iter()
            }

            pub fn get(&self, index: usize) -> Option<&$item> {
                self.items.get(index)
            }

            pub fn count(&self) -> usize {
                self.items.len()
            }

            pub fn is_empty(&self) -> bool {
                self.items.is_empty()
            }

            pub fn add(&mut self, item: $item) {
                self.items.push(item);
            }

            pub fn add_range<I>(&mut self, items: I)
            where
                I: IntoIterator<Item = $item>,
            {
                self.items.extend(items);
            }

            /// Remove the first entry equal to `item`.
            pub fn remove(&mut self, item: &$item) -> bool {
                match self.items.iter().position(|entry| entry == item) {
                    Some(index) => {
                        self.items.remove(index);
                        true
                    },
                    None => false,
                }
            }

            pub fn remove_at(&mut self, index: usize) -> Option<$item> {
                (index < self.items.len()).then(|| self.items.remove(index))
            }

            pub fn clear(&mut self) {
                self.items.clear();
            }

            /// Replace the whole sequence, e.g. after a reorder.
            pub fn update_order(&mut self, items: Vec<$item>) {
                self.items = items;
            }

            /// Move the entry at `from` so it ends up at `to`.
            ///
            /// `to` is clamped to the list end.
            pub fn move_item(&mut self, from: usize, to: usize) -> bool {
                if from >= self.items.len() {
                    return false;
                }
                let item = self.items.remove(from);
                let to = to.min(self.items.len());
                self.items.insert(to, item);
                true
            }

            /// Drop entries whose identifying fields are all blank.
            pub fn filter_empty_entries(&mut self) {
                self.items.retain(|item| !item.is_empty());
            }
        }

        impl From<Vec<$item>> for $list {
            fn from(items: Vec<$item>) -> Self {
                Self::new(items)
            }
        }

        impl IntoIterator for $list {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<$item>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $list {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.iter()
            }
        }
    };
}

list_ops!(ButtonRecords, ButtonRecord);
list_ops!(InstallationPaths, InstallationPath);

impl ButtonRecords {
    /// Keep the first button per text/file/image triple.
    pub fn remove_duplicates(&mut self) {
        let mut seen = HashSet::new();
        self.items.retain(|item| seen.insert(item.dedupe_key()));
    }

    /// Keep the first of every group of fully equal buttons.
    pub fn remove_exact_duplicates(&mut self) {
        let mut seen = HashSet::new();
        self.items.retain(|item| seen.insert(item.clone()));
    }
}

impl InstallationPaths {
    /// Keep the first entry per name. Unnamed entries are all kept.
    pub fn remove_duplicates(&mut self) {
        let mut seen = HashSet::new();
        self.items.retain(|item| {
            item.name.is_empty() || seen.insert(item.name.clone())
        });
    }

    pub fn find_by_name(&self, name: &str) -> Option<&InstallationPath> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Copy path, database and license fields of `updated` onto the first
    /// entry with the same name.
    pub fn update_by_name(&mut self, updated: &InstallationPath) -> bool {
        match self.items.iter_mut().find(|item| item.name == updated.name) {
            Some(item) => {
                item.assign_details(updated);
                true
            },
            None => false,
        }
    }

    /// Remove the first entry with the given name.
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        match self.items.iter().position(|item| item.name == name) {
            Some(index) => {
                self.items.remove(index);
                true
            },
            None => false,
        }
    }
}
