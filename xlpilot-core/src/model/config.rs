use serde::{Deserialize, Serialize};

use super::{ButtonRecord, InstallationPath};

/// Number of persisted UI toggle flags.
pub const FLAG_COUNT: usize = 3;
/// Number of persisted window dimensions (width, height).
pub const DIMENSION_COUNT: usize = 2;

/// Root element name of the main configuration file.
pub const CONFIG_ROOT: &str = "XLPilotConfig";
/// Root element name of a button export file.
pub const BUTTON_EXPORT_ROOT: &str = "ButtonExport";
/// Root element name of an installation path export file.
pub const PATH_EXPORT_ROOT: &str = "PathExport";

/// Which button collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSet {
    /// Buttons tied to XL installations.
    Primary,
    /// General purpose buttons.
    Secondary,
}

/// Independently shareable part of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    PrimaryButtons,
    SecondaryButtons,
    InstallationPaths,
}

impl From<ButtonSet> for Subset {
    fn from(set: ButtonSet) -> Self {
        match set {
            ButtonSet::Primary => Self::PrimaryButtons,
            ButtonSet::Secondary => Self::SecondaryButtons,
        }
    }
}

/// Root persisted object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "XLPilotConfig")]
pub struct Configuration {
    #[serde(rename = "XLPaths", default)]
    installation_paths: PathList,
    #[serde(rename = "XLButtons", default)]
    primary_buttons: ButtonList,
    #[serde(rename = "OtherButtons", default)]
    secondary_buttons: ButtonList,
    #[serde(rename = "Flags", default)]
    flags: FlagList,
    #[serde(rename = "WindowSize", default)]
    window_size: DimensionList,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            installation_paths: PathList::default(),
            primary_buttons: ButtonList::default(),
            secondary_buttons: ButtonList::default(),
            flags: FlagList {
                items: vec![false; FLAG_COUNT],
            },
            window_size: DimensionList {
                items: vec![0; DIMENSION_COUNT],
            },
        }
    }
}

impl Configuration {
    pub fn installation_paths(&self) -> &[InstallationPath] {
        &self.installation_paths.items
    }

    pub fn installation_paths_mut(&mut self) -> &mut Vec<InstallationPath> {
        &mut self.installation_paths.items
    }

    pub fn buttons(&self, set: ButtonSet) -> &[ButtonRecord] {
        match set {
            ButtonSet::Primary => &self.primary_buttons.items,
            ButtonSet::Secondary => &self.secondary_buttons.items,
        }
    }

    pub fn buttons_mut(&mut self, set: ButtonSet) -> &mut Vec<ButtonRecord> {
        match set {
            ButtonSet::Primary => &mut self.primary_buttons.items,
            ButtonSet::Secondary => &mut self.secondary_buttons.items,
        }
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags.items
    }

    pub fn set_flag(&mut self, index: usize, value: bool) -> bool {
        match self.flags.items.get_mut(index) {
            Some(flag) => {
                *flag = value;
                true
            },
            None => false,
        }
    }

    /// Window width and height.
    pub fn window_size(&self) -> (i32, i32) {
        let items = &self.window_size.items;
        (
            items.first().copied().unwrap_or_default(),
            items.get(1).copied().unwrap_or_default(),
        )
    }

    pub fn set_window_size(&mut self, width: i32, height: i32) {
        self.window_size.items = vec![width, height];
    }

    /// Copy the named subset from `other` into this configuration.
    pub fn take_subset(&mut self, subset: Subset, other: &Configuration) {
        match subset {
            Subset::InstallationPaths => {
                self.installation_paths = other.installation_paths.clone();
            },
            Subset::PrimaryButtons => {
                self.primary_buttons = other.primary_buttons.clone();
            },
            Subset::SecondaryButtons => {
                self.secondary_buttons = other.secondary_buttons.clone();
            },
        }
    }

    /// Copy flags and window size from `other`.
    pub fn take_layout(&mut self, other: &Configuration) {
        self.flags = other.flags.clone();
        self.window_size = other.window_size.clone();
    }

    /// Force the fixed-size lists to their exact lengths.
    pub fn normalized(mut self) -> Self {
        self.flags.items.resize(FLAG_COUNT, false);
        self.window_size.items.resize(DIMENSION_COUNT, 0);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct PathList {
    #[serde(rename = "InstallationPath", default)]
    items: Vec<InstallationPath>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ButtonList {
    #[serde(rename = "ButtonRecord", default)]
    items: Vec<ButtonRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct FlagList {
    #[serde(rename = "Flag", default)]
    items: Vec<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct DimensionList {
    #[serde(rename = "Dimension", default)]
    items: Vec<i32>,
}

/// Standalone file holding one button collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "ButtonExport")]
pub struct ButtonExport {
    #[serde(rename = "ButtonRecord", default)]
    pub items: Vec<ButtonRecord>,
}

/// Standalone file holding installation paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "PathExport")]
pub struct PathExport {
    #[serde(rename = "InstallationPath", default)]
    pub items: Vec<InstallationPath>,
}
