//! Owner of the persisted configuration.
//!
//! Every mutating call is a read-modify-write of the whole file. There is
//! no locking; the last writer wins.

use std::path::{Path, PathBuf};

use crate::container::{ButtonRecords, InstallationPaths};
use crate::error::XlPilotError;
use crate::model::{
    BUTTON_EXPORT_ROOT, ButtonExport, ButtonRecord, ButtonSet, CONFIG_ROOT,
    Configuration, FLAG_COUNT, InstallationPath, PATH_EXPORT_ROOT, PathExport,
    Subset,
};
use crate::notifier::Notifier;
use crate::validation::{validate_button, validate_installation_path};
use crate::xml;

const CONFIG_DIR_NAME: &str = "XLPilot";
const CONFIG_FILE_NAME: &str = "XLPilotConfig.xml";

/// Part of the configuration written back by [`ConfigStore::commit_slice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Subset(Subset),
    /// UI flags and window size.
    Layout,
}

/// Return the default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Configuration bound to one backing file.
pub struct ConfigStore {
    path: PathBuf,
    config: Configuration,
    notifier: Box<dyn Notifier>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Load the configuration at `path`, or start from defaults when the
    /// file does not exist. Nothing is written until [`Self::save`].
    pub fn open(
        path: impl Into<PathBuf>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, XlPilotError> {
        let path = path.into();
        let loaded = read_configuration(&path);
        let mut store = Self {
            path,
            config: Configuration::default(),
            notifier,
        };
        store.config = store.report("load configuration", loaded)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Re-read the backing file, discarding unsaved edits.
    pub fn reload(&mut self) -> Result<(), XlPilotError> {
        let loaded = read_configuration(&self.path);
        self.config = self.report("reload configuration", loaded)?;
        Ok(())
    }

    /// Write the whole configuration to the backing file.
    pub fn save(&self) -> Result<(), XlPilotError> {
        self.write(&self.config)
    }

    /// Reload, replace only `slice` with the in-memory value, then save.
    ///
    /// Slices other than `slice` take the on-disk value, so concurrent
    /// editors of different slices do not overwrite each other.
    pub fn commit_slice(&mut self, slice: Slice) -> Result<(), XlPilotError> {
        let on_disk = read_configuration(&self.path);
        let mut merged = self.report("reload configuration", on_disk)?;
        match slice {
            Slice::Subset(subset) => merged.take_subset(subset, &self.config),
            Slice::Layout => merged.take_layout(&self.config),
        }
        self.persist(merged)
    }

    pub fn installation_paths(&self) -> InstallationPaths {
        InstallationPaths::new(self.config.installation_paths().to_vec())
    }

    pub fn buttons(&self, set: ButtonSet) -> ButtonRecords {
        ButtonRecords::new(self.config.buttons(set).to_vec())
    }

    pub fn find_installation_path(
        &self,
        name: &str,
    ) -> Option<&InstallationPath> {
        self.config
            .installation_paths()
            .iter()
            .find(|path| path.name == name)
    }

    pub fn add_installation_path(
        &mut self,
        path: InstallationPath,
    ) -> Result<(), XlPilotError> {
        self.report(
            "add installation path",
            validate_installation_path(&path),
        )?;
        let mut updated = self.config.clone();
        updated.installation_paths_mut().push(path);
        self.persist(updated)
    }

    /// Update the entry sharing `updated.name`. Returns `false` when no
    /// entry matches; nothing is written in that case.
    pub fn update_installation_path(
        &mut self,
        updated: &InstallationPath,
    ) -> Result<bool, XlPilotError> {
        self.report(
            "update installation path",
            validate_installation_path(updated),
        )?;
        let mut paths = self.installation_paths();
        if !paths.update_by_name(updated) {
            return Ok(false);
        }
        self.replace_installation_paths(paths)?;
        Ok(true)
    }

    pub fn remove_installation_path(
        &mut self,
        name: &str,
    ) -> Result<bool, XlPilotError> {
        let mut paths = self.installation_paths();
        if !paths.remove_by_name(name) {
            return Ok(false);
        }
        self.replace_installation_paths(paths)?;
        Ok(true)
    }

    pub fn replace_installation_paths(
        &mut self,
        paths: InstallationPaths,
    ) -> Result<(), XlPilotError> {
        let mut updated = self.config.clone();
        *updated.installation_paths_mut() = paths.into_inner();
        self.persist(updated)
    }

    pub fn add_button(
        &mut self,
        set: ButtonSet,
        record: ButtonRecord,
    ) -> Result<(), XlPilotError> {
        self.report("add button", validate_button(&record))?;
        let mut updated = self.config.clone();
        updated.buttons_mut(set).push(record);
        self.persist(updated)
    }

    pub fn remove_button(
        &mut self,
        set: ButtonSet,
        index: usize,
    ) -> Result<Option<ButtonRecord>, XlPilotError> {
        let mut buttons = self.buttons(set);
        let removed = buttons.remove_at(index);
        if removed.is_some() {
            self.replace_buttons(set, buttons)?;
        }
        Ok(removed)
    }

    pub fn replace_buttons(
        &mut self,
        set: ButtonSet,
        buttons: ButtonRecords,
    ) -> Result<(), XlPilotError> {
        let mut updated = self.config.clone();
        *updated.buttons_mut(set) = buttons.into_inner();
        self.persist(updated)
    }

    /// Set the UI toggles; missing values become `false`.
    pub fn set_flags(&mut self, flags: &[bool]) -> Result<(), XlPilotError> {
        let mut updated = self.config.clone();
        for index in 0..FLAG_COUNT {
            let value = flags.get(index).copied().unwrap_or_default();
            updated.set_flag(index, value);
        }
        self.persist(updated)
    }

    pub fn set_window_size(
        &mut self,
        width: i32,
        height: i32,
    ) -> Result<(), XlPilotError> {
        let mut updated = self.config.clone();
        updated.set_window_size(width, height);
        self.persist(updated)
    }

    /// Write one subset to a standalone file.
    pub fn export_subset(
        &self,
        path: &Path,
        subset: Subset,
    ) -> Result<(), XlPilotError> {
        let result = match subset {
            Subset::PrimaryButtons | Subset::SecondaryButtons => {
                let export = ButtonExport {
                    items: self.config.buttons(button_set(subset)).to_vec(),
                };
                xml::serialize_to_file(&export, path)
            },
            Subset::InstallationPaths => {
                let export = PathExport {
                    items: self.config.installation_paths().to_vec(),
                };
                xml::serialize_to_file(&export, path)
            },
        };
        self.report("export", result)?;
        self.notifier
            .info(&format!("Exported {subset:?} to {}", path.display()));
        Ok(())
    }

    /// Append the entries of a standalone file to `subset`, drop
    /// duplicates and persist. Returns how many entries were added.
    ///
    /// Buttons must be fully equal to count as duplicates; paths are
    /// matched by name and the existing entry wins. Entries carrying
    /// forbidden characters are skipped.
    pub fn import_subset(
        &mut self,
        path: &Path,
        subset: Subset,
    ) -> Result<usize, XlPilotError> {
        let mut updated = self.config.clone();
        let added = match subset {
            Subset::PrimaryButtons | Subset::SecondaryButtons => {
                let loaded = xml::deserialize_from_file::<ButtonExport>(
                    path,
                    BUTTON_EXPORT_ROOT,
                );
                let export = self.report("import", loaded)?;
                let set = button_set(subset);
                let mut buttons = self.buttons(set);
                let before = buttons.count();
                buttons.add_range(keep_valid(export.items, validate_button));
                buttons.remove_exact_duplicates();
                let added = buttons.count().saturating_sub(before);
                *updated.buttons_mut(set) = buttons.into_inner();
                added
            },
            Subset::InstallationPaths => {
                let loaded = xml::deserialize_from_file::<PathExport>(
                    path,
                    PATH_EXPORT_ROOT,
                );
                let export = self.report("import", loaded)?;
                let mut paths = self.installation_paths();
                let before = paths.count();
                paths.add_range(keep_valid(
                    export.items,
                    validate_installation_path,
                ));
                paths.remove_duplicates();
                let added = paths.count().saturating_sub(before);
                *updated.installation_paths_mut() = paths.into_inner();
                added
            },
        };
        self.persist(updated)?;
        self.notifier
            .info(&format!("Imported {added} new entries into {subset:?}"));
        Ok(added)
    }

    /// Write `updated` and adopt it; on failure the current aggregate
    /// stays as it was.
    fn persist(&mut self, updated: Configuration) -> Result<(), XlPilotError> {
        self.write(&updated)?;
        self.config = updated;
        Ok(())
    }

    fn write(&self, config: &Configuration) -> Result<(), XlPilotError> {
        let result = xml::serialize_to_file(config, &self.path);
        self.report("save configuration", result)?;
        log::info!("configuration saved to {}", self.path.display());
        Ok(())
    }

    /// Log and surface a failure before handing it back.
    fn report<T>(
        &self,
        operation: &str,
        result: Result<T, XlPilotError>,
    ) -> Result<T, XlPilotError> {
        result.inspect_err(|err| {
            log::error!("failed to {operation}: {err}");
            self.notifier.error(&format!("Failed to {operation}: {err}"));
        })
    }
}

fn read_configuration(path: &Path) -> Result<Configuration, XlPilotError> {
    if !path.exists() {
        log::debug!("{} not found, using defaults", path.display());
        return Ok(Configuration::default());
    }
    let config: Configuration = xml::deserialize_from_file(path, CONFIG_ROOT)?;
    Ok(config.normalized())
}

fn keep_valid<T, F>(items: Vec<T>, validate: F) -> Vec<T>
where
    F: Fn(&T) -> Result<(), XlPilotError>,
{
    items
        .into_iter()
        .filter(|item| match validate(item) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("skipping imported entry: {err}");
                false
            },
        })
        .collect()
}

fn button_set(subset: Subset) -> ButtonSet {
    match subset {
        Subset::SecondaryButtons => ButtonSet::Secondary,
        _ => ButtonSet::Primary,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{ConfigStore, Slice};
    use crate::error::XlPilotError;
    use crate::model::{
        ButtonExport, ButtonRecord, ButtonSet, InstallationPath, Subset,
    };
    use crate::xml;
    use crate::notifier::testing::RecordingNotifier;

    fn open_store(path: &PathBuf) -> (ConfigStore, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let store = ConfigStore::open(path.clone(), Box::new(notifier.clone()))
            .expect("store should open");
        (store, notifier)
    }

    #[test]
    fn given_missing_file_when_opened_then_defaults_and_nothing_written() {
        let root = test_temp_dir("missing");
        let path = root.join("config.xml");

        let (store, _) = open_store(&path);

        assert!(store.config().installation_paths().is_empty());
        assert_eq!(store.config().flags().len(), 3);
        assert!(!path.exists());
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_added_path_when_reopened_then_path_persisted() {
        let root = test_temp_dir("add_path");
        let path = root.join("config.xml");
        let (mut store, _) = open_store(&path);

        store
            .add_installation_path(
                InstallationPath::new("XL 2024", "C:\\XL").with_database("DB"),
            )
            .expect("path should be added");
        let (reopened, _) = open_store(&path);

        let entry = reopened
            .find_installation_path("XL 2024")
            .expect("path should be persisted");
        assert_eq!(entry.database, "DB");
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_unknown_name_when_updating_path_then_false_and_no_write() {
        let root = test_temp_dir("update_missing");
        let path = root.join("config.xml");
        let (mut store, _) = open_store(&path);

        let updated = store
            .update_installation_path(&InstallationPath::new("Nope", "C:\\"))
            .expect("update should not fail");

        assert!(!updated);
        assert!(!path.exists());
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_forbidden_characters_when_adding_button_then_rejected() {
        let root = test_temp_dir("forbidden");
        let path = root.join("config.xml");
        let (mut store, notifier) = open_store(&path);

        let result = store.add_button(
            ButtonSet::Primary,
            ButtonRecord::new("<XL>", "xl.exe"),
        );

        assert!(matches!(
            result,
            Err(XlPilotError::ForbiddenCharacters { .. })
        ));
        assert!(store.config().buttons(ButtonSet::Primary).is_empty());
        assert_eq!(notifier.errors().len(), 1);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_unsaved_edits_when_reloaded_then_edits_discarded() {
        let root = test_temp_dir("reload");
        let path = root.join("config.xml");
        let (mut store, _) = open_store(&path);
        store
            .add_button(ButtonSet::Primary, ButtonRecord::new("XL", "xl.exe"))
            .expect("button should be added");

        store
            .config
            .buttons_mut(ButtonSet::Primary)
            .push(ButtonRecord::new("Unsaved", "x.exe"));
        store.reload().expect("reload should succeed");

        assert_eq!(store.config().buttons(ButtonSet::Primary).len(), 1);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_two_editors_when_committing_slices_then_both_changes_survive() {
        let root = test_temp_dir("commit_slice");
        let path = root.join("config.xml");
        let (mut buttons_tab, _) = open_store(&path);
        let (mut other_tab, _) = open_store(&path);

        buttons_tab
            .config
            .buttons_mut(ButtonSet::Primary)
            .push(ButtonRecord::new("XL", "xl.exe"));
        buttons_tab
            .commit_slice(Slice::Subset(Subset::PrimaryButtons))
            .expect("primary buttons should commit");

        other_tab
            .config
            .buttons_mut(ButtonSet::Secondary)
            .push(ButtonRecord::new("Notepad", "notepad.exe"));
        other_tab
            .commit_slice(Slice::Subset(Subset::SecondaryButtons))
            .expect("secondary buttons should commit");

        let (reopened, _) = open_store(&path);
        assert_eq!(reopened.config().buttons(ButtonSet::Primary).len(), 1);
        assert_eq!(reopened.config().buttons(ButtonSet::Secondary).len(), 1);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_two_editors_when_committing_layout_then_buttons_kept() {
        let root = test_temp_dir("commit_layout");
        let path = root.join("config.xml");
        let (mut buttons_tab, _) = open_store(&path);
        let (mut layout_tab, _) = open_store(&path);

        buttons_tab
            .add_button(ButtonSet::Primary, ButtonRecord::new("XL", "xl.exe"))
            .expect("button should be added");
        layout_tab.config.set_window_size(1280, 720);
        layout_tab.config.set_flag(0, true);
        layout_tab
            .commit_slice(Slice::Layout)
            .expect("layout should commit");

        let (reopened, _) = open_store(&path);
        assert_eq!(reopened.config().window_size(), (1280, 720));
        assert_eq!(reopened.config().flags(), &[true, false, false]);
        assert_eq!(reopened.config().buttons(ButtonSet::Primary).len(), 1);
        assert_eq!(layout_tab.config().buttons(ButtonSet::Primary).len(), 1);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_unwritable_path_when_adding_then_memory_unchanged() {
        let root = test_temp_dir("failed_save");
        let blocker = root.join("blocker");
        fs::write(&blocker, "not a directory")
            .expect("test payload should be written");
        let (mut store, notifier) = open_store(&blocker.join("config.xml"));

        let added = store
            .add_installation_path(InstallationPath::new("XL", "C:\\XL"));
        let flagged = store.set_flags(&[true]);
        let layout = store.commit_slice(Slice::Layout);

        assert!(added.is_err());
        assert!(flagged.is_err());
        assert!(layout.is_err());
        assert!(store.config().installation_paths().is_empty());
        assert_eq!(store.config().flags(), &[false, false, false]);
        assert!(!notifier.errors().is_empty());
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_full_save_after_other_commit_then_last_writer_wins() {
        let root = test_temp_dir("last_writer");
        let path = root.join("config.xml");
        let (mut first, _) = open_store(&path);
        let (second, _) = open_store(&path);

        first
            .add_button(ButtonSet::Primary, ButtonRecord::new("XL", "xl.exe"))
            .expect("button should be added");
        second.save().expect("stale save should succeed");

        let (reopened, _) = open_store(&path);
        assert!(reopened.config().buttons(ButtonSet::Primary).is_empty());
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_exported_buttons_when_imported_then_exact_duplicates_dropped() {
        let root = test_temp_dir("import");
        let path = root.join("config.xml");
        let export = root.join("buttons.xml");
        let (mut store, _) = open_store(&path);
        store
            .add_button(ButtonSet::Primary, ButtonRecord::new("XL", "xl.exe"))
            .expect("button should be added");
        store
            .export_subset(&export, Subset::PrimaryButtons)
            .expect("export should succeed");
        store
            .add_button(
                ButtonSet::Primary,
                ButtonRecord::new("XL", "xl.exe").elevated(true),
            )
            .expect("button should be added");

        let added = store
            .import_subset(&export, Subset::PrimaryButtons)
            .expect("import should succeed");

        assert_eq!(added, 0);
        assert_eq!(store.config().buttons(ButtonSet::Primary).len(), 2);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_imported_paths_when_names_clash_then_existing_entry_kept() {
        let root = test_temp_dir("import_paths");
        let export = root.join("paths.xml");
        let (mut source, _) = open_store(&root.join("source.xml"));
        source
            .add_installation_path(InstallationPath::new("XL", "D:\\Theirs"))
            .expect("path should be added");
        source
            .add_installation_path(InstallationPath::new("New", "D:\\New"))
            .expect("path should be added");
        source
            .export_subset(&export, Subset::InstallationPaths)
            .expect("export should succeed");
        let (mut target, _) = open_store(&root.join("target.xml"));
        target
            .add_installation_path(InstallationPath::new("XL", "C:\\Ours"))
            .expect("path should be added");

        let added = target
            .import_subset(&export, Subset::InstallationPaths)
            .expect("import should succeed");

        assert_eq!(added, 1);
        let kept = target
            .find_installation_path("XL")
            .expect("existing path should remain");
        assert_eq!(kept.path, "C:\\Ours");
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_button_export_when_imported_as_paths_then_malformed_and_notified()
    {
        let root = test_temp_dir("wrong_root");
        let export = root.join("buttons.xml");
        let (mut store, notifier) = open_store(&root.join("config.xml"));
        store
            .export_subset(&export, Subset::SecondaryButtons)
            .expect("export should succeed");

        let result = store.import_subset(&export, Subset::InstallationPaths);

        assert!(matches!(result, Err(XlPilotError::Malformed { .. })));
        assert_eq!(notifier.errors().len(), 1);
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_import_with_forbidden_characters_then_entry_skipped() {
        let root = test_temp_dir("import_invalid");
        let export = root.join("buttons.xml");
        let payload = ButtonExport {
            items: vec![
                ButtonRecord::new("A&B", "ab.exe"),
                ButtonRecord::new("Notepad", "notepad.exe"),
            ],
        };
        xml::serialize_to_file(&payload, &export)
            .expect("export should be written");
        let (mut store, _) = open_store(&root.join("config.xml"));

        let added = store
            .import_subset(&export, Subset::SecondaryButtons)
            .expect("import should succeed");

        assert_eq!(added, 1);
        let buttons = store.config().buttons(ButtonSet::Secondary);
        assert_eq!(buttons[0].button_text, "Notepad");
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_corrupt_file_when_opened_then_error_returned() {
        let root = test_temp_dir("corrupt");
        let path = root.join("config.xml");
        fs::write(&path, "<Wrong/>").expect("test payload should be written");

        let result = ConfigStore::open(
            path.clone(),
            Box::new(RecordingNotifier::default()),
        );

        assert!(matches!(result, Err(XlPilotError::Malformed { .. })));
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    fn test_temp_dir(test_name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "xlpilot-store-{test_name}-{stamp}-{}",
            std::process::id()
        ));

        fs::create_dir_all(&dir)
            .expect("temporary directory should be created");
        dir
    }
}
