use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::XlPilotError;

const APP_DIR_NAME: &str = "XLPilot";
const BACKUP_DIR_NAME: &str = "PathBackups";

#[cfg(windows)]
pub(crate) const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub(crate) const PATH_SEPARATOR: char = ':';

/// Timestamped copies of the PATH value taken before it is changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBackup {
    dir: PathBuf,
}

impl Default for PathBackup {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(APP_DIR_NAME).join(BACKUP_DIR_NAME))
    }
}

impl PathBackup {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `value` to a new backup file and return its path.
    pub fn store(&self, value: &str) -> Result<PathBuf, XlPilotError> {
        fs::create_dir_all(&self.dir)?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let file = self.dir.join(format!("PATH_{stamp}.txt"));
        fs::write(&file, value)?;
        log::info!("PATH backup written to {}", file.display());
        Ok(file)
    }
}

/// Put `directory` first in a PATH value, dropping other occurrences of it.
///
/// Entries are compared case-insensitively and without trailing slashes.
pub fn apply_path_priority(
    current: &str,
    directory: &str,
    separator: char,
) -> String {
    let wanted = normalize_entry(directory);
    let rest = current
        .split(separator)
        .filter(|entry| !entry.trim().is_empty())
        .filter(|entry| normalize_entry(entry) != wanted);

    std::iter::once(directory)
        .chain(rest)
        .collect::<Vec<_>>()
        .join(separator.to_string().as_str())
}

fn normalize_entry(entry: &str) -> String {
    entry
        .trim()
        .trim_end_matches(['\\', '/'])
        .to_lowercase()
}
