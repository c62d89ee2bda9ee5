use std::fs;
use std::path::Path;

use crate::error::XlPilotError;
use crate::model::InstallationPath;
use crate::templates::XL_CLIENT_EXECUTABLE;

/// Find installations directly below `root`.
///
/// A subdirectory counts when it contains the XL client executable
/// (case-insensitive). Results are named after the folder and sorted.
pub fn discover_installations(
    root: &Path,
) -> Result<Vec<InstallationPath>, XlPilotError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let dir = entry.path();
        if !dir.is_dir() || !contains_client(&dir) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        log::debug!("found XL installation {name} at {}", dir.display());
        found.push(InstallationPath::new(name, dir.to_string_lossy()));
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

fn contains_client(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry
            .file_name()
            .to_string_lossy()
            .eq_ignore_ascii_case(XL_CLIENT_EXECUTABLE)
            && entry.path().is_file()
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::discover_installations;

    #[test]
    fn given_folders_with_and_without_client_then_only_installations_found() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let root = std::env::temp_dir().join(format!(
            "xlpilot-discovery-{stamp}-{}",
            std::process::id()
        ));
        for (dir, file) in [
            ("XL 2024.1", "CDNXL.EXE"),
            ("XL 2023.0", "cdnxl.exe"),
            ("Docs", "readme.txt"),
        ] {
            fs::create_dir_all(root.join(dir))
                .expect("installation directory should be created");
            fs::write(root.join(dir).join(file), b"")
                .expect("file should be written");
        }

        let found =
            discover_installations(&root).expect("discovery should succeed");

        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["XL 2023.0", "XL 2024.1"]);
        assert!(found[0].database.is_empty());
        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_missing_root_then_io_error() {
        let missing =
            std::env::temp_dir().join("xlpilot-discovery-absent-root");
        assert!(discover_installations(&missing).is_err());
    }
}
