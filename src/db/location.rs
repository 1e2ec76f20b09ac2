use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-records-manager";
/// Records file name stored inside the application data directory.
const DATA_FILE_NAME: &str = "students.db";
/// Log file name stored next to the records file.
const LOG_FILE_NAME: &str = "student-records.log";

/// Resolve the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Default location of the records file when none is configured.
pub fn default_data_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DATA_FILE_NAME))
}

/// Default location of the diagnostic log when none is configured.
pub fn default_log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE_NAME))
}

/// Make sure the directory that will hold `path` exists.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Like [`ensure_parent_dir`] but with an application-level error message.
pub fn prepare_file_location(path: &Path) -> Result<()> {
    ensure_parent_dir(path)
        .with_context(|| format!("failed to create directory for {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_parent_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("students.db");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn bare_file_name_needs_no_directory() {
        assert!(ensure_parent_dir(Path::new("students.db")).is_ok());
    }

    #[test]
    fn default_paths_share_the_data_directory() {
        if let (Ok(data), Ok(log)) = (default_data_path(), default_log_path()) {
            assert_eq!(data.parent(), log.parent());
            assert!(data.ends_with(Path::new(DATA_DIR_NAME).join(DATA_FILE_NAME)));
        }
    }
}
