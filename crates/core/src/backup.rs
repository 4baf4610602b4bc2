//! Backup helpers for files about to be overwritten.

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copy `path` to a timestamped `<path>.<YYYYMMDD_HHMMSS>.backup` sibling.
/// Plain full-content duplication; the caller decides when a backup is due.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{stamp}.backup"));
    let backup_path = PathBuf::from(name);
    fs::copy(path, &backup_path)?;
    debug!("backed up {} to {}", path.display(), backup_path.display());
    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// The backup holds the original content under a stamped name.
    #[test]
    fn copies_full_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.srt");
        fs::write(&path, "old content").unwrap();

        let backup_path = create_backup(&path).unwrap();
        let name = backup_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("out.srt."));
        assert!(name.ends_with(".backup"));
        assert_eq!(fs::read_to_string(&backup_path).unwrap(), "old content");
        assert_eq!(fs::read_to_string(&path).unwrap(), "old content");
    }

    /// Backing up a missing file is an error the caller can surface.
    #[test]
    fn fails_on_missing_source() {
        let dir = tempdir().unwrap();
        assert!(create_backup(&dir.path().join("absent.srt")).is_err());
    }
}
