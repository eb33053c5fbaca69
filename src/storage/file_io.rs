//! JSON file helpers for the local snapshot
//!
//! Writes go through a temp file in the target's directory and a rename, so
//! a reader sees either the previous snapshot or the new one.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::LedgerError;

fn storage_error(action: &str, path: &Path, e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// Parse the JSON document at `path`; `Ok(None)` when there is no file
pub fn read_json<T, P>(path: P) -> Result<Option<T>, LedgerError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage_error("open", path, e)),
    };

    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|e| storage_error("parse", path, e))
}

/// Replace the file at `path` with `data` as pretty JSON
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), LedgerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let written = write_temp(&temp_path, data)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| storage_error("replace", path, e)));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

/// Rename `path` to `<name>.<label>-<timestamp>` next to it
///
/// Returns the new location.
pub fn move_aside(path: &Path, label: &str) -> Result<PathBuf, LedgerError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = path.with_file_name(format!(
        "{}.{}-{}",
        file_name,
        label,
        Utc::now().format("%Y%m%dT%H%M%S%.3f")
    ));

    fs::rename(path, &target).map_err(|e| storage_error("move aside", path, e))?;
    Ok(target)
}

// Hidden and per-process so two runs never share a temp file
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

fn write_temp<T: Serialize>(temp_path: &Path, data: &T) -> Result<(), LedgerError> {
    let file = File::create(temp_path).map_err(|e| storage_error("create", temp_path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_error("serialize into", temp_path, e))?;
    writer
        .flush()
        .map_err(|e| storage_error("flush", temp_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_error("sync", temp_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Snapshot {
        label: String,
        cents: i64,
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let data: Option<Snapshot> = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert!(data.is_none());
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        let data = Snapshot {
            label: "pension".to_string(),
            cents: 150000,
        };

        write_json_atomic(&path, &data).unwrap();

        assert_eq!(file_names(temp_dir.path()), vec!["ledger.json".to_string()]);
        let loaded: Option<Snapshot> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(data));
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");

        write_json_atomic(&path, &Snapshot::default()).unwrap();
        let newer = Snapshot {
            label: "rent".to_string(),
            cents: -80000,
        };
        write_json_atomic(&path, &newer).unwrap();

        let loaded: Option<Snapshot> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(newer));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("ledger.json");

        write_json_atomic(&path, &Snapshot::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_failed_write_cleans_up_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A directory in the way makes the final rename fail
        let path = temp_dir.path().join("ledger.json");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let result = write_json_atomic(&path, &Snapshot::default());

        assert!(matches!(result, Err(LedgerError::Storage(_))));
        assert_eq!(file_names(temp_dir.path()), vec!["ledger.json".to_string()]);
    }

    #[test]
    fn test_read_invalid_json_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        let result: Result<Option<Snapshot>, _> = read_json(&path);
        assert!(matches!(result, Err(LedgerError::Storage(_))));
    }

    #[test]
    fn test_move_aside_renames_with_label() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, "garbage").unwrap();

        let moved = move_aside(&path, "corrupt").unwrap();

        assert!(!path.exists());
        assert!(moved
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ledger.json.corrupt-"));
        assert_eq!(fs::read_to_string(moved).unwrap(), "garbage");
    }
}
