//! Atomic JSON persistence for settings documents.
//!
//! Writes go to a uniquely named temp file next to the target, are synced to
//! disk, optionally back up the previous document, and are then renamed over
//! the target. A reader therefore sees either the old or the new document,
//! never a torn one, even when a sync client picks the file up mid-save.

use crate::{BookMasterError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn io_error(message: String, path: &Path) -> impl FnOnce(std::io::Error) -> BookMasterError {
    let path = path.to_path_buf();
    move |e| BookMasterError::Io {
        message,
        path: Some(path),
        source: Some(e),
    }
}

/// Read and parse a JSON document.
///
/// Returns `None` if the file doesn't exist, or an error if parsing fails.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(format!("Failed to read {}", path.display()), path)(e)),
    };

    let data = serde_json::from_str(&contents).map_err(|e| BookMasterError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write a JSON document atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T, keep_backup: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_error(
                format!("Failed to create directory {}", parent.display()),
                parent,
            ))?;
        }
    }

    let serialized = serde_json::to_string_pretty(data).map_err(|e| BookMasterError::Json {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        source: Some(e),
    })?;

    let temp_path = temp_path_for(path);
    if let Err(e) = write_synced(&temp_path, serialized.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if keep_backup && path.exists() {
        let backup_path = path.with_extension("json.bak");
        match fs::copy(path, &backup_path) {
            Ok(_) => debug!("Created backup: {}", backup_path.display()),
            // A missing backup never blocks the save itself.
            Err(e) => warn!("Failed to create backup {}: {}", backup_path.display(), e),
        }
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        io_error(
            format!("Failed to rename {} to {}", temp_path.display(), path.display()),
            path,
        )(e)
    })?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_synced(temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(io_error(
            format!("Failed to create temp file {}", temp_path.display()),
            temp_path,
        ))?;

    file.write_all(bytes).map_err(io_error(
        format!("Failed to write temp file {}", temp_path.display()),
        temp_path,
    ))?;

    file.sync_all().map_err(io_error(
        format!("Failed to sync temp file {}", temp_path.display()),
        temp_path,
    ))
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doc {
        name: String,
        value: i32,
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let doc = Doc {
            name: "fiction".to_string(),
            value: 42,
        };

        atomic_write_json(&path, &doc, false).unwrap();

        let read: Option<Doc> = atomic_read_json(&path).unwrap();
        assert_eq!(read, Some(doc));
    }

    #[test]
    fn test_backup_holds_previous_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let first = Doc {
            name: "first".to_string(),
            value: 1,
        };
        let second = Doc {
            name: "second".to_string(),
            value: 2,
        };

        atomic_write_json(&path, &first, true).unwrap();
        atomic_write_json(&path, &second, true).unwrap();

        let backup: Option<Doc> = atomic_read_json(&path.with_extension("json.bak")).unwrap();
        assert_eq!(backup, Some(first));
        let current: Option<Doc> = atomic_read_json(&path).unwrap();
        assert_eq!(current, Some(second));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let read: Option<Doc> = atomic_read_json(&temp_dir.path().join("missing.json")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_read_corrupt_file_is_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        fs::write(&path, "{ not json").unwrap();

        let err = atomic_read_json::<Doc>(&path).unwrap_err();
        assert!(matches!(err, BookMasterError::Json { .. }));
    }

    #[test]
    fn test_write_creates_directories_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("devices").join("abc.json");
        let doc = Doc {
            name: "nested".to_string(),
            value: 99,
        };

        atomic_write_json(&path, &doc, false).unwrap();

        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("abc.json")]);
    }
}
