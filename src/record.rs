/// Movement record persistence.
///
/// Every copy or rename performed during an organize run is recorded here, grouped
/// by the directory the file came from, and saved as JSON at the base path so a
/// later invocation can undo it.
use crate::error::{OrganizeError, OrganizeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the movement record file inside the base path.
pub const RECORD_FILE_NAME: &str = ".clipnest_movements.json";

/// Kind of filesystem operation that was performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// File was duplicated; the original stayed in place.
    Copy,
    /// File was moved.
    #[default]
    Rename,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

/// A single recorded file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    /// Path of the file before the operation.
    pub original: PathBuf,
    /// Path the file was copied or moved to.
    pub new: PathBuf,
    /// Older records may omit this; those entries were renames.
    #[serde(default)]
    pub operation: Operation,
}

/// All movements of one or more organize runs, keyed by source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementRecord {
    directories: BTreeMap<String, Vec<MovementEntry>>,
}

impl MovementRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry under `directory`, keeping execution order.
    pub fn add(&mut self, directory: &Path, entry: MovementEntry) {
        self.directories
            .entry(directory.to_string_lossy().to_string())
            .or_default()
            .push(entry);
    }

    /// Appends every entry of `other` after the entries already present.
    pub fn merge(&mut self, other: MovementRecord) {
        for (directory, entries) in other.directories {
            self.directories
                .entry(directory)
                .or_default()
                .extend(entries);
        }
    }

    /// Iterates over directories and their entries.
    pub fn directories(&self) -> impl Iterator<Item = (&str, &[MovementEntry])> {
        self.directories
            .iter()
            .map(|(directory, entries)| (directory.as_str(), entries.as_slice()))
    }

    /// Total number of recorded entries.
    pub fn len(&self) -> usize {
        self.directories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the path to the record file for this base path.
    pub fn file_path(base_path: &Path) -> PathBuf {
        base_path.join(RECORD_FILE_NAME)
    }

    /// Writes this record to disk, replacing any record already saved there.
    ///
    /// Callers that extend an earlier run load it first and [`merge`](Self::merge) into it.
    pub fn save(&self, base_path: &Path) -> OrganizeResult<()> {
        let record_path = Self::file_path(base_path);
        let json_string = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::RecordWriteFailed {
                path: record_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            }
        })?;

        fs::write(&record_path, json_string).map_err(|e| OrganizeError::RecordWriteFailed {
            path: record_path,
            source: e,
        })
    }

    /// Loads the record saved at the base path, if any.
    pub fn load(base_path: &Path) -> OrganizeResult<Option<Self>> {
        let record_path = Self::file_path(base_path);

        if !record_path.exists() {
            return Ok(None);
        }

        let json_string =
            fs::read_to_string(&record_path).map_err(|e| OrganizeError::RecordReadFailed {
                path: record_path.clone(),
                source: e,
            })?;

        let record = serde_json::from_str(&json_string).map_err(|e| {
            OrganizeError::InvalidRecordFormat {
                reason: format!("{}: {}", record_path.display(), e),
            }
        })?;

        Ok(Some(record))
    }

    /// Deletes the record file for a given base path.
    pub fn delete(base_path: &Path) -> OrganizeResult<()> {
        let record_path = Self::file_path(base_path);
        if record_path.exists() {
            fs::remove_file(&record_path).map_err(|e| OrganizeError::RecordWriteFailed {
                path: record_path,
                source: e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(original: &str, new: &str, operation: Operation) -> MovementEntry {
        MovementEntry {
            original: PathBuf::from(original),
            new: PathBuf::from(new),
            operation,
        }
    }

    #[test]
    fn test_load_missing_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        assert!(MovementRecord::load(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_save_writes_directory_keyed_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let mut record = MovementRecord::new();
        record.add(
            Path::new("/videos"),
            entry("/videos/GH010001.MP4", "/videos/Video_0001/GH010001.MP4", Operation::Rename),
        );
        record.add(
            Path::new("/videos"),
            entry("/videos/GH020001.MP4", "/videos/Video_0001/GH020001.MP4", Operation::Copy),
        );
        record.save(base_path).expect("Failed to save record");

        let raw = fs::read_to_string(MovementRecord::file_path(base_path)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entries = json["/videos"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["original"], "/videos/GH010001.MP4");
        assert_eq!(entries[0]["new"], "/videos/Video_0001/GH010001.MP4");
        assert_eq!(entries[0]["operation"], "rename");
        assert_eq!(entries[1]["operation"], "copy");
    }

    #[test]
    fn test_merge_appends_after_saved_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let mut first = MovementRecord::new();
        first.add(Path::new("/a"), entry("/a/1", "/a/x/1", Operation::Rename));
        first.save(base_path).unwrap();

        let mut second = MovementRecord::new();
        second.add(Path::new("/a"), entry("/a/2", "/a/x/2", Operation::Rename));
        second.add(Path::new("/b"), entry("/b/3", "/b/x/3", Operation::Copy));
        let mut combined = MovementRecord::load(base_path).unwrap().unwrap();
        combined.merge(second);
        combined.save(base_path).unwrap();

        let loaded = MovementRecord::load(base_path).unwrap().unwrap();
        assert_eq!(loaded.len(), 3);
        let (directory, entries) = loaded.directories().next().unwrap();
        assert_eq!(directory, "/a");
        assert_eq!(entries[0].original, PathBuf::from("/a/1"));
        assert_eq!(entries[1].original, PathBuf::from("/a/2"));
    }

    #[test]
    fn test_missing_operation_defaults_to_rename() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(
            MovementRecord::file_path(base_path),
            r#"{"/a": [{"original": "/a/GOPR0001.MP4", "new": "/a/Video_0001/GOPR0001.MP4"}]}"#,
        )
        .unwrap();

        let loaded = MovementRecord::load(base_path).unwrap().unwrap();
        let (_, entries) = loaded.directories().next().unwrap();
        assert_eq!(entries[0].operation, Operation::Rename);
    }

    #[test]
    fn test_invalid_record_format() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(MovementRecord::file_path(base_path), "[1, 2, 3]").unwrap();

        let result = MovementRecord::load(base_path);
        assert!(matches!(
            result,
            Err(OrganizeError::InvalidRecordFormat { .. })
        ));
    }

    #[test]
    fn test_delete_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();

        let mut record = MovementRecord::new();
        record.add(Path::new("/a"), entry("/a/1", "/a/x/1", Operation::Rename));
        record.save(base_path).unwrap();
        assert!(MovementRecord::file_path(base_path).exists());

        MovementRecord::delete(base_path).unwrap();
        assert!(!MovementRecord::file_path(base_path).exists());
        // Deleting twice is fine
        MovementRecord::delete(base_path).unwrap();
    }
}
