//! Directory traversal and camera file discovery.

use crate::camera_file::CameraFile;
use crate::config::ScanFilter;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Files sharing a containing directory and a recording id, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingGroup {
    pub directory: PathBuf,
    pub recording_id: String,
    pub files: Vec<CameraFile>,
}

impl RecordingGroup {
    /// Number of MP4 segments in the group.
    pub fn segment_count(&self) -> usize {
        self.files.iter().filter(|file| file.is_segment()).count()
    }

    /// A recording split over more than one segment needs its own folder.
    pub fn qualifies(&self) -> bool {
        self.segment_count() > 1
    }

    /// Name of the folder the group is moved into.
    pub fn folder_name(&self) -> String {
        format!("Video_{}", self.recording_id)
    }

    /// Full path of the destination folder.
    pub fn destination(&self) -> PathBuf {
        self.directory.join(self.folder_name())
    }
}

/// Camera files found under a root, grouped by directory and recording id.
#[derive(Debug, Default)]
pub struct ScanResult {
    groups: Vec<RecordingGroup>,
    index: HashMap<(PathBuf, String), usize>,
}

impl ScanResult {
    fn insert(&mut self, directory: &Path, file: CameraFile) {
        let key = (directory.to_path_buf(), file.recording_id.clone());
        match self.index.get(&key) {
            Some(&position) => self.groups[position].files.push(file),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push(RecordingGroup {
                    directory: directory.to_path_buf(),
                    recording_id: file.recording_id.clone(),
                    files: vec![file],
                });
            }
        }
    }

    /// All groups in discovery order.
    pub fn groups(&self) -> &[RecordingGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<RecordingGroup> {
        self.groups
    }

    #[cfg(test)]
    fn group(&self, directory: &Path, recording_id: &str) -> Option<&RecordingGroup> {
        self.index
            .get(&(directory.to_path_buf(), recording_id.to_string()))
            .map(|&position| &self.groups[position])
    }

    /// Number of camera files found.
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|group| group.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Walks a directory tree collecting camera files.
///
/// Traversal problems never abort a scan: unreadable directories are logged and
/// skipped, and the rest of the tree is still visited.
pub struct Scanner<'a> {
    root: &'a Path,
    recursive: bool,
    filter: &'a ScanFilter,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &'a Path, recursive: bool, filter: &'a ScanFilter) -> Self {
        Self {
            root,
            recursive,
            filter,
        }
    }

    /// Scans the root, and its subdirectories when recursive.
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        self.scan_directory(self.root, &mut result);
        result
    }

    fn scan_directory(&self, directory: &Path, result: &mut ScanResult) {
        let listing = fs::read_dir(directory)
            .and_then(|entries| entries.collect::<Result<Vec<_>, _>>());
        let mut entries = match listing {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!("Permission denied accessing {}: {}", directory.display(), e);
                return;
            }
            Err(e) => {
                error!("Error processing directory {}: {}", directory.display(), e);
                return;
            }
        };
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Could not read file type of {}: {}", path.display(), e);
                    continue;
                }
            };

            if file_type.is_file() {
                if let Some(file) = CameraFile::from_path(&path) {
                    debug!(
                        "Found {} {} (recording {})",
                        file.extension.as_str(),
                        path.display(),
                        file.recording_id
                    );
                    result.insert(directory, file);
                }
            } else if file_type.is_dir() && self.recursive {
                if self.filter.is_excluded(self.root, &path) {
                    debug!("Skipping excluded directory {}", path.display());
                    continue;
                }
                self.scan_directory(&path, result);
            }
        }
    }
}
