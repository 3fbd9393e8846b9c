/// Undo functionality for reverting organize runs.
///
/// Replays the saved movement record: renamed files go back to where they came
/// from, copies are deleted, and folders left empty are removed.
use crate::context::RunContext;
use crate::error::{OrganizeError, OrganizeResult};
use crate::record::{MovementEntry, MovementRecord, Operation};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// False when no movement record was found.
    pub record_found: bool,
    /// Number of renamed files moved back.
    pub restored_files: usize,
    /// Number of copies deleted.
    pub removed_copies: usize,
    /// Entries whose file no longer exists at its new location.
    pub skipped_files: Vec<PathBuf>,
    /// Entries that could not be reverted.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Empty directories removed after restoring.
    pub removed_folders: Vec<PathBuf>,
}

impl UndoReport {
    /// Returns the total number of entries processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files
            + self.removed_copies
            + self.skipped_files.len()
            + self.failed_restores.len()
    }

    /// Returns true if no entry failed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty()
    }
}

/// Manages undo operations for organize runs.
pub struct UndoManager;

impl UndoManager {
    /// Undoes every organize run recorded at `base_path`.
    ///
    /// # Edge Cases Handled
    ///
    /// * **No record**: reported as nothing to undo, not an error
    /// * **File not found**: skipped
    /// * **Original path occupied**: the occupying file is backed up with a timestamp suffix
    /// * **Failure to revert an entry**: recorded in the report, the record file is kept
    /// * **Folder removal failure**: logged as a warning
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clipnest::context::RunContext;
    /// use clipnest::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// let mut ctx = RunContext::silent();
    /// let result = UndoManager::undo(Path::new("/media/card/DCIM"), false, &mut ctx);
    /// match result {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(
        base_path: &Path,
        dry_run: bool,
        ctx: &mut RunContext,
    ) -> OrganizeResult<UndoReport> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path is not a directory",
                ),
            });
        }

        let mut report = UndoReport::default();
        let Some(record) = MovementRecord::load(base_path)? else {
            info!("No organization to undo.");
            return Ok(report);
        };
        report.record_found = true;

        ctx.progress.start(record.len() as u64, "Undoing changes");
        for (_, entries) in record.directories() {
            for entry in entries {
                Self::revert_entry(entry, dry_run, &mut report);
                ctx.progress.advance();
            }
        }
        ctx.progress.finish();

        if dry_run {
            info!("This was a dry run - no files were actually modified.");
            return Ok(report);
        }

        if !report.is_complete_success() {
            warn!(
                "{} entries could not be reverted; keeping {}",
                report.failed_restores.len(),
                MovementRecord::file_path(base_path).display()
            );
            return Ok(report);
        }

        report.removed_folders = Self::remove_empty_folders(base_path);
        MovementRecord::delete(base_path)?;
        info!("Undo complete!");

        Ok(report)
    }

    fn revert_entry(entry: &MovementEntry, dry_run: bool, report: &mut UndoReport) {
        if !entry.new.exists() {
            report.skipped_files.push(entry.new.clone());
            return;
        }

        if dry_run {
            match entry.operation {
                Operation::Copy => info!("Would remove copy at '{}'", entry.new.display()),
                Operation::Rename => info!(
                    "Would rename '{}' back to '{}'",
                    entry.new.display(),
                    entry.original.display()
                ),
            }
            return;
        }

        let result = match entry.operation {
            Operation::Copy => fs::remove_file(&entry.new)
                .map(|()| {
                    info!("Removed copy at '{}'", entry.new.display());
                    report.removed_copies += 1;
                })
                .map_err(|e| format!("Failed to remove copy: {}", e)),
            Operation::Rename => Self::restore_file(entry).map(|()| {
                info!(
                    "Renamed '{}' back to '{}'",
                    entry.new.display(),
                    entry.original.display()
                );
                report.restored_files += 1;
            }),
        };

        if let Err(reason) = result {
            warn!("Could not revert '{}': {}", entry.new.display(), reason);
            report.failed_restores.push((entry.new.clone(), reason));
        }
    }

    /// Moves a renamed file back to its original location.
    ///
    /// Handles file name conflicts by backing up the existing file with a timestamp.
    fn restore_file(entry: &MovementEntry) -> Result<(), String> {
        if let Some(parent) = entry.original.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Could not recreate {}: {}", parent.display(), e))?;
        }

        if entry.original.exists() {
            let backup_path = Self::generate_backup_path(&entry.original);
            fs::rename(&entry.original, &backup_path)
                .map_err(|e| format!("Could not backup conflicting file: {}", e))?;
            warn!(
                "'{}' was occupied; moved it to '{}'",
                entry.original.display(),
                backup_path.display()
            );
        }

        fs::rename(&entry.new, &entry.original)
            .map_err(|e| format!("Failed to restore file: {}", e))
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `GH010001.MP4` becomes `GH010001.MP4.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        let backup_name = format!("{}.bak.{}", filename, timestamp);

        if let Some(parent) = original_path.parent() {
            parent.join(backup_name)
        } else {
            PathBuf::from(backup_name)
        }
    }

    /// Removes empty directories below `base_path`, deepest first.
    fn remove_empty_folders(base_path: &Path) -> Vec<PathBuf> {
        let mut removed = Vec::new();
        let directories = WalkDir::new(base_path)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Could not inspect folder: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir());

        for entry in directories {
            let dir_path = entry.path();
            let is_empty = fs::read_dir(dir_path).map(|mut entries| entries.next().is_none());
            match is_empty {
                Ok(true) => match fs::remove_dir(dir_path) {
                    Ok(()) => {
                        info!("Removed empty folder: {}", dir_path.display());
                        removed.push(dir_path.to_path_buf());
                    }
                    Err(e) => warn!("Could not remove folder {}: {}", dir_path.display(), e),
                },
                Ok(false) => {}
                Err(e) => warn!("Could not remove folder {}: {}", dir_path.display(), e),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn save_record(base_path: &Path, entries: &[(PathBuf, PathBuf, Operation)]) {
        let mut record = MovementRecord::new();
        for (original, new, operation) in entries {
            record.add(
                base_path,
                MovementEntry {
                    original: original.clone(),
                    new: new.clone(),
                    operation: *operation,
                },
            );
        }
        record.save(base_path).expect("Failed to save record");
    }

    #[test]
    fn test_undo_no_record() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let report = UndoManager::undo(temp_dir.path(), false, &mut RunContext::silent())
            .expect("Undo without record should succeed");
        assert!(!report.record_found);
        assert_eq!(report.total_processed(), 0);
    }

    #[test]
    fn test_undo_rename() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let folder = base_path.join("Video_0001");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("GH010001.MP4"), "segment").unwrap();
        save_record(
            base_path,
            &[(
                base_path.join("GH010001.MP4"),
                folder.join("GH010001.MP4"),
                Operation::Rename,
            )],
        );

        let report =
            UndoManager::undo(base_path, false, &mut RunContext::silent()).expect("Undo failed");

        assert_eq!(report.restored_files, 1);
        assert!(report.is_complete_success());
        assert!(base_path.join("GH010001.MP4").exists());
        assert!(!folder.exists());
        assert_eq!(report.removed_folders, vec![folder]);
        assert!(!MovementRecord::file_path(base_path).exists());
    }

    #[test]
    fn test_undo_copy_removes_only_copy() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let folder = base_path.join("Video_0001");
        fs::create_dir(&folder).unwrap();
        fs::write(base_path.join("GH010001.MP4"), "segment").unwrap();
        fs::write(folder.join("GH010001.MP4"), "segment").unwrap();
        save_record(
            base_path,
            &[(
                base_path.join("GH010001.MP4"),
                folder.join("GH010001.MP4"),
                Operation::Copy,
            )],
        );

        let report =
            UndoManager::undo(base_path, false, &mut RunContext::silent()).expect("Undo failed");

        assert_eq!(report.removed_copies, 1);
        assert!(base_path.join("GH010001.MP4").exists());
        assert!(!folder.exists());
    }

    #[test]
    fn test_undo_skips_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        save_record(
            base_path,
            &[(
                base_path.join("GOPR0001.MP4"),
                base_path.join("Video_0001").join("GOPR0001.MP4"),
                Operation::Rename,
            )],
        );

        let report =
            UndoManager::undo(base_path, false, &mut RunContext::silent()).expect("Undo failed");

        assert_eq!(report.restored_files, 0);
        assert_eq!(report.skipped_files.len(), 1);
        assert!(report.is_complete_success());
        assert!(!MovementRecord::file_path(base_path).exists());
    }

    #[test]
    fn test_undo_recreates_missing_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let folder = base_path.join("Video_0001");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("GH010001.MP4"), "segment").unwrap();
        let original = base_path.join("day1").join("GH010001.MP4");
        save_record(
            base_path,
            &[(original.clone(), folder.join("GH010001.MP4"), Operation::Rename)],
        );

        UndoManager::undo(base_path, false, &mut RunContext::silent()).expect("Undo failed");

        assert!(original.exists());
    }

    #[test]
    fn test_undo_with_file_name_conflict() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let folder = base_path.join("Video_0001");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("GH010001.MP4"), "original content").unwrap();
        fs::write(base_path.join("GH010001.MP4"), "new content").unwrap();
        save_record(
            base_path,
            &[(
                base_path.join("GH010001.MP4"),
                folder.join("GH010001.MP4"),
                Operation::Rename,
            )],
        );

        let report =
            UndoManager::undo(base_path, false, &mut RunContext::silent()).expect("Undo failed");

        assert_eq!(report.restored_files, 1);
        let restored = fs::read_to_string(base_path.join("GH010001.MP4")).unwrap();
        assert_eq!(restored, "original content");

        let backups: Vec<_> = fs::read_dir(base_path)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".bak."))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_undo_dry_run_keeps_everything() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let folder = base_path.join("Video_0001");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("GH010001.MP4"), "segment").unwrap();
        save_record(
            base_path,
            &[(
                base_path.join("GH010001.MP4"),
                folder.join("GH010001.MP4"),
                Operation::Rename,
            )],
        );

        let report =
            UndoManager::undo(base_path, true, &mut RunContext::silent()).expect("Undo failed");

        assert!(report.record_found);
        assert_eq!(report.restored_files, 0);
        assert!(folder.join("GH010001.MP4").exists());
        assert!(MovementRecord::file_path(base_path).exists());
    }

    #[test]
    fn test_undo_invalid_base_path() {
        let mut ctx = RunContext::silent();
        let result = UndoManager::undo(Path::new("/non/existent/path"), false, &mut ctx);
        assert!(result.is_err());
    }
}
