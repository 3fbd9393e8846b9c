/// Moves or copies qualifying recording groups into per-recording folders.
///
/// Each group from an [`OrganizePlan`] lands in a `Video_<id>` folder next to its
/// files. Every executed operation is recorded in a [`MovementRecord`] that is
/// saved at the base path so the run can be undone.
use crate::context::RunContext;
use crate::error::{OrganizeError, OrganizeResult};
use crate::grouper::OrganizePlan;
use crate::record::{MovementEntry, MovementRecord, Operation};
use crate::scanner::RecordingGroup;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Flags controlling an organize run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Descend into subdirectories of the base path.
    pub recursive: bool,
    /// Log what would happen without touching the filesystem.
    pub dry_run: bool,
    /// Copy files instead of moving them.
    pub copy: bool,
    /// Also copy each file into a timestamped backup directory. Requires `copy`.
    pub backup: bool,
}

impl OrganizeOptions {
    /// The operation applied to each file.
    pub fn operation(&self) -> Operation {
        if self.copy {
            Operation::Copy
        } else {
            Operation::Rename
        }
    }

    /// Backups only make sense when the originals stay in place.
    pub fn backup_enabled(&self) -> bool {
        self.copy && self.backup
    }
}

/// Summary of a completed organize run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Destination folders and the number of files placed in each.
    pub folders: Vec<(PathBuf, usize)>,
    /// Files processed across those groups.
    pub files: usize,
    /// Operations performed in this run. Empty for dry runs.
    pub record: MovementRecord,
}

/// Executes an organize plan.
pub struct FileOrganizer<'a> {
    base_path: &'a Path,
    options: OrganizeOptions,
    backup_path: Option<PathBuf>,
    record: MovementRecord,
    report: OrganizeReport,
}

impl<'a> FileOrganizer<'a> {
    /// Creates an organizer for `base_path`.
    ///
    /// `backup_path` is only used when both copy and backup are enabled.
    pub fn new(
        base_path: &'a Path,
        options: OrganizeOptions,
        backup_path: Option<PathBuf>,
    ) -> Self {
        Self {
            base_path,
            options,
            backup_path: backup_path.filter(|_| options.backup_enabled()),
            record: MovementRecord::new(),
            report: OrganizeReport::default(),
        }
    }

    /// Processes every group of the plan in order.
    ///
    /// The first failing group aborts the run. Files already handled stay where
    /// they are, and their movements are still saved so they can be undone.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clipnest::config::ScanFilter;
    /// use clipnest::context::RunContext;
    /// use clipnest::file_organizer::{FileOrganizer, OrganizeOptions};
    /// use clipnest::grouper::OrganizePlan;
    /// use clipnest::scanner::Scanner;
    /// use std::path::Path;
    ///
    /// let base_path = Path::new("/media/card/DCIM");
    /// let filter = ScanFilter::default();
    /// let plan = OrganizePlan::from_scan(Scanner::new(base_path, false, &filter).scan());
    ///
    /// let organizer = FileOrganizer::new(base_path, OrganizeOptions::default(), None);
    /// match organizer.execute(&plan, &mut RunContext::silent()) {
    ///     Ok(report) => println!("Organized {} recordings", report.folders.len()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn execute(
        mut self,
        plan: &OrganizePlan,
        ctx: &mut RunContext,
    ) -> OrganizeResult<OrganizeReport> {
        if !self.base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: self.base_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "base path is not a directory"),
            });
        }

        if plan.is_empty() {
            return Ok(self.report);
        }

        // An unreadable record must stop the run before anything moves
        let mut history = if self.options.dry_run {
            MovementRecord::new()
        } else {
            MovementRecord::load(self.base_path)?.unwrap_or_default()
        };

        self.create_backup_dir()?;

        ctx.progress.start(plan.total_files as u64, "Processing files");
        let outcome = plan
            .groups
            .iter()
            .try_for_each(|group| self.organize_group(group, ctx));
        ctx.progress.finish();

        if !self.options.dry_run && !self.record.is_empty() {
            history.merge(self.record.clone());
            let saved = history.save(self.base_path);
            match (&outcome, saved) {
                (Ok(()), saved) => saved?,
                (Err(_), Ok(())) => warn!(
                    "Run aborted; saved {} completed movements so they can be undone",
                    self.record.len()
                ),
                (Err(_), Err(e)) => error!("Could not save movement record: {}", e),
            }
        }
        outcome?;

        self.report.record = self.record;
        Ok(self.report)
    }

    fn create_backup_dir(&self) -> OrganizeResult<()> {
        if let Some(backup_path) = &self.backup_path {
            if self.options.dry_run {
                info!("Would create backup directory '{}'", backup_path.display());
            } else {
                fs::create_dir_all(backup_path).map_err(|e| {
                    OrganizeError::DirectoryCreationFailed {
                        path: backup_path.clone(),
                        source: e,
                    }
                })?;
                info!("Created backup directory '{}'", backup_path.display());
            }
        }
        Ok(())
    }

    fn organize_group(
        &mut self,
        group: &RecordingGroup,
        ctx: &mut RunContext,
    ) -> OrganizeResult<()> {
        let folder_path = group.destination();
        debug!(
            "Recording {} in {}: {} files, {} segments",
            group.recording_id,
            group.directory.display(),
            group.files.len(),
            group.segment_count()
        );

        if let Some(path) = self.unrecordable_path(group) {
            warn!(
                "Skipping recording {} in {}: '{}' is not valid UTF-8 and cannot be recorded",
                group.recording_id,
                group.directory.display(),
                path.display()
            );
            for _ in &group.files {
                ctx.progress.advance();
            }
            return Ok(());
        }

        if self.options.copy {
            self.check_disk_space(group, ctx)?;
        }

        if !self.options.dry_run {
            fs::create_dir_all(&folder_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: folder_path.clone(),
                source: e,
            })?;
        }

        let operation = self.options.operation();
        for file in &group.files {
            if let Some(backup_target) = self.backup_target(group, file.file_name()) {
                self.apply(&group.directory, Operation::Copy, &file.path, &backup_target)?;
            }

            let new_path = folder_path.join(file.file_name());
            self.apply(&group.directory, operation, &file.path, &new_path)?;
            ctx.progress.advance();
            self.report.files += 1;
        }

        self.report.folders.push((folder_path, group.files.len()));
        Ok(())
    }

    /// First path this group would write to the record that JSON cannot hold.
    fn unrecordable_path(&self, group: &RecordingGroup) -> Option<PathBuf> {
        let folder_path = group.destination();
        let mut paths = vec![group.directory.clone(), folder_path.clone()];
        for file in &group.files {
            paths.push(file.path.clone());
            paths.push(folder_path.join(file.file_name()));
            if let Some(backup_target) = self.backup_target(group, file.file_name()) {
                paths.push(backup_target);
            }
        }
        paths.into_iter().find(|path| path.to_str().is_none())
    }

    /// Fails when the filesystem cannot hold every copy this group needs.
    fn check_disk_space(&self, group: &RecordingGroup, ctx: &RunContext) -> OrganizeResult<()> {
        let mut required = 0u64;
        for file in &group.files {
            match fs::metadata(&file.path) {
                Ok(metadata) => required += metadata.len(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(OrganizeError::SpaceCheckFailed {
                        path: file.path.clone(),
                        source: e,
                    });
                }
            }
        }
        if self.backup_path.is_some() {
            required *= 2;
        }

        let available = ctx
            .space
            .available_space(self.base_path)
            .map_err(|e| OrganizeError::SpaceCheckFailed {
                path: self.base_path.to_path_buf(),
                source: e,
            })?;

        if available > required {
            Ok(())
        } else {
            error!(
                "Not enough disk space to copy recording {} ({} bytes needed, {} available)",
                group.recording_id, required, available
            );
            Err(OrganizeError::InsufficientSpace {
                path: self.base_path.to_path_buf(),
                required,
                available,
            })
        }
    }

    /// Where the backup copy of a file goes, mirroring its directory under the backup root.
    fn backup_target(
        &self,
        group: &RecordingGroup,
        file_name: &std::ffi::OsStr,
    ) -> Option<PathBuf> {
        let backup_path = self.backup_path.as_ref()?;
        let relative = group
            .directory
            .strip_prefix(self.base_path)
            .unwrap_or(Path::new(""));
        Some(backup_path.join(relative).join(file_name))
    }

    /// Performs or simulates one operation and records it.
    fn apply(
        &mut self,
        directory: &Path,
        operation: Operation,
        source: &Path,
        destination: &Path,
    ) -> OrganizeResult<()> {
        if self.options.dry_run {
            info!(
                "Would {} '{}' to '{}'",
                operation,
                source.display(),
                destination.display()
            );
            return Ok(());
        }

        if let Err(e) = transfer(operation, source, destination) {
            error!("Error processing file {}: {}", source.display(), e);
            return Err(OrganizeError::FileOperationFailed {
                operation,
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                source_error: e,
            });
        }

        info!(
            "{} '{}' to '{}'",
            match operation {
                Operation::Copy => "Copied",
                Operation::Rename => "Renamed",
            },
            source.display(),
            destination.display()
        );
        self.record.add(
            directory,
            MovementEntry {
                original: source.to_path_buf(),
                new: destination.to_path_buf(),
                operation,
            },
        );
        Ok(())
    }
}

/// Copies or renames without ever replacing an existing file.
fn transfer(operation: Operation, source: &Path, destination: &Path) -> io::Result<()> {
    if destination.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }
    match operation {
        Operation::Copy => {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            copy_with_metadata(source, destination)
        }
        Operation::Rename => fs::rename(source, destination),
    }
}

/// Copies contents and permissions, then carries over access and modification times.
fn copy_with_metadata(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    fs::copy(source, destination)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    // Read-only copies can't be opened for writing; their times stay as copied.
    match File::options().write(true).open(destination) {
        Ok(file) => file.set_times(times),
        Err(e) => {
            debug!("Could not preserve times on {}: {}", destination.display(), e);
            Ok(())
        }
    }
}
