//! Command-line interface module for clipnest.
//!
//! This module handles:
//! - Argument parsing
//! - Merging flags with the configuration file
//! - Organize orchestration (scan, group, execute)
//! - Undo dispatch

use crate::config::{Config, ScanFilter};
use crate::context::RunContext;
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_organizer::{FileOrganizer, OrganizeOptions, OrganizeReport};
use crate::grouper::OrganizePlan;
use crate::output::OutputFormatter;
use crate::scanner::Scanner;
use crate::undo::{UndoManager, UndoReport};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Prefix of the timestamped backup directories created at the base path.
pub const BACKUP_DIR_PREFIX: &str = "clipnest_backup_";

/// Group split camera recordings into one folder per recording.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base directory to organize (default: current directory)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub path: Option<PathBuf>,

    /// Process subdirectories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Show what would be done without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Undo the previous organization
    #[arg(short, long)]
    pub undo: bool,

    /// Copy files instead of moving them
    #[arg(short, long)]
    pub copy: bool,

    /// Also copy originals into a timestamped backup directory (only works with --copy)
    #[arg(short, long)]
    pub backup: bool,

    /// Configuration file to use
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print progress as plain text instead of a progress bar
    #[arg(long)]
    pub plain: bool,

    /// Print debug information
    #[arg(short, long)]
    pub verbose: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Group recordings into folders.
    Organize(OrganizeOptions),
    /// Undo the previous organization.
    Undo {
        /// If true, only log what would be reverted.
        dry_run: bool,
    },
}

impl Args {
    /// Directory to operate on.
    pub fn base_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Combines flags with configuration defaults.
    pub fn command(&self, config: &Config) -> OrganizeCommand {
        if self.undo {
            return OrganizeCommand::Undo {
                dry_run: self.dry_run,
            };
        }

        OrganizeCommand::Organize(OrganizeOptions {
            recursive: self.recursive || config.organize.recursive,
            dry_run: self.dry_run,
            copy: self.copy || config.organize.copy,
            backup: self.backup || config.organize.backup,
        })
    }
}

/// Runs a command against `base_path` and prints a summary.
///
/// # Examples
///
/// ```no_run
/// use clipnest::cli::{OrganizeCommand, run_cli};
/// use clipnest::config::Config;
/// use clipnest::context::RunContext;
/// use clipnest::file_organizer::OrganizeOptions;
/// use std::path::Path;
///
/// let command = OrganizeCommand::Organize(OrganizeOptions::default());
/// let result = run_cli(command, Path::new("/media/card/DCIM"), &Config::default(), &mut RunContext::silent());
/// match result {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(
    command: OrganizeCommand,
    base_path: &Path,
    config: &Config,
    ctx: &mut RunContext,
) -> OrganizeResult<()> {
    match command {
        OrganizeCommand::Organize(options) => {
            let filter = config.compile_filters()?;
            let report = organize_directory(base_path, options, filter, ctx)?;
            OutputFormatter::organize_summary(&report, &options, base_path);
            Ok(())
        }
        OrganizeCommand::Undo { dry_run } => {
            let report = undo_organization(base_path, dry_run, ctx)?;
            OutputFormatter::undo_summary(&report, dry_run);
            if report.is_complete_success() {
                Ok(())
            } else {
                Err(OrganizeError::UndoIncomplete {
                    failed: report.failed_restores.len(),
                })
            }
        }
    }
}

/// Scans `base_path`, selects split recordings and moves or copies them.
///
/// Finding no camera files, or none that need a folder, is a successful run.
pub fn organize_directory(
    base_path: &Path,
    options: OrganizeOptions,
    filter: ScanFilter,
    ctx: &mut RunContext,
) -> OrganizeResult<OrganizeReport> {
    info!(
        "Starting file {} operation in {}",
        options.operation(),
        base_path.display()
    );
    if !base_path.is_dir() {
        return Err(OrganizeError::InvalidBasePath {
            path: base_path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    if options.backup && !options.copy {
        warn!("--backup only works together with --copy; ignoring it");
    }
    let backup_path = options.backup_enabled().then(|| {
        base_path.join(format!(
            "{}{}",
            BACKUP_DIR_PREFIX,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ))
    });

    // Backups from earlier runs hold camera files too
    let mut filter = filter.exclude_glob(&format!("{}*", BACKUP_DIR_PREFIX))?;
    if let Some(backup_path) = &backup_path {
        filter = filter.exclude_dir(backup_path);
    }

    let scan = Scanner::new(base_path, options.recursive, &filter).scan();
    if scan.is_empty() {
        info!("No camera files found to process.");
        return Ok(OrganizeReport::default());
    }

    let plan = OrganizePlan::from_scan(scan);
    if plan.is_empty() {
        info!(
            "Found {} camera files; none need reorganization.",
            plan.camera_files
        );
        return Ok(OrganizeReport::default());
    }
    info!(
        "Found {} files to process in {} recordings",
        plan.total_files,
        plan.groups.len()
    );

    let report = FileOrganizer::new(base_path, options, backup_path).execute(&plan, ctx)?;

    info!("Organization complete!");
    if options.dry_run {
        info!("This was a dry run - no files were actually modified.");
    }
    Ok(report)
}

/// Reverts the movements recorded at `base_path`.
pub fn undo_organization(
    base_path: &Path,
    dry_run: bool,
    ctx: &mut RunContext,
) -> OrganizeResult<UndoReport> {
    info!("Undoing previous organization in {}", base_path.display());
    UndoManager::undo(base_path, dry_run, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from(["clipnest", "/videos", "-r", "--dry-run", "--copy"]);
        assert_eq!(args.base_path(), PathBuf::from("/videos"));
        assert!(args.recursive);
        assert!(args.dry_run);
        assert!(args.copy);
        assert!(!args.undo);
    }

    #[test]
    fn test_default_path_is_current_directory() {
        let args = Args::parse_from(["clipnest"]);
        assert_eq!(args.base_path(), PathBuf::from("."));
    }

    #[test]
    fn test_undo_command() {
        let args = Args::parse_from(["clipnest", "--undo", "-n"]);
        assert_eq!(
            args.command(&Config::default()),
            OrganizeCommand::Undo { dry_run: true }
        );
    }

    #[test]
    fn test_config_defaults_enable_flags() {
        let config = Config::from_toml_str("[organize]\nrecursive = true\ncopy = true\n").unwrap();
        let args = Args::parse_from(["clipnest", "--backup"]);

        assert_eq!(
            args.command(&config),
            OrganizeCommand::Organize(OrganizeOptions {
                recursive: true,
                dry_run: false,
                copy: true,
                backup: true,
            })
        );
    }

    #[test]
    fn test_organize_invalid_base_path() {
        let result = organize_directory(
            Path::new("/non/existent/path"),
            OrganizeOptions::default(),
            ScanFilter::default(),
            &mut RunContext::silent(),
        );
        assert!(matches!(result, Err(OrganizeError::InvalidBasePath { .. })));
    }
}
