//! Output formatting and styling module.
//!
//! Colored console summaries shown after an organize or undo run. Detailed,
//! per-file lines go through `tracing` instead.

use crate::file_organizer::{OrganizeOptions, OrganizeReport};
use crate::undo::UndoReport;
use colored::*;
use std::path::Path;

/// Prints styled summaries.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints one row per destination folder and a total line.
    pub fn organize_summary(report: &OrganizeReport, options: &OrganizeOptions, base_path: &Path) {
        if report.folders.is_empty() {
            Self::success("Nothing to organize.");
            return;
        }

        Self::header("SUMMARY");

        let rows: Vec<(String, usize)> = report
            .folders
            .iter()
            .map(|(folder, count)| {
                let name = folder.strip_prefix(base_path).unwrap_or(folder);
                (name.display().to_string(), *count)
            })
            .collect();

        let max_folder_len = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Folder" width

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));
        for (name, count) in &rows {
            println!(
                "{:<width$} | {} {}",
                name,
                count.to_string().green(),
                plural(*count),
                width = max_folder_len
            );
        }
        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            report.files.to_string().green().bold(),
            plural(report.files),
            width = max_folder_len
        );

        let verb = if options.copy { "copied" } else { "moved" };
        if options.dry_run {
            Self::dry_run_notice(&format!(
                "{} files would be {}. No files were modified.",
                report.files, verb
            ));
        } else {
            Self::success(&format!(
                "{} files {}. Run with --undo to revert.",
                report.files, verb
            ));
        }
    }

    /// Prints the outcome of an undo run.
    pub fn undo_summary(report: &UndoReport, dry_run: bool) {
        if !report.record_found {
            Self::success("No organization to undo.");
            return;
        }

        Self::header("UNDO SUMMARY");
        println!("  Restored:        {}", report.restored_files.to_string().green());
        println!("  Copies removed:  {}", report.removed_copies.to_string().green());
        println!("  Folders removed: {}", report.removed_folders.len());

        if !report.skipped_files.is_empty() {
            println!("  Skipped:         {}", report.skipped_files.len());
            for path in &report.skipped_files {
                println!("    - {} (not found)", path.display());
            }
        }

        if !report.failed_restores.is_empty() {
            Self::error(&format!("Failed: {}", report.failed_restores.len()));
            for (path, reason) in &report.failed_restores {
                eprintln!("    - {}: {}", path.display(), reason);
            }
            Self::warning("The movement record was kept. Fix the issues above and try again.");
        } else if dry_run {
            Self::dry_run_notice("No files were modified.");
        } else {
            Self::success("Undo complete.");
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "file");
        assert_eq!(plural(0), "files");
        assert_eq!(plural(3), "files");
    }
}
