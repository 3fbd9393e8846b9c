//! Error types shared by the organize and undo pipelines.

use crate::config::ConfigError;
use crate::record::Operation;
use std::path::PathBuf;

/// Errors that can occur while organizing or undoing.
#[derive(Debug)]
pub enum OrganizeError {
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a destination or backup directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Not enough free space to copy a recording group.
    InsufficientSpace {
        path: PathBuf,
        required: u64,
        available: u64,
    },
    /// Free space or file sizes could not be determined.
    SpaceCheckFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A single copy, rename or removal failed.
    FileOperationFailed {
        operation: Operation,
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to write the movement record.
    RecordWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the movement record.
    RecordReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Movement record has invalid format.
    InvalidRecordFormat { reason: String },
    /// Some undo entries could not be reverted.
    UndoIncomplete { failed: usize },
    /// Configuration could not be loaded.
    Config(ConfigError),
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::InsufficientSpace {
                path,
                required,
                available,
            } => {
                write!(
                    f,
                    "Not enough disk space on {} to copy files (needed: {} MB, available: {} MB)",
                    path.display(),
                    required / 1024 / 1024,
                    available / 1024 / 1024
                )
            }
            Self::SpaceCheckFailed { path, source } => {
                write!(
                    f,
                    "Could not check disk space for {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileOperationFailed {
                operation,
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to {} {} to {}: {}",
                    operation,
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::RecordWriteFailed { path, source } => {
                write!(
                    f,
                    "Failed to write movement record {}: {}",
                    path.display(),
                    source
                )
            }
            Self::RecordReadFailed { path, source } => {
                write!(
                    f,
                    "Failed to read movement record {}: {}",
                    path.display(),
                    source
                )
            }
            Self::InvalidRecordFormat { reason } => {
                write!(f, "Invalid movement record format: {}", reason)
            }
            Self::UndoIncomplete { failed } => {
                write!(f, "Undo incomplete: {} entries could not be reverted", failed)
            }
            Self::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OrganizeError {}

impl From<ConfigError> for OrganizeError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

/// Result type for organize and undo operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_space_reports_megabytes() {
        let error = OrganizeError::InsufficientSpace {
            path: PathBuf::from("/videos"),
            required: 5 * 1024 * 1024,
            available: 1024 * 1024,
        };
        let message = error.to_string();
        assert!(message.contains("needed: 5 MB"));
        assert!(message.contains("available: 1 MB"));
    }

    #[test]
    fn test_file_operation_failure_names_operation() {
        let error = OrganizeError::FileOperationFailed {
            operation: Operation::Rename,
            source: PathBuf::from("a/GH010001.MP4"),
            destination: PathBuf::from("a/Video_0001/GH010001.MP4"),
            source_error: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(error.to_string().starts_with("Failed to rename"));
    }
}
