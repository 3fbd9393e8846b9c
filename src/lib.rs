//! clipnest - keep split camera recordings together
//!
//! This library detects action-camera video files, groups the segments and
//! sidecar files of each recording, moves or copies recordings that span more
//! than one segment into their own folder, and undoes those operations from a
//! saved movement record.

pub mod camera_file;
pub mod cli;
pub mod config;
pub mod context;
pub mod disk;
pub mod error;
pub mod file_organizer;
pub mod grouper;
pub mod logging;
pub mod output;
pub mod progress;
pub mod record;
pub mod scanner;
pub mod undo;

pub use camera_file::{CameraFile, Extension};
pub use config::{Config, ConfigError, ScanFilter};
pub use context::RunContext;
pub use error::{OrganizeError, OrganizeResult};
pub use file_organizer::{FileOrganizer, OrganizeOptions, OrganizeReport};
pub use grouper::OrganizePlan;
pub use record::{MovementEntry, MovementRecord, Operation};
pub use scanner::{RecordingGroup, ScanResult, Scanner};
pub use undo::{UndoManager, UndoReport};

pub use cli::{OrganizeCommand, run_cli};
