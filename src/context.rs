//! Per-invocation collaborators handed to the organize and undo stages.

use crate::disk::{FsSpaceProbe, SpaceProbe};
use crate::progress::{ProgressReporter, SilentProgress};

/// Progress reporting and disk-space queries for one invocation.
pub struct RunContext {
    pub progress: Box<dyn ProgressReporter>,
    pub space: Box<dyn SpaceProbe>,
}

impl RunContext {
    pub fn new(progress: Box<dyn ProgressReporter>, space: Box<dyn SpaceProbe>) -> Self {
        Self { progress, space }
    }

    /// No progress output, real disk-space queries.
    pub fn silent() -> Self {
        Self::new(Box::new(SilentProgress), Box::new(FsSpaceProbe))
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::silent()
    }
}
