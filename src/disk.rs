//! Free space queries used before copying.

use std::io;
use std::path::Path;

/// Reports free space on the filesystem holding a path.
pub trait SpaceProbe {
    fn available_space(&self, path: &Path) -> io::Result<u64>;
}

/// Asks the operating system via `fs2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSpaceProbe;

impl SpaceProbe for FsSpaceProbe {
    fn available_space(&self, path: &Path) -> io::Result<u64> {
        fs2::available_space(path)
    }
}

/// Always reports the same amount of free space.
#[derive(Debug, Clone, Copy)]
pub struct FixedSpaceProbe(pub u64);

impl SpaceProbe for FixedSpaceProbe {
    fn available_space(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_probe_reports_space_for_temp_dir() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        assert!(FsSpaceProbe.available_space(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_fs_probe_missing_path() {
        assert!(FsSpaceProbe.available_space(Path::new("/non/existent/path")).is_err());
    }
}
