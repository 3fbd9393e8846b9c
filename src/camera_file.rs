//! Camera filename recognition.
//!
//! Maps filenames produced by action cameras to a recording identifier shared by
//! every segment and sidecar of one recording.
//!
//! # Examples
//!
//! ```
//! use clipnest::camera_file::{CameraFile, Extension};
//!
//! let file = CameraFile::classify("GH020042.MP4").unwrap();
//! assert_eq!(file.recording_id, "0042");
//! assert_eq!(file.extension, Extension::Mp4);
//! assert!(CameraFile::classify("IMG_0001.JPG").is_none());
//! ```

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// File extensions produced alongside a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Primary video segment
    Mp4,
    /// Thumbnail
    Thm,
    /// Low-resolution proxy video
    Lrv,
}

impl Extension {
    /// Parses an extension case-insensitively.
    pub fn parse(ext: &str) -> Option<Self> {
        match ext.to_ascii_uppercase().as_str() {
            "MP4" => Some(Self::Mp4),
            "THM" => Some(Self::Thm),
            "LRV" => Some(Self::Lrv),
            _ => None,
        }
    }

    /// Returns the uppercase form of this extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Thm => "THM",
            Self::Lrv => "LRV",
        }
    }
}

/// Naming conventions recognized as camera files, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPattern {
    /// `GH011234.MP4` / `GX011234.MP4`: chapter digits then recording id.
    Chaptered,
    /// `GOPR1234.MP4`
    Gopr,
    /// `20240101_120000_001.MP4`: date, time, then recording id.
    Timestamped,
}

impl NamingPattern {
    const ALL: [Self; 3] = [Self::Chaptered, Self::Gopr, Self::Timestamped];

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Chaptered => &CHAPTERED,
            Self::Gopr => &GOPR,
            Self::Timestamped => &TIMESTAMPED,
        }
    }
}

// Capture group 1 is the recording id, group 2 the extension.
static CHAPTERED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^G[HX][0-9]{2}([0-9]{4})\.(MP4|THM|LRV)$"));
static GOPR: LazyLock<Regex> = LazyLock::new(|| compile(r"^GOPR([0-9]{4})\.(MP4|THM|LRV)$"));
static TIMESTAMPED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[0-9]{8}_[0-9]{6}_([0-9]{3})\.(MP4|THM|LRV)$"));

// Only ever called with the literals above; `test_builtin_patterns_compile` forces each one.
fn compile(pattern: &str) -> Regex {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("built-in camera pattern is valid")
}

/// A file recognized as belonging to a camera recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFile {
    /// Location of the file.
    pub path: PathBuf,
    /// Uppercased extension.
    pub extension: Extension,
    /// Identifier shared by all files of the same recording.
    pub recording_id: String,
    /// The naming convention that matched.
    pub pattern: NamingPattern,
}

impl CameraFile {
    /// Classifies a bare filename. Returns `None` for non-camera files.
    pub fn classify(file_name: &str) -> Option<Self> {
        Self::from_path(Path::new(file_name))
    }

    /// Classifies the file at `path` by its filename.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;

        NamingPattern::ALL.iter().find_map(|pattern| {
            let captures = pattern.regex().captures(file_name)?;
            let recording_id = captures.get(1)?.as_str().to_string();
            let extension = Extension::parse(captures.get(2)?.as_str())?;
            Some(Self {
                path: path.to_path_buf(),
                extension,
                recording_id,
                pattern: *pattern,
            })
        })
    }

    /// True for primary video segments.
    pub fn is_segment(&self) -> bool {
        self.extension == Extension::Mp4
    }

    /// The filename component of the path.
    pub fn file_name(&self) -> &std::ffi::OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }
}
