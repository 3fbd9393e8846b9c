//! User configuration loaded from TOML.
//!
//! Provides defaults for the organize flags, glob patterns for directories the
//! scanner should not descend into, and logging settings.
//!
//! # Configuration File Format
//!
//! ```toml
//! [organize]
//! recursive = true
//! copy = false
//! backup = false
//!
//! [scan]
//! exclude = ["**/.Trash-*", "archive/**"]
//!
//! [logging]
//! level = "info"
//! directory = "/var/log/clipnest"
//! ```

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub organize: OrganizeDefaults,
    #[serde(default)]
    pub scan: ScanRules,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default values for the organize flags. Command-line flags can only enable these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeDefaults {
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub copy: bool,
    #[serde(default)]
    pub backup: bool,
}

/// Directory exclusion rules applied during recursive scans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanRules {
    /// Glob patterns matched against directory paths relative to the base path.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `CLIPNEST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for the per-run log file. Defaults to the base path.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.clipnestrc.toml` in the current directory
    /// 3. Look for `~/.config/clipnest/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".clipnestrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("clipnest")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the scan exclusion patterns.
    pub fn compile_filters(&self) -> Result<ScanFilter, ConfigError> {
        ScanFilter::new(&self.scan)
    }
}

/// Decides which directories a recursive scan descends into.
///
/// Explicit paths (such as the backup directory of the current run) are compared
/// exactly, glob patterns are matched against the path relative to the scan root.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    excluded_dirs: Vec<PathBuf>,
    exclude_patterns: Vec<Pattern>,
}

impl ScanFilter {
    fn new(rules: &ScanRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            excluded_dirs: Vec::new(),
            exclude_patterns,
        })
    }

    /// Adds a directory that must never be scanned.
    pub fn exclude_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_dirs.push(path.into());
        self
    }

    /// Adds a glob pattern of directories that must never be scanned.
    pub fn exclude_glob(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Pattern::new(pattern)
            .map_err(|_| ConfigError::InvalidGlobPattern(pattern.to_string()))?;
        self.exclude_patterns.push(pattern);
        Ok(self)
    }

    /// Returns true if the scanner should skip `dir`.
    pub fn is_excluded(&self, root: &Path, dir: &Path) -> bool {
        if self.excluded_dirs.iter().any(|excluded| excluded == dir) {
            return true;
        }

        let relative = dir.strip_prefix(root).unwrap_or(dir);
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}
