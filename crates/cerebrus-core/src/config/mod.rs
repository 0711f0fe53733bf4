//! Application Configuration
//!
//! Typed configuration for the bridge executable, the cache directory and
//! the project definition files. The configuration is resolved once, at
//! startup, and handed to every component that needs it.
//!
//! ## File Format
//!
//! ```text
//! {
//!   "version": 1,
//!   "bridge": { "executable": "adb" },
//!   "cache": { "directory": "~/.cerebrus-cache", "max_entries": 50 },
//!   "project_paths": {
//!     "definition_file": "config/projects.json",
//!     "override_file": null
//!   }
//! }
//! ```
//!
//! Every section is optional; missing sections fall back to their defaults.

mod error;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use error::ConfigError;

/// Configuration schema version understood by this crate
pub const CONFIG_VERSION: u32 = 1;

/// Default location of the application configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/cerebrus.json";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Schema version, must equal [`CONFIG_VERSION`]
    #[serde(default = "default_version")]
    pub version: u32,

    /// Device bridge settings
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Local cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Project definition file locations
    #[serde(default)]
    pub project_paths: ProjectPathsConfig,
}

/// Device bridge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Executable name or path (e.g. "adb" or "/opt/android/platform-tools/adb")
    #[serde(default = "default_executable")]
    pub executable: String,
}

/// Cache directory and retention policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root directory
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,

    /// Maximum number of direct children kept in the cache (0 or less = unlimited)
    #[serde(default = "default_max_entries")]
    pub max_entries: i64,
}

/// Locations of the base project definitions and the user override file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPathsConfig {
    /// Shared, read-only project definitions
    #[serde(default = "default_definition_file")]
    pub definition_file: PathBuf,

    /// User-local overrides; bound inside the cache directory when unset
    #[serde(default)]
    pub override_file: Option<PathBuf>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_executable() -> String {
    "adb".to_string()
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from(".cerebrus-cache")
}

fn default_max_entries() -> i64 {
    50
}

fn default_definition_file() -> PathBuf {
    PathBuf::from("config/projects.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            bridge: BridgeConfig::default(),
            cache: CacheConfig::default(),
            project_paths: ProjectPathsConfig::default(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    /// Create a cache configuration for a directory and entry limit
    pub fn new<P: Into<PathBuf>>(directory: P, max_entries: i64) -> Self {
        Self {
            directory: directory.into(),
            max_entries,
        }
    }

    /// Whether the retention policy removes anything at all
    pub fn eviction_enabled(&self) -> bool {
        self.max_entries > 0
    }
}

impl Default for ProjectPathsConfig {
    fn default() -> Self {
        Self {
            definition_file: default_definition_file(),
            override_file: None,
        }
    }
}

impl AppConfig {
    /// Resolve a leading `~` in every configured path
    fn expand_paths(mut self) -> Self {
        self.cache.directory = expand_path(&self.cache.directory);
        self.project_paths.definition_file = expand_path(&self.project_paths.definition_file);
        self.project_paths.override_file = self
            .project_paths
            .override_file
            .as_deref()
            .map(expand_path);
        self
    }
}

/// Load the configuration file, falling back to defaults when it is absent
pub fn load_config_from_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No configuration file; using defaults");
        return Ok(AppConfig::default().expand_paths());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;

    if config.version != CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            found: config.version,
            expected: CONFIG_VERSION,
        });
    }

    Ok(config.expand_paths())
}

/// Expand a leading `~` to the user's home directory.
///
/// Only `~` on its own or followed by a separator is expanded; anything
/// else (including `~user`) is returned unchanged.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\"))
    };

    match (rest, dirs::home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => expand_home(raw),
        None => path.to_path_buf(),
    }
}
