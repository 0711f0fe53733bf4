//! Preflight checks
//!
//! Loads the configuration and prepares the cache directory. Used before
//! any device work and by CI to validate a configuration file.

use std::path::{Path, PathBuf};

use crate::cache::CacheStore;
use crate::config::{load_config_from_file, ConfigError, DEFAULT_CONFIG_PATH};

/// Load the configuration (default location when `None`), create and trim
/// the cache, and return the cache directory
pub fn run_preflight(config_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = load_config_from_file(&path)?;
    let cache_dir = CacheStore::new(config.cache).ensure_cache();

    tracing::info!("Preflight completed with cache at {}", cache_dir.display());
    Ok(cache_dir)
}
