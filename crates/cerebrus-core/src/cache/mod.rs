//! Cache Directory Management
//!
//! Owns the local cache root and bounds the number of entries directly
//! beneath it. The least recently modified entries are evicted first.
//!
//! ## Layout
//!
//! ```text
//! [cache_root]/
//! ├── projects.json             # Project path overrides
//! └── device_captures/
//!     └── [ProjectName]/        # Pulled logs and CSV profiles
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::config::CacheConfig;

/// Bounded cache directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: CacheConfig,
}

impl CacheStore {
    /// Create a store for the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// The cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The cache root directory
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Create the cache directory if needed and enforce retention.
    ///
    /// Filesystem failures are logged and never returned; the configured
    /// directory path is returned in every case.
    pub fn ensure_cache(&self) -> PathBuf {
        let cache_dir = self.config.directory.clone();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::error!(path = %cache_dir.display(), "Failed to create cache directory: {e}");
            return cache_dir;
        }

        if self.config.eviction_enabled() {
            let removed = self.enforce_max_entries(&cache_dir);
            if removed > 0 {
                tracing::info!(
                    path = %cache_dir.display(),
                    "Evicted {removed} cache entries (limit {})",
                    self.config.max_entries
                );
            }
        }

        cache_dir
    }

    /// Remove the oldest direct children until at most `max_entries` remain.
    ///
    /// Returns the number of entries actually removed.
    fn enforce_max_entries(&self, cache_dir: &Path) -> usize {
        let limit = usize::try_from(self.config.max_entries).unwrap_or(usize::MAX);

        let entries = match fs::read_dir(cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %cache_dir.display(), "Cannot enumerate cache: {e}");
                return 0;
            }
        };

        let mut aged: Vec<(u128, PathBuf)> = entries
            .flatten()
            .map(|entry| {
                let path = entry.path();
                (modified_nanos(&path), path)
            })
            .collect();

        if aged.len() <= limit {
            return 0;
        }

        // Oldest first; ties broken by path so eviction is deterministic
        aged.sort();

        let excess = aged.len() - limit;
        let mut removed = 0;
        for (_, path) in aged.into_iter().take(excess) {
            match remove_entry(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Evicted cache entry");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Failed to evict cache entry: {e}");
                }
            }
        }

        removed
    }
}

/// Modification time as nanoseconds since the epoch, 0 when unreadable
fn modified_nanos(path: &Path) -> u128 {
    fs::symlink_metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0)
}

/// Delete a file, symlink, or whole directory tree
fn remove_entry(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn stamp(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn touch(path: &Path, age_secs: u64) {
        fs::write(path, "data").unwrap();
        stamp(path, SystemTime::now() - Duration::from_secs(age_secs));
    }

    fn names(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_ensure_cache_creates_directory() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("nested").join("cache");
        let store = CacheStore::new(CacheConfig::new(&cache_dir, 5));

        let created = store.ensure_cache();

        assert_eq!(created, cache_dir);
        assert!(cache_dir.is_dir());

        // Idempotent
        assert_eq!(store.ensure_cache(), cache_dir);
    }

    #[test]
    fn test_evicts_oldest_entries() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("cache");
        fs::create_dir_all(&cache_dir).unwrap();

        touch(&cache_dir.join("older.txt"), 300);
        touch(&cache_dir.join("middle.txt"), 200);
        touch(&cache_dir.join("newest.txt"), 100);

        let store = CacheStore::new(CacheConfig::new(&cache_dir, 2));
        store.ensure_cache();

        let expected: BTreeSet<String> = ["middle.txt", "newest.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names(&cache_dir), expected);
    }

    #[test]
    fn test_evicts_directories_recursively() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("cache");
        let old_dir = cache_dir.join("old_capture");
        fs::create_dir_all(old_dir.join("Saved").join("Logs")).unwrap();
        fs::write(old_dir.join("Saved").join("Logs").join("game.log"), "log").unwrap();

        // Newer than the directory regardless of when it was created
        let fresh = cache_dir.join("fresh.txt");
        fs::write(&fresh, "data").unwrap();
        stamp(&fresh, SystemTime::now() + Duration::from_secs(3600));

        let store = CacheStore::new(CacheConfig::new(&cache_dir, 1));
        store.ensure_cache();

        assert!(!old_dir.exists());
        assert!(cache_dir.join("fresh.txt").exists());
    }

    #[test]
    fn test_non_positive_limit_disables_eviction() {
        for limit in [0, -1] {
            let temp = TempDir::new().unwrap();
            let cache_dir = temp.path().join("cache");
            fs::create_dir_all(&cache_dir).unwrap();
            for i in 0..4 {
                touch(&cache_dir.join(format!("entry{i}.txt")), 100 * i);
            }

            CacheStore::new(CacheConfig::new(&cache_dir, limit)).ensure_cache();

            assert_eq!(names(&cache_dir).len(), 4);
        }
    }

    #[test]
    fn test_unreadable_mtime_counts_as_oldest() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("vanished.csv");
        fs::write(&gone, "data").unwrap();
        fs::remove_file(&gone).unwrap();

        assert_eq!(modified_nanos(&gone), 0);

        let present = temp.path().join("present.csv");
        touch(&present, 10);
        assert!(modified_nanos(&present) > 0);
    }

    #[test]
    fn test_under_limit_keeps_everything() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("cache");
        fs::create_dir_all(&cache_dir).unwrap();
        touch(&cache_dir.join("a.txt"), 20);
        touch(&cache_dir.join("b.txt"), 10);

        CacheStore::new(CacheConfig::new(&cache_dir, 10)).ensure_cache();

        assert_eq!(names(&cache_dir).len(), 2);
    }
}
