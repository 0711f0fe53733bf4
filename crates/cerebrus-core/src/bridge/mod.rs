//! Device Bridge
//!
//! Capability interface over the external device-communication tool
//! (Android Debug Bridge). Two implementations exist:
//!
//! - [`AdbBridge`] runs the bridge executable as a blocking subprocess
//! - [`OfflineBridge`] fabricates placeholder devices and files so the
//!   upstream flows stay usable without hardware or tooling
//!
//! [`connect`] picks one of them once, from configuration.

mod adb;
mod error;
mod offline;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use adb::AdbBridge;
pub use error::BridgeError;
pub use offline::{OfflineBridge, PLACEHOLDER_DEVICE_ID};

use crate::config::{expand_home, BridgeConfig};
use crate::device::Device;

/// Operations consumed from the device bridge.
///
/// Implementations absorb per-invocation failures: a failed call logs a
/// warning and yields an empty (or partial) result.
pub trait DeviceBridge: Send + Sync + std::fmt::Debug {
    /// Enumerate connected, authorised devices
    fn list_devices(&self) -> Vec<Device>;

    /// Read a system property; `None` when unavailable or empty
    fn get_property(&self, device: &Device, key: &str) -> Option<String>;

    /// Whether the application package is installed on the device
    fn is_package_installed(&self, device: &Device, package: &str) -> bool;

    /// List the entries of a remote directory as full remote paths
    fn list_remote_files(&self, device: &Device, remote_dir: &Path) -> Vec<PathBuf>;

    /// Pull files from `remote_dir` into `destination`.
    ///
    /// With `files`, each entry is resolved by file name against
    /// `remote_dir`. Without, the whole directory is pulled. Returns the
    /// local paths that were materialised.
    fn pull_files(
        &self,
        device: &Device,
        remote_dir: &Path,
        destination: &Path,
        files: Option<&[PathBuf]>,
    ) -> Vec<PathBuf>;
}

/// Select the bridge implementation for this configuration.
///
/// The executable is resolved once here; when it cannot be found the
/// offline bridge is used instead.
pub fn connect(config: &BridgeConfig) -> Arc<dyn DeviceBridge> {
    match locate_executable(&config.executable) {
        Some(path) => {
            tracing::info!(executable = %path.display(), "Using device bridge");
            Arc::new(AdbBridge::new(path))
        }
        None => {
            tracing::warn!(
                "Device bridge '{}' not found; using offline placeholders",
                config.executable
            );
            Arc::new(OfflineBridge::new())
        }
    }
}

/// Resolve an executable name or path.
///
/// Values with a directory component are checked as-is; bare names are
/// searched on `PATH`.
pub fn locate_executable(executable: &str) -> Option<PathBuf> {
    if executable.is_empty() {
        return None;
    }

    let candidate = expand_home(executable);
    if candidate.components().count() > 1 {
        return candidate.is_file().then_some(candidate);
    }

    let search = env::var_os("PATH")?;
    env::split_paths(&search).find_map(|dir| {
        let direct = dir.join(executable);
        if direct.is_file() {
            return Some(direct);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{executable}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

/// Render a remote path for the device side, which always uses `/`
pub(crate) fn remote_arg(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// File name component of a remote or local path
pub(crate) fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_explicit_path() {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("adb");
        std::fs::write(&tool, "").unwrap();

        let found = locate_executable(tool.to_str().unwrap());
        assert_eq!(found, Some(tool));

        let missing = temp.path().join("nope").join("adb");
        assert_eq!(locate_executable(missing.to_str().unwrap()), None);
    }

    #[test]
    fn test_locate_empty_name() {
        assert_eq!(locate_executable(""), None);
    }

    #[test]
    fn test_connect_falls_back_to_offline() {
        let config = BridgeConfig {
            executable: "/definitely/not/here/adb".to_string(),
        };
        let bridge = connect(&config);
        let devices = bridge.list_devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].identifier, PLACEHOLDER_DEVICE_ID);
    }

    #[test]
    fn test_remote_arg_uses_forward_slashes() {
        assert_eq!(
            remote_arg(Path::new("/sdcard\\Saved\\Logs")),
            "/sdcard/Saved/Logs"
        );
    }
}
