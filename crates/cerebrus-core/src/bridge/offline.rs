//! Placeholder bridge used when no bridge executable is available

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use super::{file_name_of, remote_arg, DeviceBridge};
use crate::device::Device;

/// Identifier of the single device reported by [`OfflineBridge`]
pub const PLACEHOLDER_DEVICE_ID: &str = "OFFLINE-0";

/// Fabricates one device, one file per listed directory, and local
/// placeholder files for every pull
#[derive(Debug, Clone, Default)]
pub struct OfflineBridge;

impl OfflineBridge {
    /// Create an offline bridge
    pub fn new() -> Self {
        Self
    }
}

/// Placeholder file name for a remote directory.
///
/// Profiling directories get a `.csv` file, everything else a `.log`.
fn placeholder_name(device: &Device, remote_dir: &Path) -> String {
    let is_profiling = file_name_of(remote_dir)
        .map(|name| name.to_lowercase().contains("profil"))
        .unwrap_or(false);
    let extension = if is_profiling { "csv" } else { "log" };
    format!("{}_placeholder.{}", device.identifier, extension)
}

impl DeviceBridge for OfflineBridge {
    fn list_devices(&self) -> Vec<Device> {
        tracing::info!("Offline bridge: returning placeholder device");
        vec![Device::new(PLACEHOLDER_DEVICE_ID, "Placeholder Device", "14")]
    }

    fn get_property(&self, _device: &Device, _key: &str) -> Option<String> {
        None
    }

    fn is_package_installed(&self, _device: &Device, _package: &str) -> bool {
        false
    }

    fn list_remote_files(&self, device: &Device, remote_dir: &Path) -> Vec<PathBuf> {
        vec![remote_dir.join(placeholder_name(device, remote_dir))]
    }

    fn pull_files(
        &self,
        device: &Device,
        remote_dir: &Path,
        destination: &Path,
        files: Option<&[PathBuf]>,
    ) -> Vec<PathBuf> {
        if let Err(e) = fs::create_dir_all(destination) {
            tracing::warn!(path = %destination.display(), "Cannot create destination: {e}");
            return Vec::new();
        }

        let names: Vec<String> = match files {
            Some(files) => files.iter().filter_map(|f| file_name_of(f)).collect(),
            None => vec![placeholder_name(device, remote_dir)],
        };

        let stamp = Utc::now().to_rfc3339();
        let mut written = Vec::with_capacity(names.len());
        for name in names {
            let local = destination.join(&name);
            let body = format!(
                "Placeholder for {}/{} on {}\nGenerated {}\n",
                remote_arg(remote_dir),
                name,
                device.identifier,
                stamp
            );
            match fs::write(&local, body) {
                Ok(()) => written.push(local),
                Err(e) => {
                    tracing::warn!(path = %local.display(), "Failed to write placeholder: {e}")
                }
            }
        }
        written
    }
}
