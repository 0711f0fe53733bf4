//! Subprocess-backed bridge using the `adb` command line tool

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;

use super::{file_name_of, remote_arg, BridgeError, DeviceBridge};
use crate::device::{Device, PROP_MODEL, PROP_RELEASE, UNKNOWN};

/// Runs `adb` for every bridge operation
#[derive(Debug, Clone)]
pub struct AdbBridge {
    executable: PathBuf,
}

impl AdbBridge {
    /// Create a bridge around a resolved executable
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// The executable this bridge invokes
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run one command and return its stdout
    pub fn execute_command(&self, args: &[&str]) -> Result<String, BridgeError> {
        let command = format!("{} {}", self.executable.display(), args.join(" "));
        tracing::debug!("Executing bridge command: {command}");

        let output = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => BridgeError::Unavailable(command.clone()),
                _ => BridgeError::IoError(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(BridgeError::CommandFailed {
                command,
                status: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn device_command(&self, device: &Device, args: &[&str]) -> Result<String, BridgeError> {
        let mut full = vec!["-s", device.identifier.as_str()];
        full.extend_from_slice(args);
        self.execute_command(&full)
    }

    fn pull_one(&self, device: &Device, remote: &Path, local: &Path) -> Result<(), BridgeError> {
        let remote = remote_arg(remote);
        let local = local.to_string_lossy();
        self.device_command(device, &["pull", &remote, &local])?;
        Ok(())
    }
}

impl DeviceBridge for AdbBridge {
    fn list_devices(&self) -> Vec<Device> {
        let output = match self.execute_command(&["devices", "-l"]) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Device enumeration failed: {e}");
                return Vec::new();
            }
        };

        let devices: Vec<Device> = parse_device_lines(&output)
            .into_iter()
            .map(|(serial, model)| {
                let partial = Device::new(&serial, UNKNOWN, UNKNOWN);
                let model = model
                    .or_else(|| self.get_property(&partial, PROP_MODEL))
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let android_version = self
                    .get_property(&partial, PROP_RELEASE)
                    .unwrap_or_else(|| UNKNOWN.to_string());
                Device {
                    identifier: serial,
                    model,
                    android_version,
                }
            })
            .collect();

        tracing::info!("Found {} devices", devices.len());
        devices
    }

    fn get_property(&self, device: &Device, key: &str) -> Option<String> {
        match self.device_command(device, &["shell", "getprop", key]) {
            Ok(output) => Some(output.trim().to_string()).filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(device = %device.identifier, "getprop {key} failed: {e}");
                None
            }
        }
    }

    fn is_package_installed(&self, device: &Device, package: &str) -> bool {
        if package.is_empty() {
            return false;
        }

        match self.device_command(device, &["shell", "pm", "list", "packages", package]) {
            Ok(output) => package_listed(&output, package),
            Err(e) => {
                tracing::warn!(device = %device.identifier, "Package query failed: {e}");
                false
            }
        }
    }

    fn list_remote_files(&self, device: &Device, remote_dir: &Path) -> Vec<PathBuf> {
        let dir = remote_arg(remote_dir);
        match self.device_command(device, &["shell", "ls", "-1", &dir]) {
            Ok(output) => parse_listing(&output)
                .into_iter()
                .map(|name| remote_dir.join(name))
                .collect(),
            Err(e) => {
                tracing::warn!(device = %device.identifier, "Listing {dir} failed: {e}");
                Vec::new()
            }
        }
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

        let Some(files) = files else {
            let pulled_root = file_name_of(remote_dir)
                .map(|name| destination.join(name))
                .unwrap_or_else(|| destination.to_path_buf());
            let before: HashMap<PathBuf, FileStamp> =
                fingerprint_files(&pulled_root).into_iter().collect();

            return match self.pull_one(device, remote_dir, destination) {
                Ok(()) => fingerprint_files(&pulled_root)
                    .into_iter()
                    .filter(|(path, stamp)| before.get(path) != Some(stamp))
                    .map(|(path, _)| path)
                    .collect(),
                Err(e) => {
                    tracing::warn!(device = %device.identifier, "Directory pull failed: {e}");
                    Vec::new()
                }
            };
        };

        let mut pulled = Vec::with_capacity(files.len());
        for file in files {
            let Some(name) = file_name_of(file) else {
                tracing::warn!("Skipping selection without a file name: {}", file.display());
                continue;
            };
            let remote = remote_dir.join(&name);
            let local = destination.join(&name);

            match self.pull_one(device, &remote, &local) {
                Ok(()) if local.exists() => pulled.push(local),
                Ok(()) => {
                    tracing::warn!("Pull reported success but {} is missing", local.display())
                }
                Err(e) => tracing::warn!(device = %device.identifier, "Failed to pull {name}: {e}"),
            }
        }
        pulled
    }
}

/// Parse `adb devices -l` output into (serial, model) pairs.
///
/// Only devices in the `device` state are returned; offline and
/// unauthorized entries are skipped.
fn parse_device_lines(output: &str) -> Vec<(String, Option<String>)> {
    output
        .lines()
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            if parts.next()? != "device" {
                return None;
            }
            let model = parts
                .find_map(|part| part.strip_prefix("model:"))
                .map(|m| m.to_string());
            Some((serial.to_string(), model))
        })
        .collect()
}

/// One entry per non-empty line of `ls -1` output
fn parse_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `pm list packages` output names exactly this package
fn package_listed(output: &str, package: &str) -> bool {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .any(|name| name == package)
}

/// Size and modification time of one local file
type FileStamp = (u64, Option<SystemTime>);

/// Every regular file under `root` with its stamp, sorted by path.
///
/// Comparing two fingerprints taken around a pull tells which files that
/// pull created or rewrote.
fn fingerprint_files(root: &Path) -> Vec<(PathBuf, FileStamp)> {
    collect_files(root)
        .into_iter()
        .map(|path| {
            let stamp = fs::metadata(&path)
                .map(|meta| (meta.len(), meta.modified().ok()))
                .unwrap_or((0, None));
            (path, stamp)
        })
        .collect()
}

/// Every regular file under `root`, sorted
fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            if dir.is_file() {
                files.push(dir);
            }
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}
