//! Device Management
//!
//! Keeps a refreshable snapshot of the devices reported by the bridge.
//! The snapshot is only as fresh as the last [`DeviceManager::refresh`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bridge::DeviceBridge;

/// Property holding the device manufacturer
pub const PROP_MANUFACTURER: &str = "ro.product.manufacturer";
/// Property holding the device model
pub const PROP_MODEL: &str = "ro.product.model";
/// Property holding the Android release version
pub const PROP_RELEASE: &str = "ro.build.version.release";
/// Property holding the SDK (API) level
pub const PROP_SDK: &str = "ro.build.version.sdk";

/// Value reported for properties that could not be read
pub const UNKNOWN: &str = "Unknown";

/// A connected Android device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Serial number, stable for the lifetime of the connection
    pub identifier: String,
    /// Model name as reported by the device
    pub model: String,
    /// Android release (e.g. "14")
    pub android_version: String,
}

impl Device {
    /// Create a device record
    pub fn new(identifier: &str, model: &str, android_version: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            model: model.to_string(),
            android_version: android_version.to_string(),
        }
    }
}

/// Extended device information for one application package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDetails {
    /// The inspected device
    pub device: Device,
    /// Manufacturer, or "Unknown"
    pub make: String,
    /// SDK (API) level, or "Unknown"
    pub sdk_level: String,
    /// Whether the queried package is installed
    pub package_found: bool,
}

/// Snapshot of connected devices
#[derive(Debug)]
pub struct DeviceManager {
    bridge: Arc<dyn DeviceBridge>,
    devices: Vec<Device>,
}

impl DeviceManager {
    /// Create a manager with an empty snapshot
    pub fn new(bridge: Arc<dyn DeviceBridge>) -> Self {
        Self {
            bridge,
            devices: Vec::new(),
        }
    }

    /// Re-enumerate devices and replace the snapshot
    pub fn refresh(&mut self) -> Vec<Device> {
        tracing::info!("Refreshing connected devices");
        self.devices = self.bridge.list_devices();
        self.devices.clone()
    }

    /// The last snapshot, without querying the bridge
    pub fn get_connected(&self) -> Vec<Device> {
        self.devices.clone()
    }

    /// First device in the snapshot
    pub fn select_first_available(&self) -> Option<&Device> {
        self.devices.first()
    }

    /// Replace the snapshot directly
    pub fn apply_snapshot(&mut self, devices: Vec<Device>) {
        self.devices = devices;
    }

    /// Read manufacturer, SDK level and package presence for one device
    pub fn inspect(&self, device: &Device, package: &str) -> DeviceDetails {
        let read = |key: &str| {
            self.bridge
                .get_property(device, key)
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        DeviceDetails {
            device: device.clone(),
            make: read(PROP_MANUFACTURER),
            sdk_level: read(PROP_SDK),
            package_found: self.bridge.is_package_installed(device, package),
        }
    }

    /// Inspect every device in the snapshot
    pub fn inspect_all(&self, package: &str) -> Vec<DeviceDetails> {
        self.devices
            .iter()
            .map(|device| self.inspect(device, package))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeBridge {
        devices: Mutex<Vec<Device>>,
        properties: HashMap<(String, String), String>,
        packages: Vec<String>,
    }

    impl DeviceBridge for FakeBridge {
        fn list_devices(&self) -> Vec<Device> {
            self.devices.lock().unwrap().clone()
        }

        fn get_property(&self, device: &Device, key: &str) -> Option<String> {
            self.properties
                .get(&(device.identifier.clone(), key.to_string()))
                .cloned()
        }

        fn is_package_installed(&self, _device: &Device, package: &str) -> bool {
            self.packages.iter().any(|p| p == package)
        }

        fn list_remote_files(&self, _device: &Device, _remote_dir: &Path) -> Vec<PathBuf> {
            Vec::new()
        }

        fn pull_files(
            &self,
            _device: &Device,
            _remote_dir: &Path,
            _destination: &Path,
            _files: Option<&[PathBuf]>,
        ) -> Vec<PathBuf> {
            Vec::new()
        }
    }

    #[test]
    fn test_refresh_replaces_snapshot() {
        let bridge = Arc::new(FakeBridge::default());
        *bridge.devices.lock().unwrap() = vec![Device::new("abc", "Pixel", "14")];
        let mut manager = DeviceManager::new(bridge.clone());

        assert!(manager.get_connected().is_empty());
        assert_eq!(manager.select_first_available(), None);

        let devices = manager.refresh();
        assert_eq!(devices, vec![Device::new("abc", "Pixel", "14")]);

        // Snapshot is not re-queried until the next refresh
        *bridge.devices.lock().unwrap() = Vec::new();
        assert_eq!(manager.get_connected().len(), 1);
        assert_eq!(manager.refresh().len(), 0);
        assert_eq!(manager.select_first_available(), None);
    }

    #[test]
    fn test_apply_snapshot() {
        let mut manager = DeviceManager::new(Arc::new(FakeBridge::default()));
        manager.apply_snapshot(vec![
            Device::new("one", "Pixel", "14"),
            Device::new("two", "Galaxy", "13"),
        ]);

        assert_eq!(manager.select_first_available().unwrap().identifier, "one");
    }

    #[test]
    fn test_inspect_defaults_missing_properties() {
        let mut properties = HashMap::new();
        properties.insert(
            ("abc".to_string(), PROP_SDK.to_string()),
            "34".to_string(),
        );
        let bridge = FakeBridge {
            properties,
            packages: vec!["com.test.app".to_string()],
            ..Default::default()
        };
        let mut manager = DeviceManager::new(Arc::new(bridge));
        manager.apply_snapshot(vec![Device::new("abc", "Pixel", "14")]);

        let details = manager.inspect_all("com.test.app");
        assert_eq!(
            details,
            vec![DeviceDetails {
                device: Device::new("abc", "Pixel", "14"),
                make: UNKNOWN.to_string(),
                sdk_level: "34".to_string(),
                package_found: true,
            }]
        );

        let missing = manager.inspect(&Device::new("abc", "Pixel", "14"), "com.other");
        assert!(!missing.package_found);
    }
}
