//! Session
//!
//! Wires a resolved [`AppConfig`] and a device bridge into the cache,
//! project registry, device manager and artifact synchroniser.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::artifacts::ArtifactSync;
use crate::bridge::{self, DeviceBridge};
use crate::cache::CacheStore;
use crate::config::AppConfig;
use crate::device::{Device, DeviceManager};
use crate::project::{ProjectCatalog, ProjectRegistry, RegistryError};

/// Errors from session-level workflows
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No device connected")]
    NoDevice,

    #[error("No active project")]
    NoActiveProject,

    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// One running application instance
#[derive(Debug)]
pub struct Session {
    config: AppConfig,
    cache: CacheStore,
    registry: ProjectRegistry,
    devices: DeviceManager,
    artifacts: ArtifactSync,
}

impl Session {
    /// Open a session, selecting the bridge from configuration
    pub fn open(config: AppConfig) -> Self {
        let bridge = bridge::connect(&config.bridge);
        Self::with_bridge(config, bridge)
    }

    /// Open a session over an explicit bridge
    pub fn with_bridge(config: AppConfig, bridge: Arc<dyn DeviceBridge>) -> Self {
        let cache = CacheStore::new(config.cache.clone());
        let catalog = ProjectCatalog::from_config(&config.project_paths);
        let registry = ProjectRegistry::new(catalog, cache.directory());
        let devices = DeviceManager::new(Arc::clone(&bridge));
        let artifacts = ArtifactSync::new(bridge, cache.directory());

        Self {
            config,
            cache,
            registry,
            devices,
            artifacts,
        }
    }

    /// Prepare the cache and take the first device snapshot
    pub fn initialize(&mut self) -> Vec<Device> {
        tracing::info!("Initializing session");
        self.cache.ensure_cache();
        self.devices.refresh()
    }

    /// The configuration this session was opened with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The cache store
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The project registry
    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    /// Mutable access to the project registry
    pub fn registry_mut(&mut self) -> &mut ProjectRegistry {
        &mut self.registry
    }

    /// The device manager
    pub fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    /// Mutable access to the device manager
    pub fn devices_mut(&mut self) -> &mut DeviceManager {
        &mut self.devices
    }

    /// The artifact synchroniser
    pub fn artifacts(&self) -> &ArtifactSync {
        &self.artifacts
    }

    /// Make a project active by key
    pub fn select_project(&mut self, key: &str) -> Result<(), SessionError> {
        Ok(self.registry.set_active(key)?)
    }

    /// List and pull everything for the active project from the first
    /// device in the current snapshot.
    ///
    /// Only listed files are pulled, so a stream's capture flags apply.
    pub fn pull_active(&self, stream_name: Option<&str>) -> Result<Vec<PathBuf>, SessionError> {
        let device = self
            .devices
            .select_first_available()
            .ok_or(SessionError::NoDevice)?;
        let project = self
            .registry
            .active_project()
            .ok_or(SessionError::NoActiveProject)?;
        let stream = match stream_name {
            Some(name) => Some(
                project
                    .stream(name)
                    .ok_or_else(|| SessionError::UnknownStream(name.to_string()))?,
            ),
            None => None,
        };

        let listing = self.artifacts.list_artifacts(device, project, stream);
        Ok(self.artifacts.pull_selected(
            device,
            project,
            &listing,
            Some(listing.logs.as_slice()),
            Some(listing.profiles.as_slice()),
        ))
    }
}
