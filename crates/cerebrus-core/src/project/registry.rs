//! Project Registry
//!
//! In-memory view of the merged catalog plus the active project selection.

use std::fs;
use std::path::{Path, PathBuf};

use super::catalog::ProjectCatalog;
use super::definition::ProjectDefinition;
use super::error::RegistryError;

/// File name of the override file when it is bound inside the cache
pub const OVERRIDE_FILE_NAME: &str = "projects.json";

/// Merged project list and active selection
#[derive(Debug)]
pub struct ProjectRegistry {
    catalog: ProjectCatalog,
    cache_directory: PathBuf,
    projects: Vec<ProjectDefinition>,
    active_key: Option<String>,
}

impl ProjectRegistry {
    /// Create a registry and perform the initial load.
    ///
    /// The cache directory is created if needed. A catalog without an
    /// override file gets one at `<cache_directory>/projects.json`.
    pub fn new<P: Into<PathBuf>>(mut catalog: ProjectCatalog, cache_directory: P) -> Self {
        let cache_directory = cache_directory.into();
        if let Err(e) = fs::create_dir_all(&cache_directory) {
            tracing::warn!(
                path = %cache_directory.display(),
                "Failed to create cache directory: {e}"
            );
        }

        if catalog.override_file().is_none() {
            catalog.bind_override_file(cache_directory.join(OVERRIDE_FILE_NAME));
        }

        let mut registry = Self {
            catalog,
            cache_directory,
            projects: Vec::new(),
            active_key: None,
        };
        registry.reload();
        registry
    }

    /// The underlying catalog
    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    /// The cache directory this registry was bound to
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Reload the catalog from disk.
    ///
    /// A still-present active project stays active. If the active project
    /// disappeared, or none was set, the first project becomes active.
    pub fn reload(&mut self) {
        self.projects = self.catalog.load();

        if let Some(key) = self.active_key.take() {
            if self.contains(&key) {
                self.active_key = Some(key);
            } else {
                tracing::warn!("Active project {key} no longer defined; reselecting");
            }
        }

        if self.active_key.is_none() {
            self.active_key = self.projects.first().map(ProjectDefinition::key);
        }

        tracing::debug!("Project registry loaded {} projects", self.projects.len());
    }

    /// Copy of the current project list
    pub fn list_projects(&self) -> Vec<ProjectDefinition> {
        self.projects.clone()
    }

    /// Look up a project by key
    pub fn get(&self, key: &str) -> Option<&ProjectDefinition> {
        self.projects.iter().find(|p| p.key() == key)
    }

    /// Key of the active project
    pub fn active_key(&self) -> Option<&str> {
        self.active_key.as_deref()
    }

    /// The active project, if any
    pub fn active_project(&self) -> Option<&ProjectDefinition> {
        self.active_key.as_deref().and_then(|key| self.get(key))
    }

    /// Make a project active
    pub fn set_active(&mut self, key: &str) -> Result<(), RegistryError> {
        if !self.contains(key) {
            return Err(RegistryError::UnknownProjectKey(key.to_string()));
        }
        self.active_key = Some(key.to_string());
        tracing::info!("Active project set to {key}");
        Ok(())
    }

    /// Persist path overrides and reload so they become visible
    pub fn remember_paths(
        &mut self,
        project: &ProjectDefinition,
        device_root: Option<&Path>,
        pc_root: Option<&Path>,
    ) {
        self.catalog.remember_paths(project, device_root, pc_root);
        self.reload();
    }

    /// Replace the in-memory list without touching disk
    pub fn inject_projects(&mut self, definitions: Vec<ProjectDefinition>) {
        self.active_key = definitions.first().map(ProjectDefinition::key);
        self.projects = definitions;
    }

    fn contains(&self, key: &str) -> bool {
        self.projects.iter().any(|p| p.key() == key)
    }
}
