//! Project Catalog
//!
//! Loads project definitions from a shared base file and merges a
//! user-local override file on top. Path overrides chosen by the user are
//! persisted to the override file only; the base file is never written.

use std::fs;
use std::path::{Path, PathBuf};

use super::definition::{path_string, CatalogFile, ProjectDefinition, ProjectRecord};
use super::error::CatalogError;
use crate::config::ProjectPathsConfig;

/// Base definitions plus optional user overrides
#[derive(Debug, Clone)]
pub struct ProjectCatalog {
    /// Shared definitions (read-only here)
    definition_file: PathBuf,

    /// User-local overrides (read-write)
    override_file: Option<PathBuf>,
}

impl ProjectCatalog {
    /// Create a catalog over a base file and an optional override file
    pub fn new<P: Into<PathBuf>>(definition_file: P, override_file: Option<PathBuf>) -> Self {
        Self {
            definition_file: definition_file.into(),
            override_file,
        }
    }

    /// Create a catalog from the configured file locations
    pub fn from_config(config: &ProjectPathsConfig) -> Self {
        Self::new(&config.definition_file, config.override_file.clone())
    }

    /// Path of the base definitions file
    pub fn definition_file(&self) -> &Path {
        &self.definition_file
    }

    /// Path of the override file, if one is configured
    pub fn override_file(&self) -> Option<&Path> {
        self.override_file.as_deref()
    }

    /// Set the override file location
    pub fn bind_override_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.override_file = Some(path.into());
    }

    /// Load and merge both sources.
    ///
    /// A missing or unparseable file contributes no projects.
    pub fn load(&self) -> Vec<ProjectDefinition> {
        let base = read_records(&self.definition_file);
        let overrides = self
            .override_file
            .as_deref()
            .map(read_records)
            .unwrap_or_default();

        let (base_count, override_count) = (base.len(), overrides.len());
        let merged: Vec<ProjectDefinition> = merge(base, overrides)
            .into_iter()
            .map(ProjectRecord::into_definition)
            .collect();

        tracing::debug!(
            "Loaded {} project definitions (base={}, overrides={})",
            merged.len(),
            base_count,
            override_count
        );
        merged
    }

    /// Persist a device and/or PC root override for a project.
    ///
    /// Other projects' overrides are preserved. Write failures are logged
    /// and otherwise ignored.
    pub fn remember_paths(
        &self,
        project: &ProjectDefinition,
        device_root: Option<&Path>,
        pc_root: Option<&Path>,
    ) {
        let Some(override_file) = self.override_file.as_deref() else {
            tracing::debug!("No override file configured; skipping persistence");
            return;
        };

        let mut records = dedupe(read_records(override_file));
        let key = project.key();
        let index = match records.iter().position(|r| r.key() == key) {
            Some(index) => index,
            None => {
                records.push(ProjectRecord::from(project));
                records.len() - 1
            }
        };

        let record = &mut records[index];
        if let Some(root) = device_root.filter(|p| !p.as_os_str().is_empty()) {
            record.device_root = path_string(root);
        }
        if let Some(root) = pc_root.filter(|p| !p.as_os_str().is_empty()) {
            record.pc_root = path_string(root);
        }

        match write_records(override_file, records) {
            Ok(()) => tracing::info!(
                path = %override_file.display(),
                "Persisted project path overrides for {key}"
            ),
            Err(e) => tracing::error!(
                path = %override_file.display(),
                "Failed to persist project overrides: {e}"
            ),
        }
    }
}

/// Read the project entries of one file, treating any failure as empty
fn read_records(path: &Path) -> Vec<ProjectRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Cannot read project file; ignoring: {e}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<CatalogFile>(&content) {
        Ok(file) => file.projects.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Invalid project file; ignoring: {e}");
            Vec::new()
        }
    }
}

fn write_records(path: &Path, records: Vec<ProjectRecord>) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = CatalogFile {
        projects: Some(records),
    };
    let content = serde_json::to_string_pretty(&file)?;
    fs::write(path, content)?;
    Ok(())
}

/// Collapse entries sharing a key: first position, last value
fn dedupe(records: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    let mut unique: Vec<ProjectRecord> = Vec::with_capacity(records.len());
    for record in records {
        let key = record.key();
        match unique.iter_mut().find(|r| r.key() == key) {
            Some(existing) => *existing = record,
            None => unique.push(record),
        }
    }
    unique
}

/// Apply overrides on top of the base entries.
///
/// Roots and directories are replaced only by non-empty values and streams
/// only by a non-empty list. Unknown keys are appended.
fn merge(base: Vec<ProjectRecord>, overrides: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    let mut merged = dedupe(base);

    for item in overrides {
        let key = item.key();
        let Some(current) = merged.iter_mut().find(|r| r.key() == key) else {
            merged.push(item);
            continue;
        };

        if !item.device_root.is_empty() {
            current.device_root = item.device_root;
        }
        if !item.pc_root.is_empty() {
            current.pc_root = item.pc_root;
        }
        if !item.log_dir.is_empty() {
            current.log_dir = item.log_dir;
        }
        if !item.profiling_dir.is_empty() {
            current.profiling_dir = item.profiling_dir;
        }
        if !item.streams.is_empty() {
            current.streams = item.streams;
        }
    }

    merged
}
