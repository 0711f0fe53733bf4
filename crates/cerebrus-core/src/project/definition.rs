//! Project definitions and their on-disk records

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::expand_home;

/// Default device root when a definition does not name one
pub const DEFAULT_DEVICE_ROOT: &str = "/sdcard";

/// Default local destination root
pub const DEFAULT_PC_ROOT: &str = "captures";

/// Default log directory, relative to the device root
pub const DEFAULT_LOG_DIR: &str = "Saved/Logs";

/// Default profiling directory, relative to the device root
pub const DEFAULT_PROFILING_DIR: &str = "Saved/Profiling";

/// A named capture configuration for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStream {
    /// Stream name
    #[serde(default)]
    pub name: String,

    /// Replaces the log and profiling subpaths when non-empty
    #[serde(default)]
    pub device_subdir: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Whether log files are collected for this stream
    #[serde(default = "default_true")]
    pub include_logs: bool,

    /// Whether CSV profiles are collected for this stream
    #[serde(default = "default_true")]
    pub include_csv: bool,
}

fn default_true() -> bool {
    true
}

impl ProjectStream {
    /// Create a stream with both capture categories enabled
    pub fn new(name: &str, device_subdir: &str) -> Self {
        Self {
            name: name.to_string(),
            device_subdir: device_subdir.to_string(),
            description: String::new(),
            include_logs: true,
            include_csv: true,
        }
    }
}

/// Where a mobile application's artifacts live, on the device and locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDefinition {
    /// Owning company or studio
    pub company: String,
    /// Project name; also names the local capture folder
    pub project: String,
    /// Application package identifier (e.g. "com.acme.rocket")
    pub package: String,
    /// Remote root that `log_dir` and `profiling_dir` are relative to
    pub device_root: PathBuf,
    /// Local root for this project's captures
    pub pc_root: PathBuf,
    /// Log directory relative to `device_root`
    pub log_dir: String,
    /// CSV profiling directory relative to `device_root`
    pub profiling_dir: String,
    /// Named capture configurations
    pub streams: Vec<ProjectStream>,
    /// Free-form notes
    pub notes: String,
}

impl ProjectDefinition {
    /// Create a definition with the default log and profiling directories
    pub fn new(
        company: &str,
        project: &str,
        package: &str,
        device_root: impl Into<PathBuf>,
        pc_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            company: company.to_string(),
            project: project.to_string(),
            package: package.to_string(),
            device_root: device_root.into(),
            pc_root: pc_root.into(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
            profiling_dir: DEFAULT_PROFILING_DIR.to_string(),
            streams: Vec::new(),
            notes: String::new(),
        }
    }

    /// Lookup and merge identity: lowercase `company/project`
    pub fn key(&self) -> String {
        project_key(&self.company, &self.project)
    }

    /// Remote log directory, replaced by the stream's subdir when it has one
    pub fn device_log_path(&self, stream: Option<&ProjectStream>) -> PathBuf {
        match stream_subdir(stream) {
            Some(subdir) => self.device_root.join(subdir),
            None => self.device_root.join(&self.log_dir),
        }
    }

    /// Remote profiling directory, replaced by the stream's subdir when it has one
    pub fn device_profile_path(&self, stream: Option<&ProjectStream>) -> PathBuf {
        match stream_subdir(stream) {
            Some(subdir) => self.device_root.join(subdir),
            None => self.device_root.join(&self.profiling_dir),
        }
    }

    /// Find a stream by name
    pub fn stream(&self, name: &str) -> Option<&ProjectStream> {
        self.streams.iter().find(|s| s.name == name)
    }
}

fn stream_subdir(stream: Option<&ProjectStream>) -> Option<&str> {
    stream
        .map(|s| s.device_subdir.as_str())
        .filter(|subdir| !subdir.is_empty())
}

pub(crate) fn project_key(company: &str, project: &str) -> String {
    format!("{}/{}", company, project).to_lowercase()
}

/// Serialized project entry.
///
/// Absent fields deserialize as empty, which the merge treats as
/// "not overridden". Defaults are applied only when converting to a
/// [`ProjectDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ProjectRecord {
    pub company: String,
    pub project: String,
    pub package: String,
    pub device_root: String,
    pub pc_root: String,
    pub log_dir: String,
    pub profiling_dir: String,
    pub streams: Vec<ProjectStream>,
    pub notes: String,
}

impl ProjectRecord {
    pub fn key(&self) -> String {
        project_key(&self.company, &self.project)
    }

    pub fn into_definition(self) -> ProjectDefinition {
        ProjectDefinition {
            company: self.company,
            project: self.project,
            package: self.package,
            device_root: expand_home(or_default(&self.device_root, DEFAULT_DEVICE_ROOT)),
            pc_root: expand_home(or_default(&self.pc_root, DEFAULT_PC_ROOT)),
            log_dir: or_default(&self.log_dir, DEFAULT_LOG_DIR).to_string(),
            profiling_dir: or_default(&self.profiling_dir, DEFAULT_PROFILING_DIR).to_string(),
            streams: self.streams,
            notes: self.notes,
        }
    }
}

impl From<&ProjectDefinition> for ProjectRecord {
    fn from(def: &ProjectDefinition) -> Self {
        Self {
            company: def.company.clone(),
            project: def.project.clone(),
            package: def.package.clone(),
            device_root: path_string(&def.device_root),
            pc_root: path_string(&def.pc_root),
            log_dir: def.log_dir.clone(),
            profiling_dir: def.profiling_dir.clone(),
            streams: def.streams.clone(),
            notes: def.notes.clone(),
        }
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Top-level shape of a definition or override file
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct CatalogFile {
    #[serde(default)]
    pub projects: Option<Vec<ProjectRecord>>,
}
