//! Artifact Synchronisation
//!
//! Lists log and CSV profiling files on a device and pulls them into a
//! per-project folder of the cache:
//!
//! ```text
//! [cache_root]/device_captures/[ProjectName]/
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bridge::DeviceBridge;
use crate::device::Device;
use crate::project::{ProjectDefinition, ProjectStream};

/// Cache subdirectory holding pulled artifacts
pub const CAPTURES_DIR: &str = "device_captures";

/// Remote files found by one listing, and where they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceArtifactListing {
    /// Remote directory the logs were listed from
    pub log_dir: PathBuf,
    /// Remote directory the profiles were listed from
    pub profile_dir: PathBuf,
    /// Remote log files
    pub logs: Vec<PathBuf>,
    /// Remote CSV profiles
    pub profiles: Vec<PathBuf>,
}

impl DeviceArtifactListing {
    /// Empty listing rooted at the project's (or stream's) remote directories
    pub fn for_project(project: &ProjectDefinition, stream: Option<&ProjectStream>) -> Self {
        Self {
            log_dir: project.device_log_path(stream),
            profile_dir: project.device_profile_path(stream),
            logs: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Keep only files whose name contains `keyword`, ignoring case.
    ///
    /// An empty keyword keeps everything.
    pub fn filtered(&self, keyword: &str) -> Self {
        if keyword.is_empty() {
            return self.clone();
        }

        let needle = keyword.to_lowercase();
        let matches = |path: &&PathBuf| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(&needle))
                .unwrap_or(false)
        };

        Self {
            log_dir: self.log_dir.clone(),
            profile_dir: self.profile_dir.clone(),
            logs: self.logs.iter().filter(matches).cloned().collect(),
            profiles: self.profiles.iter().filter(matches).cloned().collect(),
        }
    }

    /// Total number of listed files
    pub fn len(&self) -> usize {
        self.logs.len() + self.profiles.len()
    }

    /// Whether nothing was listed
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.profiles.is_empty()
    }
}

/// Lists and pulls device artifacts through a bridge
#[derive(Debug, Clone)]
pub struct ArtifactSync {
    bridge: Arc<dyn DeviceBridge>,
    cache_root: PathBuf,
}

impl ArtifactSync {
    /// Create a synchroniser writing below `cache_root`
    pub fn new<P: Into<PathBuf>>(bridge: Arc<dyn DeviceBridge>, cache_root: P) -> Self {
        Self {
            bridge,
            cache_root: cache_root.into(),
        }
    }

    /// Local folder receiving a project's artifacts
    pub fn destination_path(&self, project: &ProjectDefinition) -> PathBuf {
        self.cache_root.join(CAPTURES_DIR).join(&project.project)
    }

    /// List remote logs and profiles.
    ///
    /// A stream with a non-empty `device_subdir` redirects both categories
    /// to that folder; a stream that excludes a category leaves it empty
    /// without querying the device.
    pub fn list_artifacts(
        &self,
        device: &Device,
        project: &ProjectDefinition,
        stream: Option<&ProjectStream>,
    ) -> DeviceArtifactListing {
        let mut listing = DeviceArtifactListing::for_project(project, stream);
        let include_logs = stream.map_or(true, |s| s.include_logs);
        let include_csv = stream.map_or(true, |s| s.include_csv);

        tracing::info!(
            device = %device.identifier,
            "Listing device artifacts from {}",
            listing.log_dir.display()
        );

        if include_logs {
            listing.logs = self.bridge.list_remote_files(device, &listing.log_dir);
        }
        if include_csv {
            listing.profiles = self.bridge.list_remote_files(device, &listing.profile_dir);
        }

        tracing::debug!(
            "Listed {} logs and {} profiles",
            listing.logs.len(),
            listing.profiles.len()
        );
        listing
    }

    /// Download artifacts into the project's capture folder.
    ///
    /// With neither `logs` nor `profiles`, both remote directories are
    /// pulled whole; a directory shared by both (a stream subdir) is pulled
    /// once. Otherwise exactly the given files are pulled, logs first.
    ///
    /// An empty selection is not a request for everything: `Some(&[])`
    /// pulls nothing for that category, and passing `Some(&[])` for both
    /// pulls nothing at all. Use `None` for both to pull whole directories.
    ///
    /// Files that fail to pull are skipped. Each local path is reported
    /// once, even when the same file was selected in both categories.
    pub fn pull_selected(
        &self,
        device: &Device,
        project: &ProjectDefinition,
        listing: &DeviceArtifactListing,
        logs: Option<&[PathBuf]>,
        profiles: Option<&[PathBuf]>,
    ) -> Vec<PathBuf> {
        let destination = self.destination_path(project);
        if let Err(e) = fs::create_dir_all(&destination) {
            tracing::error!(path = %destination.display(), "Cannot create capture folder: {e}");
            return Vec::new();
        }

        let log_dir = resolved_dir(&listing.log_dir, || project.device_log_path(None));
        let profile_dir = resolved_dir(&listing.profile_dir, || project.device_profile_path(None));

        let mut downloaded = Vec::new();
        if logs.is_none() && profiles.is_none() {
            tracing::info!("No specific selection provided; pulling entire directories");
            downloaded.extend(self.bridge.pull_files(device, &log_dir, &destination, None));
            if profile_dir != log_dir {
                downloaded.extend(self.bridge.pull_files(device, &profile_dir, &destination, None));
            }
        } else {
            for (dir, files) in [(&log_dir, logs), (&profile_dir, profiles)] {
                if let Some(files) = files.filter(|f| !f.is_empty()) {
                    let pulled = self.bridge.pull_files(device, dir, &destination, Some(files));
                    downloaded.extend(pulled);
                }
            }
        }

        let mut seen = HashSet::new();
        downloaded.retain(|path| seen.insert(path.clone()));

        tracing::info!(
            device = %device.identifier,
            "Pulled {} artifacts into {}",
            downloaded.len(),
            destination.display()
        );
        downloaded
    }
}

fn resolved_dir(listed: &Path, fallback: impl FnOnce() -> PathBuf) -> PathBuf {
    if listed.as_os_str().is_empty() {
        fallback()
    } else {
        listed.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every bridge call and serves a fixed remote tree
    #[derive(Debug, Default)]
    struct RecordingBridge {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBridge {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DeviceBridge for RecordingBridge {
        fn list_devices(&self) -> Vec<Device> {
            Vec::new()
        }

        fn get_property(&self, _device: &Device, _key: &str) -> Option<String> {
            None
        }

        fn is_package_installed(&self, _device: &Device, _package: &str) -> bool {
            false
        }

        fn list_remote_files(&self, _device: &Device, remote_dir: &Path) -> Vec<PathBuf> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("list {}", remote_dir.display()));
            vec![remote_dir.join("entry.log")]
        }

        fn pull_files(
            &self,
            _device: &Device,
            remote_dir: &Path,
            destination: &Path,
            files: Option<&[PathBuf]>,
        ) -> Vec<PathBuf> {
            let names: Vec<String> = match files {
                Some(files) => files
                    .iter()
                    .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
                    .collect(),
                None => vec!["*".to_string()],
            };
            self.calls.lock().unwrap().push(format!(
                "pull {} [{}]",
                remote_dir.display(),
                names.join(",")
            ));
            names.iter().map(|n| destination.join(n)).collect()
        }
    }

    fn project() -> ProjectDefinition {
        let mut def =
            ProjectDefinition::new("ACME", "RocketGame", "com.acme.rocket", "/data", "pc");
        def.streams = vec![ProjectStream::new("soak", "Saved/Soak")];
        def
    }

    fn device() -> Device {
        Device::new("abc", "Pixel", "14")
    }

    #[test]
    fn test_filtered_is_case_insensitive_and_pure() {
        let listing = DeviceArtifactListing {
            logs: vec![PathBuf::from("/d/Game.log"), PathBuf::from("/d/Crash.log")],
            profiles: vec![PathBuf::from("/d/game_profile.csv")],
            ..Default::default()
        };

        let filtered = listing.filtered("GAME");
        assert_eq!(filtered.logs, vec![PathBuf::from("/d/Game.log")]);
        assert_eq!(filtered.profiles, vec![PathBuf::from("/d/game_profile.csv")]);
        assert_eq!(listing.len(), 3);
        assert_eq!(listing.filtered(""), listing);
    }

    #[test]
    fn test_list_artifacts_default_dirs() {
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), "/cache");

        let listing = sync.list_artifacts(&device(), &project(), None);

        assert_eq!(
            bridge.calls(),
            vec!["list /data/Saved/Logs", "list /data/Saved/Profiling"]
        );
        assert_eq!(listing.logs, vec![PathBuf::from("/data/Saved/Logs/entry.log")]);
        assert_eq!(listing.log_dir, PathBuf::from("/data/Saved/Logs"));
    }

    #[test]
    fn test_stream_subdir_collapses_both_dirs() {
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), "/cache");
        let project = project();

        let listing = sync.list_artifacts(&device(), &project, project.stream("soak"));

        assert_eq!(bridge.calls(), vec!["list /data/Saved/Soak", "list /data/Saved/Soak"]);
        assert_eq!(listing.log_dir, listing.profile_dir);
    }

    #[test]
    fn test_stream_flags_skip_categories() {
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), "/cache");
        let mut stream = ProjectStream::new("csv-only", "");
        stream.include_logs = false;

        let listing = sync.list_artifacts(&device(), &project(), Some(&stream));

        assert!(listing.logs.is_empty());
        assert_eq!(bridge.calls(), vec!["list /data/Saved/Profiling"]);
    }

    #[test]
    fn test_selective_pull_logs_before_profiles() {
        let temp = TempDir::new().unwrap();
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), temp.path());
        let listing = DeviceArtifactListing::for_project(&project(), None);

        let logs = vec![PathBuf::from("/data/Saved/Logs/a.log")];
        let profiles = vec![PathBuf::from("c.csv")];
        let pulled = sync.pull_selected(
            &device(),
            &project(),
            &listing,
            Some(logs.as_slice()),
            Some(profiles.as_slice()),
        );

        assert_eq!(
            bridge.calls(),
            vec![
                "pull /data/Saved/Logs [a.log]",
                "pull /data/Saved/Profiling [c.csv]"
            ]
        );
        let dest = temp.path().join(CAPTURES_DIR).join("RocketGame");
        assert!(dest.is_dir());
        assert_eq!(pulled, vec![dest.join("a.log"), dest.join("c.csv")]);
    }

    #[test]
    fn test_empty_selection_pulls_nothing_for_that_category() {
        let temp = TempDir::new().unwrap();
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), temp.path());
        let listing = DeviceArtifactListing::for_project(&project(), None);

        let logs = vec![PathBuf::from("a.log")];
        let profiles: Vec<PathBuf> = Vec::new();
        sync.pull_selected(
            &device(),
            &project(),
            &listing,
            Some(logs.as_slice()),
            Some(profiles.as_slice()),
        );

        assert_eq!(bridge.calls(), vec!["pull /data/Saved/Logs [a.log]"]);
    }

    #[test]
    fn test_bulk_pull_uses_listing_dirs() {
        let temp = TempDir::new().unwrap();
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), temp.path());
        let project = project();
        let listing = DeviceArtifactListing::for_project(&project, project.stream("soak"));

        sync.pull_selected(&device(), &project, &listing, None, None);

        assert_eq!(bridge.calls(), vec!["pull /data/Saved/Soak [*]"]);
    }

    #[test]
    fn test_shared_directory_reports_each_file_once() {
        let temp = TempDir::new().unwrap();
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), temp.path());
        let project = project();
        let listing = DeviceArtifactListing::for_project(&project, project.stream("soak"));

        let selected = vec![PathBuf::from("/data/Saved/Soak/entry.log")];
        let pulled = sync.pull_selected(
            &device(),
            &project,
            &listing,
            Some(selected.as_slice()),
            Some(selected.as_slice()),
        );

        assert_eq!(bridge.calls().len(), 2);
        let dest = temp.path().join(CAPTURES_DIR).join("RocketGame");
        assert_eq!(pulled, vec![dest.join("entry.log")]);
    }

    #[test]
    fn test_default_listing_falls_back_to_project_dirs() {
        let temp = TempDir::new().unwrap();
        let bridge = Arc::new(RecordingBridge::default());
        let sync = ArtifactSync::new(bridge.clone(), temp.path());

        sync.pull_selected(
            &device(),
            &project(),
            &DeviceArtifactListing::default(),
            None,
            None,
        );

        assert_eq!(
            bridge.calls(),
            vec!["pull /data/Saved/Logs [*]", "pull /data/Saved/Profiling [*]"]
        );
    }
}
