//! # Cerebrus Core Library
//!
//! Retrieval and retention of performance-capture artifacts (logs and CSV
//! profiling data) produced by mobile applications on Android devices.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Project definitions merged from a shared file and user overrides
//! - Device discovery through the Android Debug Bridge
//! - Listing and pulling of device logs and CSV profiles
//! - A bounded local cache with least-recently-modified eviction
//!
//! ## Example
//!
//! ```rust,ignore
//! use cerebrus_core::{config::load_config_from_file, session::Session};
//!
//! let config = load_config_from_file("config/cerebrus.json".as_ref())?;
//! let mut session = Session::open(config);
//! session.initialize();
//!
//! let pulled = session.pull_active(None)?;
//! println!("Pulled {} artifacts", pulled.len());
//! ```

pub mod artifacts;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod device;
pub mod logging;
pub mod preflight;
pub mod project;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::artifacts::{ArtifactSync, DeviceArtifactListing};
    pub use crate::bridge::{AdbBridge, DeviceBridge, OfflineBridge};
    pub use crate::cache::CacheStore;
    pub use crate::config::{AppConfig, CacheConfig};
    pub use crate::device::{Device, DeviceManager};
    pub use crate::logging::LiveLogBuffer;
    pub use crate::project::{ProjectCatalog, ProjectDefinition, ProjectRegistry, ProjectStream};
    pub use crate::session::Session;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
