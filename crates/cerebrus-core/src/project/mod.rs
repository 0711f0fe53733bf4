//! Project Definitions
//!
//! A project names a mobile application and where its logs and CSV
//! profiles live, both on the device and on the workstation.
//!
//! Definitions come from a shared base file merged with a user-local
//! override file:
//!
//! ```text
//! { "projects": [ {
//!     "company": "ACME", "project": "RocketGame", "package": "com.acme.rocket",
//!     "device_root": "/sdcard/Android/data/com.acme.rocket/files",
//!     "pc_root": "~/captures/rocket",
//!     "log_dir": "Saved/Logs", "profiling_dir": "Saved/Profiling",
//!     "streams": [ { "name": "soak", "device_subdir": "Saved/Soak" } ],
//!     "notes": ""
//! } ] }
//! ```

mod catalog;
mod definition;
mod error;
mod registry;

pub use catalog::ProjectCatalog;
pub use definition::{
    ProjectDefinition, ProjectStream, DEFAULT_DEVICE_ROOT, DEFAULT_LOG_DIR, DEFAULT_PC_ROOT,
    DEFAULT_PROFILING_DIR,
};
pub use error::{CatalogError, RegistryError};
pub use registry::{ProjectRegistry, OVERRIDE_FILE_NAME};
