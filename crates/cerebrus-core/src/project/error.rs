//! Project catalog and registry errors

use thiserror::Error;

/// Errors raised by the project registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown project key: {0}")]
    UnknownProjectKey(String),
}

/// Errors that can occur while persisting project overrides
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}
