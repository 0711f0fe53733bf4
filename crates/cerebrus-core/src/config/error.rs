//! Configuration errors

use thiserror::Error;

/// Errors that can occur while loading the application configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration data: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Unsupported configuration version {found}; expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}
