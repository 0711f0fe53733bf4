//! Device bridge errors

use thiserror::Error;

/// Errors from a single bridge invocation
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge executable unavailable: {0}")]
    Unavailable(String),

    #[error("`{command}` exited with {status:?}: {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
