//! Tracker error types

use thiserror::Error;

/// Errors raised while reading a worker's usage.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Request to the usage endpoint failed
    #[error("usage request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Usage endpoint answered with a non-success status
    #[error("usage endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// Credential environment variable is unset or empty
    #[error("credential not available: environment variable '{0}' is not set")]
    MissingCredential(String),

    /// Usage command could not run or exited unsuccessfully
    #[error("usage command failed: {0}")]
    Command(String),

    /// Usage data could not be interpreted
    #[error("invalid usage data: {0}")]
    InvalidData(String),
}
