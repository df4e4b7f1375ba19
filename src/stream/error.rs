//! Stream read error

use thiserror::Error;

/// Transport failure while reading a worker's output pipe.
///
/// Decode failures never produce this error. `partial` holds whatever text
/// was decoded before the pipe failed.
#[derive(Debug, Error)]
#[error("stream read failed: {source}")]
pub struct StreamReadError {
    pub partial: String,
    #[source]
    pub source: std::io::Error,
}
