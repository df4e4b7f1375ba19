//! Error types for routing failures

use thiserror::Error;

/// Errors that can occur while choosing a worker
#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    /// No tracker produced a capacity snapshot
    #[error("No worker could report its capacity")]
    NoEstimates,

    /// Every worker is below the availability threshold or over its limit
    #[error("No workers available: all workers have exceeded their limits or are unavailable")]
    NoWorkersAvailable,

    /// The forced worker name does not match any configured worker
    #[error("Unknown worker '{name}' (known workers: {})", known.join(", "))]
    InvalidWorker { name: String, known: Vec<String> },

    /// The forced worker is configured but produced no estimate
    #[error("Forced worker '{worker}' has no capacity estimate (its tracker failed)")]
    ForcedWorkerNotFound { worker: String },
}
