//! Execution error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised while running a worker process.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The worker executable is not on the search path
    #[error("{worker} is not installed (command '{command}' not found). {hint}")]
    WorkerNotInstalled {
        worker: String,
        command: String,
        hint: String,
    },

    /// The process could not be started for another reason
    #[error("failed to start {worker}: {message}")]
    Spawn { worker: String, message: String },

    /// The deadline elapsed and the process was killed
    #[error("{worker} execution timed out after {after:?}")]
    Timeout { worker: String, after: Duration },

    /// The process exited unsuccessfully
    #[error("{worker} failed (exit code {exit_code}): {message}")]
    Failed {
        worker: String,
        exit_code: i32,
        message: String,
    },

    /// The output pipe failed mid-stream
    #[error("{worker} output stream failed: {message}")]
    StreamRead { worker: String, message: String },
}
