//! Council error types

use crate::delegate::ExecutionError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CouncilError {
    #[error("No worker selected. Mention a worker first.")]
    NoWorkerSelected,

    #[error("Unknown worker '{name}'. Known workers: {}", known.join(", "))]
    UnknownWorker { name: String, known: Vec<String> },

    #[error("Worker '{worker}' is not available right now")]
    Unavailable { worker: String },

    #[error("No task in this session yet. Describe the task first.")]
    NoTask,

    #[error("{worker} did not answer within {after:?}")]
    Timeout { worker: String, after: Duration },

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
