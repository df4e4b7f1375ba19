//! Worker abstraction for external AI coding tools.
//!
//! Every tool the dispatcher can hand a task to implements [`Worker`]. Callers
//! route, query and execute through the trait and never branch on a worker's
//! identity string. Each worker kind lives in its own file and wraps a
//! [`Delegator`](crate::delegate::Delegator) configured with that tool's
//! command-line flags and stream format.

pub mod claude_code;
pub mod codex;
pub mod factory;
pub mod generic;
pub mod opencode;
pub mod registry;
pub mod scripted;

pub use claude_code::ClaudeCodeWorker;
pub use codex::CodexWorker;
pub use factory::{create_mock_worker, create_worker, WorkerSettings};
pub use generic::GenericWorker;
pub use opencode::OpenCodeWorker;
pub use registry::WorkerRegistry;
pub use scripted::{Reply, ScriptedWorker};

use crate::delegate::{DelegationResult, ExecutionError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a worker.
///
/// Identities are compared case-insensitively, so the value is normalized to
/// trimmed lowercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkerId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for WorkerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-worker price table entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pricing {
    /// Price in USD per 1000 tokens. Zero for free tiers.
    pub price_per_1k: f64,
}

impl Pricing {
    pub fn free() -> Self {
        Self { price_per_1k: 0.0 }
    }

    pub fn per_1k(price_per_1k: f64) -> Self {
        Self { price_per_1k }
    }

    pub fn is_free(&self) -> bool {
        self.price_per_1k == 0.0
    }
}

/// Capability shared by every worker kind.
///
/// Implementations own their process invocation details. Both async methods
/// are cancel-safe: dropping the returned future kills any child process
/// the call spawned.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Identity used for routing, tracker lookup and mention detection.
    fn id(&self) -> &WorkerId;

    /// Human-readable name for reason strings and terminal output.
    fn name(&self) -> &str;

    /// Price table entry consumed by the cost model.
    fn pricing(&self) -> Pricing;

    /// Send a conversational prompt and return the reply text.
    ///
    /// Used by council mode. No live rendering happens here; the worker runs
    /// in simple mode and only the final text matters.
    async fn query(&self, prompt: &str) -> Result<String, ExecutionError>;

    /// Execute a coding task with live streaming output.
    ///
    /// A process that starts but times out or exits non-zero still yields
    /// `Ok` with the corresponding [`ExecutionState`](crate::delegate::ExecutionState);
    /// `Err` is reserved for failures before any output could be produced,
    /// such as a missing executable.
    async fn execute(&self, task: &str) -> Result<DelegationResult, ExecutionError>;
}
