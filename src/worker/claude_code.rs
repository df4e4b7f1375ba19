//! Claude Code CLI worker.

use super::{Pricing, Worker, WorkerId};
use crate::delegate::{DelegationResult, Delegator, ExecutionError};
use async_trait::async_trait;

pub const DEFAULT_MODEL: &str = "haiku";

const QUERY_PREAMBLE: &str = "CRITICAL: Respond in the SAME LANGUAGE as the user. \
Maximum 2-3 short sentences. Do not explain who you are. Just answer directly.\n\n";

/// Drives `claude -p` in print mode.
///
/// Execution asks for `stream-json` with partial messages so text deltas can be
/// rendered as they arrive; queries use plain output.
pub struct ClaudeCodeWorker {
    delegator: Delegator,
    model: String,
    pricing: Pricing,
}

impl ClaudeCodeWorker {
    pub fn new(delegator: Delegator, pricing: Pricing) -> Self {
        Self {
            delegator,
            model: DEFAULT_MODEL.to_string(),
            pricing,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn exec_args(&self, task: &str) -> Vec<String> {
        vec![
            "-p".to_string(),
            task.to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--include-partial-messages".to_string(),
            "--verbose".to_string(),
        ]
    }

    fn query_args(&self, prompt: &str) -> Vec<String> {
        vec![
            "-p".to_string(),
            format!("{}{}", QUERY_PREAMBLE, prompt),
            "--model".to_string(),
            self.model.clone(),
        ]
    }
}

#[async_trait]
impl Worker for ClaudeCodeWorker {
    fn id(&self) -> &WorkerId {
        self.delegator.worker()
    }

    fn name(&self) -> &str {
        self.delegator.worker_name()
    }

    fn pricing(&self) -> Pricing {
        self.pricing
    }

    async fn query(&self, prompt: &str) -> Result<String, ExecutionError> {
        let result = self
            .delegator
            .execute_simple(&self.query_args(prompt))
            .await?
            .check()?;
        Ok(result.output.trim().to_string())
    }

    async fn execute(&self, task: &str) -> Result<DelegationResult, ExecutionError> {
        self.delegator.execute(&self.exec_args(task)).await
    }
}
