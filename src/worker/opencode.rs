//! OpenCode CLI worker.

use super::{Pricing, Worker, WorkerId};
use crate::delegate::{DelegationResult, Delegator, ExecutionError};
use async_trait::async_trait;

const QUERY_PREAMBLE: &str = "Respond in the SAME LANGUAGE as the user. \
Maximum 2-3 short sentences. Answer directly.\n\n";

/// Drives `opencode run`, which prints plain text.
pub struct OpenCodeWorker {
    delegator: Delegator,
    model: Option<String>,
    pricing: Pricing,
}

impl OpenCodeWorker {
    pub fn new(delegator: Delegator, pricing: Pricing) -> Self {
        Self {
            delegator,
            model: None,
            pricing,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    fn run_args(&self, message: String) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args.push(message);
        args
    }
}

#[async_trait]
impl Worker for OpenCodeWorker {
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
        let args = self.run_args(format!("{}{}", QUERY_PREAMBLE, prompt));
        let result = self.delegator.execute_simple(&args).await?.check()?;
        Ok(result.output.trim().to_string())
    }

    async fn execute(&self, task: &str) -> Result<DelegationResult, ExecutionError> {
        self.delegator.execute(&self.run_args(task.to_string())).await
    }
}
