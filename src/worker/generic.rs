//! Worker for arbitrary CLIs configured through argument templates.

use super::{Pricing, Worker, WorkerId};
use crate::delegate::{DelegationResult, Delegator, ExecutionError};
use async_trait::async_trait;

/// Placeholder replaced by the task or prompt in argument templates.
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Runs a configured command with templated arguments.
///
/// When a template contains no `{prompt}` placeholder the text is appended as
/// the final argument.
pub struct GenericWorker {
    delegator: Delegator,
    exec_args: Vec<String>,
    query_args: Vec<String>,
    pricing: Pricing,
}

impl GenericWorker {
    pub fn new(
        delegator: Delegator,
        exec_args: Vec<String>,
        query_args: Vec<String>,
        pricing: Pricing,
    ) -> Self {
        Self {
            delegator,
            exec_args,
            query_args,
            pricing,
        }
    }
}

/// Substitute `text` into an argument template.
pub fn render_args(template: &[String], text: &str) -> Vec<String> {
    let mut substituted = false;
    let mut args: Vec<String> = template
        .iter()
        .map(|arg| {
            if arg.contains(PROMPT_PLACEHOLDER) {
                substituted = true;
                arg.replace(PROMPT_PLACEHOLDER, text)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        args.push(text.to_string());
    }
    args
}

#[async_trait]
impl Worker for GenericWorker {
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
        let template = if self.query_args.is_empty() {
            &self.exec_args
        } else {
            &self.query_args
        };
        let result = self
            .delegator
            .execute_simple(&render_args(template, prompt))
            .await?
            .check()?;
        Ok(result.output.trim().to_string())
    }

    async fn execute(&self, task: &str) -> Result<DelegationResult, ExecutionError> {
        self.delegator
            .execute(&render_args(&self.exec_args, task))
            .await
    }
}
