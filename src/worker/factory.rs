//! Builds workers from configuration.

use super::claude_code::{self, ClaudeCodeWorker};
use super::codex::{self, CodexWorker};
use super::generic::GenericWorker;
use super::opencode::OpenCodeWorker;
use super::{Pricing, Reply, ScriptedWorker, Worker, WorkerId};
use crate::config::{ExecutionConfig, WorkerConfig, WorkerKind};
use crate::delegate::{Delegator, IndicatorConfig, OutputSink, StdoutSink, DEFAULT_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

/// Runtime settings shared by every worker built in one session.
#[derive(Clone)]
pub struct WorkerSettings {
    pub timeout: Duration,
    pub sink: Arc<dyn OutputSink>,
    pub indicator: IndicatorConfig,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            sink: Arc::new(StdoutSink),
            indicator: IndicatorConfig::default(),
        }
    }
}

impl WorkerSettings {
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            timeout: config.timeout(),
            sink: Arc::new(StdoutSink),
            indicator: config.indicator(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }
}

/// Build the worker described by `config`.
pub fn create_worker(config: &WorkerConfig, settings: &WorkerSettings) -> Arc<dyn Worker> {
    let delegator = Delegator::new(
        WorkerId::new(&config.id),
        config.display_name(),
        config.command(),
    )
    .with_timeout(settings.timeout)
    .with_format(config.stream_format())
    .with_sink(settings.sink.clone())
    .with_indicator(settings.indicator)
    .with_install_hint(config.install_hint());
    let pricing = Pricing::per_1k(config.price_per_1k);

    match config.kind {
        WorkerKind::ClaudeCode => Arc::new(
            ClaudeCodeWorker::new(delegator, pricing).with_model(
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| claude_code::DEFAULT_MODEL.to_string()),
            ),
        ),
        WorkerKind::Codex => Arc::new(
            CodexWorker::new(delegator, pricing).with_model(
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| codex::DEFAULT_MODEL.to_string()),
            ),
        ),
        WorkerKind::Opencode => {
            Arc::new(OpenCodeWorker::new(delegator, pricing).with_model(config.model.clone()))
        }
        WorkerKind::Generic => Arc::new(GenericWorker::new(
            delegator,
            config.exec_args.clone(),
            config.query_args.clone(),
            pricing,
        )),
    }
}

/// Build a scripted stand-in for `config` that answers without spawning anything.
///
/// Plan prompts get a JSON plan naming the files mentioned in the conversation.
pub fn create_mock_worker(config: &WorkerConfig, settings: &WorkerSettings) -> Arc<dyn Worker> {
    let name = config.display_name();
    let lines = MOCK_REPLIES
        .iter()
        .map(|line| format!("[mock] {}", line))
        .collect();
    Arc::new(
        ScriptedWorker::new(&config.id, name, Reply::Mock(lines))
            .with_pricing(Pricing::per_1k(config.price_per_1k))
            .with_delay(Duration::from_millis(150))
            .with_sink(settings.sink.clone()),
    )
}

const MOCK_REPLIES: &[&str] = &[
    "I would start with the smallest change that makes this work, then add tests.",
    "Consider reusing the existing middleware instead of writing a new layer.",
    "Keep the state in one place; a single struct behind an Arc is enough here.",
    "I'd split this into two steps so each one can be reviewed on its own.",
];
