//! In-process worker with canned replies.
//!
//! Backs `council --mock` and the test suites; no external process is spawned.

use super::{Pricing, Worker, WorkerId};
use crate::council::{detect_files, PLAN_INSTRUCTIONS};
use crate::delegate::{
    estimate_tokens, DelegationResult, ExecutionError, ExecutionState, NullSink, OutputSink,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What a scripted worker answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Always the same text
    Fixed(String),
    /// Echo the input back with a prefix
    Echo(String),
    /// Cycle through canned lines, one per call
    Rotate(Vec<String>),
    /// Fail with this message
    Error(String),
    /// Like `Rotate`, but plan prompts get a JSON plan built from the
    /// file paths mentioned in the prompt
    Mock(Vec<String>),
}

/// Files proposed by a mock plan when the conversation names none.
const MOCK_PLAN_FILES: &[(&str, &str, &str)] = &[
    ("src/auth/middleware.rs", "create", "Request guard for the new check"),
    ("src/routes/auth.rs", "modify", "Wire the guard into the routes"),
    ("src/config/security.rs", "create", "Settings for the new behavior"),
];

/// Structured plan a mock worker returns for a plan prompt.
///
/// `request` is the prompt after the plan instructions: the file under
/// discussion, the recent conversation and the task.
fn mock_plan(worker: &str, request: &str) -> String {
    let detected = detect_files(request);
    let files: Vec<serde_json::Value> = if detected.is_empty() {
        MOCK_PLAN_FILES
            .iter()
            .map(|(path, action, summary)| json!({"path": path, "action": action, "summary": summary}))
            .collect()
    } else {
        detected
            .iter()
            .map(|path| json!({"path": path, "action": "modify", "summary": "Apply the change discussed in council"}))
            .collect()
    };

    json!({
        "summary": format!("[mock] {} would make the change in small steps, adding tests alongside.", worker),
        "files": files,
        "dependencies": [],
        "risks": ["Scripted plan; no code was read"],
        "confidence": 0.8,
    })
    .to_string()
}

pub struct ScriptedWorker {
    id: WorkerId,
    name: String,
    pricing: Pricing,
    reply: Reply,
    delay: Duration,
    sink: Arc<dyn OutputSink>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedWorker {
    pub fn new(id: impl AsRef<str>, name: impl Into<String>, reply: Reply) -> Self {
        Self {
            id: WorkerId::new(id),
            name: name.into(),
            pricing: Pricing::free(),
            reply,
            delay: Duration::ZERO,
            sink: Arc::new(NullSink),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(id: impl AsRef<str>, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, name, Reply::Fixed(text.into()))
    }

    pub fn echo(id: impl AsRef<str>, name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(id, name, Reply::Echo(prefix.into()))
    }

    pub fn failing(id: impl AsRef<str>, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, name, Reply::Error(message.into()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    /// Print executed output here, as a real worker would stream it.
    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Number of query and execute calls that ran to completion.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt or task received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    async fn respond(&self, input: &str) -> Result<String, String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(input.to_string());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Echo(prefix) => Ok(format!("{}{}", prefix, input)),
            Reply::Rotate(lines) if !lines.is_empty() => Ok(lines[call % lines.len()].clone()),
            Reply::Rotate(_) => Ok(String::new()),
            Reply::Mock(lines) => Ok(match input.strip_prefix(PLAN_INSTRUCTIONS) {
                Some(request) => mock_plan(&self.name, request),
                None if lines.is_empty() => String::new(),
                None => lines[call % lines.len()].clone(),
            }),
            Reply::Error(message) => Err(message.clone()),
        }
    }
}

#[async_trait]
impl Worker for ScriptedWorker {
    fn id(&self) -> &WorkerId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn pricing(&self) -> Pricing {
        self.pricing
    }

    async fn query(&self, prompt: &str) -> Result<String, ExecutionError> {
        self.respond(prompt)
            .await
            .map_err(|message| ExecutionError::Failed {
                worker: self.id.to_string(),
                exit_code: 1,
                message,
            })
    }

    async fn execute(&self, task: &str) -> Result<DelegationResult, ExecutionError> {
        let start = Instant::now();
        let (success, state, output, error, exit_code) = match self.respond(task).await {
            Ok(text) => {
                let output = format!("{}\n", text.trim_end());
                self.sink.write(&output);
                (true, ExecutionState::Completed, output, None, 0)
            }
            Err(message) => (false, ExecutionState::Failed, String::new(), Some(message), 1),
        };

        Ok(DelegationResult {
            worker: self.id.clone(),
            worker_name: self.name.clone(),
            success,
            state,
            tokens_used: estimate_tokens(&output),
            output,
            error,
            duration: start.elapsed(),
            exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_reply() {
        let worker = ScriptedWorker::fixed("codex", "Codex", "ok");
        assert_eq!(worker.query("anything").await.unwrap(), "ok");
        assert_eq!(worker.calls(), 1);
        assert_eq!(worker.prompts(), vec!["anything"]);
    }

    #[tokio::test]
    async fn test_echo_and_execute() {
        let worker = ScriptedWorker::echo("codex", "Codex", "did: ");
        let result = worker.execute("task").await.unwrap();
        assert!(result.success);
        assert_eq!(result.state, ExecutionState::Completed);
        assert_eq!(result.output, "did: task\n");
    }

    #[tokio::test]
    async fn test_rotate_cycles() {
        let worker = ScriptedWorker::new(
            "codex",
            "Codex",
            Reply::Rotate(vec!["one".to_string(), "two".to_string()]),
        );
        assert_eq!(worker.query("a").await.unwrap(), "one");
        assert_eq!(worker.query("b").await.unwrap(), "two");
        assert_eq!(worker.query("c").await.unwrap(), "one");
    }

    #[tokio::test]
    async fn test_error_reply() {
        let worker = ScriptedWorker::failing("codex", "Codex", "quota exceeded");
        assert!(matches!(
            worker.query("x").await,
            Err(ExecutionError::Failed { .. })
        ));
        let result = worker.execute("x").await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn test_dropped_call_not_counted() {
        let worker = ScriptedWorker::fixed("codex", "Codex", "ok").with_delay(Duration::from_secs(10));
        let outcome = tokio::time::timeout(Duration::from_millis(20), worker.query("x")).await;
        assert!(outcome.is_err());
        assert_eq!(worker.calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_plan_lists_mentioned_files() {
        let worker = ScriptedWorker::new("codex", "Codex", Reply::Mock(vec!["[mock] hi".to_string()]));
        let prompt = format!(
            "{}\nFile under discussion: src/main.rs\n\nTask: update src/main.rs and README.md",
            PLAN_INSTRUCTIONS
        );
        let reply: serde_json::Value =
            serde_json::from_str(&worker.query(&prompt).await.unwrap()).unwrap();

        let paths: Vec<_> = reply["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["src/main.rs", "README.md"]);
        assert_eq!(reply["files"][0]["action"], "modify");
        assert_eq!(reply["confidence"], 0.8);
        assert!(reply["summary"].as_str().unwrap().contains("Codex"));

        assert_eq!(worker.query("what do you think?").await.unwrap(), "[mock] hi");
    }

    #[tokio::test]
    async fn test_mock_plan_without_files_proposes_defaults() {
        let worker = ScriptedWorker::new("codex", "Codex", Reply::Mock(Vec::new()));
        let prompt = format!("{}\nTask: add rate limiting", PLAN_INSTRUCTIONS);
        let reply: serde_json::Value =
            serde_json::from_str(&worker.query(&prompt).await.unwrap()).unwrap();
        assert_eq!(reply["files"].as_array().unwrap().len(), MOCK_PLAN_FILES.len());
        assert_eq!(reply["files"][0]["path"], "src/auth/middleware.rs");
    }
}
