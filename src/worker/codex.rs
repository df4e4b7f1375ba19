//! OpenAI Codex CLI worker.

use super::{Pricing, Worker, WorkerId};
use crate::delegate::{DelegationResult, Delegator, ExecutionError};
use async_trait::async_trait;

pub const DEFAULT_MODEL: &str = "gpt-5.2-codex";

const QUERY_PREAMBLE: &str = "EXTREMELY IMPORTANT: Respond in the SAME LANGUAGE as the user. \
Maximum 2 short sentences. NO markdown, NO lists, NO headers. Just plain direct text.\n\n";

/// Header lines `codex exec` prints before the reply.
const BANNER_PREFIXES: &[&str] = &[
    "OpenAI Codex",
    "workdir:",
    "model:",
    "provider:",
    "approval:",
    "sandbox:",
    "reasoning",
    "session id:",
    "mcp startup:",
    "user",
    "thinking",
];

const RESPONSE_MARKER: &str = "codex";

/// Drives `codex exec`.
///
/// Execution uses `--json` event output and a read-only sandbox; queries run
/// with plain output and have the banner stripped from the reply.
pub struct CodexWorker {
    delegator: Delegator,
    model: String,
    pricing: Pricing,
}

impl CodexWorker {
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

    fn common_args(&self) -> Vec<String> {
        vec![
            "--model".to_string(),
            self.model.clone(),
            "-c".to_string(),
            "model_reasoning_effort=low".to_string(),
            "--sandbox".to_string(),
            "read-only".to_string(),
            "--skip-git-repo-check".to_string(),
        ]
    }

    fn exec_args(&self, task: &str) -> Vec<String> {
        let mut args = vec![
            "exec".to_string(),
            "--json".to_string(),
            "--full-auto".to_string(),
        ];
        args.extend(self.common_args());
        args.push("--".to_string());
        args.push(task.to_string());
        args
    }

    fn query_args(&self, prompt: &str) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        args.extend(self.common_args());
        args.push("--".to_string());
        args.push(format!("{}{}", QUERY_PREAMBLE, prompt));
        args
    }
}

#[async_trait]
impl Worker for CodexWorker {
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
        Ok(strip_banner(&result.output))
    }

    async fn execute(&self, task: &str) -> Result<DelegationResult, ExecutionError> {
        self.delegator.execute(&self.exec_args(task)).await
    }
}

/// Extract the reply from plain `codex exec` output.
///
/// The reply follows a line reading exactly `codex` and ends at the
/// `tokens used` footer or a bare token count. Output without a recognizable
/// reply section is returned as is.
pub fn strip_banner(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let mut reply: Vec<&str> = Vec::new();
    let mut in_reply = false;

    for (i, line) in lines.iter().enumerate() {
        if !in_reply {
            if *line == "--------" || BANNER_PREFIXES.iter().any(|p| line.starts_with(p)) {
                continue;
            }
            if *line == RESPONSE_MARKER && i + 1 < lines.len() {
                in_reply = true;
            }
            continue;
        }

        if line.starts_with("tokens used") || is_token_count(line.trim()) {
            break;
        }
        reply.push(line);
    }

    while reply.last().is_some_and(|l| l.trim().is_empty()) {
        reply.pop();
    }

    if reply.is_empty() {
        if let Some(idx) = output.find("\ncodex\n") {
            return output[idx + "\ncodex\n".len()..].trim().to_string();
        }
        return output.to_string();
    }

    reply.join("\n")
}

fn is_token_count(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> CodexWorker {
        let delegator = Delegator::new(WorkerId::new("codex"), "Codex", "codex");
        CodexWorker::new(delegator, Pricing::free())
    }

    #[test]
    fn test_exec_args_json_read_only() {
        let args = worker().exec_args("add tests");
        assert_eq!(&args[..3], &["exec", "--json", "--full-auto"]);
        assert!(args.windows(2).any(|w| w[0] == "--sandbox" && w[1] == "read-only"));
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "add tests");
    }

    #[test]
    fn test_query_args_no_json_or_full_auto() {
        let args = worker().with_model("o4-mini").query_args("hello");
        assert!(!args.contains(&"--json".to_string()));
        assert!(!args.contains(&"--full-auto".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--model" && w[1] == "o4-mini"));
        assert!(args.last().unwrap().starts_with("EXTREMELY IMPORTANT"));
    }

    #[test]
    fn test_strip_banner_extracts_reply() {
        let output = "OpenAI Codex v0.1\n--------\nworkdir: /tmp\nmodel: gpt\n\
                      sandbox: read-only\n--------\nuser\nhello\nthinking\nhmm\n\
                      codex\nUse a HashMap here.\nIt is faster.\n\ntokens used\n1,234\n";
        assert_eq!(strip_banner(output), "Use a HashMap here.\nIt is faster.");
    }

    #[test]
    fn test_strip_banner_stops_at_bare_count() {
        let output = "codex\nDone.\n2,048\nignored";
        assert_eq!(strip_banner(output), "Done.");
    }

    #[test]
    fn test_strip_banner_passthrough_without_marker() {
        assert_eq!(strip_banner("just text"), "just text");
    }

    #[test]
    fn test_strip_banner_empty_reply_falls_back() {
        let output = "header\ncodex\n\ntokens used\n";
        // The reply section is empty, so everything after the marker is kept.
        assert_eq!(strip_banner(output), "tokens used");
    }
}
