//! Execution outcome types

use super::ExecutionError;
use crate::worker::WorkerId;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Lifecycle of one execution.
///
/// `Idle -> Started -> Streaming -> {Completed, TimedOut, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Idle,
    Started,
    Streaming,
    Completed,
    TimedOut,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Completed | ExecutionState::TimedOut | ExecutionState::Failed
        )
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Started => "started",
            ExecutionState::Streaming => "streaming",
            ExecutionState::Completed => "completed",
            ExecutionState::TimedOut => "timed out",
            ExecutionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of running a worker process once.
#[derive(Debug, Clone, Serialize)]
pub struct DelegationResult {
    pub worker: WorkerId,
    pub worker_name: String,
    pub success: bool,
    pub state: ExecutionState,
    /// Decoded stdout, followed by captured stderr when there was any
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rough size-based estimate, about four characters per token
    pub tokens_used: usize,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Process exit code, or -1 when the process did not exit on its own
    pub exit_code: i32,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl DelegationResult {
    /// Convert an unsuccessful outcome into its typed error.
    pub fn check(self) -> Result<Self, ExecutionError> {
        let worker = self.worker.to_string();
        match self.state {
            ExecutionState::Completed if self.success => Ok(self),
            ExecutionState::TimedOut => Err(ExecutionError::Timeout {
                worker,
                after: self.duration,
            }),
            _ if self.exit_code == 0 => Err(ExecutionError::StreamRead {
                worker,
                message: self.error.unwrap_or_default(),
            }),
            _ => Err(ExecutionError::Failed {
                worker,
                exit_code: self.exit_code,
                message: self.error.unwrap_or_else(|| self.output.clone()),
            }),
        }
    }
}

/// Estimate tokens from output size.
pub fn estimate_tokens(output: &str) -> usize {
    output.len() / 4
}

/// Append stderr after stdout, separated by a newline.
pub fn merge_output(stdout: &str, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        stdout.to_string()
    } else {
        format!("{}\n{}", stdout, stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(state: ExecutionState, success: bool, exit_code: i32) -> DelegationResult {
        DelegationResult {
            worker: WorkerId::new("codex"),
            worker_name: "Codex".to_string(),
            success,
            state,
            output: "out".to_string(),
            error: None,
            tokens_used: 0,
            duration: Duration::from_millis(1500),
            exit_code,
        }
    }

    #[test]
    fn test_merge_output() {
        assert_eq!(merge_output("stdout", ""), "stdout");
        assert_eq!(merge_output("stdout", "warn"), "stdout\nwarn");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ExecutionState::Idle.is_terminal());
        assert!(!ExecutionState::Streaming.is_terminal());
        assert!(ExecutionState::Completed.is_terminal());
        assert!(ExecutionState::TimedOut.is_terminal());
        assert!(ExecutionState::Failed.is_terminal());
    }

    #[test]
    fn test_check_completed() {
        assert!(result(ExecutionState::Completed, true, 0).check().is_ok());
    }

    #[test]
    fn test_check_timeout() {
        let err = result(ExecutionState::TimedOut, false, -1).check().unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout { .. }));
    }

    #[test]
    fn test_check_nonzero_exit() {
        let err = result(ExecutionState::Failed, false, 2).check().unwrap_err();
        assert!(matches!(err, ExecutionError::Failed { exit_code: 2, .. }));
    }

    #[test]
    fn test_serializes_duration_ms() {
        let json = serde_json::to_value(result(ExecutionState::Completed, true, 0)).unwrap();
        assert_eq!(json["duration_ms"], 1500);
        assert_eq!(json["state"], "completed");
        assert!(json.get("error").is_none());
    }
}
