//! Worker process execution.
//!
//! A [`Delegator`] spawns one worker command, applies a deadline and turns the
//! process outcome into a [`DelegationResult`]. Streaming mode decodes stdout
//! through the worker's [`StreamFormat`] and renders lines live next to the
//! [`IdleIndicator`]; simple mode only collects the raw text.

pub mod error;
pub mod indicator;
pub mod result;

pub use error::ExecutionError;
pub use indicator::{
    Activity, IdleIndicator, IndicatorConfig, LineWriter, NullSink, OutputSink, StderrSink,
    StdoutSink, ERASE_GLYPH, SPINNER_FRAMES,
};
pub use result::{estimate_tokens, merge_output, DelegationResult, ExecutionState};

use crate::stream::{self, StreamFormat, StreamReadError};
use crate::worker::WorkerId;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Deadline applied when the caller does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How long to wait for stderr to drain once the process is gone.
const STDERR_GRACE: Duration = Duration::from_secs(1);

/// Runs a worker command under a deadline.
#[derive(Clone)]
pub struct Delegator {
    worker: WorkerId,
    worker_name: String,
    command: String,
    install_hint: String,
    timeout: Duration,
    format: StreamFormat,
    sink: Arc<dyn OutputSink>,
    indicator: IndicatorConfig,
}

impl Delegator {
    pub fn new(worker: WorkerId, worker_name: impl Into<String>, command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            install_hint: format!("Make sure '{}' is installed and on your PATH.", command),
            worker,
            worker_name: worker_name.into(),
            command,
            timeout: DEFAULT_TIMEOUT,
            format: StreamFormat::Plain,
            sink: Arc::new(StdoutSink),
            indicator: IndicatorConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_format(mut self, format: StreamFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_indicator(mut self, indicator: IndicatorConfig) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn with_install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = hint.into();
        self
    }

    pub fn worker(&self) -> &WorkerId {
        &self.worker
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Run with live rendering and the idle indicator.
    pub async fn execute(&self, args: &[String]) -> Result<DelegationResult, ExecutionError> {
        self.run(args, true).await
    }

    /// Run without rendering. Same deadline and error semantics.
    pub async fn execute_simple(&self, args: &[String]) -> Result<DelegationResult, ExecutionError> {
        self.run(args, false).await
    }

    fn spawn(&self, args: &[String]) -> Result<Child, ExecutionError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecutionError::WorkerNotInstalled {
                    worker: self.worker.to_string(),
                    command: self.command.clone(),
                    hint: self.install_hint.clone(),
                }
            } else {
                ExecutionError::Spawn {
                    worker: self.worker.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    /// Move to `to`. A terminal state is final and is kept.
    fn advance(&self, from: ExecutionState, to: ExecutionState) -> ExecutionState {
        if from.is_terminal() {
            warn!(worker = %self.worker, from = ?from, to = ?to, "Ignoring change out of a final state");
            return from;
        }
        debug!(worker = %self.worker, from = ?from, to = ?to, "Execution state changed");
        to
    }

    async fn run(&self, args: &[String], streaming: bool) -> Result<DelegationResult, ExecutionError> {
        let start = Instant::now();
        let state = ExecutionState::Idle;

        let mut child = self.spawn(args)?;
        let state = self.advance(state, ExecutionState::Started);

        let pipe_missing = |name: &str| ExecutionError::Spawn {
            worker: self.worker.to_string(),
            message: format!("{} was not captured", name),
        };
        let stdout = child.stdout.take().ok_or_else(|| pipe_missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe_missing("stderr"))?;
        let mut stderr_task = tokio::spawn(drain(stderr));

        let activity = Arc::new(Activity::new());
        let indicator = (streaming && self.indicator.enabled)
            .then(|| IdleIndicator::spawn(self.sink.clone(), activity.clone(), self.indicator));
        let writer = LineWriter::new(self.sink.clone(), activity);

        let state = self.advance(state, ExecutionState::Streaming);
        let mut transcript = String::new();
        let mut raw = Vec::new();

        let outcome = {
            let mut reader = BufReader::new(stdout);
            let mut parser = self.format.parser();
            let mut on_line = |line: &str| {
                transcript.push_str(line);
                transcript.push('\n');
                writer.write_line(line);
            };

            let work = async {
                let parsed = if streaming {
                    stream::parse(&mut reader, parser.as_mut(), &mut on_line).await
                } else {
                    match reader.read_to_end(&mut raw).await {
                        Ok(_) => Ok(String::from_utf8_lossy(&raw).into_owned()),
                        Err(source) => Err(StreamReadError {
                            partial: String::from_utf8_lossy(&raw).into_owned(),
                            source,
                        }),
                    }
                };
                let status = child.wait().await;
                (parsed, status)
            };

            tokio::time::timeout(self.timeout, work).await
        };

        let (stdout_text, exit_code, mut error, final_state) = match outcome {
            Ok((parsed, status)) => {
                let (text, stream_error) = match parsed {
                    Ok(text) => (text, None),
                    Err(e) => {
                        warn!(worker = %self.worker, error = %e, "Worker output stream failed");
                        let message = e.to_string();
                        (e.partial, Some(message))
                    }
                };
                match status {
                    Ok(status) => {
                        let code = status.code().unwrap_or(-1);
                        if let Some(message) = stream_error {
                            (text, code, Some(message), ExecutionState::Failed)
                        } else if status.success() {
                            (text, code, None, ExecutionState::Completed)
                        } else {
                            (
                                text,
                                code,
                                Some(format!("process exited with {}", status)),
                                ExecutionState::Failed,
                            )
                        }
                    }
                    Err(e) => (
                        text,
                        -1,
                        Some(format!("failed to wait for process: {}", e)),
                        ExecutionState::Failed,
                    ),
                }
            }
            Err(_) => {
                warn!(
                    worker = %self.worker,
                    timeout = ?self.timeout,
                    "Execution deadline elapsed, killing worker"
                );
                let _ = child.start_kill();
                let _ = child.wait().await;
                let partial = if streaming {
                    transcript
                } else {
                    String::from_utf8_lossy(&raw).into_owned()
                };
                (
                    partial,
                    -1,
                    Some(format!("execution timed out after {:?}", self.timeout)),
                    ExecutionState::TimedOut,
                )
            }
        };

        if let Some(indicator) = indicator {
            indicator.stop().await;
        }

        let stderr_text = match tokio::time::timeout(STDERR_GRACE, &mut stderr_task).await {
            Ok(Ok(text)) => text,
            _ => {
                stderr_task.abort();
                String::new()
            }
        };

        if final_state == ExecutionState::Failed && exit_code > 0 {
            let detail = stderr_text.trim();
            if let (Some(message), false) = (error.as_mut(), detail.is_empty()) {
                message.push_str(": ");
                message.push_str(detail);
            }
        }

        let state = self.advance(state, final_state);
        let output = merge_output(&stdout_text, &stderr_text);
        let duration = start.elapsed();

        debug!(
            worker = %self.worker,
            exit_code,
            duration_ms = duration.as_millis() as u64,
            output_bytes = output.len(),
            "Execution finished"
        );

        Ok(DelegationResult {
            worker: self.worker.clone(),
            worker_name: self.worker_name.clone(),
            success: state == ExecutionState::Completed && exit_code == 0,
            state,
            tokens_used: estimate_tokens(&output),
            output,
            error,
            duration,
            exit_code,
        })
    }
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}
