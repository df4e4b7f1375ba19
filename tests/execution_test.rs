//! Integration tests for worker execution through real child processes.
//!
//! Workers are stood in for by `sh` scripts that print the envelopes the real
//! CLIs emit.

#![cfg(unix)]

mod common;

use common::sh_worker;
use dispatcher::config::{WorkerConfig, WorkerKind};
use dispatcher::delegate::{
    Delegator, ExecutionError, ExecutionState, IndicatorConfig, OutputSink, ERASE_GLYPH,
    SPINNER_FRAMES,
};
use dispatcher::stream::StreamFormat;
use dispatcher::worker::{create_worker, WorkerId, WorkerSettings};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sink that keeps everything written to it.
#[derive(Default)]
struct CaptureSink {
    buf: Mutex<String>,
}

impl CaptureSink {
    fn text(&self) -> String {
        self.buf.lock().unwrap().clone()
    }
}

impl OutputSink for CaptureSink {
    fn write(&self, text: &str) {
        self.buf.lock().unwrap().push_str(text);
    }
}

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn test_claude_stream_rendered_line_by_line() {
    let sink = Arc::new(CaptureSink::default());
    let script = r#"printf '%s\n' \
        '{"type":"system","subtype":"init"}' \
        '{"type":"stream_event","event":{"type":"content_block_delta","delta":{"type":"text_delta","text":"Fixed the "}}}' \
        '{"type":"stream_event","event":{"type":"content_block_delta","delta":{"type":"text_delta","text":"bug.\nAdded a test."}}}' \
        '{"type":"assistant","message":{"content":[{"type":"text","text":"Fixed the bug.\nAdded a test."}]}}' \
        '{"type":"result","result":"Fixed the bug.\nAdded a test."}'"#;

    let result = Delegator::new(WorkerId::new("claude-code"), "Claude Code", "sh")
        .with_format(StreamFormat::Claude)
        .with_sink(sink.clone())
        .with_indicator(IndicatorConfig::disabled())
        .execute(&sh(script))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.output, "Fixed the bug.\nAdded a test.");
    assert_eq!(sink.text(), "Fixed the bug.\nAdded a test.\n");
}

#[tokio::test]
async fn test_idle_indicator_drawn_and_erased() {
    let sink = Arc::new(CaptureSink::default());
    let indicator = IndicatorConfig {
        enabled: true,
        tick: Duration::from_millis(20),
        idle_after: Duration::from_millis(50),
    };

    let result = Delegator::new(WorkerId::new("stub"), "Stub", "sh")
        .with_sink(sink.clone())
        .with_indicator(indicator)
        .execute(&sh("echo first; sleep 0.5; echo second"))
        .await
        .unwrap();

    assert!(result.success);
    let text = sink.text();
    assert!(text.starts_with("first\n"));
    assert!(text.contains(SPINNER_FRAMES[0]));
    assert!(text.contains(&format!("{}second\n", ERASE_GLYPH)));
    assert_eq!(result.output, "first\nsecond\n");
}

#[tokio::test]
async fn test_generic_worker_from_config() {
    let config = sh_worker("scripted", "printf 'done: %s\\n' \"$0\"");
    let sink = Arc::new(CaptureSink::default());
    let settings = WorkerSettings {
        timeout: Duration::from_secs(10),
        sink: sink.clone(),
        indicator: IndicatorConfig::disabled(),
    };

    let worker = create_worker(&config, &settings);
    let result = worker.execute("add tests").await.unwrap();

    assert!(result.success);
    assert_eq!(result.worker.as_str(), "scripted");
    assert_eq!(sink.text(), "done: add tests\n");
    assert!(result.tokens_used > 0);

    assert_eq!(worker.query("hello").await.unwrap(), "done: hello");
}

#[tokio::test]
async fn test_worker_timeout_reported() {
    let config = sh_worker("slow", "exec sleep 30");
    let settings = WorkerSettings {
        timeout: Duration::from_millis(200),
        sink: Arc::new(CaptureSink::default()),
        indicator: IndicatorConfig::disabled(),
    };
    let worker = create_worker(&config, &settings);

    let started = Instant::now();
    let result = worker.execute("anything").await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.state, ExecutionState::TimedOut);

    assert!(matches!(
        worker.query("anything").await,
        Err(ExecutionError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_failed_query_is_an_error() {
    let config = sh_worker("broken", "echo 'quota exceeded' >&2; exit 2");
    let settings = WorkerSettings::default().with_sink(Arc::new(CaptureSink::default()));
    let worker = create_worker(&config, &settings);

    match worker.query("hi").await {
        Err(ExecutionError::Failed {
            exit_code, message, ..
        }) => {
            assert_eq!(exit_code, 2);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_missing_binary_reports_install_hint() {
    let mut config = WorkerConfig::new("codex", WorkerKind::Codex);
    config.command = Some("codex-binary-that-does-not-exist".to_string());
    let worker = create_worker(&config, &WorkerSettings::default());

    let err = worker.execute("task").await.unwrap_err();
    assert!(matches!(err, ExecutionError::WorkerNotInstalled { .. }));
    assert!(err.to_string().contains("npm"));
}
