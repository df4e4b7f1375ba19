//! CLI Integration Tests
//!
//! End-to-end tests for CLI commands using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Config with two generic `sh` workers: a paid one and a nearly exhausted free one.
const TEST_CONFIG: &str = r#"
[execution]
timeout_secs = 10
idle_indicator = false

[[workers]]
id = "echoer"
kind = "generic"
name = "Echoer"
command = "sh"
price_per_1k = 0.02
exec_args = ["-c", "printf 'echoer did: %s\n' \"$0\"", "{prompt}"]
tracker = { type = "static", available_percent = 80.0, remaining_minutes = 150 }

[[workers]]
id = "freebie"
kind = "generic"
name = "Freebie"
aliases = ["free"]
command = "sh"
exec_args = ["-c", "echo 'freebie is broken' >&2; exit 4", "{prompt}"]
tracker = { type = "static", available_percent = 3.0, remaining_minutes = 20 }
"#;

/// Get the dispatcher binary for testing, isolated from the caller's environment
fn dispatcher_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dispatcher").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DISPATCHER_CONFIG")
        .env_remove("DISPATCHER_LOG_LEVEL")
        .env_remove("DISPATCHER_TIMEOUT_SECS")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("test.toml");
    std::fs::write(&path, TEST_CONFIG).unwrap();
    path
}

#[test]
fn test_version_output() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dispatcher"));
}

#[test]
fn test_help_shows_all_commands() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("council"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_exec_help() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .args(["exec", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .args(["config", "init"])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("dispatcher.toml")).unwrap();
    assert!(content.contains("[[workers]]"));
}

#[test]
fn test_config_init_no_overwrite() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("dispatcher.toml");
    std::fs::write(&config_path, "existing content").unwrap();

    dispatcher_cmd(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exists"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .args(["status", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = dispatcher_cmd(&dir)
        .args(["status", "--json", "-c", config.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let workers = parsed["workers"].as_array().unwrap();
    assert_eq!(workers.len(), 2);
    assert_eq!(workers[0]["worker"], "echoer");
    assert_eq!(workers[0]["status"], "available");
    assert_eq!(workers[1]["status"], "limited");
}

#[test]
fn test_status_table() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    dispatcher_cmd(&dir)
        .args(["status", "-c", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Echoer"))
        .stdout(predicate::str::contains("2h 30m"))
        .stdout(predicate::str::contains("Limited"));
}

#[test]
fn test_exec_dry_run_json() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = dispatcher_cmd(&dir)
        .args([
            "exec",
            "fix typo in readme",
            "--dry-run",
            "--json",
            "-c",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["dry_run"], true);
    assert_eq!(parsed["complexity"]["level"], "simple");
    assert_eq!(parsed["decision"]["selected"], "echoer");
    assert!(parsed.get("execution").is_none());
}

#[test]
fn test_exec_empty_task_rejected() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .args(["exec", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task cannot be empty"));
}

#[test]
fn test_exec_unknown_forced_worker() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    dispatcher_cmd(&dir)
        .args([
            "exec",
            "fix typo",
            "--force",
            "gemini",
            "--dry-run",
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown worker 'gemini'"));
}

#[cfg(unix)]
#[test]
fn test_exec_runs_selected_worker() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    dispatcher_cmd(&dir)
        .args(["exec", "add a health check", "-c", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("echoer did: add a health check"))
        .stdout(predicate::str::contains("Task completed successfully"));
}

#[cfg(unix)]
#[test]
fn test_exec_forced_failing_worker_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);

    let output = dispatcher_cmd(&dir)
        .args([
            "exec",
            "add a health check",
            "--force",
            "free",
            "--json",
            "-c",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["decision"]["was_forced"], true);
    assert_eq!(parsed["execution"]["exit_code"], 4);
    assert_eq!(parsed["execution"]["success"], false);
    assert!(parsed["execution"]["error"]
        .as_str()
        .unwrap()
        .contains("freebie is broken"));
}

#[test]
fn test_council_mock_session() {
    let dir = TempDir::new().unwrap();

    dispatcher_cmd(&dir)
        .args(["council", "--mock"])
        .write_stdin("how should we structure auth?\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("MOCK"))
        .stdout(predicate::str::contains("[mock]"))
        .stdout(predicate::str::contains("Leaving council mode"));
}

#[test]
fn test_council_mock_plan_names_discussed_file() {
    let dir = TempDir::new().unwrap();

    dispatcher_cmd(&dir)
        .args(["council", "--mock"])
        .write_stdin("refactor src/main.rs\nplan\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan from"))
        .stdout(predicate::str::contains("[modify] src/main.rs"));
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    dispatcher_cmd(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}
