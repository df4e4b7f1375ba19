//! Tracker that runs a local command printing usage JSON.
//!
//! The command must print a single object on stdout:
//!
//! ```json
//! {"available_percent": 80.0, "remaining_minutes": 120, "current_spend": 0.42}
//! ```
//!
//! `remaining_minutes` and `current_spend` are optional and default to zero.

use super::{CapacitySnapshot, CapacityTracker, TrackerError, TtlCache};
use crate::worker::WorkerId;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
struct UsageReport {
    available_percent: f64,
    #[serde(default)]
    remaining_minutes: u32,
    #[serde(default)]
    current_spend: f64,
}

pub struct CommandTracker {
    worker: WorkerId,
    command: String,
    args: Vec<String>,
    timeout: Duration,
    cache: TtlCache<UsageReport>,
}

impl CommandTracker {
    pub fn new(worker: WorkerId, command: String, args: Vec<String>) -> Self {
        Self {
            worker,
            command,
            args,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            cache: TtlCache::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TtlCache::new(ttl);
        self
    }

    async fn report(&self) -> Result<UsageReport, TrackerError> {
        if let Some(report) = self.cache.get() {
            return Ok(report);
        }

        let child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TrackerError::Command(format!("{}: {}", self.command, e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                TrackerError::Command(format!(
                    "{} timed out after {}s",
                    self.command,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| TrackerError::Command(e.to_string()))?;

        if !output.status.success() {
            return Err(TrackerError::Command(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let report: UsageReport = serde_json::from_slice(&output.stdout)
            .map_err(|e| TrackerError::InvalidData(e.to_string()))?;
        self.cache.put(report.clone());
        Ok(report)
    }
}

#[async_trait]
impl CapacityTracker for CommandTracker {
    fn worker(&self) -> &WorkerId {
        &self.worker
    }

    async fn available_percent(&self) -> Result<f64, TrackerError> {
        Ok(self.report().await?.available_percent.clamp(0.0, 100.0))
    }

    async fn remaining_minutes(&self) -> Result<u32, TrackerError> {
        Ok(self.report().await?.remaining_minutes)
    }

    async fn current_spend(&self) -> Result<f64, TrackerError> {
        Ok(self.report().await?.current_spend)
    }

    async fn snapshot(&self) -> Result<CapacitySnapshot, TrackerError> {
        let report = self.report().await?;
        Ok(CapacitySnapshot::new(
            report.available_percent,
            report.remaining_minutes,
            report.current_spend,
        ))
    }
}
