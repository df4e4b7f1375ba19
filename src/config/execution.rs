//! Execution configuration

use crate::delegate::IndicatorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for running worker processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Deadline for a single execution
    pub timeout_secs: u64,
    /// Show the idle spinner while a worker is silent
    pub idle_indicator: bool,
    /// Silence before the spinner appears
    pub idle_after_ms: u64,
    /// Spinner animation tick
    pub spinner_tick_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            idle_indicator: true,
            idle_after_ms: 2000,
            spinner_tick_ms: 300,
        }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn indicator(&self) -> IndicatorConfig {
        IndicatorConfig {
            enabled: self.idle_indicator,
            tick: Duration::from_millis(self.spinner_tick_ms),
            idle_after: Duration::from_millis(self.idle_after_ms),
        }
    }
}
