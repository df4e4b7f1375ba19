//! Council configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for council mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilConfig {
    /// Shared deadline for one broadcast or single query
    pub timeout_secs: u64,
    /// Recent messages included in discussion prompts
    pub history_messages: usize,
    /// Per-message character cap in discussion prompts
    pub history_chars: usize,
    /// Recent messages included in plan prompts
    pub plan_history_messages: usize,
    /// Per-message character cap in plan prompts
    pub plan_history_chars: usize,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            history_messages: 3,
            history_chars: 150,
            plan_history_messages: 5,
            plan_history_chars: 200,
        }
    }
}

impl CouncilConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
