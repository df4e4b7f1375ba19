//! Usage and quota tracking per worker.
//!
//! The router only consumes the [`CapacityTracker`] trait and treats every
//! call as potentially slow and fallible. Any caching is owned by the tracker
//! instance itself through an explicit [`TtlCache`].

pub mod cache;
pub mod command;
pub mod error;
pub mod fixed;
pub mod http;

pub use cache::TtlCache;
pub use command::CommandTracker;
pub use error::TrackerError;
pub use fixed::StaticTracker;
pub use http::HttpTracker;

use crate::config::TrackerConfig;
use crate::worker::WorkerId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Minimum available percentage for a worker to be considered available.
pub const AVAILABILITY_THRESHOLD: f64 = 5.0;

/// Point-in-time read of a worker's remaining quota.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    /// Remaining capacity in `[0, 100]`
    pub available_percent: f64,
    /// Minutes until the usage window resets
    pub remaining_minutes: u32,
    /// Spend accumulated in the current window, USD
    pub current_spend: f64,
    pub is_available: bool,
}

impl CapacitySnapshot {
    /// Build a snapshot, clamping the percentage and deriving availability.
    pub fn new(available_percent: f64, remaining_minutes: u32, current_spend: f64) -> Self {
        let available_percent = available_percent.clamp(0.0, 100.0);
        Self {
            available_percent,
            remaining_minutes,
            current_spend: current_spend.max(0.0),
            is_available: available_percent >= AVAILABILITY_THRESHOLD,
        }
    }
}

/// Source of usage data for one worker.
#[async_trait]
pub trait CapacityTracker: Send + Sync + 'static {
    /// Worker this tracker reports on.
    fn worker(&self) -> &WorkerId;

    /// Remaining capacity in the current window, `[0, 100]`.
    async fn available_percent(&self) -> Result<f64, TrackerError>;

    /// Minutes until the current window resets.
    async fn remaining_minutes(&self) -> Result<u32, TrackerError>;

    /// Spend accumulated in the current window.
    async fn current_spend(&self) -> Result<f64, TrackerError>;

    async fn is_available(&self) -> Result<bool, TrackerError> {
        Ok(self.available_percent().await? >= AVAILABILITY_THRESHOLD)
    }

    /// Read every figure once. Fails if any single read fails.
    ///
    /// Trackers whose figures come from one fetch override this so a
    /// snapshot costs a single request.
    async fn snapshot(&self) -> Result<CapacitySnapshot, TrackerError> {
        let available = self.available_percent().await?;
        let remaining = self.remaining_minutes().await?;
        let spend = self.current_spend().await?;
        Ok(CapacitySnapshot::new(available, remaining, spend))
    }
}

/// Build the tracker described by a worker's configuration.
pub fn create_tracker(
    worker: &WorkerId,
    config: &TrackerConfig,
    client: Arc<reqwest::Client>,
) -> Result<Arc<dyn CapacityTracker>, TrackerError> {
    let tracker: Arc<dyn CapacityTracker> = match config {
        TrackerConfig::Static {
            available_percent,
            remaining_minutes,
            current_spend,
        } => Arc::new(StaticTracker::new(
            worker.clone(),
            CapacitySnapshot::new(*available_percent, *remaining_minutes, *current_spend),
        )),
        TrackerConfig::Command {
            command,
            args,
            timeout_secs,
            cache_ttl_secs,
        } => Arc::new(
            CommandTracker::new(worker.clone(), command.clone(), args.clone())
                .with_timeout(Duration::from_secs(*timeout_secs))
                .with_cache_ttl(Duration::from_secs(*cache_ttl_secs)),
        ),
        TrackerConfig::Http {
            url,
            token_env,
            headers,
            cache_ttl_secs,
        } => {
            let url = reqwest::Url::parse(url)
                .map_err(|e| TrackerError::InvalidData(format!("tracker url '{}': {}", url, e)))?;
            Arc::new(
                HttpTracker::new(worker.clone(), url, client)
                    .with_token_env(token_env.clone())
                    .with_headers(headers.clone())
                    .with_cache_ttl(Duration::from_secs(*cache_ttl_secs)),
            )
        }
    };
    Ok(tracker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_threshold() {
        assert!(CapacitySnapshot::new(5.0, 0, 0.0).is_available);
        assert!(!CapacitySnapshot::new(4.99, 0, 0.0).is_available);
    }

    #[test]
    fn test_snapshot_clamps() {
        let snap = CapacitySnapshot::new(140.0, 10, -1.0);
        assert_eq!(snap.available_percent, 100.0);
        assert_eq!(snap.current_spend, 0.0);
        assert_eq!(CapacitySnapshot::new(-3.0, 0, 0.0).available_percent, 0.0);
    }

    #[tokio::test]
    async fn test_create_static_tracker() {
        let config = TrackerConfig::Static {
            available_percent: 42.0,
            remaining_minutes: 30,
            current_spend: 1.5,
        };
        let tracker =
            create_tracker(&WorkerId::new("codex"), &config, Arc::new(reqwest::Client::new()))
                .unwrap();
        let snap = tracker.snapshot().await.unwrap();
        assert_eq!(snap.available_percent, 42.0);
        assert_eq!(snap.remaining_minutes, 30);
        assert!(tracker.is_available().await.unwrap());
    }

    #[test]
    fn test_create_http_tracker_rejects_bad_url() {
        let config = TrackerConfig::Http {
            url: "not a url".to_string(),
            token_env: None,
            headers: Default::default(),
            cache_ttl_secs: 5,
        };
        let result =
            create_tracker(&WorkerId::new("claude-code"), &config, Arc::new(reqwest::Client::new()));
        assert!(matches!(result, Err(TrackerError::InvalidData(_))));
    }
}
