//! Tracker backed by an HTTP usage endpoint.
//!
//! The endpoint returns the utilization of the rolling five-hour window:
//!
//! ```json
//! {"five_hour": {"utilization": 37.5, "resets_at": "2025-01-01T12:00:00Z"}}
//! ```
//!
//! Available capacity is `100 - utilization`. The bearer token is read from an
//! environment variable on every fetch; obtaining or refreshing it is left to
//! the user's tooling.

use super::{CapacitySnapshot, CapacityTracker, TrackerError, TtlCache};
use crate::worker::WorkerId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
struct UsageResponse {
    five_hour: UsageWindow,
}

#[derive(Debug, Clone, Deserialize)]
struct UsageWindow {
    utilization: f64,
    #[serde(default)]
    resets_at: Option<String>,
}

pub struct HttpTracker {
    worker: WorkerId,
    url: reqwest::Url,
    token_env: Option<String>,
    headers: HashMap<String, String>,
    client: Arc<reqwest::Client>,
    cache: TtlCache<UsageWindow>,
}

impl HttpTracker {
    pub fn new(worker: WorkerId, url: reqwest::Url, client: Arc<reqwest::Client>) -> Self {
        Self {
            worker,
            url,
            token_env: None,
            headers: HashMap::new(),
            client,
            cache: TtlCache::default(),
        }
    }

    pub fn with_token_env(mut self, token_env: Option<String>) -> Self {
        self.token_env = token_env;
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TtlCache::new(ttl);
        self
    }

    fn token(&self) -> Result<Option<String>, TrackerError> {
        match &self.token_env {
            None => Ok(None),
            Some(var) => match std::env::var(var) {
                Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
                _ => Err(TrackerError::MissingCredential(var.clone())),
            },
        }
    }

    async fn usage(&self) -> Result<UsageWindow, TrackerError> {
        if let Some(window) = self.cache.get() {
            return Ok(window);
        }

        let mut request = self.client.get(self.url.clone());
        if let Some(token) = self.token()? {
            request = request.bearer_auth(token);
        }
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
            });
        }

        let usage: UsageResponse = response
            .json()
            .await
            .map_err(|e| TrackerError::InvalidData(e.to_string()))?;
        debug!(
            worker = %self.worker,
            utilization = usage.five_hour.utilization,
            "Fetched usage"
        );

        self.cache.put(usage.five_hour.clone());
        Ok(usage.five_hour)
    }
}

impl UsageWindow {
    fn available_percent(&self) -> f64 {
        (100.0 - self.utilization).clamp(0.0, 100.0)
    }

    /// Minutes until `resets_at`; zero when the endpoint gives no reset time.
    fn remaining_minutes(&self) -> Result<u32, TrackerError> {
        let Some(resets_at) = self.resets_at.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(0);
        };
        let reset = DateTime::parse_from_rfc3339(resets_at)
            .map_err(|e| TrackerError::InvalidData(format!("resets_at '{}': {}", resets_at, e)))?;
        let remaining = reset.with_timezone(&Utc) - Utc::now();
        Ok(remaining.num_minutes().max(0) as u32)
    }
}

#[async_trait]
impl CapacityTracker for HttpTracker {
    fn worker(&self) -> &WorkerId {
        &self.worker
    }

    async fn available_percent(&self) -> Result<f64, TrackerError> {
        Ok(self.usage().await?.available_percent())
    }

    async fn remaining_minutes(&self) -> Result<u32, TrackerError> {
        self.usage().await?.remaining_minutes()
    }

    /// The endpoint reports utilization only.
    async fn current_spend(&self) -> Result<f64, TrackerError> {
        Ok(0.0)
    }

    async fn snapshot(&self) -> Result<CapacitySnapshot, TrackerError> {
        let window = self.usage().await?;
        Ok(CapacitySnapshot::new(
            window.available_percent(),
            window.remaining_minutes()?,
            0.0,
        ))
    }
}
