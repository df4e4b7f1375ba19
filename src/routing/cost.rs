//! Cost model and per-decision cost estimates.

use super::RoutingError;
use crate::complexity::ComplexityEstimate;
use crate::tracker::{CapacitySnapshot, CapacityTracker};
use crate::worker::{Pricing, WorkerId};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Below this available percentage a worker is treated as about to hit its
/// limit even when it is still nominally available.
pub const EXCEED_LIMIT_PERCENT: f64 = 10.0;

/// Projected cost of spending `tokens` on a worker with `pricing`.
pub fn estimate_cost(pricing: Pricing, tokens: u32) -> f64 {
    f64::from(tokens) * pricing.price_per_1k / 1000.0
}

/// One worker's projected cost and capacity for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub worker: WorkerId,
    pub worker_name: String,
    pub estimated_cost: f64,
    pub estimated_tokens: u32,
    pub available_percent: f64,
    pub current_spend: f64,
    pub will_exceed_limit: bool,
    pub is_available: bool,
    pub confidence: f64,
}

impl CostEstimate {
    pub fn new(
        worker: WorkerId,
        worker_name: impl Into<String>,
        pricing: Pricing,
        complexity: &ComplexityEstimate,
        snapshot: &CapacitySnapshot,
    ) -> Self {
        Self {
            worker,
            worker_name: worker_name.into(),
            estimated_cost: estimate_cost(pricing, complexity.tokens),
            estimated_tokens: complexity.tokens,
            available_percent: snapshot.available_percent,
            current_spend: snapshot.current_spend,
            will_exceed_limit: !snapshot.is_available
                || snapshot.available_percent < EXCEED_LIMIT_PERCENT,
            is_available: snapshot.is_available,
            confidence: complexity.confidence,
        }
    }

    pub fn is_free(&self) -> bool {
        self.estimated_cost == 0.0
    }
}

/// A routable worker as the calculator sees it.
#[derive(Clone)]
pub struct RouteTarget {
    pub worker: WorkerId,
    pub name: String,
    /// Extra names accepted by `--force`
    pub aliases: Vec<String>,
    pub pricing: Pricing,
    pub tracker: Arc<dyn CapacityTracker>,
}

impl RouteTarget {
    pub fn new(
        worker: WorkerId,
        name: impl Into<String>,
        pricing: Pricing,
        tracker: Arc<dyn CapacityTracker>,
    ) -> Self {
        Self {
            worker,
            name: name.into(),
            aliases: Vec::new(),
            pricing,
            tracker,
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// True if `name` is this target's id, display name or an alias.
    pub fn answers_to(&self, name: &str) -> bool {
        let wanted = WorkerId::new(name);
        wanted == self.worker
            || WorkerId::new(&self.name) == wanted
            || self.aliases.iter().any(|a| WorkerId::new(a) == wanted)
    }
}

/// Combines the cost model with live tracker snapshots.
pub struct CostCalculator {
    targets: Vec<RouteTarget>,
}

impl CostCalculator {
    pub fn new(targets: Vec<RouteTarget>) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &[RouteTarget] {
        &self.targets
    }

    /// Produce one estimate per worker whose tracker answers.
    ///
    /// Trackers are read concurrently. A failing tracker drops its worker
    /// from this decision; the call only fails when no worker is left.
    pub async fn calculate(
        &self,
        complexity: &ComplexityEstimate,
    ) -> Result<Vec<CostEstimate>, RoutingError> {
        let reads = self
            .targets
            .iter()
            .map(|target| async move { (target, target.tracker.snapshot().await) });

        let mut estimates = Vec::with_capacity(self.targets.len());
        for (target, result) in join_all(reads).await {
            match result {
                Ok(snapshot) => estimates.push(CostEstimate::new(
                    target.worker.clone(),
                    target.name.clone(),
                    target.pricing,
                    complexity,
                    &snapshot,
                )),
                Err(e) => {
                    debug!(worker = %target.worker, error = %e, "Tracker read failed, worker excluded");
                }
            }
        }

        if estimates.is_empty() {
            return Err(RoutingError::NoEstimates);
        }
        Ok(estimates)
    }
}

/// Keep only estimates that are available and not about to hit a limit.
///
/// `will_exceed_limit` already implies `!is_available`, but the two flags
/// come from different places and both are checked.
pub fn filter_available(estimates: &[CostEstimate]) -> Vec<CostEstimate> {
    estimates
        .iter()
        .filter(|e| e.is_available && !e.will_exceed_limit)
        .cloned()
        .collect()
}
