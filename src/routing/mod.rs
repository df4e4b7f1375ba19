//! Worker selection.
//!
//! The [`CostCalculator`] turns tracker snapshots into [`CostEstimate`]s and
//! [`decide`] picks one worker from them with a deterministic total order.
//! [`DecisionEngine`] ties both together and resolves `--force` names.
//!
//! # Example
//!
//! ```rust
//! use dispatcher::complexity::{ComplexityEstimate, ComplexityLevel};
//! use dispatcher::routing::{decide, CostEstimate};
//! use dispatcher::worker::WorkerId;
//!
//! let estimate = |id: &str, cost: f64| CostEstimate {
//!     worker: WorkerId::new(id),
//!     worker_name: id.to_string(),
//!     estimated_cost: cost,
//!     estimated_tokens: 500,
//!     available_percent: 80.0,
//!     current_spend: 0.0,
//!     will_exceed_limit: false,
//!     is_available: true,
//!     confidence: 0.6,
//! };
//! let complexity = ComplexityEstimate::new(ComplexityLevel::Medium, 500, 0.6, "heuristic");
//!
//! let decision = decide(&[estimate("paid", 0.015), estimate("free", 0.0)], &complexity, None).unwrap();
//! assert_eq!(decision.selected.as_str(), "free");
//! ```

pub mod cost;
pub mod decision;
pub mod error;
pub mod ordering;
pub mod status;

pub use cost::{estimate_cost, filter_available, CostCalculator, CostEstimate, RouteTarget};
pub use decision::{decide, format_cost, RoutingDecision};
pub use error::RoutingError;
pub use ordering::{compare_estimates, rank};
pub use status::{StatusLevel, WorkerStatus};

use crate::complexity::ComplexityEstimate;
use crate::worker::WorkerId;
use futures::future::join_all;
use tracing::{debug, info};

/// Chooses a worker for a task.
pub struct DecisionEngine {
    calculator: CostCalculator,
}

impl DecisionEngine {
    pub fn new(calculator: CostCalculator) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &CostCalculator {
        &self.calculator
    }

    /// Resolve a user-supplied worker name (id, display name or alias).
    pub fn resolve(&self, name: &str) -> Result<WorkerId, RoutingError> {
        self.calculator
            .targets()
            .iter()
            .find(|t| t.answers_to(name))
            .map(|t| t.worker.clone())
            .ok_or_else(|| RoutingError::InvalidWorker {
                name: name.to_string(),
                known: self
                    .calculator
                    .targets()
                    .iter()
                    .map(|t| t.worker.to_string())
                    .collect(),
            })
    }

    /// Read every tracker, then decide.
    pub async fn make_decision(
        &self,
        complexity: &ComplexityEstimate,
        forced: Option<&str>,
    ) -> Result<RoutingDecision, RoutingError> {
        let forced = forced.map(|name| self.resolve(name)).transpose()?;
        let estimates = self.calculator.calculate(complexity).await?;
        debug!(estimates = estimates.len(), "Collected cost estimates");

        let decision = decide(&estimates, complexity, forced.as_ref())?;
        info!(
            worker = %decision.selected,
            forced = decision.was_forced,
            alternatives = decision.alternatives.len(),
            "Routing decision made"
        );
        Ok(decision)
    }

    /// Capacity status of every configured worker, in configuration order.
    pub async fn worker_status(&self) -> Vec<WorkerStatus> {
        let reads = self
            .calculator
            .targets()
            .iter()
            .map(|target| async move { (target, target.tracker.snapshot().await) });

        join_all(reads)
            .await
            .into_iter()
            .map(|(target, result)| match result {
                Ok(snapshot) => {
                    WorkerStatus::from_snapshot(target.worker.clone(), target.name.clone(), &snapshot)
                }
                Err(e) => WorkerStatus::failed(target.worker.clone(), target.name.clone(), e.to_string()),
            })
            .collect()
    }
}
