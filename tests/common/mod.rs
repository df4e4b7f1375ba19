//! Shared test utilities for dispatcher integration tests.
//!
//! Provides builders for cost estimates, route targets, engines and scripted
//! worker registries so that test files don't repeat the same setup.

#![allow(dead_code)]

use dispatcher::complexity::{ComplexityEstimate, ComplexityLevel};
use dispatcher::config::{TrackerConfig, WorkerConfig, WorkerKind};
use dispatcher::routing::{CostCalculator, CostEstimate, DecisionEngine, RouteTarget};
use dispatcher::tracker::{CapacitySnapshot, StaticTracker};
use dispatcher::worker::{Pricing, ScriptedWorker, Worker, WorkerId, WorkerRegistry};
use std::sync::Arc;

// =============================================================================
// Estimate Builders
// =============================================================================

/// Medium complexity with the default token budget.
pub fn medium() -> ComplexityEstimate {
    ComplexityEstimate::new(ComplexityLevel::Medium, 500, 0.6, "heuristic")
}

/// Create an available estimate with the given cost and capacity.
pub fn make_estimate(id: &str, cost: f64, available: f64) -> CostEstimate {
    CostEstimate {
        worker: WorkerId::new(id),
        worker_name: id.to_string(),
        estimated_cost: cost,
        estimated_tokens: 500,
        available_percent: available,
        current_spend: 0.0,
        will_exceed_limit: available < 10.0,
        is_available: available >= 5.0,
        confidence: 0.6,
    }
}

// =============================================================================
// Engine Builders
// =============================================================================

/// Route target backed by a static tracker.
pub fn static_target(id: &str, name: &str, price_per_1k: f64, available: f64) -> RouteTarget {
    let worker = WorkerId::new(id);
    RouteTarget::new(
        worker.clone(),
        name,
        Pricing::per_1k(price_per_1k),
        Arc::new(StaticTracker::new(
            worker,
            CapacitySnapshot::new(available, 120, 0.0),
        )),
    )
}

/// Engine over the three stock workers with the given available percentages.
pub fn stock_engine(claude: f64, codex: f64, opencode: f64) -> DecisionEngine {
    DecisionEngine::new(CostCalculator::new(vec![
        static_target("claude-code", "Claude Code", 0.03, claude).with_aliases(vec!["claude".into()]),
        static_target("codex", "Codex", 0.0, codex),
        static_target("opencode", "OpenCode", 0.0, opencode),
    ]))
}

// =============================================================================
// Worker Builders
// =============================================================================

/// Registry over scripted workers, keeping their order.
///
/// Callers keep their own `Arc` clones to inspect calls afterwards.
pub fn registry_of(workers: Vec<Arc<ScriptedWorker>>) -> WorkerRegistry {
    let mut registry = WorkerRegistry::new();
    for worker in workers {
        let worker: Arc<dyn Worker> = worker;
        registry.register(worker, &[]);
    }
    registry
}

/// Scripted worker answering with a fixed text.
pub fn fixed(id: &str, name: &str, text: &str) -> Arc<ScriptedWorker> {
    Arc::new(ScriptedWorker::fixed(id, name, text))
}

/// Generic worker config running `sh -c <script> <prompt>`.
///
/// Inside the script the prompt is `$0`.
pub fn sh_worker(id: &str, script: &str) -> WorkerConfig {
    let mut config = WorkerConfig::new(id, WorkerKind::Generic);
    config.command = Some("sh".to_string());
    config.exec_args = vec!["-c".to_string(), script.to_string(), "{prompt}".to_string()];
    config.tracker = TrackerConfig::Static {
        available_percent: 100.0,
        remaining_minutes: 60,
        current_spend: 0.0,
    };
    config
}
