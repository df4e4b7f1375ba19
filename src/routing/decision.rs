//! Routing decisions and their human-readable justification.

use super::ordering::rank;
use super::{filter_available, CostEstimate, RoutingError};
use crate::complexity::ComplexityEstimate;
use crate::worker::WorkerId;
use serde::Serialize;

/// Number of alternatives named in the reason text.
const REASON_ALTERNATIVES: usize = 2;

/// Outcome of one routing decision.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub selected: WorkerId,
    pub selected_name: String,
    /// Advisory text. Wording is not part of any contract.
    pub reason: String,
    /// Remaining candidates, best first. Never contains `selected`.
    pub alternatives: Vec<CostEstimate>,
    pub selected_cost: CostEstimate,
    pub complexity: ComplexityEstimate,
    pub was_forced: bool,
}

/// Format a USD amount with three decimals.
pub fn format_cost(cost: f64) -> String {
    format!("${:.3}", cost)
}

/// Choose a worker from already collected estimates.
///
/// Without `forced`, unavailable and near-limit workers are filtered out and
/// the best ranked remaining worker wins. With `forced`, that worker is
/// looked up among all estimates and selected regardless of its capacity;
/// the reason text then carries explicit warnings.
pub fn decide(
    estimates: &[CostEstimate],
    complexity: &ComplexityEstimate,
    forced: Option<&WorkerId>,
) -> Result<RoutingDecision, RoutingError> {
    if let Some(worker) = forced {
        return decide_forced(estimates, complexity, worker);
    }

    let mut ranked = rank(&filter_available(estimates));
    if ranked.is_empty() {
        return Err(RoutingError::NoWorkersAvailable);
    }

    let selected = ranked.remove(0);
    let reason = selection_reason(&selected, complexity, &ranked);

    Ok(RoutingDecision {
        selected: selected.worker.clone(),
        selected_name: selected.worker_name.clone(),
        reason,
        alternatives: ranked,
        selected_cost: selected,
        complexity: complexity.clone(),
        was_forced: false,
    })
}

fn decide_forced(
    estimates: &[CostEstimate],
    complexity: &ComplexityEstimate,
    worker: &WorkerId,
) -> Result<RoutingDecision, RoutingError> {
    let selected = estimates
        .iter()
        .find(|e| &e.worker == worker)
        .cloned()
        .ok_or_else(|| RoutingError::ForcedWorkerNotFound {
            worker: worker.to_string(),
        })?;

    let others: Vec<CostEstimate> = estimates
        .iter()
        .filter(|e| &e.worker != worker)
        .cloned()
        .collect();

    let mut reason = format!("Using {} (forced by --force flag)", selected.worker_name);
    if !selected.is_available {
        reason.push_str(&format!(
            " - WARNING: Worker has low availability ({:.1}%)",
            selected.available_percent
        ));
    }
    if selected.will_exceed_limit {
        reason.push_str(" - WARNING: This may exceed usage limits");
    }

    Ok(RoutingDecision {
        selected: selected.worker.clone(),
        selected_name: selected.worker_name.clone(),
        reason,
        alternatives: rank(&others),
        selected_cost: selected,
        complexity: complexity.clone(),
        was_forced: true,
    })
}

fn cost_phrase(estimate: &CostEstimate) -> String {
    if estimate.is_free() {
        "free".to_string()
    } else {
        format_cost(estimate.estimated_cost)
    }
}

fn selection_reason(
    selected: &CostEstimate,
    complexity: &ComplexityEstimate,
    alternatives: &[CostEstimate],
) -> String {
    let mut parts = Vec::new();

    if selected.is_free() {
        parts.push(format!(
            "Selected {} (free tier) with {:.1}% capacity available",
            selected.worker_name, selected.available_percent
        ));
    } else {
        parts.push(format!(
            "Selected {} (est. cost: {}) with {:.1}% capacity available",
            selected.worker_name,
            format_cost(selected.estimated_cost),
            selected.available_percent
        ));
    }

    parts.push(format!(
        "Task complexity: {} (~{} tokens, confidence: {:.1}%, method: {})",
        complexity.level,
        complexity.tokens,
        complexity.confidence * 100.0,
        complexity.method
    ));

    if !complexity.reasoning.is_empty() {
        parts.push(format!("Reason: {}", complexity.reasoning));
    }

    if !alternatives.is_empty() {
        let names: Vec<String> = alternatives
            .iter()
            .take(REASON_ALTERNATIVES)
            .map(|alt| format!("{} ({})", alt.worker_name, cost_phrase(alt)))
            .collect();
        parts.push(format!("Alternatives: {}", names.join(", ")));
    }

    parts.join(". ")
}
