//! Total ordering over cost estimates.

use super::CostEstimate;
use std::cmp::Ordering;

/// Compare two estimates by routing preference. `Less` means preferred.
///
/// Keys, in priority order:
/// 1. available before unavailable
/// 2. within limits before about to exceed them
/// 3. free before paid
/// 4. cheaper before more expensive
/// 5. more remaining capacity first
/// 6. worker id, ascending
///
/// Floats are compared with `total_cmp` and the last key is the worker id, so
/// distinct workers never compare equal and ranking does not depend on input
/// order.
pub fn compare_estimates(a: &CostEstimate, b: &CostEstimate) -> Ordering {
    b.is_available
        .cmp(&a.is_available)
        .then(a.will_exceed_limit.cmp(&b.will_exceed_limit))
        .then(b.is_free().cmp(&a.is_free()))
        .then(a.estimated_cost.total_cmp(&b.estimated_cost))
        .then(b.available_percent.total_cmp(&a.available_percent))
        .then_with(|| a.worker.cmp(&b.worker))
}

/// Sorted copy of `estimates`, best first.
pub fn rank(estimates: &[CostEstimate]) -> Vec<CostEstimate> {
    let mut ranked = estimates.to_vec();
    ranked.sort_by(compare_estimates);
    ranked
}
