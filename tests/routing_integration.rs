//! Integration tests for cost-aware routing

mod common;

use common::{make_estimate, medium, stock_engine};
use dispatcher::complexity::HeuristicClassifier;
use dispatcher::routing::{decide, rank, CostEstimate, RoutingError};
use dispatcher::worker::WorkerId;
use proptest::prelude::*;

#[tokio::test]
async fn test_free_worker_preferred_over_paid() {
    let engine = stock_engine(95.0, 60.0, 40.0);
    let complexity = HeuristicClassifier.classify("update the login handler to log failures");
    let decision = engine.make_decision(&complexity, None).await.unwrap();

    assert_eq!(decision.selected.as_str(), "codex");
    assert!(!decision.was_forced);
    assert!(decision.selected_cost.is_free());
    assert!(decision.reason.contains("Codex"));
}

#[tokio::test]
async fn test_paid_worker_used_when_free_ones_exhausted() {
    let engine = stock_engine(95.0, 4.0, 8.0);
    let decision = engine.make_decision(&medium(), None).await.unwrap();

    assert_eq!(decision.selected.as_str(), "claude-code");
    assert!((decision.selected_cost.estimated_cost - 0.015).abs() < 1e-9);
}

#[tokio::test]
async fn test_no_worker_available() {
    let engine = stock_engine(2.0, 1.0, 0.0);
    let err = engine.make_decision(&medium(), None).await.unwrap_err();
    assert_eq!(err, RoutingError::NoWorkersAvailable);
}

#[tokio::test]
async fn test_forced_worker_bypasses_capacity() {
    let engine = stock_engine(3.0, 90.0, 90.0);
    let decision = engine
        .make_decision(&medium(), Some("claude"))
        .await
        .unwrap();

    assert_eq!(decision.selected.as_str(), "claude-code");
    assert!(decision.was_forced);
    assert!(decision.reason.contains("WARNING"));
    assert_eq!(decision.alternatives.len(), 2);
}

#[tokio::test]
async fn test_complexity_scales_cost() {
    let engine = stock_engine(95.0, 0.0, 0.0);
    let simple = HeuristicClassifier.classify("fix typo");
    let complex = HeuristicClassifier.classify("refactor the entire auth architecture");

    let cheap = engine.make_decision(&simple, None).await.unwrap();
    let expensive = engine.make_decision(&complex, None).await.unwrap();
    assert!(cheap.selected_cost.estimated_cost < expensive.selected_cost.estimated_cost);
}

#[test]
fn test_tie_broken_by_worker_id() {
    let estimates = vec![
        make_estimate("zeta", 0.0, 50.0),
        make_estimate("alpha", 0.0, 50.0),
    ];
    let decision = decide(&estimates, &medium(), None).unwrap();
    assert_eq!(decision.selected, WorkerId::new("alpha"));
}

fn arb_estimate(id: usize) -> impl Strategy<Value = CostEstimate> {
    (
        prop_oneof![Just(0.0), 0.001f64..1.0],
        0.0f64..100.0,
    )
        .prop_map(move |(cost, available)| make_estimate(&format!("w{}", id), cost, available))
}

fn arb_estimates() -> impl Strategy<Value = Vec<CostEstimate>> {
    (1usize..8).prop_flat_map(|n| (0..n).map(arb_estimate).collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn prop_decision_independent_of_input_order(
        estimates in arb_estimates(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = estimates.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        if seed % 2 == 0 {
            shuffled.reverse();
        }

        let a = decide(&estimates, &medium(), None);
        let b = decide(&shuffled, &medium(), None);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.selected, b.selected);
                prop_assert_eq!(a.alternatives, b.alternatives);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "outcome depends on input order"),
        }
    }

    #[test]
    fn prop_selected_is_usable_and_not_an_alternative(estimates in arb_estimates()) {
        if let Ok(decision) = decide(&estimates, &medium(), None) {
            prop_assert!(decision.selected_cost.is_available);
            prop_assert!(!decision.selected_cost.will_exceed_limit);
            prop_assert!(decision.alternatives.iter().all(|a| a.worker != decision.selected));
        }
    }

    #[test]
    fn prop_free_available_worker_always_beats_paid(estimates in arb_estimates()) {
        let has_free = estimates
            .iter()
            .any(|e| e.is_free() && e.is_available && !e.will_exceed_limit);
        if let Ok(decision) = decide(&estimates, &medium(), None) {
            if has_free {
                prop_assert!(decision.selected_cost.is_free());
            }
        }
    }

    #[test]
    fn prop_rank_is_a_permutation(estimates in arb_estimates()) {
        let ranked = rank(&estimates);
        prop_assert_eq!(ranked.len(), estimates.len());
        for e in &estimates {
            prop_assert!(ranked.contains(e));
        }
    }
}
