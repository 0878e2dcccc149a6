//! Diagnostic reporting tests.

use einsum_planner::{
    CapturingObserver, Diagnostic, EinsumConfig, NdArrayBackend, OptimizeStrategy, einsum_with_observer,
};

use super::reference::{naive_einsum, operand};

#[test]
fn test_pairwise_emits_nothing() {
    let backend = NdArrayBackend::<f64>::new();
    let observer = CapturingObserver::new();
    let inputs = [operand(&[2, 3], 0), operand(&[3, 4], 1)];

    einsum_with_observer(&backend, "ij,jk->ik", &inputs, None, &observer).unwrap();
    assert!(observer.is_empty());
}

#[test]
fn test_exponential_fallback_is_reported() {
    let backend = NdArrayBackend::<f64>::new();
    let observer = CapturingObserver::new();
    let inputs = [operand(&[2, 3], 0), operand(&[2, 3], 1), operand(&[2, 4], 2)];

    let out = einsum_with_observer(&backend, "ij,ij,ik->jk", &inputs, None, &observer).unwrap();
    let expected = naive_einsum("ij,ij,ik->jk", &inputs);
    assert_eq!(out.shape(), expected.shape());
    for (a, e) in out.iter().zip(expected.iter()) {
        approx::assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
    }
    assert_eq!(
        observer.diagnostics(),
        vec![Diagnostic::ExponentialFallback { label: 'i' }]
    );
}

#[test]
fn test_cost_ceiling_is_relaxed() {
    let backend = NdArrayBackend::<f64>::new();
    let observer = CapturingObserver::new();
    let inputs = [operand(&[4, 4], 0), operand(&[4, 4], 1), operand(&[4, 4], 2)];
    let config = EinsumConfig::new()
        .with_strategy(OptimizeStrategy::Exact)
        .with_cost_ceiling(Some(10));

    let out = einsum_with_observer(&backend, "ij,jk,kl->il", &inputs, Some(config), &observer).unwrap();
    let expected = naive_einsum("ij,jk,kl->il", &inputs);
    for (a, e) in out.iter().zip(expected.iter()) {
        approx::assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
    }
    assert_eq!(
        observer.diagnostics(),
        vec![Diagnostic::CostCeilingRelaxed { ceiling: 10 }]
    );
}

#[test]
fn test_generous_ceiling_is_silent() {
    let backend = NdArrayBackend::<f64>::new();
    let observer = CapturingObserver::new();
    let inputs = [operand(&[4, 4], 0), operand(&[4, 4], 1)];
    let config = EinsumConfig::new().with_cost_ceiling(Some(64));

    einsum_with_observer(&backend, "ij,jk->ik", &inputs, Some(config), &observer).unwrap();
    assert!(observer.is_empty());
}

#[test]
fn test_diagnostic_display() {
    let text = Diagnostic::ExponentialFallback { label: 'i' }.to_string();
    assert!(text.contains("'i'"));
    let text = Diagnostic::CostCeilingRelaxed { ceiling: 10 }.to_string();
    assert!(text.contains("10"));
}
