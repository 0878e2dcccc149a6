//! Greedy contraction order.
//!
//! O(n³) algorithm that repeatedly contracts the cheapest pair.

use alloc::vec::Vec;

use super::cost::{CostModel, PairwiseContraction};
use super::path::ContractionSequence;
use crate::shape::{Dim, Labels, Shape};

/// Finds a contraction sequence by always contracting the cheapest pair.
///
/// Pairs `(j, k)`, `j < k`, are scanned row-major over the live list and the
/// first strictly cheapest one wins. Outer products are allowed. The result
/// replaces both operands at the front of the list.
pub fn greedy_sequence(
    shapes: &[&[Dim]],
    labels: &[Labels],
    cost_model: &CostModel,
) -> ContractionSequence {
    let mut live: Vec<(Shape, Labels)> = shapes
        .iter()
        .zip(labels)
        .map(|(s, l)| (Shape::from_slice(s), l.clone()))
        .collect();
    let mut sequence = ContractionSequence::new();

    while live.len() > 1 {
        let (pair, best) = find_best_pair(&live, cost_model);
        tracing::trace!(
            "greedy picked {:?} -> {} at cost {}",
            pair,
            best.labels.iter().collect::<alloc::string::String>(),
            best.cost
        );

        live.remove(pair.1);
        live.remove(pair.0);
        live.insert(0, (best.shape, best.labels));
        sequence.push(pair);
    }

    sequence
}

/// Finds the cheapest pair in the live list. Requires at least two operands.
fn find_best_pair(
    live: &[(Shape, Labels)],
    cost_model: &CostModel,
) -> ((usize, usize), PairwiseContraction) {
    let evaluate = |j: usize, k: usize| {
        cost_model.contract(&live[j].0, &live[j].1, &live[k].0, &live[k].1)
    };

    let mut best_pair = (0, 1);
    let mut best = evaluate(0, 1);

    for j in 0..live.len() - 1 {
        for k in (j + 1)..live.len() {
            if (j, k) == (0, 1) {
                continue;
            }
            let candidate = evaluate(j, k);
            if candidate.cost.cost() < best.cost.cost() {
                best_pair = (j, k);
                best = candidate;
            }
        }
    }

    (best_pair, best)
}
