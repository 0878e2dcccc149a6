//! Optimal contraction order via dynamic programming.
//!
//! Operands are split into connected components first; each component is
//! solved exactly by building the cheapest tree for every subset of size
//! `m` from subsets of sizes `m - k` and `k`. Exponential in component size.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::cost::CostModel;
use super::greedy::greedy_sequence;
use super::path::ContractionSequence;
use super::subgraph::find_subgraphs;
use super::tree::ContractionTree;
use crate::error::{EinsumError, EinsumResult};
use crate::shape::{Dim, Labels, Shape};

/// Largest component solved exactly; bigger ones are ordered greedily.
pub const MAX_DP_TENSORS: usize = 16;

/// Best known contraction of one subset of a component.
#[derive(Debug, Clone)]
struct SubsetEntry {
    shape: Shape,
    labels: Labels,
    cost: u64,
    tree: ContractionTree,
}

/// Finds the optimal contraction sequence over all operands.
///
/// Component trees are joined by a left fold in component order. Candidates
/// whose accumulated cost exceeds `cost_ceiling` are discarded; if that
/// leaves a component without a full contraction the search fails with
/// [`EinsumError::CostCeilingExceeded`].
pub fn optimal_sequence(
    shapes: &[&[Dim]],
    labels: &[Labels],
    cost_model: &CostModel,
    cost_ceiling: Option<u64>,
) -> EinsumResult<ContractionSequence> {
    let n = shapes.len();
    let components = find_subgraphs(labels, cost_model.output());
    tracing::debug!("contraction graph has {} component(s)", components.len());

    let mut trees = Vec::with_capacity(components.len());
    for members in &components {
        trees.push(optimal_tree(shapes, labels, members, cost_model, cost_ceiling)?);
    }

    match ContractionTree::left_fold(trees) {
        Some(tree) => tree.linearize(n),
        None => Ok(ContractionSequence::new()),
    }
}

/// Solves one connected component, given as indices into `shapes`.
pub fn optimal_tree(
    shapes: &[&[Dim]],
    labels: &[Labels],
    members: &[usize],
    cost_model: &CostModel,
    cost_ceiling: Option<u64>,
) -> EinsumResult<ContractionTree> {
    check_members(shapes, labels, members)?;
    match members {
        [] => Err(EinsumError::invalid_sequence(0, "empty component")),
        [single] => Ok(ContractionTree::Leaf(*single)),
        _ if members.len() > MAX_DP_TENSORS => {
            tracing::debug!(
                "component of {} operands exceeds {}, ordering greedily",
                members.len(),
                MAX_DP_TENSORS
            );
            greedy_tree(shapes, labels, members, cost_model)
        }
        _ => solve_component(shapes, labels, members, cost_model, cost_ceiling),
    }
}

/// Orders a component greedily and converts the sequence to a tree.
pub fn greedy_tree(
    shapes: &[&[Dim]],
    labels: &[Labels],
    members: &[usize],
    cost_model: &CostModel,
) -> EinsumResult<ContractionTree> {
    check_members(shapes, labels, members)?;
    let sub_shapes: Vec<&[Dim]> = members.iter().map(|&i| shapes[i]).collect();
    let sub_labels: Vec<Labels> = members.iter().map(|&i| labels[i].clone()).collect();
    let sequence = greedy_sequence(&sub_shapes, &sub_labels, cost_model);

    ContractionTree::from_sequence(&sequence, members)?
        .ok_or_else(|| EinsumError::invalid_sequence(sequence.len(), "greedy order left several operands"))
}

/// Component members must index both `shapes` and `labels`.
fn check_members(shapes: &[&[Dim]], labels: &[Labels], members: &[usize]) -> EinsumResult<()> {
    let available = shapes.len().min(labels.len());
    match members.iter().find(|&&i| i >= available) {
        Some(&i) => Err(EinsumError::invalid_sequence(
            0,
            alloc::format!("component member {} out of range for {} operands", i, available),
        )),
        None => Ok(()),
    }
}

fn solve_component(
    shapes: &[&[Dim]],
    labels: &[Labels],
    members: &[usize],
    cost_model: &CostModel,
    cost_ceiling: Option<u64>,
) -> EinsumResult<ContractionTree> {
    let n = members.len();

    // levels[m] holds the best entry for every reachable subset of size m.
    let mut levels: Vec<BTreeMap<u64, SubsetEntry>> = Vec::with_capacity(n + 1);
    levels.push(BTreeMap::new());
    levels.push(
        members
            .iter()
            .enumerate()
            .map(|(bit, &operand)| {
                let entry = SubsetEntry {
                    shape: Shape::from_slice(shapes[operand]),
                    labels: labels[operand].clone(),
                    cost: 0,
                    tree: ContractionTree::Leaf(operand),
                };
                (1u64 << bit, entry)
            })
            .collect(),
    );

    for m in 2..=n {
        let mut level: BTreeMap<u64, SubsetEntry> = BTreeMap::new();

        for k in 1..=m / 2 {
            for (&s1, e1) in &levels[m - k] {
                for (&s2, e2) in &levels[k] {
                    if s1 & s2 != 0 {
                        continue;
                    }

                    let contraction =
                        cost_model.contract(&e1.shape, &e1.labels, &e2.shape, &e2.labels);
                    if contraction.is_outer_product() {
                        continue;
                    }

                    let total = contraction
                        .cost
                        .cost()
                        .saturating_add(e1.cost)
                        .saturating_add(e2.cost);
                    if cost_ceiling.is_some_and(|ceiling| total > ceiling) {
                        continue;
                    }

                    let subset = s1 | s2;
                    if level.get(&subset).is_some_and(|existing| existing.cost <= total) {
                        continue;
                    }
                    level.insert(
                        subset,
                        SubsetEntry {
                            shape: contraction.shape,
                            labels: contraction.labels,
                            cost: total,
                            tree: ContractionTree::node(e1.tree.clone(), e2.tree.clone()),
                        },
                    );
                }
            }
        }

        levels.push(level);
    }

    let full = (1u64 << n) - 1;
    match levels[n].remove(&full) {
        Some(entry) => {
            tracing::trace!("component {:?} solved at cost {}", members, entry.cost);
            Ok(entry.tree)
        }
        None => match cost_ceiling {
            Some(ceiling) => Err(EinsumError::CostCeilingExceeded { ceiling }),
            // Labels shared by more than two operands can disconnect a
            // component once summed; order it greedily instead.
            None => greedy_tree(shapes, labels, members, cost_model),
        },
    }
}
