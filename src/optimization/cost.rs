//! Cost model for pairwise contractions.

use alloc::collections::BTreeSet;

use crate::shape::{Dim, Labels, Shape};

/// Classification of the labels of one pairwise reduction.
///
/// Every label of either operand lands in exactly one group; each group is
/// sorted. The cost model and the reduction executor share this layout, so
/// estimated result labels are the executed ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AxisPartition {
    /// In both operands and kept.
    pub preserved: Labels,
    /// In both operands and summed.
    pub summed: Labels,
    /// Only in the left operand.
    pub lhs_broadcast: Labels,
    /// Only in the right operand.
    pub rhs_broadcast: Labels,
}

impl AxisPartition {
    /// Partitions the labels, summing the shared labels listed in `axes_to_sum`.
    pub fn new(lhs: &[char], rhs: &[char], axes_to_sum: &BTreeSet<char>) -> Self {
        let lhs_set: BTreeSet<char> = lhs.iter().copied().collect();
        let rhs_set: BTreeSet<char> = rhs.iter().copied().collect();

        let mut partition = Self::default();
        for &c in lhs_set.intersection(&rhs_set) {
            if axes_to_sum.contains(&c) {
                partition.summed.push(c);
            } else {
                partition.preserved.push(c);
            }
        }
        partition.lhs_broadcast.extend(lhs_set.difference(&rhs_set).copied());
        partition.rhs_broadcast.extend(rhs_set.difference(&lhs_set).copied());
        partition
    }

    /// Partitions the labels, summing shared labels absent from `output`.
    pub fn for_output(lhs: &[char], rhs: &[char], output: &[char]) -> Self {
        let axes_to_sum = summable_labels(lhs, rhs, output);
        Self::new(lhs, rhs, &axes_to_sum)
    }

    /// Labels of the reduction result: preserved, then lhs broadcast, then rhs broadcast.
    pub fn result_labels(&self) -> Labels {
        let mut labels = Labels::with_capacity(
            self.preserved.len() + self.lhs_broadcast.len() + self.rhs_broadcast.len(),
        );
        labels.extend_from_slice(&self.preserved);
        labels.extend_from_slice(&self.lhs_broadcast);
        labels.extend_from_slice(&self.rhs_broadcast);
        labels
    }

    #[inline]
    pub fn is_outer_product(&self) -> bool {
        self.summed.is_empty()
    }
}

/// Labels shared by both operands that the output does not keep.
pub fn summable_labels(lhs: &[char], rhs: &[char], output: &[char]) -> BTreeSet<char> {
    lhs.iter()
        .copied()
        .filter(|c| rhs.contains(c) && !output.contains(c))
        .collect()
}

/// Estimated outcome of contracting two operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseContraction {
    /// Result labels, in executor order.
    pub labels: Labels,
    /// Result shape.
    pub shape: Shape,
    /// Summed labels; empty for an outer product.
    pub contracted: Labels,
    /// Multiply-adds.
    pub cost: Dim,
}

impl PairwiseContraction {
    #[inline]
    pub fn is_outer_product(&self) -> bool {
        self.contracted.is_empty()
    }
}

/// Cost model for evaluating pairwise contractions against a fixed output.
#[derive(Debug, Clone)]
pub struct CostModel {
    output: Labels,
}

impl CostModel {
    pub fn new(output: &[char]) -> Self {
        Self {
            output: output.iter().copied().collect(),
        }
    }

    pub fn output(&self) -> &[char] {
        &self.output
    }

    /// Computes the result and cost of contracting two operands.
    ///
    /// The cost is the product of the sizes of all distinct labels of both
    /// operands, i.e. result elements times summed elements.
    pub fn contract(
        &self,
        lhs_shape: &[Dim],
        lhs_labels: &[char],
        rhs_shape: &[Dim],
        rhs_labels: &[char],
    ) -> PairwiseContraction {
        let partition = AxisPartition::for_output(lhs_labels, rhs_labels, &self.output);
        let size_of = |c: char| label_size(c, lhs_shape, lhs_labels, rhs_shape, rhs_labels);

        let labels = partition.result_labels();
        let shape: Shape = labels.iter().map(|&c| size_of(c)).collect();
        let cost = Dim::product(
            labels
                .iter()
                .chain(partition.summed.iter())
                .map(|&c| size_of(c)),
        );

        PairwiseContraction {
            labels,
            shape,
            contracted: partition.summed,
            cost,
        }
    }
}

/// Size of a label, preferring a known size from either operand.
///
/// A size of 1 on one side broadcasts against the other.
fn label_size(
    label: char,
    lhs_shape: &[Dim],
    lhs_labels: &[char],
    rhs_shape: &[Dim],
    rhs_labels: &[char],
) -> Dim {
    let lookup = |shape: &[Dim], labels: &[char]| {
        labels
            .iter()
            .position(|&c| c == label)
            .and_then(|pos| shape.get(pos).copied())
    };
    match (lookup(lhs_shape, lhs_labels), lookup(rhs_shape, rhs_labels)) {
        (Some(Dim::Known(a)), Some(Dim::Known(b))) => Dim::Known(a.max(b)),
        (Some(Dim::Known(d)), _) | (_, Some(Dim::Known(d))) => Dim::Known(d),
        _ => Dim::Deferred,
    }
}
