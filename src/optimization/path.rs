//! Contraction sequences and their replay against a live operand list.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EinsumError;
use crate::shape::{Dim, Labels, Shape};

/// Ordered pairs of live-list positions to contract.
///
/// Each step pops the two positions, contracts them and inserts the result
/// at the front of the list, so a sequence over `n` operands has `n - 1`
/// steps and leaves a single operand.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractionSequence {
    pairs: Vec<(usize, usize)>,
}

impl ContractionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs }
    }

    /// Contracts the first two live operands at every step.
    pub fn left_to_right(num_operands: usize) -> Self {
        Self {
            pairs: alloc::vec![(0, 1); num_operands.saturating_sub(1)],
        }
    }

    pub fn push(&mut self, pair: (usize, usize)) {
        self.pairs.push(pair);
    }

    #[inline]
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, usize)> {
        self.pairs.iter()
    }

    /// Replays the sequence over `items`.
    ///
    /// `combine` receives the normalized pair `(i, j)` with `i < j` and the
    /// items at those positions, in that order. Its result is inserted at the
    /// front of the list. Returns what is left after the last step.
    pub fn replay<T, E, F>(&self, mut items: Vec<T>, mut combine: F) -> Result<Vec<T>, E>
    where
        E: From<EinsumError>,
        F: FnMut((usize, usize), T, T) -> Result<T, E>,
    {
        for (step, &(a, b)) in self.pairs.iter().enumerate() {
            let (i, j) = if a <= b { (a, b) } else { (b, a) };
            if i == j {
                return Err(EinsumError::invalid_sequence(
                    step,
                    alloc::format!("pair ({}, {}) names one operand twice", a, b),
                )
                .into());
            }
            if j >= items.len() {
                return Err(EinsumError::invalid_sequence(
                    step,
                    alloc::format!("position {} outside {} live operands", j, items.len()),
                )
                .into());
            }

            let rhs = items.remove(j);
            let lhs = items.remove(i);
            let result = combine((i, j), lhs, rhs)?;
            items.insert(0, result);
        }
        Ok(items)
    }
}

impl From<Vec<(usize, usize)>> for ContractionSequence {
    fn from(pairs: Vec<(usize, usize)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl fmt::Display for ContractionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (k, (i, j)) in self.pairs.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", i, j)?;
        }
        write!(f, "]")
    }
}

/// A single planned pairwise contraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractionStep {
    /// Positions in the live list, `i < j`.
    pub inputs: (usize, usize),
    /// Labels summed in this step.
    pub contracted: Labels,
    /// Labels of the result.
    pub result: Labels,
    /// Shape of the result.
    pub shape: Shape,
    /// Estimated multiply-adds.
    pub cost: Dim,
}
