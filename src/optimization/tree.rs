//! Binary contraction trees and their linearization.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use super::path::ContractionSequence;
use crate::error::{EinsumError, EinsumResult};

/// A binary tree of pairwise contractions over operand indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractionTree {
    Leaf(usize),
    Node(Box<ContractionTree>, Box<ContractionTree>),
}

impl ContractionTree {
    pub fn node(left: ContractionTree, right: ContractionTree) -> Self {
        Self::Node(Box::new(left), Box::new(right))
    }

    /// Joins trees by a left fold: `((t0, t1), t2)...`.
    pub fn left_fold(trees: impl IntoIterator<Item = ContractionTree>) -> Option<Self> {
        trees.into_iter().reduce(Self::node)
    }

    /// Builds the tree a sequence describes by replaying it over leaves.
    pub fn from_sequence(
        sequence: &ContractionSequence,
        leaves: &[usize],
    ) -> EinsumResult<Option<Self>> {
        let items = leaves.iter().map(|&i| Self::Leaf(i)).collect();
        let mut remaining =
            sequence.replay(items, |_, lhs, rhs| Ok::<_, EinsumError>(Self::node(lhs, rhs)))?;
        Ok(if remaining.len() == 1 { remaining.pop() } else { None })
    }

    /// Operand indices in left-to-right order.
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            Self::Leaf(i) => out.push(*i),
            Self::Node(l, r) => {
                l.collect_leaves(out);
                r.collect_leaves(out);
            }
        }
    }

    /// Number of internal nodes.
    pub fn num_contractions(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Node(l, r) => 1 + l.num_contractions() + r.num_contractions(),
        }
    }

    /// Flattens the tree into a sequence over a live list of `num_operands`.
    ///
    /// Nodes are emitted in post-order, left subtree first. Each emitted pair
    /// holds the sorted current positions of the two children; the result
    /// takes their place at the front of the list.
    pub fn linearize(&self, num_operands: usize) -> EinsumResult<ContractionSequence> {
        let mut state = Linearizer {
            live: (0..num_operands).collect(),
            next_id: num_operands,
            sequence: ContractionSequence::new(),
        };
        state.resolve(self)?;
        Ok(state.sequence)
    }
}

struct Linearizer {
    /// Node ids of the live list, leaves are `0..n`.
    live: Vec<usize>,
    next_id: usize,
    sequence: ContractionSequence,
}

impl Linearizer {
    fn resolve(&mut self, tree: &ContractionTree) -> EinsumResult<usize> {
        match tree {
            ContractionTree::Leaf(i) => Ok(*i),
            ContractionTree::Node(left, right) => {
                let a = self.resolve(left)?;
                let b = self.resolve(right)?;
                let pa = self.position(a)?;
                let pb = self.position(b)?;
                let (i, j) = if pa < pb { (pa, pb) } else { (pb, pa) };

                self.live.remove(j);
                self.live.remove(i);
                let id = self.next_id;
                self.next_id += 1;
                self.live.insert(0, id);
                self.sequence.push((i, j));
                Ok(id)
            }
        }
    }

    fn position(&self, id: usize) -> EinsumResult<usize> {
        self.live.iter().position(|&x| x == id).ok_or_else(|| {
            EinsumError::invalid_sequence(
                self.sequence.len(),
                alloc::format!("tree references operand {} that is not live", id),
            )
        })
    }
}

impl fmt::Display for ContractionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(i) => write!(f, "{}", i),
            Self::Node(l, r) => write!(f, "({}, {})", l, r),
        }
    }
}
