//! Subscript representation for einsum notation.

use alloc::vec::Vec;
use core::fmt;

use crate::shape::Labels;

/// A single entry of an einsum subscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    /// A named axis label (a-z, A-Z).
    Named(char),
    /// Ellipsis standing for zero or more broadcast axes.
    Ellipsis,
}

impl Index {
    #[inline]
    pub fn is_ellipsis(&self) -> bool {
        matches!(self, Index::Ellipsis)
    }

    /// Returns the label if this is a named index.
    #[inline]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Index::Named(c) => Some(*c),
            Index::Ellipsis => None,
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Named(c) => write!(f, "{}", c),
            Index::Ellipsis => write!(f, "..."),
        }
    }
}

/// The unresolved subscript of one operand (or of the output).
///
/// For example, in `...ij,jk->...ik`, the subscripts are `...ij`, `jk` and `...ik`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subscript {
    indices: Vec<Index>,
    ellipsis_pos: Option<usize>,
}

impl Subscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a subscript of named labels only.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            indices: chars.into_iter().map(Index::Named).collect(),
            ellipsis_pos: None,
        }
    }

    pub fn push_named(&mut self, c: char) {
        self.indices.push(Index::Named(c));
    }

    /// Adds an ellipsis. Returns false if the subscript already has one.
    pub fn push_ellipsis(&mut self) -> bool {
        if self.ellipsis_pos.is_some() {
            return false;
        }
        self.ellipsis_pos = Some(self.indices.len());
        self.indices.push(Index::Ellipsis);
        true
    }

    #[inline]
    pub fn has_ellipsis(&self) -> bool {
        self.ellipsis_pos.is_some()
    }

    /// Number of named labels (the ellipsis excluded).
    #[inline]
    pub fn explicit_count(&self) -> usize {
        self.indices.len() - usize::from(self.has_ellipsis())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Index> {
        self.indices.iter()
    }

    /// Named labels in order, skipping the ellipsis.
    pub fn named_indices(&self) -> impl Iterator<Item = char> + '_ {
        self.indices.iter().filter_map(|i| i.as_char())
    }

    pub fn contains(&self, c: char) -> bool {
        self.named_indices().any(|x| x == c)
    }

    /// Counts occurrences of a named label.
    pub fn count(&self, c: char) -> usize {
        self.named_indices().filter(|&x| x == c).count()
    }

    /// Replaces the ellipsis with the given labels.
    pub fn expand_ellipsis(&self, batch_labels: &[char]) -> Labels {
        let mut expanded = Labels::with_capacity(self.explicit_count() + batch_labels.len());
        for idx in &self.indices {
            match idx {
                Index::Named(c) => expanded.push(*c),
                Index::Ellipsis => expanded.extend_from_slice(batch_labels),
            }
        }
        expanded
    }
}

impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in &self.indices {
            write!(f, "{}", idx)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Subscript {
    type Item = &'a Index;
    type IntoIter = core::slice::Iter<'a, Index>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}
