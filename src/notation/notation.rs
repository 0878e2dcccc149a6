//! Parsed and resolved einsum equations.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::collections::BTreeSet;
use core::fmt;

use super::subscript::Subscript;
use crate::shape::Labels;

/// A parsed einsum equation whose ellipses are not yet expanded.
#[derive(Debug, Clone)]
pub struct EinsumNotation {
    inputs: Vec<Subscript>,
    /// `None` when the equation has no `->`.
    output: Option<Subscript>,
    original: Option<String>,
}

impl EinsumNotation {
    pub fn new(inputs: Vec<Subscript>, output: Option<Subscript>) -> Self {
        Self {
            inputs,
            output,
            original: None,
        }
    }

    /// Sets the original equation text.
    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    #[inline]
    pub fn inputs(&self) -> &[Subscript] {
        &self.inputs
    }

    #[inline]
    pub fn output(&self) -> Option<&Subscript> {
        self.output.as_ref()
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn has_explicit_output(&self) -> bool {
        self.output.is_some()
    }

    /// Returns true if any subscript uses an ellipsis.
    pub fn has_ellipsis(&self) -> bool {
        self.inputs.iter().any(|s| s.has_ellipsis())
            || self.output.as_ref().is_some_and(|s| s.has_ellipsis())
    }

    /// All named labels of the equation, inputs and output.
    pub fn named_labels(&self) -> BTreeSet<char> {
        self.inputs
            .iter()
            .chain(self.output.iter())
            .flat_map(|s| s.named_indices())
            .collect()
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }
}

impl fmt::Display for EinsumNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", input)?;
        }
        if let Some(output) = &self.output {
            write!(f, "->{}", output)?;
        }
        Ok(())
    }
}

/// An equation with every ellipsis expanded and the output label set fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEquation {
    pub(crate) inputs: Vec<Labels>,
    pub(crate) output: Labels,
    /// Labels the widest ellipsis expanded to.
    pub(crate) broadcast: Labels,
    pub(crate) self_trace: bool,
}

impl ResolvedEquation {
    /// Builds a resolved equation from explicit label strings.
    pub fn from_labels(inputs: Vec<Labels>, output: Labels) -> Self {
        Self {
            inputs,
            output,
            broadcast: Labels::new(),
            self_trace: false,
        }
    }

    #[inline]
    pub fn inputs(&self) -> &[Labels] {
        &self.inputs
    }

    #[inline]
    pub fn output(&self) -> &Labels {
        &self.output
    }

    #[inline]
    pub fn broadcast_labels(&self) -> &Labels {
        &self.broadcast
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// True for a single-operand diagonal sum such as `ii` without `->`.
    #[inline]
    pub fn is_self_trace(&self) -> bool {
        self.self_trace
    }

    /// Labels present in some input but not in the output.
    pub fn summed_labels(&self) -> BTreeSet<char> {
        let output: BTreeSet<char> = self.output.iter().copied().collect();
        self.inputs
            .iter()
            .flat_map(|l| l.iter().copied())
            .filter(|c| !output.contains(c))
            .collect()
    }

    /// Number of operands containing a label.
    pub fn operand_count(&self, label: char) -> usize {
        self.inputs.iter().filter(|l| l.contains(&label)).count()
    }

    /// First summed label (alphabetically) shared by more than two operands.
    pub fn label_summed_over_many(&self) -> Option<char> {
        self.summed_labels()
            .into_iter()
            .find(|&c| self.operand_count(c) > 2)
    }
}

impl fmt::Display for ResolvedEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            for c in input {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "->")?;
        for c in &self.output {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
