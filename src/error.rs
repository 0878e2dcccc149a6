//! Error types for einsum operations.

use alloc::string::String;

/// Errors that can occur during einsum resolution, planning and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum EinsumError {
    /// Malformed equation text.
    #[cfg_attr(feature = "std", error("invalid equation syntax: {message}"))]
    EquationSyntax { message: String },

    /// Number of operands does not match the number of input subscripts.
    #[cfg_attr(feature = "std", error("equation expects {expected} operands, got {got}"))]
    EquationArity { expected: usize, got: usize },

    /// An ellipsis could not be expanded from static shape information.
    #[cfg_attr(feature = "std", error("cannot infer ellipsis axes: {message}"))]
    ShapeInference { message: String },

    /// Output label appears in no input.
    #[cfg_attr(feature = "std", error("output axis '{label}' not found in any input"))]
    UnknownOutputAxis { label: char },

    /// A label repeats within one operand outside the self-trace pattern.
    #[cfg_attr(feature = "std", error("axis '{label}' appears more than once in subscript '{subscript}'"))]
    DuplicateAxis { label: char, subscript: String },

    /// Label count does not match operand rank.
    #[cfg_attr(feature = "std", error("subscript '{subscript}' has {expected} axes, operand has rank {got}"))]
    RankMismatch {
        subscript: String,
        expected: usize,
        got: usize,
    },

    /// Two operands disagree on the size of a shared axis.
    #[cfg_attr(feature = "std", error("size mismatch for axis '{label}': {expected} vs {got}"))]
    ShapeMismatch {
        label: char,
        expected: usize,
        got: usize,
    },

    /// Surviving labels after reduction do not match the output labels.
    #[cfg_attr(feature = "std", error("invalid equation '{equation}': {message}"))]
    InvalidEquation { equation: String, message: String },

    /// Every candidate contraction order exceeded the cost ceiling.
    ///
    /// Recoverable: planning again without a ceiling always succeeds.
    #[cfg_attr(feature = "std", error("no contraction order within cost ceiling {ceiling}"))]
    CostCeilingExceeded { ceiling: u64 },

    /// A contraction sequence references positions outside the live list.
    #[cfg_attr(feature = "std", error("invalid contraction step {step}: {message}"))]
    InvalidSequence { step: usize, message: String },

    /// Malformed reduction request.
    #[cfg_attr(feature = "std", error("shape error: {message}"))]
    ShapeError { message: String },

    /// Array primitive failure.
    #[cfg_attr(feature = "std", error("backend error: {message}"))]
    Backend { message: String },
}

impl EinsumError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::EquationSyntax {
            message: message.into(),
        }
    }

    pub fn shape_inference(message: impl Into<String>) -> Self {
        Self::ShapeInference {
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::ShapeError {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn invalid_sequence(step: usize, message: impl Into<String>) -> Self {
        Self::InvalidSequence {
            step,
            message: message.into(),
        }
    }

    /// Returns true if retrying without a cost ceiling can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CostCeilingExceeded { .. })
    }
}

/// Result type for einsum operations.
pub type EinsumResult<T> = core::result::Result<T, EinsumError>;
