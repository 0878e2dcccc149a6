//! Route recognition for resolved equations.
//!
//! Picks how an equation is evaluated:
//! - Self-trace: a single operand summed along its diagonal (`ii`)
//! - Exponential space: a summed label shared by more than two operands
//! - Pairwise: everything else, as a sequence of two-operand reductions

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::notation::ResolvedEquation;

/// Evaluation route of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Diagonal sum of a single operand.
    SelfTrace,
    /// Broadcast every operand to the full label space and sum.
    ExponentialSpace {
        /// First label summed over more than two operands.
        label: char,
    },
    /// Ordered pairwise reductions.
    Pairwise,
}

impl Route {
    #[inline]
    pub fn is_pairwise(&self) -> bool {
        matches!(self, Route::Pairwise)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::SelfTrace => write!(f, "self-trace"),
            Route::ExponentialSpace { label } => write!(f, "exponential-space (over '{}')", label),
            Route::Pairwise => write!(f, "pairwise"),
        }
    }
}

/// Main entry point for route recognition.
pub fn recognize_route(equation: &ResolvedEquation) -> Route {
    if equation.is_self_trace() {
        return Route::SelfTrace;
    }
    if let Some(label) = equation.label_summed_over_many() {
        return Route::ExponentialSpace { label };
    }
    Route::Pairwise
}
