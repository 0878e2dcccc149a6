//! Non-fatal diagnostics raised while planning or executing.

use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

/// A condition worth reporting that does not stop the computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The broadcast-and-sum path was taken because `label` is summed over
    /// more than two operands.
    ExponentialFallback { label: char },
    /// No order fit under `ceiling`; planning was repeated without it.
    CostCeilingRelaxed { ceiling: u64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ExponentialFallback { label } => write!(
                f,
                "falling back to exponential-space einsum because index '{}' is summed over more than two inputs",
                label
            ),
            Diagnostic::CostCeilingRelaxed { ceiling } => write!(
                f,
                "no contraction order within cost ceiling {}, planning without it",
                ceiling
            ),
        }
    }
}

/// Receives diagnostics.
pub trait DiagnosticObserver {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DiagnosticObserver for TracingObserver {
    fn emit(&self, diagnostic: &Diagnostic) {
        tracing::warn!("{}", diagnostic);
    }
}

/// Records diagnostics in emission order.
#[derive(Debug, Default)]
pub struct CapturingObserver {
    captured: RefCell<Vec<Diagnostic>>,
}

impl CapturingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the diagnostics received so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.captured.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.borrow().is_empty()
    }
}

impl DiagnosticObserver for CapturingObserver {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.captured.borrow_mut().push(diagnostic.clone());
    }
}
