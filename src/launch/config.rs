//! Configuration for einsum operations.

use serde::{Deserialize, Serialize};

use crate::optimization::OptimizeStrategy;

/// Configuration options for einsum execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EinsumConfig {
    /// Strategy for ordering pairwise contractions.
    pub strategy: OptimizeStrategy,
    /// Upper bound on the accumulated cost of any candidate order.
    ///
    /// Only the exact strategy consults it. When no order fits, planning is
    /// retried without a ceiling.
    pub cost_ceiling: Option<u64>,
    /// Whether to validate shapes before planning.
    pub validate_shapes: bool,
}

impl Default for EinsumConfig {
    fn default() -> Self {
        Self {
            strategy: OptimizeStrategy::Exact,
            cost_ceiling: None,
            validate_shapes: true,
        }
    }
}

impl EinsumConfig {
    /// Creates a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contraction strategy.
    pub fn with_strategy(mut self, strategy: OptimizeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets or clears the cost ceiling.
    pub fn with_cost_ceiling(mut self, ceiling: Option<u64>) -> Self {
        self.cost_ceiling = ceiling;
        self
    }

    /// Enables or disables shape validation.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_shapes = enabled;
        self
    }

    /// Creates a config optimized for speed (greedy, no validation).
    pub fn fast() -> Self {
        Self {
            strategy: OptimizeStrategy::Greedy,
            cost_ceiling: None,
            validate_shapes: false,
        }
    }

    /// Creates a config optimized for correctness (exact, full validation).
    pub fn safe() -> Self {
        Self {
            strategy: OptimizeStrategy::Exact,
            cost_ceiling: None,
            validate_shapes: true,
        }
    }
}
