//! Contraction order optimization for einsum.
//!
//! Implements the strategies for ordering pairwise contractions:
//! - Exact: dynamic programming per connected component, exponential in
//!   component size
//! - Greedy: O(n³) cheapest-pair heuristic
//! - None: left to right

mod cost;
mod dynamic;
mod greedy;
mod path;
mod plan;
mod subgraph;
mod tree;

pub use cost::{AxisPartition, CostModel, PairwiseContraction, summable_labels};
pub use dynamic::{MAX_DP_TENSORS, greedy_tree, optimal_sequence, optimal_tree};
pub use greedy::greedy_sequence;
pub use path::{ContractionSequence, ContractionStep};
pub use plan::{ExecutionPlan, OptimizeStrategy, create_plan, einsum_path, optimize_order};
pub use subgraph::find_subgraphs;
pub use tree::ContractionTree;
