//! # Einsum Planner
//!
//! Einstein summation (einsum) over multi-dimensional arrays with cost-based
//! contraction ordering.
//!
//! ## Features
//!
//! - Full einsum notation parsing with ellipsis broadcasting and implicit output
//! - Contraction order optimization (exact DP over connected components, greedy)
//! - Pairwise execution via transpose/reshape/batched matmul
//! - Exponential-space fallback for labels summed over more than two operands
//! - Pluggable array backend, with an `ndarray` reference implementation
//!
//! ## Example
//!
//! ```ignore
//! use einsum_planner::{einsum, NdArrayBackend};
//!
//! let backend = NdArrayBackend::<f64>::new();
//!
//! // Matrix multiplication
//! let c = einsum(&backend, "ij,jk->ik", &[a, b], None)?;
//!
//! // Batched attention scores
//! let scores = einsum(&backend, "bhqd,bhkd->bhqk", &[queries, keys], None)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod backend;
pub mod error;
pub mod launch;
pub mod notation;
pub mod optimization;
pub mod pattern;
pub mod shape;

pub use backend::{Backend, NdArrayBackend, Operand};
pub use error::{EinsumError, EinsumResult};
pub use launch::{
    CapturingObserver, Diagnostic, DiagnosticObserver, EinsumConfig, TracingObserver, einsum,
    einsum_with_observer, execute_plan, reduce_pair,
};
pub use notation::{EinsumNotation, ResolvedEquation, parse_einsum, resolve_equation};
pub use optimization::{
    ContractionSequence, ContractionTree, ExecutionPlan, OptimizeStrategy, einsum_path,
    optimize_order,
};
pub use pattern::Route;
pub use shape::{Dim, Labels, Shape};
