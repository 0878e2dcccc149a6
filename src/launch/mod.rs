//! Launch module for einsum operations.
//!
//! Provides the high-level API: evaluate an equation against a [`Backend`]
//! and report non-fatal diagnostics along the way.
//!
//! [`Backend`]: crate::backend::Backend

mod config;
mod diagnostics;
mod executor;
mod exponential;
mod reduction;

pub use config::EinsumConfig;
pub use diagnostics::{CapturingObserver, Diagnostic, DiagnosticObserver, TracingObserver};
pub use executor::{einsum, einsum_with_observer, execute_plan};
pub use exponential::exponential_space_einsum;
pub use reduction::reduce_pair;
