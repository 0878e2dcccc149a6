//! Einsum notation parsing, resolution and shape validation.
//!
//! Supports the full einsum grammar:
//! - Basic: `ij,jk->ik`
//! - Ellipsis: `...ij,...jk->...ik`
//! - Implicit output: `ij,jk` (implies `->ik`)
//! - Self-trace: `ii`

mod notation;
mod parser;
mod resolve;
mod subscript;
pub mod validation;

pub use notation::{EinsumNotation, ResolvedEquation};
pub use parser::parse_einsum;
pub use resolve::{resolve, resolve_equation};
pub use subscript::{Index, Subscript};
pub use validation::{
    SizeRule, ValidationResult, describe_shapes, validate_shapes, validate_shapes_with,
};
