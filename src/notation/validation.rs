//! Shape validation against a resolved equation.

use hashbrown::HashMap;

use super::notation::ResolvedEquation;
use crate::error::{EinsumError, EinsumResult};
use crate::shape::{Dim, Shape};

/// How sizes of the same label on different operands are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// Known sizes must be equal.
    Exact,
    /// Known sizes must be equal unless one of them is 1.
    Broadcast,
}

/// Result of shape validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Size of every label.
    pub dim_map: HashMap<char, Dim>,
    /// Computed output shape.
    pub output_shape: Shape,
}

impl ValidationResult {
    /// Multiply-adds of summing every label at once, without any ordering.
    pub fn naive_cost(&self) -> Dim {
        Dim::product(self.dim_map.values().copied())
    }

    /// Number of output elements.
    pub fn output_elements(&self) -> Dim {
        Dim::product(self.output_shape.iter().copied())
    }
}

/// Validates operand shapes, requiring equal sizes for shared labels.
pub fn validate_shapes(
    equation: &ResolvedEquation,
    shapes: &[&[Dim]],
) -> EinsumResult<ValidationResult> {
    validate_shapes_with(equation, shapes, SizeRule::Exact)
}

/// Validates operand shapes under the given size rule.
pub fn validate_shapes_with(
    equation: &ResolvedEquation,
    shapes: &[&[Dim]],
    rule: SizeRule,
) -> EinsumResult<ValidationResult> {
    if shapes.len() != equation.num_inputs() {
        return Err(EinsumError::EquationArity {
            expected: equation.num_inputs(),
            got: shapes.len(),
        });
    }

    let dim_map = build_dimension_map(equation, shapes, rule)?;
    let output_shape = equation
        .output()
        .iter()
        .map(|c| dim_map.get(c).copied().unwrap_or(Dim::Deferred))
        .collect();

    Ok(ValidationResult {
        dim_map,
        output_shape,
    })
}

/// Describes operand shapes without checking them.
///
/// Each label takes the first known size found for it; operands whose rank
/// disagrees with their labels contribute only the overlapping prefix.
pub fn describe_shapes(equation: &ResolvedEquation, shapes: &[&[Dim]]) -> ValidationResult {
    let mut dim_map: HashMap<char, Dim> = HashMap::new();
    for (labels, shape) in equation.inputs().iter().zip(shapes) {
        for (&c, &dim) in labels.iter().zip(shape.iter()) {
            let entry = dim_map.entry(c).or_insert(dim);
            if !entry.is_known() {
                *entry = dim;
            }
        }
    }

    let output_shape = equation
        .output()
        .iter()
        .map(|c| dim_map.get(c).copied().unwrap_or(Dim::Deferred))
        .collect();
    ValidationResult {
        dim_map,
        output_shape,
    }
}

/// Builds a mapping from labels to sizes.
///
/// Deferred sizes are replaced by the first known size seen for the label.
/// Under [`SizeRule::Broadcast`] a size of 1 yields to any larger size.
pub fn build_dimension_map(
    equation: &ResolvedEquation,
    shapes: &[&[Dim]],
    rule: SizeRule,
) -> EinsumResult<HashMap<char, Dim>> {
    let mut dim_map: HashMap<char, Dim> = HashMap::new();

    for (labels, shape) in equation.inputs().iter().zip(shapes) {
        if labels.len() != shape.len() {
            return Err(EinsumError::RankMismatch {
                subscript: labels.iter().collect(),
                expected: labels.len(),
                got: shape.len(),
            });
        }

        for (&c, &dim) in labels.iter().zip(shape.iter()) {
            let entry = dim_map.entry(c).or_insert(dim);
            *entry = merge_dims(c, *entry, dim, rule)?;
        }
    }

    Ok(dim_map)
}

fn merge_dims(label: char, existing: Dim, dim: Dim, rule: SizeRule) -> EinsumResult<Dim> {
    match (existing, dim) {
        (Dim::Deferred, other) | (other, Dim::Deferred) => Ok(other),
        (Dim::Known(a), Dim::Known(b)) if a == b => Ok(existing),
        (Dim::Known(1), Dim::Known(_)) if rule == SizeRule::Broadcast => Ok(dim),
        (Dim::Known(_), Dim::Known(1)) if rule == SizeRule::Broadcast => Ok(existing),
        (Dim::Known(a), Dim::Known(b)) => Err(EinsumError::ShapeMismatch {
            label,
            expected: a,
            got: b,
        }),
    }
}
