//! Einsum execution engine.
//!
//! Orchestrates resolution, planning and dispatch to the backend.

use alloc::vec::Vec;

use super::config::EinsumConfig;
use super::diagnostics::{Diagnostic, DiagnosticObserver, TracingObserver};
use super::exponential::exponential_space_einsum;
use super::reduction::{permute_to, reduce_pair};
use crate::backend::{Backend, Operand};
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{ResolvedEquation, resolve_equation};
use crate::optimization::{ExecutionPlan, create_plan, summable_labels};
use crate::pattern::Route;
use crate::shape::{Dim, Labels, Shape};

/// Evaluates an einsum equation.
///
/// Diagnostics are logged through `tracing`; use [`einsum_with_observer`]
/// to receive them directly.
///
/// # Arguments
/// * `backend` - Array primitives to run on
/// * `equation` - Einsum equation (e.g., "ij,jk->ik")
/// * `inputs` - Operands, one per input subscript; they are never modified
/// * `config` - Optional configuration
///
/// # Example
///
/// ```ignore
/// let backend = NdArrayBackend::<f32>::new();
/// let c = einsum(&backend, "ij,jk->ik", &[a, b], None)?;
/// ```
pub fn einsum<B: Backend>(
    backend: &B,
    equation: &str,
    inputs: &[B::Tensor],
    config: Option<EinsumConfig>,
) -> EinsumResult<B::Tensor> {
    einsum_with_observer(backend, equation, inputs, config, &TracingObserver)
}

/// Evaluates an einsum equation, reporting diagnostics to `observer`.
pub fn einsum_with_observer<B: Backend>(
    backend: &B,
    equation: &str,
    inputs: &[B::Tensor],
    config: Option<EinsumConfig>,
    observer: &dyn DiagnosticObserver,
) -> EinsumResult<B::Tensor> {
    let config = config.unwrap_or_default();

    let shapes: Vec<Shape> = inputs.iter().map(|t| backend.shape(t)).collect();
    let ranks: Vec<Option<&[Dim]>> = shapes.iter().map(|s| Some(s.as_slice())).collect();
    let resolved = resolve_equation(equation, &ranks)?;

    let refs: Vec<&[Dim]> = shapes.iter().map(|s| s.as_slice()).collect();
    let plan = create_plan(&resolved, &refs, &config, observer)?;

    execute_plan(backend, &resolved, &plan, inputs, observer)
}

/// Executes a plan built for `equation`.
///
/// Useful when the same equation runs repeatedly on equally shaped operands.
pub fn execute_plan<B: Backend>(
    backend: &B,
    equation: &ResolvedEquation,
    plan: &ExecutionPlan,
    inputs: &[B::Tensor],
    observer: &dyn DiagnosticObserver,
) -> EinsumResult<B::Tensor> {
    if inputs.len() != equation.num_inputs() {
        return Err(EinsumError::EquationArity {
            expected: equation.num_inputs(),
            got: inputs.len(),
        });
    }
    let operands: Vec<Operand<B::Tensor>> = inputs
        .iter()
        .zip(equation.inputs())
        .map(|(tensor, labels)| Operand::new(tensor.clone(), labels.clone()))
        .collect();

    match plan.route() {
        Route::SelfTrace => execute_self_trace(backend, operands),
        Route::ExponentialSpace { label } => {
            observer.emit(&Diagnostic::ExponentialFallback { label });
            exponential_space_einsum(backend, operands, equation.output())
        }
        Route::Pairwise => execute_pairwise(backend, equation, plan, operands),
    }
}

fn execute_pairwise<B: Backend>(
    backend: &B,
    equation: &ResolvedEquation,
    plan: &ExecutionPlan,
    operands: Vec<Operand<B::Tensor>>,
) -> EinsumResult<B::Tensor> {
    let output = equation.output();

    let mut survivors = plan.sequence().replay(operands, |_, lhs, rhs| {
        let axes_to_sum = summable_labels(&lhs.labels, &rhs.labels, output);
        reduce_pair(backend, lhs, rhs, &axes_to_sum)
    })?;
    let survivor = match (survivors.pop(), survivors.is_empty()) {
        (Some(survivor), true) => survivor,
        _ => {
            return Err(EinsumError::invalid_sequence(
                plan.sequence().len(),
                "sequence does not reduce the operands to one",
            ));
        }
    };

    let survivor = sum_unused(backend, survivor, output)?;

    let mut have: Vec<char> = survivor.labels.to_vec();
    let mut want: Vec<char> = output.to_vec();
    have.sort_unstable();
    want.sort_unstable();
    if have != want {
        return Err(EinsumError::InvalidEquation {
            equation: alloc::format!("{}", equation),
            message: alloc::format!(
                "reduction leaves axes [{}], output needs [{}]",
                have.iter().collect::<alloc::string::String>(),
                want.iter().collect::<alloc::string::String>()
            ),
        });
    }

    permute_to(backend, survivor.tensor, &survivor.labels, output)
}

/// Sums every axis of `operand` whose label the output does not keep.
fn sum_unused<B: Backend>(
    backend: &B,
    operand: Operand<B::Tensor>,
    output: &[char],
) -> EinsumResult<Operand<B::Tensor>> {
    let axes: Vec<usize> = operand
        .labels
        .iter()
        .enumerate()
        .filter(|(_, c)| !output.contains(c))
        .map(|(axis, _)| axis)
        .collect();
    if axes.is_empty() {
        return Ok(operand);
    }

    tracing::trace!("summing axes {:?} of {:?}", axes, operand.labels.as_slice());
    let labels: Labels = operand
        .labels
        .iter()
        .copied()
        .filter(|c| output.contains(c))
        .collect();
    let tensor = backend.reduce_sum(operand.tensor, &axes)?;
    Ok(Operand::new(tensor, labels))
}

/// Sums a palindromic operand such as `ijji` by tracing the middle pair
/// until no axis is left.
fn execute_self_trace<B: Backend>(
    backend: &B,
    operands: Vec<Operand<B::Tensor>>,
) -> EinsumResult<B::Tensor> {
    let Some(operand) = operands.into_iter().next() else {
        return Err(EinsumError::shape("self-trace needs one operand"));
    };
    let dims = backend.dims(&operand.tensor)?;
    let rank = dims.len();
    if rank != operand.labels.len() {
        return Err(EinsumError::RankMismatch {
            subscript: operand.labels.iter().collect(),
            expected: operand.labels.len(),
            got: rank,
        });
    }
    // Axis i is traced against axis rank - 1 - i.
    let pairs = operand.labels.iter().zip(&dims).zip(dims.iter().rev());
    for ((&label, &size), &partner) in pairs.take(rank / 2) {
        if size != partner {
            return Err(EinsumError::ShapeMismatch {
                label,
                expected: size,
                got: partner,
            });
        }
    }

    let mut tensor = operand.tensor;
    let mut rank = rank;
    while rank >= 2 {
        let mid = rank / 2;
        tensor = backend.trace(tensor, mid - 1, mid)?;
        rank -= 2;
    }
    Ok(tensor)
}
