//! Broadcast-multiply-then-reduce evaluation of a whole equation.
//!
//! Used when a summed label is shared by more than two operands, which a
//! sequence of pairwise reductions cannot express. Every operand is aligned
//! to one canonical axis order, all of them are multiplied together and the
//! summed axes are reduced in one go, so memory grows with the product of
//! every label size.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use super::reduction::permute_to;
use crate::backend::{Backend, Operand};
use crate::error::{EinsumError, EinsumResult};
use crate::shape::Labels;

/// Evaluates `inputs -> output` in the full label space.
///
/// Sizes of a shared label must agree unless one of them is 1.
pub fn exponential_space_einsum<B: Backend>(
    backend: &B,
    operands: Vec<Operand<B::Tensor>>,
    output: &[char],
) -> EinsumResult<B::Tensor> {
    let mut unique = BTreeSet::new();
    if output.iter().any(|c| !unique.insert(*c)) {
        return Err(EinsumError::InvalidEquation {
            equation: equation_text(&operands, output),
            message: "output repeats a label".into(),
        });
    }

    // Non-output labels first so that the reduction covers a leading block.
    let all: BTreeSet<char> = operands.iter().flat_map(|op| op.labels.iter().copied()).collect();
    let mut canonical: Labels = all.iter().copied().filter(|c| !output.contains(c)).collect();
    let num_summed = canonical.len();
    canonical.extend(unique.iter().copied());

    check_sizes(backend, &operands)?;

    let mut product: Option<B::Tensor> = None;
    for operand in operands {
        let own: Labels = canonical
            .iter()
            .copied()
            .filter(|c| operand.labels.contains(c))
            .collect();
        let mut tensor = permute_to(backend, operand.tensor, &operand.labels, &own)?;
        for (axis, c) in canonical.iter().enumerate() {
            if !own.contains(c) {
                tensor = backend.expand_dims(tensor, axis)?;
            }
        }
        product = Some(match product {
            Some(acc) => backend.multiply(&acc, &tensor)?,
            None => tensor,
        });
    }
    let product =
        product.ok_or_else(|| EinsumError::shape("cannot evaluate an equation without operands"))?;

    let summed_axes: Vec<usize> = (0..num_summed).collect();
    let reduced = if summed_axes.is_empty() {
        product
    } else {
        backend.reduce_sum(product, &summed_axes)?
    };

    let sorted_output = &canonical[num_summed..];
    permute_to(backend, reduced, sorted_output, output)
}

/// Ranks must match labels; sizes of a label must agree, ignoring 1s.
fn check_sizes<B: Backend>(backend: &B, operands: &[Operand<B::Tensor>]) -> EinsumResult<()> {
    let mut sizes: HashMap<char, usize> = HashMap::new();
    for operand in operands {
        let dims = backend.dims(&operand.tensor)?;
        if dims.len() != operand.labels.len() {
            return Err(EinsumError::RankMismatch {
                subscript: operand.labels.iter().collect(),
                expected: operand.labels.len(),
                got: dims.len(),
            });
        }
        for (&c, &size) in operand.labels.iter().zip(&dims) {
            if size == 1 {
                continue;
            }
            match sizes.get(&c) {
                Some(&seen) if seen != size => {
                    return Err(EinsumError::ShapeMismatch {
                        label: c,
                        expected: seen,
                        got: size,
                    });
                }
                Some(_) => {}
                None => {
                    sizes.insert(c, size);
                }
            }
        }
    }
    Ok(())
}

fn equation_text<T>(operands: &[Operand<T>], output: &[char]) -> String {
    let inputs: Vec<String> = operands.iter().map(|op| op.labels.iter().collect()).collect();
    let output: String = output.iter().collect();
    alloc::format!("{}->{}", inputs.join(","), output)
}
