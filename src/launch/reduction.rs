//! Pairwise reduction of two labelled operands.
//!
//! A reduction is a transpose of each side into
//! `(preserved, broadcast, summed)` order followed by either a reshape to
//! three blocks and a batched matmul over the preserved axes, or a
//! broadcasting multiply when nothing is summed or a shared axis has size 1
//! on one side only.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::backend::{Backend, Operand};
use crate::error::{EinsumError, EinsumResult};
use crate::optimization::AxisPartition;
use crate::shape::{Dim, Labels};

/// Contracts two operands, summing the shared labels in `axes_to_sum`.
///
/// Sizes are taken from [`Backend::dims`], so deferred sizes are resolved
/// here. A shared label must have the same size on both sides unless one of
/// them is 1, which broadcasts.
///
/// The result labels are the preserved labels, then the labels only `lhs`
/// has, then the labels only `rhs` has, each group sorted. The caller
/// permutes the final operand into the requested output order.
pub fn reduce_pair<B: Backend>(
    backend: &B,
    lhs: Operand<B::Tensor>,
    rhs: Operand<B::Tensor>,
    axes_to_sum: &BTreeSet<char>,
) -> EinsumResult<Operand<B::Tensor>> {
    let lhs_dims = checked_dims(backend, &lhs)?;
    let rhs_dims = checked_dims(backend, &rhs)?;

    if let Some(&label) = axes_to_sum
        .iter()
        .find(|c| !lhs.labels.contains(c) || !rhs.labels.contains(c))
    {
        return Err(EinsumError::shape(alloc::format!(
            "summed axis '{}' must appear in both operands",
            label
        )));
    }
    let mut broadcasts = false;
    for (&label, &size) in lhs.labels.iter().zip(&lhs_dims) {
        let Some(other) = size_of(label, &rhs.labels, &rhs_dims) else {
            continue;
        };
        if size != other {
            if size != 1 && other != 1 {
                return Err(EinsumError::ShapeMismatch {
                    label,
                    expected: size,
                    got: other,
                });
            }
            broadcasts = true;
        }
    }

    let partition = AxisPartition::new(&lhs.labels, &rhs.labels, axes_to_sum);
    let result_labels = partition.result_labels();
    tracing::trace!(
        "reduce {:?} x {:?}, summing {:?}",
        lhs.labels.as_slice(),
        rhs.labels.as_slice(),
        partition.summed.as_slice()
    );

    let tensor = if partition.is_outer_product() || broadcasts {
        broadcast_product(backend, lhs, rhs, &partition)?
    } else {
        folded_product(backend, lhs, &lhs_dims, rhs, &rhs_dims, &partition)?
    };

    Ok(Operand::new(tensor, result_labels))
}

/// Multiplies in `(preserved, lhs, rhs, summed)` order with singleton axes
/// filling the gaps, then sums the trailing summed axes.
fn broadcast_product<B: Backend>(
    backend: &B,
    lhs: Operand<B::Tensor>,
    rhs: Operand<B::Tensor>,
    partition: &AxisPartition,
) -> EinsumResult<B::Tensor> {
    let p = partition.preserved.len();
    let lhs_width = p + partition.lhs_broadcast.len();
    let kept = lhs_width + partition.rhs_broadcast.len();

    let lhs_order = concat(&[&partition.preserved, &partition.lhs_broadcast, &partition.summed]);
    let rhs_order = concat(&[&partition.preserved, &partition.rhs_broadcast, &partition.summed]);
    let mut lhs_tensor = permute_to(backend, lhs.tensor, &lhs.labels, &lhs_order)?;
    let mut rhs_tensor = permute_to(backend, rhs.tensor, &rhs.labels, &rhs_order)?;

    for _ in 0..partition.rhs_broadcast.len() {
        lhs_tensor = backend.expand_dims(lhs_tensor, lhs_width)?;
    }
    for _ in 0..partition.lhs_broadcast.len() {
        rhs_tensor = backend.expand_dims(rhs_tensor, p)?;
    }
    let product = backend.multiply(&lhs_tensor, &rhs_tensor)?;

    if partition.summed.is_empty() {
        Ok(product)
    } else {
        let axes: Vec<usize> = (kept..kept + partition.summed.len()).collect();
        backend.reduce_sum(product, &axes)
    }
}

/// Folds each side to `(preserved, rows, summed)` / `(preserved, summed,
/// cols)`, multiplies, and unfolds the rows and columns again.
fn folded_product<B: Backend>(
    backend: &B,
    lhs: Operand<B::Tensor>,
    lhs_dims: &[usize],
    rhs: Operand<B::Tensor>,
    rhs_dims: &[usize],
    partition: &AxisPartition,
) -> EinsumResult<B::Tensor> {
    let lhs_order = concat(&[&partition.preserved, &partition.lhs_broadcast, &partition.summed]);
    let rhs_order = concat(&[&partition.preserved, &partition.summed, &partition.rhs_broadcast]);
    let lhs_tensor = permute_to(backend, lhs.tensor, &lhs.labels, &lhs_order)?;
    let rhs_tensor = permute_to(backend, rhs.tensor, &rhs.labels, &rhs_order)?;

    let sizes = |labels: &[char], from_labels: &[char], from_dims: &[usize]| -> Vec<usize> {
        labels
            .iter()
            .filter_map(|&c| size_of(c, from_labels, from_dims))
            .collect()
    };
    let preserved = sizes(&partition.preserved, &lhs.labels, lhs_dims);
    let rows = sizes(&partition.lhs_broadcast, &lhs.labels, lhs_dims);
    let cols = sizes(&partition.rhs_broadcast, &rhs.labels, rhs_dims);
    let summed: usize = sizes(&partition.summed, &lhs.labels, lhs_dims).iter().product();

    let lhs_target = joined(&preserved, &[rows.iter().product(), summed]);
    let rhs_target = joined(&preserved, &[summed, cols.iter().product()]);
    let lhs_tensor = reshape_if_needed(backend, lhs_tensor, &lhs_target)?;
    let rhs_tensor = reshape_if_needed(backend, rhs_tensor, &rhs_target)?;

    let product = backend.matmul(&lhs_tensor, &rhs_tensor)?;
    let unpacked = joined(&preserved, &joined(&rows, &cols));
    reshape_if_needed(backend, product, &unpacked)
}

/// Run-time sizes of an operand, checked against its labels.
fn checked_dims<B: Backend>(
    backend: &B,
    operand: &Operand<B::Tensor>,
) -> EinsumResult<Vec<usize>> {
    let dims = backend.dims(&operand.tensor)?;
    if dims.len() != operand.labels.len() {
        return Err(EinsumError::RankMismatch {
            subscript: operand.labels.iter().collect(),
            expected: operand.labels.len(),
            got: dims.len(),
        });
    }
    let mut seen = BTreeSet::new();
    if let Some(&label) = operand.labels.iter().find(|c| !seen.insert(**c)) {
        return Err(EinsumError::shape(alloc::format!(
            "axis '{}' repeats within one operand",
            label
        )));
    }
    Ok(dims)
}

fn size_of(label: char, labels: &[char], dims: &[usize]) -> Option<usize> {
    labels
        .iter()
        .position(|&c| c == label)
        .and_then(|i| dims.get(i).copied())
}

fn concat(groups: &[&Labels]) -> Labels {
    groups.iter().flat_map(|g| g.iter().copied()).collect()
}

fn joined(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter().chain(b).copied().collect()
}

/// Transposes `tensor` from `current` label order to `target`, unless they agree.
pub(crate) fn permute_to<B: Backend>(
    backend: &B,
    tensor: B::Tensor,
    current: &[char],
    target: &[char],
) -> EinsumResult<B::Tensor> {
    let perm: Vec<usize> = target
        .iter()
        .map(|c| {
            current.iter().position(|x| x == c).ok_or_else(|| {
                EinsumError::shape(alloc::format!("axis '{}' missing from operand", c))
            })
        })
        .collect::<EinsumResult<_>>()?;

    if perm.iter().enumerate().all(|(i, &p)| i == p) {
        Ok(tensor)
    } else {
        backend.transpose(tensor, &perm)
    }
}

/// Reshapes unless the tensor already has the target sizes.
fn reshape_if_needed<B: Backend>(
    backend: &B,
    tensor: B::Tensor,
    target: &[usize],
) -> EinsumResult<B::Tensor> {
    if backend.dims(&tensor)? == target {
        Ok(tensor)
    } else {
        let target: Vec<Dim> = target.iter().map(|&d| Dim::Known(d)).collect();
        backend.reshape(tensor, &target)
    }
}
