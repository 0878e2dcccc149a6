//! CPU reference backend over `ndarray`.

use alloc::vec::Vec;
use core::marker::PhantomData;

use ndarray::{Array3, ArrayD, ArrayViewD, Axis, IxDyn, LinalgScalar, Zip};

use super::Backend;
use crate::error::{EinsumError, EinsumResult};
use crate::shape::{Dim, Shape};

/// [`Backend`] over dynamically ranked `ndarray` arrays.
///
/// Works for any [`LinalgScalar`] element: floats, integers and `half::f16`.
#[derive(Debug, Clone, Copy)]
pub struct NdArrayBackend<E> {
    _element: PhantomData<E>,
}

impl<E> NdArrayBackend<E> {
    pub fn new() -> Self {
        Self {
            _element: PhantomData,
        }
    }
}

impl<E> Default for NdArrayBackend<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn shape_error(err: ndarray::ShapeError) -> EinsumError {
    EinsumError::backend(alloc::format!("{}", err))
}

/// Row-major copy unless the array already is.
fn standard<E: LinalgScalar>(tensor: ArrayD<E>) -> ArrayD<E> {
    if tensor.is_standard_layout() {
        tensor
    } else {
        tensor.as_standard_layout().into_owned()
    }
}

/// Shape both operands broadcast to, aligning trailing axes.
fn co_broadcast(lhs: &[usize], rhs: &[usize]) -> EinsumResult<Vec<usize>> {
    let rank = lhs.len().max(rhs.len());
    let mut out = alloc::vec![1; rank];
    for (i, slot) in out.iter_mut().enumerate() {
        let l = (i + lhs.len()).checked_sub(rank).map_or(1, |j| lhs[j]);
        let r = (i + rhs.len()).checked_sub(rank).map_or(1, |j| rhs[j]);
        *slot = match (l, r) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(EinsumError::backend(alloc::format!(
                    "cannot broadcast {:?} with {:?}",
                    lhs, rhs
                )));
            }
        };
    }
    Ok(out)
}

impl<E: LinalgScalar> Backend for NdArrayBackend<E> {
    type Tensor = ArrayD<E>;

    fn shape(&self, tensor: &Self::Tensor) -> Shape {
        tensor.shape().iter().map(|&d| Dim::Known(d)).collect()
    }

    fn dims(&self, tensor: &Self::Tensor) -> EinsumResult<Vec<usize>> {
        Ok(tensor.shape().to_vec())
    }

    fn transpose(&self, tensor: Self::Tensor, perm: &[usize]) -> EinsumResult<Self::Tensor> {
        let mut seen = alloc::vec![false; tensor.ndim()];
        let valid = perm.len() == tensor.ndim()
            && perm
                .iter()
                .all(|&p| p < seen.len() && !core::mem::replace(&mut seen[p], true));
        if !valid {
            return Err(EinsumError::backend(alloc::format!(
                "{:?} is not a permutation of {} axes",
                perm,
                tensor.ndim()
            )));
        }
        Ok(tensor.permuted_axes(IxDyn(perm)))
    }

    fn reshape(&self, tensor: Self::Tensor, shape: &[Dim]) -> EinsumResult<Self::Tensor> {
        let known: usize = shape.iter().filter_map(|d| d.known()).product();
        let deferred = shape.iter().filter(|d| !d.is_known()).count();

        let inferred = match deferred {
            0 => 0,
            1 if known != 0 && tensor.len() % known == 0 => tensor.len() / known,
            _ => {
                return Err(EinsumError::backend(alloc::format!(
                    "cannot infer reshape of {:?} to {:?}",
                    tensor.shape(),
                    shape
                )));
            }
        };
        let target: Vec<usize> = shape.iter().map(|d| d.known().unwrap_or(inferred)).collect();

        standard(tensor)
            .into_shape_with_order(IxDyn(&target))
            .map_err(shape_error)
    }

    fn expand_dims(&self, tensor: Self::Tensor, axis: usize) -> EinsumResult<Self::Tensor> {
        if axis > tensor.ndim() {
            return Err(EinsumError::backend(alloc::format!(
                "axis {} out of range for rank {}",
                axis,
                tensor.ndim()
            )));
        }
        Ok(tensor.insert_axis(Axis(axis)))
    }

    fn multiply(&self, lhs: &Self::Tensor, rhs: &Self::Tensor) -> EinsumResult<Self::Tensor> {
        let out = IxDyn(&co_broadcast(lhs.shape(), rhs.shape())?);
        let (l, r) = match (lhs.broadcast(out.clone()), rhs.broadcast(out)) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(EinsumError::backend("broadcast failed")),
        };
        Ok(Zip::from(l).and(r).map_collect(|&a, &b| a * b))
    }

    fn matmul(&self, lhs: &Self::Tensor, rhs: &Self::Tensor) -> EinsumResult<Self::Tensor> {
        let rank = lhs.ndim();
        if rank < 2 || rhs.ndim() != rank || lhs.shape()[..rank - 2] != rhs.shape()[..rank - 2] {
            return Err(EinsumError::backend(alloc::format!(
                "cannot batch-multiply {:?} by {:?}",
                lhs.shape(),
                rhs.shape()
            )));
        }
        let (m, k) = (lhs.shape()[rank - 2], lhs.shape()[rank - 1]);
        let (k2, n) = (rhs.shape()[rank - 2], rhs.shape()[rank - 1]);
        if k != k2 {
            return Err(EinsumError::backend(alloc::format!(
                "inner sizes differ: {} vs {}",
                k, k2
            )));
        }
        let batch_shape = &lhs.shape()[..rank - 2];
        let batch: usize = batch_shape.iter().product();

        let lhs = lhs.as_standard_layout();
        let rhs = rhs.as_standard_layout();
        let lhs = lhs.view().into_shape_with_order((batch, m, k)).map_err(shape_error)?;
        let rhs = rhs.view().into_shape_with_order((batch, k, n)).map_err(shape_error)?;

        let mut out = Array3::<E>::zeros((batch, m, n));
        for b in 0..batch {
            let product = lhs.index_axis(Axis(0), b).dot(&rhs.index_axis(Axis(0), b));
            out.index_axis_mut(Axis(0), b).assign(&product);
        }

        let mut result_shape = batch_shape.to_vec();
        result_shape.extend([m, n]);
        out.into_shape_with_order(IxDyn(&result_shape))
            .map_err(shape_error)
    }

    fn reduce_sum(&self, tensor: Self::Tensor, axes: &[usize]) -> EinsumResult<Self::Tensor> {
        let mut axes = axes.to_vec();
        axes.sort_unstable_by(|a, b| b.cmp(a));
        axes.dedup();
        if axes.first().is_some_and(|&a| a >= tensor.ndim()) {
            return Err(EinsumError::backend(alloc::format!(
                "reduction axes {:?} out of range for rank {}",
                axes,
                tensor.ndim()
            )));
        }

        // Descending order keeps the remaining axis numbers valid.
        let mut tensor = tensor;
        for axis in axes {
            tensor = tensor.sum_axis(Axis(axis));
        }
        Ok(tensor)
    }

    fn trace(&self, tensor: Self::Tensor, axis1: usize, axis2: usize) -> EinsumResult<Self::Tensor> {
        let rank = tensor.ndim();
        if axis1 == axis2 || axis1 >= rank || axis2 >= rank {
            return Err(EinsumError::backend(alloc::format!(
                "invalid trace axes ({}, {}) for rank {}",
                axis1, axis2, rank
            )));
        }
        let size = tensor.shape()[axis1];
        if tensor.shape()[axis2] != size {
            return Err(EinsumError::backend(alloc::format!(
                "trace axes differ in size: {} vs {}",
                size,
                tensor.shape()[axis2]
            )));
        }

        let mut perm: Vec<usize> = (0..rank).filter(|&a| a != axis1 && a != axis2).collect();
        let rest: Vec<usize> = perm.iter().map(|&a| tensor.shape()[a]).collect();
        perm.extend([axis1, axis2]);
        let permuted: ArrayViewD<'_, E> = tensor.view().permuted_axes(IxDyn(&perm));

        let mut out = ArrayD::<E>::zeros(IxDyn(&rest));
        for d in 0..size {
            let diagonal = permuted
                .clone()
                .index_axis_move(Axis(rank - 1), d)
                .index_axis_move(Axis(rank - 2), d);
            out.zip_mut_with(&diagonal, |acc, &x| *acc = *acc + x);
        }
        Ok(out)
    }
}
