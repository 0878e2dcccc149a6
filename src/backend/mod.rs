//! Array primitives the executor is written against.
//!
//! The einsum driver never touches array storage directly: every transpose,
//! reshape and product goes through a [`Backend`]. [`NdArrayBackend`] is the
//! CPU reference implementation over `ndarray`.

mod cpu;

pub use cpu::NdArrayBackend;
/// Half-precision element accepted by [`NdArrayBackend`].
pub use half::f16;

use alloc::vec::Vec;

use crate::error::EinsumResult;
use crate::shape::{Dim, Labels, Shape};

/// Tensor primitives required by the einsum executor.
///
/// Consuming methods take the tensor by value so backends can reuse storage;
/// caller-owned inputs are cloned by the driver before they are handed over.
pub trait Backend {
    type Tensor: Clone;

    /// Axis sizes; backends with dynamic shapes may report [`Dim::Deferred`].
    fn shape(&self, tensor: &Self::Tensor) -> Shape;

    /// Axis sizes of this particular tensor, with nothing deferred.
    fn dims(&self, tensor: &Self::Tensor) -> EinsumResult<Vec<usize>>;

    /// Reorders axes so that output axis `i` is input axis `perm[i]`.
    fn transpose(&self, tensor: Self::Tensor, perm: &[usize]) -> EinsumResult<Self::Tensor>;

    /// Reshapes in row-major order. A deferred target size, if any, is
    /// inferred from the element count.
    fn reshape(&self, tensor: Self::Tensor, shape: &[Dim]) -> EinsumResult<Self::Tensor>;

    /// Inserts a size-1 axis at `axis`.
    fn expand_dims(&self, tensor: Self::Tensor, axis: usize) -> EinsumResult<Self::Tensor>;

    /// Elementwise product with broadcasting of size-1 and missing leading axes.
    fn multiply(&self, lhs: &Self::Tensor, rhs: &Self::Tensor) -> EinsumResult<Self::Tensor>;

    /// Matrix product over the last two axes, batched over the leading ones.
    fn matmul(&self, lhs: &Self::Tensor, rhs: &Self::Tensor) -> EinsumResult<Self::Tensor>;

    /// Sums over the given axes, removing them.
    fn reduce_sum(&self, tensor: Self::Tensor, axes: &[usize]) -> EinsumResult<Self::Tensor>;

    /// Sums the diagonal of two equally sized axes, removing both.
    fn trace(&self, tensor: Self::Tensor, axis1: usize, axis2: usize) -> EinsumResult<Self::Tensor>;
}

/// A tensor together with the label of each of its axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand<T> {
    pub tensor: T,
    pub labels: Labels,
}

impl<T> Operand<T> {
    pub fn new(tensor: T, labels: impl Into<Labels>) -> Self {
        Self {
            tensor,
            labels: labels.into(),
        }
    }
}
