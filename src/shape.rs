//! Axis sizes, shapes and label strings.

use core::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Size of one axis: statically known, or only resolved at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Known(usize),
    Deferred,
}

/// Ordered axis sizes of one operand.
pub type Shape = SmallVec<[Dim; 6]>;

/// Ordered axis labels of one operand.
pub type Labels = SmallVec<[char; 8]>;

impl Dim {
    /// Returns the size if statically known.
    #[inline]
    pub fn known(self) -> Option<usize> {
        match self {
            Dim::Known(d) => Some(d),
            Dim::Deferred => None,
        }
    }

    #[inline]
    pub fn is_known(self) -> bool {
        matches!(self, Dim::Known(_))
    }

    /// Deferred sizes are assumed compatible with anything.
    #[inline]
    pub fn compatible(self, other: Dim) -> bool {
        match (self, other) {
            (Dim::Known(a), Dim::Known(b)) => a == b,
            _ => true,
        }
    }

    /// Product of sizes; deferred if any factor is deferred.
    pub fn product<I: IntoIterator<Item = Dim>>(dims: I) -> Dim {
        let mut total: usize = 1;
        for dim in dims {
            match dim {
                Dim::Known(d) => total = total.saturating_mul(d),
                Dim::Deferred => return Dim::Deferred,
            }
        }
        Dim::Known(total)
    }

    /// Saturating sum; deferred if any term is deferred.
    pub fn sum<I: IntoIterator<Item = Dim>>(dims: I) -> Dim {
        let mut total: usize = 0;
        for dim in dims {
            match dim {
                Dim::Known(d) => total = total.saturating_add(d),
                Dim::Deferred => return Dim::Deferred,
            }
        }
        Dim::Known(total)
    }

    /// Size used for cost ranking; deferred ranks as the most expensive.
    #[inline]
    pub fn cost(self) -> u64 {
        match self {
            Dim::Known(d) => d as u64,
            Dim::Deferred => u64::MAX,
        }
    }
}

impl From<usize> for Dim {
    fn from(value: usize) -> Self {
        Dim::Known(value)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(d) => write!(f, "{}", d),
            Dim::Deferred => write!(f, "?"),
        }
    }
}

/// Builds a fully known shape.
pub fn shape_of(dims: &[usize]) -> Shape {
    dims.iter().map(|&d| Dim::Known(d)).collect()
}

/// Builds a label string from text.
pub fn labels_of(text: &str) -> Labels {
    text.chars().collect()
}

/// True if any axis size is deferred.
pub fn has_deferred(shape: &[Dim]) -> bool {
    shape.iter().any(|d| !d.is_known())
}
