//! A dynamically sized vector of `Real`s.
//!
//! Thin wrapper around `nalgebra::DVector` exposing just the operations the
//! optimizer and the fitter need.

use cc_core::Real;
use nalgebra::DVector;
use std::ops::{Index, IndexMut};

/// A dynamically sized vector of `Real` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Array(DVector<Real>);

impl Array {
    /// An array of `n` zeros.
    pub fn zeros(n: usize) -> Self {
        Array(DVector::zeros(n))
    }

    /// Build from a slice.
    pub fn from_slice(data: &[Real]) -> Self {
        Array(DVector::from_column_slice(data))
    }

    /// Build from a `Vec` without copying.
    pub fn from_vec(data: Vec<Real>) -> Self {
        Array(DVector::from_vec(data))
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// View as a slice.
    pub fn as_slice(&self) -> &[Real] {
        self.0.as_slice()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> Real {
        self.0.norm()
    }

    /// Squared Euclidean norm.
    pub fn norm_squared(&self) -> Real {
        self.0.norm_squared()
    }

    /// Largest absolute element, or 0 for an empty array.
    pub fn sup_norm(&self) -> Real {
        self.0.iter().fold(0.0, |m, &v| m.max(v.abs()))
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &Real> {
        self.0.iter()
    }

    /// Borrow the underlying `nalgebra` vector.
    pub fn inner(&self) -> &DVector<Real> {
        &self.0
    }
}

impl From<Vec<Real>> for Array {
    fn from(v: Vec<Real>) -> Self {
        Array::from_vec(v)
    }
}

impl From<DVector<Real>> for Array {
    fn from(v: DVector<Real>) -> Self {
        Array(v)
    }
}

impl Index<usize> for Array {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        &self.0[i]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn construction_and_indexing() {
        let mut a = Array::from_slice(&[1.0, -2.0, 3.0]);
        assert_eq!(a.size(), 3);
        a[1] = 2.0;
        assert_abs_diff_eq!(a[1], 2.0);
    }

    #[test]
    fn sup_norm_is_max_abs() {
        let a = Array::from_slice(&[0.5, -4.0, 3.0]);
        assert_abs_diff_eq!(a.sup_norm(), 4.0);
        assert_abs_diff_eq!(Array::zeros(0).sup_norm(), 0.0);
    }
}
