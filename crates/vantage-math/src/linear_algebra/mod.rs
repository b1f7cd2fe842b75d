//! Linear algebra utilities.
//!
//! Matrices are stored row-major in a flat buffer. Conversions to and
//! from `nalgebra::DMatrix` are provided for interop.

mod cholesky;

pub use cholesky::{cholesky, Decomposition, LowerTriangular, PIVOT_TOLERANCE};

use std::ops::{Index, IndexMut};

use nalgebra::DMatrix;

use crate::error::{MathError, MathResult};

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Creates a zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates an identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Creates a square diagonal matrix.
    pub fn from_diagonal(diagonal: &[f64]) -> Self {
        let n = diagonal.len();
        let mut m = Self::zeros(n, n);
        for (i, d) in diagonal.iter().enumerate() {
            m[(i, i)] = *d;
        }
        m
    }

    /// Creates a matrix from a row-major slice.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> MathResult<Self> {
        Self::from_vec(rows, cols, data.to_vec())
    }

    /// Creates a matrix taking ownership of a row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> MathResult<Self> {
        if data.len() != rows * cols {
            return Err(MathError::BufferLength {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true for square matrices.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns true for 0×0 matrices.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major backing buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consumes the matrix, returning the row-major buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Borrows row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Main diagonal.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self[(i, i)]).collect()
    }

    /// Transpose.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// Returns true if the matrix is square and symmetric within `tolerance`.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        for i in 0..self.rows {
            for j in 0..i {
                if (self[(i, j)] - self[(j, i)]).abs() > tolerance {
                    return false;
                }
            }
        }
        true
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, v: &[f64]) -> MathResult<Vec<f64>> {
        if v.len() != self.cols {
            return Err(MathError::ShapeMismatch {
                left: (self.rows, self.cols),
                right: (v.len(), 1),
            });
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Matrix-matrix product.
    pub fn mul(&self, other: &DenseMatrix) -> MathResult<DenseMatrix> {
        if self.cols != other.rows {
            return Err(MathError::ShapeMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }
        let mut out = DenseMatrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out[(i, j)] += a * other[(k, j)];
                }
            }
        }
        Ok(out)
    }

    /// Converts to an `nalgebra` matrix.
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.data)
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

impl From<&DMatrix<f64>> for DenseMatrix {
    fn from(m: &DMatrix<f64>) -> Self {
        let (rows, cols) = m.shape();
        let mut out = DenseMatrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                out[(i, j)] = m[(i, j)];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_row_major_layout() {
        let m = DenseMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.transpose()[(2, 1)], 6.0);
    }

    #[test]
    fn test_bad_buffer_length() {
        assert!(DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_mul_vec_and_mul() {
        let a = DenseMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]).unwrap();
        assert_eq!(a.mul_vec(&[1.0, 1.0]).unwrap(), vec![3.0, 4.0]);
        assert!(a.mul_vec(&[1.0]).is_err());

        let product = a.mul(&DenseMatrix::identity(2)).unwrap();
        assert_eq!(product, a);
    }

    #[test]
    fn test_symmetry() {
        let s = DenseMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]).unwrap();
        assert!(s.is_symmetric(1e-12));
        let a = DenseMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.4, 1.0]).unwrap();
        assert!(!a.is_symmetric(1e-12));
    }

    #[test]
    fn test_nalgebra_round_trip() {
        let m = DenseMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let d = m.to_dmatrix();
        assert_relative_eq!(d[(1, 0)], 3.0);
        assert_eq!(DenseMatrix::from(&d), m);
    }
}
