//! Cholesky decomposition for covariance matrices.
//!
//! The factorization tolerates positive-semidefinite input: a pivot within
//! [`PIVOT_TOLERANCE`] (relative to the largest diagonal entry) is taken as
//! an exact zero and its column is zeroed. Perfectly correlated assets
//! therefore still factor. A clearly negative pivot, or a zero pivot with a
//! non-zero residual below it, means the matrix is not positive-semidefinite
//! and is reported as a [`Decomposition::NotPositiveSemidefinite`] variant.

use log::debug;

use super::DenseMatrix;
use crate::error::{MathError, MathResult};

/// Relative tolerance for treating a pivot as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Lower-triangular factor `L` with `L·Lᵗ = Σ`.
#[derive(Debug, Clone, PartialEq)]
pub struct LowerTriangular {
    factor: DenseMatrix,
    zero_pivots: usize,
}

impl LowerTriangular {
    /// Dimension of the factor.
    pub fn dim(&self) -> usize {
        self.factor.rows()
    }

    /// The factor as a dense matrix (upper triangle is zero).
    pub fn matrix(&self) -> &DenseMatrix {
        &self.factor
    }

    /// Number of pivots treated as zero (rank deficiency).
    pub fn zero_pivots(&self) -> usize {
        self.zero_pivots
    }

    /// Computes `out = L·z` touching only the lower triangle.
    ///
    /// # Panics
    ///
    /// Panics if `z` or `out` is shorter than the factor dimension.
    pub fn apply(&self, z: &[f64], out: &mut [f64]) {
        let n = self.dim();
        for i in 0..n {
            let row = self.factor.row(i);
            let mut sum = 0.0;
            for k in 0..=i {
                sum += row[k] * z[k];
            }
            out[i] = sum;
        }
    }

    /// Rebuilds `L·Lᵗ`.
    pub fn reconstruct(&self) -> DenseMatrix {
        let n = self.dim();
        let mut out = DenseMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..=j {
                    sum += self.factor[(i, k)] * self.factor[(j, k)];
                }
                out[(i, j)] = sum;
                out[(j, i)] = sum;
            }
        }
        out
    }
}

/// Outcome of a Cholesky factorization.
#[derive(Debug, Clone, PartialEq)]
pub enum Decomposition {
    /// The matrix factored.
    Factored(LowerTriangular),
    /// The matrix is not positive-semidefinite.
    NotPositiveSemidefinite {
        /// Row at which the factorization broke down.
        row: usize,
        /// Offending pivot (or residual) value.
        pivot: f64,
    },
}

impl Decomposition {
    /// Returns the factor, if any.
    pub fn factor(&self) -> Option<&LowerTriangular> {
        match self {
            Decomposition::Factored(l) => Some(l),
            Decomposition::NotPositiveSemidefinite { .. } => None,
        }
    }

    /// Returns true if the matrix factored.
    pub fn is_factored(&self) -> bool {
        matches!(self, Decomposition::Factored(_))
    }
}

/// Factorizes a symmetric matrix as `L·Lᵗ`, reading only its lower triangle.
///
/// # Errors
///
/// Returns an error only for non-square input. Failure to factor is the
/// [`Decomposition::NotPositiveSemidefinite`] variant.
pub fn cholesky(matrix: &DenseMatrix) -> MathResult<Decomposition> {
    if !matrix.is_square() {
        return Err(MathError::NotSquare {
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }

    let n = matrix.rows();
    let scale = matrix
        .diagonal()
        .iter()
        .fold(0.0_f64, |acc, d| acc.max(d.abs()));
    let tolerance = PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    let mut l = DenseMatrix::zeros(n, n);
    let mut zero_pivots = 0;

    for j in 0..n {
        let mut pivot = matrix[(j, j)];
        for k in 0..j {
            pivot -= l[(j, k)] * l[(j, k)];
        }

        if !pivot.is_finite() || pivot < -tolerance {
            debug!("cholesky: negative pivot {pivot:.3e} at row {j}");
            return Ok(Decomposition::NotPositiveSemidefinite { row: j, pivot });
        }

        if pivot <= tolerance {
            // Zero pivot: the column below must vanish for a semidefinite matrix.
            for i in (j + 1)..n {
                let mut residual = matrix[(i, j)];
                for k in 0..j {
                    residual -= l[(i, k)] * l[(j, k)];
                }
                if residual.abs() > tolerance.sqrt() * scale.sqrt() {
                    debug!("cholesky: residual {residual:.3e} below zero pivot at row {j}");
                    return Ok(Decomposition::NotPositiveSemidefinite {
                        row: i,
                        pivot: residual,
                    });
                }
            }
            zero_pivots += 1;
            continue;
        }

        let diag = pivot.sqrt();
        l[(j, j)] = diag;
        for i in (j + 1)..n {
            let mut sum = matrix[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            l[(i, j)] = sum / diag;
        }
    }

    Ok(Decomposition::Factored(LowerTriangular {
        factor: l,
        zero_pivots,
    }))
}
