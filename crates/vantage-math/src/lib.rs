//! # Vantage Math
//!
//! Mathematical utilities for the Vantage value-at-risk engine.
//!
//! This crate provides:
//!
//! - **Linear Algebra**: Row-major dense matrices and a semidefinite-tolerant
//!   Cholesky decomposition
//! - **Statistics**: Sample mean, covariance, correlation and return conversion
//! - **Random**: Injectable, seedable random streams and standard-normal samplers
//!
//! ## Design Philosophy
//!
//! - **Flat storage**: Matrices are a flat `Vec<f64>` plus dimensions
//! - **Tagged outcomes**: Expected numerical failures (a covariance matrix that is
//!   not positive-semidefinite) are variants, not errors
//! - **Reproducibility**: Every random draw comes from a stream derived from a seed

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::needless_range_loop)]

pub mod error;
pub mod linear_algebra;
pub mod random;
pub mod statistics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{cholesky, Decomposition, DenseMatrix};
    pub use crate::random::{NormalMethod, NormalSampler, RandomSource, SeededSource};
    pub use crate::statistics::{
        correlation_from_covariance, log_returns, mean, quantile_index, sample_covariance,
        simple_returns, std_dev, volatilities,
    };
}

pub use error::{MathError, MathResult};
