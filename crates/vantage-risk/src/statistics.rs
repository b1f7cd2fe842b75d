//! Mean vector and covariance estimation from return history.

use std::collections::HashMap;

use tracing::debug;
use vantage_core::types::{Exposure, ReturnSeries, Symbol};
use vantage_math::linear_algebra::DenseMatrix;
use vantage_math::statistics::{correlation_from_covariance, sample_covariance, volatilities};

use crate::error::{RiskError, RiskResult};

/// Mean vector and covariance matrix over the qualifying assets.
///
/// Index `i` of every vector and of each matrix axis refers to
/// `asset_names[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceModel {
    asset_names: Vec<Symbol>,
    exposures: Vec<f64>,
    mean: Vec<f64>,
    covariance: DenseMatrix,
    window: DenseMatrix,
}

impl CovarianceModel {
    /// Builds a model from precomputed statistics, with no history window.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions disagree or a value is not finite.
    pub fn new(
        asset_names: Vec<Symbol>,
        exposures: Vec<f64>,
        mean: Vec<f64>,
        covariance: DenseMatrix,
    ) -> RiskResult<Self> {
        let n = asset_names.len();
        Self::with_window(
            asset_names,
            exposures,
            mean,
            covariance,
            DenseMatrix::zeros(0, n),
        )
    }

    /// Builds a model together with the aligned return window it came from
    /// (one row per period, oldest first; one column per asset).
    pub fn with_window(
        asset_names: Vec<Symbol>,
        exposures: Vec<f64>,
        mean: Vec<f64>,
        covariance: DenseMatrix,
        window: DenseMatrix,
    ) -> RiskResult<Self> {
        let n = asset_names.len();
        if exposures.len() != n || mean.len() != n {
            return Err(RiskError::invalid(
                "covariance",
                format!(
                    "{n} assets but {} exposures and {} means",
                    exposures.len(),
                    mean.len()
                ),
            ));
        }
        if covariance.rows() != n || covariance.cols() != n || window.cols() != n {
            return Err(RiskError::invalid(
                "covariance",
                format!(
                    "expected {n}x{n} covariance, got {}x{}",
                    covariance.rows(),
                    covariance.cols()
                ),
            ));
        }
        let finite = |v: &f64| v.is_finite();
        if !(exposures.iter().all(finite)
            && mean.iter().all(finite)
            && covariance.as_slice().iter().all(finite))
        {
            return Err(RiskError::invalid("covariance", "values must be finite"));
        }
        Ok(Self {
            asset_names,
            exposures,
            mean,
            covariance,
            window,
        })
    }

    /// Ordered asset names.
    pub fn asset_names(&self) -> &[Symbol] {
        &self.asset_names
    }

    /// Market value held in each asset.
    pub fn exposures(&self) -> &[f64] {
        &self.exposures
    }

    /// Per-period mean return of each asset.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-period covariance matrix.
    pub fn covariance(&self) -> &DenseMatrix {
        &self.covariance
    }

    /// Aligned history, one row per period.
    pub fn window(&self) -> &DenseMatrix {
        &self.window
    }

    /// Number of assets.
    pub fn dim(&self) -> usize {
        self.asset_names.len()
    }

    /// Length of the aligned history.
    pub fn observations(&self) -> usize {
        self.window.rows()
    }

    /// Per-asset volatility `sqrt(Σ_ii)`.
    pub fn volatilities(&self) -> Vec<f64> {
        volatilities(&self.covariance)
    }

    /// Correlation matrix, flattened row-major.
    pub fn correlation(&self) -> RiskResult<Vec<f64>> {
        Ok(correlation_from_covariance(&self.covariance)?.into_vec())
    }
}

/// Outcome of statistics estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum Statistics {
    /// At least one asset has usable history.
    Qualified(CovarianceModel),
    /// No asset has usable history.
    NoQualifyingAssets,
}

/// Statistics plus the exposure left out of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Covariance model or its absence.
    pub statistics: Statistics,
    /// Assets dropped for insufficient history, with their exposure.
    pub excluded: Vec<Exposure>,
}

impl Estimate {
    /// Wraps a hand-built model with nothing excluded.
    pub fn from_model(model: CovarianceModel) -> Self {
        Self {
            statistics: Statistics::Qualified(model),
            excluded: Vec::new(),
        }
    }

    /// Symbols dropped for insufficient history.
    pub fn excluded_assets(&self) -> Vec<Symbol> {
        self.excluded.iter().map(|e| e.symbol.clone()).collect()
    }

    /// Market value held in dropped assets.
    pub fn residual_exposures(&self) -> Vec<f64> {
        self.excluded.iter().map(|e| e.market_value).collect()
    }
}

/// Computes sample statistics over the assets that have enough history.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Creates a statistics engine.
    pub fn new() -> Self {
        Self
    }

    /// Estimates the mean vector and covariance matrix.
    ///
    /// Assets whose series is missing, shorter than two observations or
    /// contains non-finite values are excluded. The remaining series are
    /// aligned on their most recent common window before estimation.
    pub fn estimate(
        &self,
        exposures: &[Exposure],
        history: &HashMap<Symbol, ReturnSeries>,
    ) -> RiskResult<Estimate> {
        let mut qualifying: Vec<(&Exposure, &ReturnSeries)> = Vec::new();
        let mut excluded = Vec::new();

        for exposure in exposures {
            match history.get(&exposure.symbol) {
                Some(series) if series.is_sufficient() => qualifying.push((exposure, series)),
                other => {
                    debug!(
                        symbol = %exposure.symbol,
                        observations = other.map_or(0, ReturnSeries::len),
                        "insufficient history, excluding asset"
                    );
                    excluded.push(exposure.clone());
                }
            }
        }

        if qualifying.is_empty() {
            return Ok(Estimate {
                statistics: Statistics::NoQualifyingAssets,
                excluded,
            });
        }

        let m = qualifying
            .iter()
            .map(|(_, s)| s.len())
            .min()
            .unwrap_or(0);
        let columns: Vec<&[f64]> = qualifying.iter().map(|(_, s)| s.tail(m)).collect();
        let (mean, covariance) = sample_covariance(&columns)?;

        let n = columns.len();
        let mut window = DenseMatrix::zeros(m, n);
        for (j, column) in columns.iter().enumerate() {
            for (t, value) in column.iter().enumerate() {
                window[(t, j)] = *value;
            }
        }

        debug!(assets = n, observations = m, excluded = excluded.len(), "estimated covariance");

        let model = CovarianceModel::with_window(
            qualifying.iter().map(|(e, _)| e.symbol.clone()).collect(),
            qualifying.iter().map(|(e, _)| e.market_value).collect(),
            mean,
            covariance,
            window,
        )?;

        Ok(Estimate {
            statistics: Statistics::Qualified(model),
            excluded,
        })
    }
}
