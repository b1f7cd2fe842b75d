//! Value-at-risk result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{RiskModel, Symbol};
use crate::error::CoreError;

/// How the simulated outcomes were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationMode {
    /// Correlated shocks from the Cholesky factor of the covariance matrix.
    Correlated,
    /// Per-asset shocks ignoring correlation (covariance not positive-semidefinite).
    IndependentFallback,
    /// Portfolio-level shocks from a single volatility (no asset had enough history).
    VolatilityFallback,
    /// Replay of the aligned historical window.
    Historical,
}

impl SimulationMode {
    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationMode::Correlated => "CORRELATED",
            SimulationMode::IndependentFallback => "INDEPENDENT_FALLBACK",
            SimulationMode::VolatilityFallback => "VOLATILITY_FALLBACK",
            SimulationMode::Historical => "HISTORICAL",
        }
    }

    /// Returns true for the two fallback modes.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            SimulationMode::IndependentFallback | SimulationMode::VolatilityFallback
        )
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CORRELATED" => Ok(SimulationMode::Correlated),
            "INDEPENDENT_FALLBACK" => Ok(SimulationMode::IndependentFallback),
            "VOLATILITY_FALLBACK" => Ok(SimulationMode::VolatilityFallback),
            "HISTORICAL" => Ok(SimulationMode::Historical),
            other => Err(CoreError::UnknownSimulationMode(other.to_string())),
        }
    }
}

/// Output of one value-at-risk computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaRResult {
    /// Potential loss magnitude (never negative).
    pub value_at_risk: f64,
    /// Assets on the covariance axes, in matrix order.
    pub asset_names: Vec<Symbol>,
    /// Row-major n×n correlation matrix.
    pub correlation_matrix: Vec<f64>,
    /// Per-asset standard deviation of periodic returns.
    pub volatility_per_asset: Vec<f64>,
    /// How outcomes were produced.
    pub simulation_mode: SimulationMode,
    /// Time of computation.
    pub last_update: DateTime<Utc>,
    /// Mean loss beyond the VaR quantile (never negative).
    pub expected_shortfall: f64,
    /// Symbols dropped for insufficient history.
    pub excluded_assets: Vec<Symbol>,
    /// Portfolio value risk was measured against.
    pub baseline_value: f64,
    /// Confidence level used.
    pub confidence_level: f64,
    /// Horizon in days.
    pub horizon_days: u32,
    /// Number of outcomes aggregated.
    pub simulation_count: usize,
    /// Model requested.
    pub risk_model: RiskModel,
    /// Seed that reproduces the simulation.
    pub seed: u64,
    /// Length of the aligned historical window (0 without history).
    pub observations: usize,
}

impl VaRResult {
    /// Number of assets on the covariance axes.
    pub fn asset_count(&self) -> usize {
        self.asset_names.len()
    }

    /// Correlation between assets `i` and `j`.
    pub fn correlation(&self, i: usize, j: usize) -> Option<f64> {
        let n = self.asset_count();
        if i >= n || j >= n {
            return None;
        }
        self.correlation_matrix.get(i * n + j).copied()
    }

    /// VaR as a fraction of the absolute baseline value.
    pub fn relative_var(&self) -> Option<f64> {
        if self.baseline_value.abs() > f64::EPSILON {
            Some(self.value_at_risk / self.baseline_value.abs())
        } else {
            None
        }
    }
}

impl fmt::Display for VaRResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VaR({:.0}%, {}d, {}): ${:.2}",
            self.confidence_level * 100.0,
            self.horizon_days,
            self.simulation_mode,
            self.value_at_risk
        )
    }
}
