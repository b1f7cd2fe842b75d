//! Value-at-risk request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Portfolio;
use crate::error::CoreError;

/// Risk model used to generate portfolio outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskModel {
    /// Replay of the aligned historical window.
    Historical,
    /// Monte Carlo simulation from the covariance model.
    #[default]
    MonteCarlo,
}

impl RiskModel {
    /// Wire name of the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskModel::Historical => "historical",
            RiskModel::MonteCarlo => "monte_carlo",
        }
    }
}

impl fmt::Display for RiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "historical" => Ok(RiskModel::Historical),
            "monte_carlo" | "montecarlo" | "mc" => Ok(RiskModel::MonteCarlo),
            other => Err(CoreError::UnknownRiskModel(other.to_string())),
        }
    }
}

/// A request for one value-at-risk computation.
///
/// Unset optional fields take the engine's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaRRequest {
    /// Portfolio snapshot to evaluate.
    pub portfolio: Portfolio,
    /// Risk model.
    #[serde(default)]
    pub risk_model: RiskModel,
    /// Confidence level in (0, 1), e.g. 0.95.
    #[serde(default)]
    pub confidence_level: Option<f64>,
    /// Horizon in days (at least 1).
    #[serde(default)]
    pub horizon_days: Option<u32>,
    /// Number of Monte Carlo simulations.
    #[serde(default)]
    pub simulation_count: Option<usize>,
    /// Number of historical periods requested per symbol.
    #[serde(default)]
    pub lookback_periods: Option<usize>,
    /// Seed for reproducible simulation.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Caller deadline for the historical fetch, in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl VaRRequest {
    /// Creates a Monte Carlo request for `portfolio` with default settings.
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            ..Self::default()
        }
    }

    /// Sets the risk model.
    #[must_use]
    pub fn with_risk_model(mut self, model: RiskModel) -> Self {
        self.risk_model = model;
        self
    }

    /// Sets the confidence level.
    #[must_use]
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = Some(confidence_level);
        self
    }

    /// Sets the horizon in days.
    #[must_use]
    pub fn with_horizon_days(mut self, horizon_days: u32) -> Self {
        self.horizon_days = Some(horizon_days);
        self
    }

    /// Sets the simulation count.
    #[must_use]
    pub fn with_simulation_count(mut self, simulation_count: usize) -> Self {
        self.simulation_count = Some(simulation_count);
        self
    }

    /// Sets the lookback window.
    #[must_use]
    pub fn with_lookback_periods(mut self, lookback_periods: usize) -> Self {
        self.lookback_periods = Some(lookback_periods);
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the caller deadline.
    #[must_use]
    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }
}
