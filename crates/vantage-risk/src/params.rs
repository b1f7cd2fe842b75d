//! Resolution of request fields against configured defaults.

use vantage_config::RiskConfig;
use vantage_core::types::{RiskModel, VaRRequest};
use vantage_math::random::{entropy_seed, NormalMethod};

use crate::error::{RiskError, RiskResult};

/// Fully resolved settings for one computation.
#[derive(Debug, Clone, PartialEq)]
pub struct VaRParameters {
    /// Risk model.
    pub risk_model: RiskModel,
    /// Confidence level in (0, 1).
    pub confidence_level: f64,
    /// Horizon in days, at least 1.
    pub horizon_days: u32,
    /// Number of simulated outcomes, at least 1.
    pub simulation_count: usize,
    /// Periods of history requested per symbol.
    pub lookback_periods: usize,
    /// Seed of the random streams.
    pub seed: u64,
    /// Volatility used when history is missing.
    pub fallback_volatility: f64,
    /// Normal sampler.
    pub normal_method: NormalMethod,
    /// Run simulation chunks in parallel.
    pub parallel: bool,
    /// Simulations per random stream.
    pub chunk_size: usize,
}

impl VaRParameters {
    /// Validates `request` and fills unset fields from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] for an empty portfolio, a
    /// portfolio whose market values are all zero, a confidence level outside
    /// (0, 1), a zero horizon, a zero lookback, or a simulation count of zero
    /// or above the configured maximum.
    pub fn resolve(request: &VaRRequest, config: &RiskConfig) -> RiskResult<Self> {
        if request.portfolio.is_empty() {
            return Err(RiskError::invalid("portfolio", "portfolio has no positions"));
        }
        if request
            .portfolio
            .exposures()
            .iter()
            .all(|e| e.market_value == 0.0)
        {
            return Err(RiskError::invalid(
                "portfolio",
                "every position has zero market value",
            ));
        }

        let confidence_level = request
            .confidence_level
            .unwrap_or(config.default_confidence_level);
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(RiskError::invalid(
                "confidenceLevel",
                format!("must be strictly between 0 and 1, got {confidence_level}"),
            ));
        }

        let horizon_days = request.horizon_days.unwrap_or(config.default_horizon_days);
        if horizon_days == 0 {
            return Err(RiskError::invalid("horizonDays", "must be at least 1"));
        }

        let simulation_count = request
            .simulation_count
            .unwrap_or(config.default_simulation_count);
        if simulation_count == 0 {
            return Err(RiskError::invalid("simulationCount", "must be at least 1"));
        }
        if simulation_count > config.max_simulation_count {
            return Err(RiskError::invalid(
                "simulationCount",
                format!(
                    "{simulation_count} exceeds the maximum of {}",
                    config.max_simulation_count
                ),
            ));
        }

        let lookback_periods = request
            .lookback_periods
            .unwrap_or(config.default_lookback_periods);
        if lookback_periods == 0 {
            return Err(RiskError::invalid("lookbackPeriods", "must be at least 1"));
        }

        if !(config.fallback_volatility.is_finite() && config.fallback_volatility >= 0.0) {
            return Err(RiskError::invalid(
                "fallbackVolatility",
                "must be a non-negative number",
            ));
        }

        let seed = request.seed.or(config.seed).unwrap_or_else(entropy_seed);

        Ok(Self {
            risk_model: request.risk_model,
            confidence_level,
            horizon_days,
            simulation_count,
            lookback_periods,
            seed,
            fallback_volatility: config.fallback_volatility,
            normal_method: config.normal_method,
            parallel: config.parallel,
            chunk_size: config.chunk_size.max(1),
        })
    }

    /// `sqrt(horizon_days)`.
    pub fn horizon_scale(&self) -> f64 {
        f64::from(self.horizon_days).sqrt()
    }
}
