//! Quantile extraction over simulated outcomes.

use vantage_math::statistics::quantile_index;

use crate::error::{RiskError, RiskResult};

/// Loss figures read off a sorted outcome set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailSummary {
    /// Loss at the confidence quantile, floored at zero.
    pub value_at_risk: f64,
    /// Mean loss at or beyond the quantile, floored at zero.
    pub expected_shortfall: f64,
    /// Portfolio value at the quantile.
    pub quantile_value: f64,
    /// Index of the quantile in the sorted outcomes.
    pub quantile_index: usize,
}

/// Turns simulated portfolio values into VaR and expected shortfall.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaRAggregator;

impl VaRAggregator {
    /// Creates an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Sorts `outcomes` ascending in place and reads the lower tail.
    ///
    /// `k = floor((1 − confidence) · S)` clamped to `[0, S − 1]`;
    /// `VaR = max(baseline − outcomes[k], 0)`.
    ///
    /// # Errors
    ///
    /// An empty outcome set is an invalid configuration, as is a confidence
    /// level outside (0, 1).
    pub fn aggregate(
        &self,
        outcomes: &mut [f64],
        baseline: f64,
        confidence_level: f64,
    ) -> RiskResult<TailSummary> {
        if outcomes.is_empty() {
            return Err(RiskError::invalid(
                "simulationCount",
                "no outcomes to aggregate",
            ));
        }
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(RiskError::invalid(
                "confidenceLevel",
                format!("must be strictly between 0 and 1, got {confidence_level}"),
            ));
        }

        outcomes.sort_unstable_by(f64::total_cmp);

        let k = quantile_index(confidence_level, outcomes.len());
        let quantile_value = outcomes[k];
        let tail = &outcomes[..=k];
        let tail_mean = tail.iter().sum::<f64>() / tail.len() as f64;

        Ok(TailSummary {
            value_at_risk: (baseline - quantile_value).max(0.0),
            expected_shortfall: (baseline - tail_mean).max(0.0),
            quantile_value,
            quantile_index: k,
        })
    }
}
