//! End-to-end value-at-risk calculator.
//!
//! `RiskCalculator` runs the pipeline
//! history fetch → statistics → scenarios → aggregation for one request.
//! Each stage may lower the fidelity of the result (see
//! [`SimulationMode`]) but only malformed input or an expired caller
//! deadline fails the call.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vantage_risk::RiskCalculator;
//!
//! let calculator = RiskCalculator::new(Arc::new(source), RiskConfig::standard());
//! let result = calculator.calculate(&VaRRequest::new(portfolio)).await?;
//!
//! println!("{result}");
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};
use vantage_config::RiskConfig;
use vantage_core::types::{
    Portfolio, ReturnSeries, RiskModel, SimulationMode, Symbol, VaRRequest, VaRResult,
};
use vantage_math::random::SeededSource;
use vantage_traits::HistoricalDataProvider;

use crate::aggregator::VaRAggregator;
use crate::cache::HistoricalCache;
use crate::error::{RiskError, RiskResult};
use crate::historical::HistoricalSimulator;
use crate::params::VaRParameters;
use crate::scenario::{ScenarioGenerator, ScenarioInputs, SimulationPlan};
use crate::statistics::{Estimate, Statistics, StatisticsEngine};

/// Value-at-risk service over a historical data provider.
#[derive(Clone)]
pub struct RiskCalculator {
    provider: Arc<dyn HistoricalDataProvider>,
    config: RiskConfig,
}

impl RiskCalculator {
    /// Creates a calculator reading history straight from `provider`.
    pub fn new(provider: Arc<dyn HistoricalDataProvider>, config: RiskConfig) -> Self {
        Self { provider, config }
    }

    /// Creates a calculator with a read-through cache in front of
    /// `provider`, bucketed by `config.cache_bucket_secs`.
    pub fn with_cache(provider: Arc<dyn HistoricalDataProvider>, config: RiskConfig) -> Self {
        let bucket = Duration::from_secs(config.cache_bucket_secs);
        let cached: Arc<dyn HistoricalDataProvider> =
            Arc::new(HistoricalCache::new(provider, bucket));
        Self::new(cached, config)
    }

    /// Engine defaults.
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Computes value at risk for `request`.
    ///
    /// # Errors
    ///
    /// [`RiskError::InvalidConfiguration`] for malformed input and
    /// [`RiskError::Timeout`] when `request.deadline_ms` expires during the
    /// history fetch.
    pub async fn calculate(&self, request: &VaRRequest) -> RiskResult<VaRResult> {
        let params = VaRParameters::resolve(request, &self.config)?;
        let symbols = request.portfolio.symbols();

        debug!(
            "Calculating {} VaR for '{}' ({} symbols, seed {})",
            params.risk_model,
            request.portfolio.name,
            symbols.len(),
            params.seed
        );

        let fetch = self.fetch_history(&symbols, params.lookback_periods);
        let history = match request.deadline_ms {
            Some(deadline_ms) => tokio::time::timeout(Duration::from_millis(deadline_ms), fetch)
                .await
                .map_err(|_| RiskError::Timeout { deadline_ms })?,
            None => fetch.await,
        };

        let portfolio = request.portfolio.clone();
        let result = tokio::task::spawn_blocking(move || evaluate(&params, &portfolio, &history))
            .await
            .map_err(|e| RiskError::Internal(format!("simulation task failed: {e}")))??;

        info!(
            "VaR for '{}': {:.2} ({}, {} outcomes)",
            request.portfolio.name,
            result.value_at_risk,
            result.simulation_mode,
            result.simulation_count
        );
        Ok(result)
    }

    /// Runs the pipeline synchronously over history the caller already holds.
    pub fn evaluate(
        &self,
        request: &VaRRequest,
        history: &HashMap<Symbol, ReturnSeries>,
    ) -> RiskResult<VaRResult> {
        let params = VaRParameters::resolve(request, &self.config)?;
        evaluate(&params, &request.portfolio, history)
    }

    /// Runs scenarios and aggregation over a prepared estimate.
    pub fn simulate(&self, request: &VaRRequest, estimate: &Estimate) -> RiskResult<VaRResult> {
        let params = VaRParameters::resolve(request, &self.config)?;
        simulate(&params, estimate, request.portfolio.baseline_value())
    }

    /// Fetches every symbol concurrently within the configured budget.
    ///
    /// Symbols that fail or miss the budget are absent from the map.
    async fn fetch_history(
        &self,
        symbols: &[Symbol],
        lookback_periods: usize,
    ) -> HashMap<Symbol, ReturnSeries> {
        let budget = match self.config.fetch_timeout_ms {
            0 => None,
            ms => Some(tokio::time::Instant::now() + Duration::from_millis(ms)),
        };

        let fetches = symbols.iter().map(|symbol| {
            let provider = &self.provider;
            async move {
                let fetch = provider.get_returns(symbol, lookback_periods);
                let outcome = match budget {
                    Some(deadline) => tokio::time::timeout_at(deadline, fetch).await.ok(),
                    None => Some(fetch.await),
                };
                match outcome {
                    Some(Ok(series)) => Some((symbol.clone(), series.truncated(lookback_periods))),
                    Some(Err(e)) => {
                        warn!("History fetch for {} failed, treating as empty: {}", symbol, e);
                        None
                    }
                    None => {
                        warn!("History fetch for {} timed out, treating as empty", symbol);
                        None
                    }
                }
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}

impl std::fmt::Debug for RiskCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskCalculator")
            .field("source_type", &self.provider.source_type())
            .field("config", &self.config.name)
            .finish()
    }
}

fn evaluate(
    params: &VaRParameters,
    portfolio: &Portfolio,
    history: &HashMap<Symbol, ReturnSeries>,
) -> RiskResult<VaRResult> {
    let estimate = StatisticsEngine::new().estimate(&portfolio.exposures(), history)?;
    simulate(params, &estimate, portfolio.baseline_value())
}

fn simulate(params: &VaRParameters, estimate: &Estimate, baseline: f64) -> RiskResult<VaRResult> {
    let (mut outcomes, mode) = match (params.risk_model, &estimate.statistics) {
        (RiskModel::Historical, Statistics::Qualified(model)) => (
            HistoricalSimulator::new().replay(model, baseline, params.horizon_days),
            SimulationMode::Historical,
        ),
        _ => {
            let plan = SimulationPlan::from_estimate(estimate, params.fallback_volatility)?;
            let inputs = ScenarioInputs {
                baseline,
                horizon_days: params.horizon_days,
                simulation_count: params.simulation_count,
                residual_exposures: estimate.residual_exposures(),
                residual_volatility: params.fallback_volatility,
            };
            let generator =
                ScenarioGenerator::new(params.normal_method, params.parallel, params.chunk_size);
            let source = SeededSource::new(params.seed);
            (generator.generate(&plan, &inputs, &source), plan.mode())
        }
    };

    let simulation_count = outcomes.len();
    let tail = VaRAggregator::new().aggregate(&mut outcomes, baseline, params.confidence_level)?;

    let (asset_names, correlation_matrix, volatility_per_asset, observations) =
        match &estimate.statistics {
            Statistics::Qualified(model) => (
                model.asset_names().to_vec(),
                model.correlation()?,
                model.volatilities(),
                model.observations(),
            ),
            Statistics::NoQualifyingAssets => (Vec::new(), Vec::new(), Vec::new(), 0),
        };

    Ok(VaRResult {
        value_at_risk: tail.value_at_risk,
        asset_names,
        correlation_matrix,
        volatility_per_asset,
        simulation_mode: mode,
        last_update: Utc::now(),
        expected_shortfall: tail.expected_shortfall,
        excluded_assets: estimate.excluded_assets(),
        baseline_value: baseline,
        confidence_level: params.confidence_level,
        horizon_days: params.horizon_days,
        simulation_count,
        risk_model: params.risk_model,
        seed: params.seed,
        observations,
    })
}
