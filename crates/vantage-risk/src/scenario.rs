//! Monte Carlo scenario generation.
//!
//! Outcomes are produced in fixed-size chunks. Chunk `k` draws from random
//! stream `k`, and chunks are concatenated in order, so a run is fully
//! determined by its seed whether the chunks execute on the rayon pool or
//! one after another.

use rayon::prelude::*;
use tracing::{debug, warn};
use vantage_core::types::SimulationMode;
use vantage_math::linear_algebra::{cholesky, Decomposition, LowerTriangular};
use vantage_math::random::{NormalMethod, NormalSampler, RandomSource};

use crate::error::RiskResult;
use crate::statistics::{Estimate, Statistics};

/// How per-asset shocks are drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationPlan {
    /// Correlated shocks `L·z` from the Cholesky factor of the covariance.
    Correlated {
        /// Market value per asset.
        exposures: Vec<f64>,
        /// Per-period mean return per asset.
        mean: Vec<f64>,
        /// Cholesky factor of the covariance.
        factor: LowerTriangular,
    },
    /// Independent shocks, one volatility per asset.
    Independent {
        /// Market value per asset.
        exposures: Vec<f64>,
        /// Per-period mean return per asset.
        mean: Vec<f64>,
        /// Per-period volatility per asset.
        volatilities: Vec<f64>,
    },
    /// A single shock applied to the whole portfolio value.
    Volatility {
        /// Per-period portfolio volatility.
        volatility: f64,
    },
}

impl SimulationPlan {
    /// Chooses the plan for an estimate, degrading as needed.
    ///
    /// A covariance matrix that is not positive-semidefinite selects
    /// independent shocks; no qualifying assets selects the portfolio-level
    /// shock at `fallback_volatility`.
    pub fn from_estimate(estimate: &Estimate, fallback_volatility: f64) -> RiskResult<Self> {
        let model = match &estimate.statistics {
            Statistics::Qualified(model) => model,
            Statistics::NoQualifyingAssets => {
                warn!("no asset has usable history, using volatility fallback");
                return Ok(SimulationPlan::Volatility {
                    volatility: fallback_volatility,
                });
            }
        };

        match cholesky(model.covariance())? {
            Decomposition::Factored(factor) => {
                if factor.zero_pivots() > 0 {
                    debug!(
                        zero_pivots = factor.zero_pivots(),
                        "covariance is rank deficient"
                    );
                }
                Ok(SimulationPlan::Correlated {
                    exposures: model.exposures().to_vec(),
                    mean: model.mean().to_vec(),
                    factor,
                })
            }
            Decomposition::NotPositiveSemidefinite { row, pivot } => {
                warn!(row, pivot, "covariance is not positive-semidefinite, sampling assets independently");
                Ok(SimulationPlan::Independent {
                    exposures: model.exposures().to_vec(),
                    mean: model.mean().to_vec(),
                    volatilities: model.volatilities(),
                })
            }
        }
    }

    /// Mode reported for results produced by this plan.
    pub fn mode(&self) -> SimulationMode {
        match self {
            SimulationPlan::Correlated { .. } => SimulationMode::Correlated,
            SimulationPlan::Independent { .. } => SimulationMode::IndependentFallback,
            SimulationPlan::Volatility { .. } => SimulationMode::VolatilityFallback,
        }
    }
}

/// Portfolio-level inputs shared by every simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInputs {
    /// Current total portfolio value.
    pub baseline: f64,
    /// Horizon in days.
    pub horizon_days: u32,
    /// Number of outcomes to produce.
    pub simulation_count: usize,
    /// Market value in assets outside the covariance model. Each is shocked
    /// independently at `residual_volatility`. Ignored by the
    /// portfolio-level plan, which already covers the whole value.
    pub residual_exposures: Vec<f64>,
    /// Per-period volatility of residual exposure.
    pub residual_volatility: f64,
}

/// Produces simulated total portfolio values.
#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    method: NormalMethod,
    parallel: bool,
    chunk_size: usize,
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::new(NormalMethod::default(), true, 1024)
    }
}

impl ScenarioGenerator {
    /// Creates a generator.
    pub fn new(method: NormalMethod, parallel: bool, chunk_size: usize) -> Self {
        Self {
            method,
            parallel,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Produces exactly `inputs.simulation_count` outcomes, in chunk order.
    pub fn generate(
        &self,
        plan: &SimulationPlan,
        inputs: &ScenarioInputs,
        source: &dyn RandomSource,
    ) -> Vec<f64> {
        let total = inputs.simulation_count;
        let chunks = total.div_ceil(self.chunk_size);
        let chunk_len = |k: usize| self.chunk_size.min(total - k * self.chunk_size);

        let parts: Vec<Vec<f64>> = if self.parallel {
            (0..chunks)
                .into_par_iter()
                .map(|k| self.run_chunk(k, chunk_len(k), plan, inputs, source))
                .collect()
        } else {
            (0..chunks)
                .map(|k| self.run_chunk(k, chunk_len(k), plan, inputs, source))
                .collect()
        };

        parts.concat()
    }

    fn run_chunk(
        &self,
        chunk: usize,
        len: usize,
        plan: &SimulationPlan,
        inputs: &ScenarioInputs,
        source: &dyn RandomSource,
    ) -> Vec<f64> {
        let mut sampler = NormalSampler::from_source(source, chunk as u64, self.method);
        let h = f64::from(inputs.horizon_days);
        let sqrt_h = h.sqrt();
        let residual_scale = inputs.residual_volatility * sqrt_h;
        let mut out = Vec::with_capacity(len);

        match plan {
            SimulationPlan::Correlated {
                exposures,
                mean,
                factor,
            } => {
                let n = exposures.len();
                let mut z = vec![0.0; n];
                let mut shock = vec![0.0; n];
                for _ in 0..len {
                    sampler.fill(&mut z);
                    factor.apply(&z, &mut shock);
                    let mut value = inputs.baseline;
                    for i in 0..n {
                        value += exposures[i] * (mean[i] * h + sqrt_h * shock[i]);
                    }
                    value += residual_pnl(&mut sampler, &inputs.residual_exposures, residual_scale);
                    out.push(value);
                }
            }
            SimulationPlan::Independent {
                exposures,
                mean,
                volatilities,
            } => {
                for _ in 0..len {
                    let mut value = inputs.baseline;
                    for i in 0..exposures.len() {
                        let r = mean[i] * h + sqrt_h * volatilities[i] * sampler.sample();
                        value += exposures[i] * r;
                    }
                    value += residual_pnl(&mut sampler, &inputs.residual_exposures, residual_scale);
                    out.push(value);
                }
            }
            SimulationPlan::Volatility { volatility } => {
                let scale = volatility * sqrt_h;
                for _ in 0..len {
                    out.push(inputs.baseline * (1.0 + scale * sampler.sample()));
                }
            }
        }

        out
    }
}

fn residual_pnl(sampler: &mut NormalSampler, exposures: &[f64], scale: f64) -> f64 {
    exposures
        .iter()
        .map(|e| e * scale * sampler.sample())
        .sum()
}
