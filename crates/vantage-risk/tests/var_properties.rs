//! End-to-end properties of the value-at-risk pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use vantage_config::RiskConfig;
use vantage_core::types::{
    Portfolio, ReturnSeries, RiskModel, SimulationMode, Symbol, VaRRequest, VaRResult,
};
use vantage_ext_file::InMemoryReturnSource;
use vantage_math::linear_algebra::DenseMatrix;
use vantage_math::random::NormalMethod;
use vantage_risk::{CovarianceModel, Estimate, RiskCalculator, RiskError};
use vantage_traits::{HistoricalDataProvider, SourceType, TraitError};

fn alternating(n: usize, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
        .collect()
}

/// Deterministic pseudo-returns with a given scale.
fn wiggle(n: usize, scale: f64, phase: f64) -> Vec<f64> {
    (0..n)
        .map(|i| scale * ((i as f64) * 1.7 + phase).sin())
        .collect()
}

fn calculator(source: InMemoryReturnSource, config: RiskConfig) -> RiskCalculator {
    RiskCalculator::new(Arc::new(source), config)
}

fn seeded() -> RiskConfig {
    RiskConfig::standard().with_seed(20_240_101)
}

fn without_timestamp(result: VaRResult) -> VaRResult {
    VaRResult {
        last_update: Utc.timestamp_opt(0, 0).unwrap(),
        ..result
    }
}

#[tokio::test]
async fn single_asset_matches_normal_quantile() {
    let source = InMemoryReturnSource::new().with_returns("BTC-USD", alternating(252, 0.02));
    let calc = calculator(source, seeded());
    let value = 100_000.0;
    let portfolio = Portfolio::from_exposures("single", [("BTC-USD", value)]).unwrap();

    let result = calc.calculate(&VaRRequest::new(portfolio)).await.unwrap();

    let expected = 1.645 * 0.02 * value;
    assert_eq!(result.simulation_mode, SimulationMode::Correlated);
    assert!(
        (result.value_at_risk - expected).abs() / expected < 0.10,
        "VaR {} vs {}",
        result.value_at_risk,
        expected
    );
}

#[tokio::test]
async fn fixed_seed_is_bit_identical() {
    let source = InMemoryReturnSource::new()
        .with_returns("A", wiggle(120, 0.02, 0.0))
        .with_returns("B", wiggle(120, 0.015, 1.0))
        .with_returns("C", wiggle(120, 0.03, 2.0));
    let calc = calculator(source, seeded());
    let portfolio = Portfolio::from_exposures("p", [("A", 50_000.0), ("B", 30_000.0), ("C", -10_000.0)]).unwrap();
    let request = VaRRequest::new(portfolio).with_seed(99);

    let first = calc.calculate(&request).await.unwrap();
    let second = calc.calculate(&request).await.unwrap();
    assert_eq!(without_timestamp(first), without_timestamp(second));
}

#[tokio::test]
async fn parallel_and_sequential_runs_agree() {
    let build = |parallel: bool| {
        let source = InMemoryReturnSource::new()
            .with_returns("A", wiggle(80, 0.02, 0.3))
            .with_returns("B", wiggle(80, 0.01, 0.9));
        calculator(
            source,
            seeded()
                .with_parallel(parallel)
                .with_chunk_size(300)
                .with_normal_method(NormalMethod::BoxMuller),
        )
    };
    let portfolio = Portfolio::from_exposures("p", [("A", 70_000.0), ("B", 30_000.0)]).unwrap();
    let request = VaRRequest::new(portfolio).with_simulation_count(5_000);

    let par = build(true).calculate(&request).await.unwrap();
    let seq = build(false).calculate(&request).await.unwrap();
    assert_eq!(without_timestamp(par), without_timestamp(seq));
}

#[tokio::test]
async fn higher_confidence_never_lowers_var() {
    let source = InMemoryReturnSource::new()
        .with_returns("A", wiggle(60, 0.02, 0.0))
        .with_returns("B", wiggle(60, 0.02, 0.5));
    let calc = calculator(source, seeded());
    let portfolio = Portfolio::from_exposures("p", [("A", 1_000.0), ("B", 2_000.0)]).unwrap();

    let mut previous = 0.0;
    for confidence in [0.80, 0.90, 0.95, 0.975, 0.99, 0.999] {
        let request = VaRRequest::new(portfolio.clone()).with_confidence_level(confidence);
        let result = calc.calculate(&request).await.unwrap();
        assert!(result.value_at_risk >= previous);
        previous = result.value_at_risk;
    }
}

#[tokio::test]
async fn short_history_everywhere_uses_volatility_fallback() {
    let source = InMemoryReturnSource::new()
        .with_returns("A", vec![0.01])
        .with_returns("B", vec![]);
    let calc = calculator(source, seeded());
    let value = 200_000.0;
    let portfolio = Portfolio::from_exposures("p", [("A", value / 2.0), ("B", value / 2.0), ("C", 0.0)]).unwrap();

    let result = calc.calculate(&VaRRequest::new(portfolio)).await.unwrap();

    assert_eq!(result.simulation_mode, SimulationMode::VolatilityFallback);
    assert!(result.asset_names.is_empty());
    assert!(result.correlation_matrix.is_empty());
    assert!(result.volatility_per_asset.is_empty());
    assert_eq!(result.excluded_assets.len(), 3);

    let expected = 1.645 * 0.02 * value;
    assert!((result.value_at_risk - expected).abs() / expected < 0.10);
}

#[test]
fn non_psd_covariance_uses_independent_fallback() {
    let calc = calculator(InMemoryReturnSource::new(), seeded());
    let estimate = Estimate::from_model(
        CovarianceModel::new(
            vec![Symbol::new("A"), Symbol::new("B"), Symbol::new("C")],
            vec![10_000.0, 10_000.0, 10_000.0],
            vec![0.0; 3],
            DenseMatrix::from_row_slice(
                3,
                3,
                &[
                    0.0004, 0.00036, 0.00036, //
                    0.00036, 0.0004, -0.00036, //
                    0.00036, -0.00036, 0.0004,
                ],
            )
            .unwrap(),
        )
        .unwrap(),
    );
    let portfolio = Portfolio::from_exposures("p", [("A", 10_000.0), ("B", 10_000.0), ("C", 10_000.0)]).unwrap();

    let result = calc.simulate(&VaRRequest::new(portfolio), &estimate).unwrap();

    assert_eq!(result.simulation_mode, SimulationMode::IndependentFallback);
    assert!(result.value_at_risk > 0.0);
    assert_eq!(result.volatility_per_asset.len(), 3);
    for v in &result.volatility_per_asset {
        assert!((v - 0.02).abs() < 1e-12);
    }
}

#[tokio::test]
async fn identical_series_behave_like_one_asset() {
    let series = wiggle(200, 0.02, 0.0);
    let pair = calculator(
        InMemoryReturnSource::new()
            .with_returns("A", series.clone())
            .with_returns("B", series.clone()),
        seeded(),
    );
    let single = calculator(InMemoryReturnSource::new().with_returns("AB", series), seeded());

    let combined = pair
        .calculate(&VaRRequest::new(Portfolio::from_exposures(
            "pair",
            [("A", 40_000.0), ("B", 60_000.0)],
        ).unwrap()))
        .await
        .unwrap();
    let reference = single
        .calculate(&VaRRequest::new(Portfolio::from_exposures(
            "single",
            [("AB", 100_000.0)],
        ).unwrap()))
        .await
        .unwrap();

    assert_eq!(combined.simulation_mode, SimulationMode::Correlated);
    assert!((combined.correlation(0, 1).unwrap() - 1.0).abs() < 1e-9);
    let gap = (combined.value_at_risk - reference.value_at_risk).abs() / reference.value_at_risk;
    assert!(gap < 0.08, "pair {} vs single {}", combined.value_at_risk, reference.value_at_risk);
}

#[tokio::test]
async fn empty_portfolio_is_rejected() {
    let calc = calculator(InMemoryReturnSource::new(), seeded());
    let err = calc
        .calculate(&VaRRequest::new(Portfolio::new("empty")))
        .await
        .unwrap_err();
    assert!(err.is_invalid_configuration());
}

#[tokio::test]
async fn zero_simulations_are_rejected() {
    let source = InMemoryReturnSource::new().with_returns("A", alternating(10, 0.01));
    let calc = calculator(source, seeded());
    let request =
        VaRRequest::new(Portfolio::from_exposures("p", [("A", 1.0)]).unwrap()).with_simulation_count(0);
    assert!(matches!(
        calc.calculate(&request).await,
        Err(RiskError::InvalidConfiguration { .. })
    ));
}

#[tokio::test]
async fn historical_model_reports_history_length() {
    let source = InMemoryReturnSource::new()
        .with_returns("A", wiggle(90, 0.02, 0.0))
        .with_returns("B", wiggle(60, 0.02, 0.7));
    let calc = calculator(source, seeded());
    let request = VaRRequest::new(Portfolio::from_exposures("p", [("A", 1_000.0), ("B", 1_000.0)]).unwrap())
        .with_risk_model(RiskModel::Historical);

    let result = calc.calculate(&request).await.unwrap();
    assert_eq!(result.simulation_mode, SimulationMode::Historical);
    assert_eq!(result.observations, 60);
    assert_eq!(result.simulation_count, 60);
}

struct Slow {
    delay: Duration,
    inner: InMemoryReturnSource,
    calls: AtomicUsize,
}

#[async_trait]
impl HistoricalDataProvider for Slow {
    fn source_type(&self) -> SourceType {
        SourceType::Database
    }

    async fn get_returns(
        &self,
        symbol: &Symbol,
        lookback_periods: usize,
    ) -> Result<ReturnSeries, TraitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if symbol.as_str() == "SLOW" {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.get_returns(symbol, lookback_periods).await
    }
}

fn slow_source() -> Slow {
    Slow {
        delay: Duration::from_millis(500),
        inner: InMemoryReturnSource::new()
            .with_returns("FAST", alternating(50, 0.02))
            .with_returns("SLOW", alternating(50, 0.02)),
        calls: AtomicUsize::new(0),
    }
}

#[tokio::test]
async fn slow_symbols_degrade_to_missing_history() {
    let calc = RiskCalculator::new(
        Arc::new(slow_source()),
        seeded().with_fetch_timeout_ms(50),
    );
    let request = VaRRequest::new(Portfolio::from_exposures(
        "p",
        [("FAST", 10_000.0), ("SLOW", 10_000.0)],
    ).unwrap());

    let result = calc.calculate(&request).await.unwrap();
    assert_eq!(result.asset_names, vec![Symbol::new("FAST")]);
    assert_eq!(result.excluded_assets, vec![Symbol::new("SLOW")]);
}

#[tokio::test]
async fn expired_caller_deadline_is_an_error() {
    let calc = RiskCalculator::new(Arc::new(slow_source()), seeded());
    let request = VaRRequest::new(Portfolio::from_exposures("p", [("SLOW", 10_000.0)]).unwrap())
        .with_deadline_ms(20);

    let err = calc.calculate(&request).await.unwrap_err();
    assert!(matches!(err, RiskError::Timeout { deadline_ms: 20 }));
}

#[tokio::test]
async fn cached_calculator_fetches_once_per_bucket() {
    let source = Arc::new(slow_source());
    let calc = RiskCalculator::with_cache(source.clone(), seeded());
    let request = VaRRequest::new(Portfolio::from_exposures("p", [("FAST", 10_000.0)]).unwrap());

    calc.calculate(&request).await.unwrap();
    calc.calculate(&request).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

fn history_strategy() -> impl Strategy<Value = Vec<(f64, Vec<f64>)>> {
    proptest::collection::vec(
        (
            -1e5f64..1e5,
            proptest::collection::vec(-0.05f64..0.05, 0..30),
        ),
        1..5,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn var_is_non_negative_and_dimensions_agree(assets in history_strategy()) {
        prop_assume!(assets.iter().any(|(v, _)| *v != 0.0));

        let names: Vec<String> = (0..assets.len()).map(|i| format!("S{i}")).collect();
        let history: HashMap<Symbol, ReturnSeries> = names
            .iter()
            .zip(&assets)
            .map(|(n, (_, r))| (Symbol::new(n.as_str()), ReturnSeries::new(n.as_str(), r.clone())))
            .collect();
        let portfolio = Portfolio::from_exposures(
            "prop",
            names.iter().zip(&assets).map(|(n, (v, _))| (n.as_str(), *v)),
        )
        .unwrap();

        let calc = calculator(InMemoryReturnSource::new(), seeded());
        let request = VaRRequest::new(portfolio).with_simulation_count(500);
        let result = calc.evaluate(&request, &history).unwrap();

        let n = result.asset_names.len();
        prop_assert!(result.value_at_risk >= 0.0);
        prop_assert!(result.expected_shortfall >= 0.0);
        prop_assert_eq!(result.volatility_per_asset.len(), n);
        prop_assert_eq!(result.correlation_matrix.len(), n * n);
        prop_assert_eq!(n + result.excluded_assets.len(), assets.len());
        for i in 0..n {
            prop_assert_eq!(result.correlation(i, i), Some(1.0));
            for j in 0..n {
                let c = result.correlation(i, j).unwrap();
                prop_assert!((-1.0..=1.0).contains(&c));
            }
        }
    }
}
