//! Var command implementation.
//!
//! Computes value at risk for a portfolio file against a history file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use vantage_core::types::{Portfolio, RiskModel, SimulationMode, VaRRequest, VaRResult};
use vantage_ext_file::{create_file_history, EmptyReturnSource, SeriesKind};
use vantage_risk::RiskCalculator;
use vantage_traits::HistoricalDataProvider;

use crate::cli::OutputFormat;
use crate::commands::{existing, load_valid_risk_config};
use crate::error::{CliError, CliResult};
use crate::output::{
    format_money, format_percent, print_header, print_json, print_matrix, print_table,
    print_warning, KeyValue,
};

/// Arguments for the var command.
#[derive(Args, Debug)]
pub struct VarArgs {
    /// Portfolio file (JSON): a portfolio object or a symbol → market value map
    #[arg(short, long)]
    pub portfolio: PathBuf,

    /// History file (CSV or JSON). Without it only the fallback volatility is used.
    #[arg(short, long)]
    pub returns: Option<PathBuf>,

    /// Treat the history file as prices rather than returns
    #[arg(long)]
    pub prices: bool,

    /// Risk model: monte_carlo or historical
    #[arg(short, long, default_value = "monte_carlo")]
    pub model: String,

    /// Confidence level, e.g. 0.99
    #[arg(short, long)]
    pub confidence: Option<f64>,

    /// Horizon in days
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Number of Monte Carlo simulations
    #[arg(short, long)]
    pub simulations: Option<usize>,

    /// Historical periods per symbol
    #[arg(short, long)]
    pub lookback: Option<usize>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Abort if history is not loaded within this many milliseconds
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Risk configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Per-asset volatility row.
#[derive(Debug, Serialize, Tabled)]
pub struct AssetRow {
    #[tabled(rename = "Asset")]
    pub asset: String,
    #[tabled(rename = "Volatility")]
    pub volatility: String,
}

/// Execute the var command.
pub fn execute(args: VarArgs, format: OutputFormat) -> Result<()> {
    let config = load_valid_risk_config(args.config.as_deref())?;
    let portfolio = load_portfolio(&args.portfolio)?;
    let provider = load_history(args.returns.as_deref(), args.prices)?;

    let request = build_request(&args, portfolio)?;
    let calculator = RiskCalculator::new(provider, config);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(calculator.calculate(&request))?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => print_result(&result),
    }
}

fn build_request(args: &VarArgs, portfolio: Portfolio) -> CliResult<VaRRequest> {
    let model: RiskModel = args.model.parse()?;
    let mut request = VaRRequest::new(portfolio).with_risk_model(model);

    if let Some(confidence) = args.confidence {
        request = request.with_confidence_level(confidence);
    }
    if let Some(horizon) = args.horizon {
        request = request.with_horizon_days(horizon);
    }
    if let Some(simulations) = args.simulations {
        request = request.with_simulation_count(simulations);
    }
    if let Some(lookback) = args.lookback {
        request = request.with_lookback_periods(lookback);
    }
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }
    if let Some(deadline_ms) = args.deadline_ms {
        request = request.with_deadline_ms(deadline_ms);
    }
    Ok(request)
}

/// Reads a portfolio object, or a plain `{ "SYM": market_value }` map.
fn load_portfolio(path: &Path) -> CliResult<Portfolio> {
    let content = std::fs::read_to_string(existing(path)?)?;
    let invalid = |e: serde_json::Error| CliError::InvalidPortfolio {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(&content).map_err(invalid)?;
    if value.get("positions").is_some() {
        return serde_json::from_value(value).map_err(invalid);
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("portfolio")
        .to_string();
    let exposures: BTreeMap<String, f64> = serde_json::from_value(value).map_err(invalid)?;
    Ok(Portfolio::from_exposures(name, exposures)?)
}

fn load_history(path: Option<&Path>, prices: bool) -> CliResult<Arc<dyn HistoricalDataProvider>> {
    match path {
        Some(path) => {
            let kind = if prices {
                SeriesKind::Prices
            } else {
                SeriesKind::Returns
            };
            Ok(create_file_history(existing(path)?, kind)?)
        }
        None => Ok(Arc::new(EmptyReturnSource)),
    }
}

fn print_result(result: &VaRResult) -> Result<()> {
    let mode = if result.simulation_mode.is_degraded() {
        result.simulation_mode.to_string().yellow().to_string()
    } else {
        result.simulation_mode.to_string().green().to_string()
    };

    let summary = vec![
        KeyValue::new("Value at Risk", format_money(result.value_at_risk).bold().to_string()),
        KeyValue::new("Expected Shortfall", format_money(result.expected_shortfall)),
        KeyValue::new("Baseline Value", format_money(result.baseline_value)),
        KeyValue::new(
            "VaR / Baseline",
            result
                .relative_var()
                .map_or_else(|| "n/a".to_string(), |r| format_percent(r, 2)),
        ),
        KeyValue::new("Confidence", format_percent(result.confidence_level, 1)),
        KeyValue::new("Horizon (days)", result.horizon_days.to_string()),
        KeyValue::new("Model", result.risk_model.to_string()),
        KeyValue::new("Simulation Mode", mode),
        KeyValue::new("Outcomes", result.simulation_count.to_string()),
        KeyValue::new("Observations", result.observations.to_string()),
        KeyValue::new("Seed", result.seed.to_string()),
    ];

    print_header("Value at Risk");
    print_table(&summary)?;

    if !result.excluded_assets.is_empty() {
        let excluded: Vec<&str> = result.excluded_assets.iter().map(|s| s.as_str()).collect();
        print_warning(&format!(
            "{}: {}",
            excluded_note(result.simulation_mode),
            excluded.join(", ")
        ));
    }

    if result.asset_names.is_empty() {
        return Ok(());
    }

    let assets: Vec<AssetRow> = result
        .asset_names
        .iter()
        .zip(&result.volatility_per_asset)
        .map(|(name, vol)| AssetRow {
            asset: name.to_string(),
            volatility: format_percent(*vol, 3),
        })
        .collect();
    print_header("Volatility per Asset");
    print_table(&assets)?;

    let labels: Vec<String> = result.asset_names.iter().map(|s| s.to_string()).collect();
    print_header("Correlation Matrix");
    print_matrix(&labels, &result.correlation_matrix, 3);

    Ok(())
}

/// How exposure without usable history entered the result.
fn excluded_note(mode: SimulationMode) -> &'static str {
    match mode {
        SimulationMode::Historical => "Insufficient history, held at zero return",
        _ => "Insufficient history, shocked at fallback volatility",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_note_follows_mode() {
        assert!(excluded_note(SimulationMode::Historical).contains("zero return"));
        assert!(excluded_note(SimulationMode::Correlated).contains("fallback volatility"));
        assert!(excluded_note(SimulationMode::VolatilityFallback).contains("fallback volatility"));
    }
}
