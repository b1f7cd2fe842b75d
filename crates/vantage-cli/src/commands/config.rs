//! Config command implementation.
//!
//! Shows the engine defaults a `var` run would start from.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use vantage_config::Validate;

use crate::cli::OutputFormat;
use crate::commands::load_risk_config;
use crate::output::{print_header, print_json, print_table, print_warning, KeyValue};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Risk configuration file (TOML). Defaults to the standard preset.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the configuration as TOML
    #[arg(long)]
    pub toml: bool,
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, format: OutputFormat) -> Result<()> {
    let config = load_risk_config(args.config.as_deref())?;

    for error in config.validate() {
        print_warning(&error.to_string());
    }

    if args.toml {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    if format == OutputFormat::Json {
        return print_json(&config);
    }

    let rows = vec![
        KeyValue::new("Name", config.name.clone()),
        KeyValue::new("Simulations", config.default_simulation_count.to_string()),
        KeyValue::new("Max simulations", config.max_simulation_count.to_string()),
        KeyValue::new("Lookback periods", config.default_lookback_periods.to_string()),
        KeyValue::new("Confidence level", config.default_confidence_level.to_string()),
        KeyValue::new("Horizon (days)", config.default_horizon_days.to_string()),
        KeyValue::new("Fallback volatility", config.fallback_volatility.to_string()),
        KeyValue::new("Fetch timeout (ms)", config.fetch_timeout_ms.to_string()),
        KeyValue::new("Normal method", config.normal_method.to_string()),
        KeyValue::new("Parallel", config.parallel.to_string()),
        KeyValue::new("Chunk size", config.chunk_size.to_string()),
        KeyValue::new("Cache bucket (s)", config.cache_bucket_secs.to_string()),
        KeyValue::new(
            "Seed",
            config
                .seed
                .map_or_else(|| "random".to_string(), |s| s.to_string()),
        ),
    ];

    print_header("Risk Configuration");
    print_table(&rows)
}
