//! Vantage CLI - Command-line interface for value-at-risk.
//!
//! # Usage
//!
//! ```bash
//! # Monte Carlo VaR from a returns file
//! vantage var --portfolio book.json --returns returns.csv --confidence 0.99
//!
//! # Historical VaR from prices, as JSON
//! vantage --format json var --portfolio book.json --returns prices.csv --prices --model historical
//!
//! # Show the effective engine defaults
//! vantage config --config risk.toml
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let default_filter = if cli.verbose { "info,vantage=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;

    match cli.command {
        Commands::Var(args) => commands::var::execute(args, format)?,
        Commands::Config(args) => commands::config::execute(args, format)?,
    }

    Ok(())
}
