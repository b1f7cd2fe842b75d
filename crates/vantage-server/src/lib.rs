//! # Vantage Server
//!
//! REST server for the Vantage value-at-risk engine.
//!
//! ## Features
//!
//! - `POST /api/v1/risk/var` computes VaR for a portfolio snapshot
//! - `GET /api/v1/risk/config` reports the effective engine defaults
//! - Health endpoints
//! - Configuration via TOML file
//!
//! ## Usage
//!
//! ```ignore
//! use vantage_server::Server;
//!
//! let server = Server::new(config, calculator);
//! server.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use vantage_ext_file::{create_file_history, EmptyReturnSource, SeriesKind};
use vantage_risk::RiskCalculator;
use vantage_traits::{HistoricalDataProvider, TraitError};

pub use config::ServerConfig;

/// The Vantage server.
pub struct Server {
    config: ServerConfig,
    calculator: RiskCalculator,
}

impl Server {
    /// Create a new server.
    pub fn new(config: ServerConfig, calculator: RiskCalculator) -> Self {
        Self { config, calculator }
    }

    /// Create a server whose history comes from the configured returns
    /// file, behind a read-through cache.
    pub fn from_config(config: ServerConfig) -> Result<Self, TraitError> {
        let provider: Arc<dyn HistoricalDataProvider> = match &config.returns_file {
            Some(path) => {
                let kind = if config.returns_are_prices {
                    SeriesKind::Prices
                } else {
                    SeriesKind::Returns
                };
                info!("Loading history from {}", path);
                create_file_history(path, kind)?
            }
            None => {
                info!("No returns file configured, using fallback volatility only");
                Arc::new(EmptyReturnSource)
            }
        };

        let calculator = RiskCalculator::with_cache(provider, config.risk.clone());
        Ok(Self::new(config, calculator))
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::create_router(self.calculator.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::new(
            self.config.host.parse().unwrap_or([0, 0, 0, 0].into()),
            self.config.port,
        );

        info!("Starting Vantage server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await
    }
}
