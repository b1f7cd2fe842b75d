//! Vantage risk server entry point.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vantage_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,vantage=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Vantage Risk Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/vantage.toml".to_string());

    let server_config = ServerConfig::load(&config_path)?;

    let server = Server::from_config(server_config)?;
    server.start().await?;

    Ok(())
}
