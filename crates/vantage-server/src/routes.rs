//! Route definitions.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use vantage_risk::RiskCalculator;

use crate::handlers::{self, AppState};

/// Create the API router.
///
/// # Arguments
/// * `calculator` - The value-at-risk calculator
pub fn create_router(calculator: RiskCalculator) -> Router {
    let state = Arc::new(AppState { calculator });

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/api/v1/health", get(handlers::health))
        // Risk
        .route("/api/v1/risk/var", post(handlers::calculate_var))
        .route("/api/v1/risk/config", get(handlers::get_risk_config))
        // State
        .with_state(state)
}
