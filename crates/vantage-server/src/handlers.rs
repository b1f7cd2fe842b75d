//! Request handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use vantage_config::RiskConfig;
use vantage_core::types::{VaRRequest, VaRResult};
use vantage_risk::{RiskCalculator, RiskError};

/// Application state.
pub struct AppState {
    /// The value-at-risk calculator
    pub calculator: RiskCalculator,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Error response.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

/// Errors returned by the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request.
    #[error("invalid {field}: {reason}")]
    BadRequest {
        /// Offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The caller deadline expired.
    #[error("deadline of {0}ms exceeded")]
    Timeout(u64),

    /// Anything else.
    #[error("calculation failed: {0}")]
    Internal(String),
}

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::InvalidConfiguration { field, reason } => {
                ApiError::BadRequest { field, reason }
            }
            RiskError::Timeout { deadline_ms } => ApiError::Timeout(deadline_ms),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let field = match &self {
            ApiError::BadRequest { field, .. } => Some(field.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}

/// Compute value at risk for a portfolio.
pub async fn calculate_var(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VaRRequest>,
) -> Result<Json<VaRResult>, ApiError> {
    match state.calculator.calculate(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!("VaR request for '{}' failed: {}", request.portfolio.name, e);
            Err(e.into())
        }
    }
}

/// Effective engine defaults.
pub async fn get_risk_config(State(state): State<Arc<AppState>>) -> Json<RiskConfig> {
    Json(state.calculator.config().clone())
}
