use super::AppState;
use crate::error::AppError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "logvault",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK once the log store answers
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.logs.store().ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness probe failed");
        AppError::Unavailable(e)
    })?;

    Ok((StatusCode::OK, Json(json!({
        "status": "ready",
        "service": "logvault",
    }))))
}
