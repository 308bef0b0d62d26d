use super::AppState;
use crate::error::AppError;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Handle /metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state.metrics.as_ref().ok_or(AppError::Disabled("Metrics"))?;
    Ok((StatusCode::OK, handle.render()))
}
