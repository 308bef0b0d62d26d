use super::AppState;
use crate::error::AppError;
use crate::logs::{LogFilter, ResultSource};
use crate::logs::ValidationError;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Handle `POST /api/logs`
pub async fn create_log(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    // The router only sends POST here
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed("POST"));
    }

    let entry = state.logs.ingest(&body).await?;
    tracing::debug!(level = %entry.level, created_at = %entry.created_at, "Log entry stored");

    Ok((
        StatusCode::OK,
        Json(json!({ "status": "Log entry created successfully" })),
    )
        .into_response())
}

/// Handle `GET /api/logs?since=&level=&limit=`
///
/// Repeated keys keep their first value.
pub async fn list_logs(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(pairs) = pairs.map_err(|e| ValidationError::QueryString(e.body_text()))?;
    let filter = LogFilter::from_pairs(pairs);

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let retrieved = state.logs.retrieve(path_and_query, &filter).await?;
    if retrieved.source == ResultSource::Cache {
        tracing::info!("Cache hit. Returning logs from cache.");
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        retrieved.body,
    )
        .into_response())
}
