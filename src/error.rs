use crate::logs::query::ValidationError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-level error types
///
/// The `Display` text is what the client sees; underlying causes are kept as
/// sources for logging only.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected query parameter or request body
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// Method not allowed for this endpoint
    #[error("Only {0} is allowed")]
    MethodNotAllowed(&'static str),
    /// Insert failed
    #[error("Failed to insert log")]
    Insert(#[source] StoreError),
    /// Select failed
    #[error("Failed to query logs")]
    Query(#[source] StoreError),
    /// A returned row could not be read or its timestamp decoded
    #[error("Failed to read logs")]
    ReadRows(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Response body could not be encoded
    #[error("Failed to process logs")]
    Encode(#[source] serde_json::Error),
    /// Store did not answer the readiness probe
    #[error("Log store unavailable")]
    Unavailable(#[source] StoreError),
    /// Endpoint disabled by configuration
    #[error("{0} is disabled")]
    Disabled(&'static str),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Insert(_) | Self::Query(_) | Self::ReadRows(_) | Self::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Disabled(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (self.status(), body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::Validation(_) => "validation_error",
        AppError::MethodNotAllowed(_) => "method_not_allowed",
        AppError::Insert(_) | AppError::Query(_) | AppError::ReadRows(_) => "store_error",
        AppError::Encode(_) => "serialization_error",
        AppError::Unavailable(_) => "unavailable",
        AppError::Disabled(_) => "not_found",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_hides_cause() {
        let error = AppError::Query(StoreError::Query(sqlx::Error::PoolTimedOut));
        assert_eq!(error.to_string(), "Failed to query logs");
    }

    #[test]
    fn test_error_type_name() {
        let error = AppError::Validation(ValidationError::Since("48h".to_string()));
        assert_eq!(error_type_name(&error), "validation_error");
        assert_eq!(error_type_name(&AppError::MethodNotAllowed("POST")), "method_not_allowed");
    }

    #[tokio::test]
    async fn test_error_response_status() {
        let response = AppError::Validation(ValidationError::Limit("x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::MethodNotAllowed("POST").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = AppError::Insert(StoreError::Insert(sqlx::Error::PoolClosed)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::Validation(ValidationError::Since("48h".to_string())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["error"]["type"], "validation_error");
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid 'since' value"));
    }
}
