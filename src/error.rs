use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::{LookupOutcome, PlayerRecord};

pub const NOT_FOUND_ERROR: &str = "Player not found in upstream servers";
pub const NOT_FOUND_HINT: &str =
    "The UID may not exist or the upstream servers are currently unavailable or blocking access.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("player not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Validation(reason) => (StatusCode::BAD_REQUEST, reason, None),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                NOT_FOUND_ERROR.to_string(),
                Some(NOT_FOUND_HINT.to_string()),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error,
            message,
        });

        (status, body).into_response()
    }
}

impl LookupOutcome {
    /// Splits the outcome into the found record and its source endpoint,
    /// or the API error to report.
    pub fn into_result(self) -> Result<(PlayerRecord, String), ApiError> {
        match self {
            LookupOutcome::Success { record, source } => Ok((record, source)),
            LookupOutcome::NotFound => Err(ApiError::NotFound),
            LookupOutcome::ValidationError(reason) => Err(ApiError::Validation(reason)),
            LookupOutcome::InternalError(reason) => Err(ApiError::Internal(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let resp = ApiError::Internal("secret pool state".into()).into_response();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("message").is_none());
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn outcomes_map_to_status_codes() {
        let not_found = LookupOutcome::NotFound.into_result().unwrap_err().into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let body = body_of(not_found).await;
        assert_eq!(body["error"], NOT_FOUND_ERROR);
        assert_eq!(body["message"], NOT_FOUND_HINT);

        let invalid = LookupOutcome::ValidationError("bad uid".into())
            .into_result()
            .unwrap_err()
            .into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let internal = LookupOutcome::InternalError("pool closed".into())
            .into_result()
            .unwrap_err()
            .into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
