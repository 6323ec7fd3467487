use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no such method: {0}")]
    MethodNotFound(String),

    #[error("check failed: {0}")]
    CheckFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CheckFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(StoreError::KeyNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
