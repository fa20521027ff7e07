use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use slipscan_ocr::ScanError;
use thiserror::Error;

/// Request failures, rendered as `{"detail": "..."}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Multipart(#[from] MultipartError),
    #[error("{0}")]
    Scan(#[from] ScanError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Scan(ScanError::NoText) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Scan(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Multipart(e) => e.body_text(),
            ApiError::Scan(e @ ScanError::NoText) => e.to_string(),
            ApiError::Scan(e) => format!("Error processing image: {e}"),
            ApiError::Internal(msg) => format!("Error processing image: {msg}"),
            ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            tracing::error!(%status, "scan failed: {detail}");
        } else {
            tracing::warn!(%status, "scan rejected: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
