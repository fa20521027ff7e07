use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use slipscan_core::ReceiptRecord;

use crate::error::ApiError;
use crate::AppState;

/// Multipart part that carries the receipt image.
const FILE_FIELD: &str = "file";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "receipt-scanner" }))
}

pub async fn scan_receipt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReceiptRecord>, ApiError> {
    let upload = read_image_part(&mut multipart).await?;
    tracing::debug!(bytes = upload.len(), "receipt upload received");

    // Decoding, normalization and OCR are CPU bound.
    let pipeline = state.pipeline.clone();
    let record = tokio::task::spawn_blocking(move || pipeline.scan_bytes(&upload))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(
        fields = record.populated_fields(),
        confidence = record.confidence(),
        sportsbook = ?record.sportsbook,
        bet_type = ?record.bet_type,
        "receipt scanned"
    );
    Ok(Json(record))
}

async fn read_image_part(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(ApiError::BadRequest("File must be an image".to_string()));
        }
        return Ok(field.bytes().await?);
    }
    Err(ApiError::BadRequest(format!("Missing `{FILE_FIELD}` upload")))
}
