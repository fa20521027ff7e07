use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use slipscan_ocr::{OcrBackend, ScanPipeline};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScanPipeline<Box<dyn OcrBackend>>>,
}

impl AppState {
    pub fn new(recognizer: Box<dyn OcrBackend>) -> Self {
        Self {
            pipeline: Arc::new(ScanPipeline::new(recognizer)),
        }
    }
}

/// Pick the OCR engine this binary was built with.
#[cfg(feature = "tesseract")]
pub fn recognizer_from_config(config: &ServerConfig) -> Box<dyn OcrBackend> {
    tracing::info!(lang = %config.tesseract_lang, "using Tesseract recognizer");
    Box::new(slipscan_ocr::TesseractRecognizer::new(
        config.tesseract_data_path.clone(),
        &config.tesseract_lang,
    ))
}

#[cfg(not(feature = "tesseract"))]
pub fn recognizer_from_config(_config: &ServerConfig) -> Box<dyn OcrBackend> {
    tracing::warn!("built without the `tesseract` feature; every scan will fail");
    Box::new(slipscan_ocr::UnavailableRecognizer)
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/scan", post(routes::scan_receipt))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid allowed origin: {o}");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
