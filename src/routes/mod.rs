// Route exports
pub mod assets;
pub mod predict;

use actix_web::{error, http::StatusCode, web, HttpResponse};
use std::path::PathBuf;
use std::sync::Arc;
use crate::core::PredictionService;
use crate::models::ErrorResponse;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictionService>,
    pub frontend_dir: Arc<PathBuf>,
    pub strict_not_found: bool,
}

/// Register every route; prediction routes first so the asset catch-all
/// never shadows them
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(predict::configure)
        .configure(assets::configure);
}

/// Error surfaced to clients as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub detail: String,
    pub status: StatusCode,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.detail)
    }
}

impl std::error::Error for ApiError {}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorResponse {
            detail: self.detail.clone(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::bad_request(format!("Invalid JSON: {}", err)).into()
}

/// JSON extractor configuration used by every prediction route
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}
