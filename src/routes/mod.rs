// Route exports
pub mod profiles;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};

use crate::models::ErrorResponse;

pub use profiles::AppState;

/// JSON error for rejected request payloads
#[derive(Debug)]
pub struct PayloadError {
    pub error: &'static str,
    pub message: String,
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for PayloadError {}

impl error::ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.error.to_string(),
            message: self.message.clone(),
            status_code: self.status_code().as_u16(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    PayloadError {
        error: "invalid_json",
        message: format!("Invalid JSON: {}", err),
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    PayloadError {
        error: "invalid_query",
        message: format!("Invalid query: {}", err),
    }
    .into()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .configure(profiles::configure),
    );
}
