//! HTTP mapping of [`AppError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use rf_core::error::{AppError, DomainError};
use serde_json::json;
use thiserror::Error;

/// Body message for every 500; the cause only goes to the log.
pub const SERVER_FAILURE: &str = "terjadi kegagalan pada server kami";

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            AppError::Internal(cause) => {
                log::error!("request failed: {cause:#}");
                HttpResponse::InternalServerError().json(json!({
                    "status": "error",
                    "message": SERVER_FAILURE,
                }))
            }
            client => HttpResponse::build(self.status_code()).json(json!({
                "status": "fail",
                "message": client.to_string(),
            })),
        }
    }
}
