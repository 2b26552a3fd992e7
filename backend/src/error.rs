//! Error type shared by all HTTP handlers.
//!
//! Every handler returns `Result<HttpResponse, ServiceError>`; the mapping to
//! status codes lives in the `ResponseError` impl below.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::mapping::FieldMappingResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// The template references variables the contact file cannot fill.
    #[error("field mapping is not valid: missing {:?}", .0.missing_fields)]
    InvalidMapping(FieldMappingResult),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Kept as text: `MultipartError` wraps a non-`Send` actix error, and
    /// `ServiceError` crosses `spawn_blocking`.
    #[error("upload error: {0}")]
    Multipart(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl From<actix_multipart::MultipartError> for ServiceError {
    fn from(e: actix_multipart::MultipartError) -> Self {
        ServiceError::Multipart(e.to_string())
    }
}

impl ServiceError {
    pub fn not_found(what: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{what} not found: {id}"))
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::BadRequest(_) | ServiceError::Csv(_) | ServiceError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::InvalidMapping(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Database(_)
            | ServiceError::Json(_)
            | ServiceError::Io(_)
            | ServiceError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // The caller needs the full result to show which fields are missing.
            ServiceError::InvalidMapping(result) => {
                HttpResponse::build(self.status_code()).json(result)
            }
            _ => {
                if self.status_code().is_server_error() {
                    log::error!("{self}");
                }
                HttpResponse::build(self.status_code()).body(self.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send + 'static>() {}

    #[test]
    fn service_error_can_leave_a_blocking_task() {
        assert_send::<ServiceError>();
        assert_send::<Result<common::jobs::CampaignStatus, ServiceError>>();
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ServiceError::not_found("file", "f-1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Multipart("truncated".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidMapping(FieldMappingResult::default()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
