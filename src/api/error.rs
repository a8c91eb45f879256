use crate::services::transcription::TranscribeError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const UNSUPPORTED_MEDIA_MESSAGE: &str = "File type not supported";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<TranscribeError> for AppError {
    fn from(err: TranscribeError) -> Self {
        match err {
            TranscribeError::UnsupportedMediaType(declared) => {
                AppError::UnsupportedMediaType(declared)
            }
            TranscribeError::InvalidFilename(reason) => {
                AppError::BadRequest(format!("Invalid filename: {}", reason))
            }
            TranscribeError::FileNotFound(path) => {
                tracing::warn!("Staged file vanished before read: {}", path.display());
                AppError::NotFound("File not found".to_string())
            }
            e @ TranscribeError::Io(_) => AppError::Internal(e.to_string()),
            TranscribeError::Transcription(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::UnsupportedMediaType(declared) => {
                tracing::info!("Rejected upload with content type '{}'", declared);
                return (StatusCode::FORBIDDEN, UNSUPPORTED_MEDIA_MESSAGE).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}
