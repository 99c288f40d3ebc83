/// Error types for FCM Sender Service
///
/// Converts send failures and request validation failures into JSON HTTP
/// responses.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use fcm_core::{BuildError, SendError};
use serde::Serialize;
use thiserror::Error;

use crate::models::FieldErrors;

/// Result type for fcm-sender-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Nginx's "client closed request"; actix drops the handler but the status still gets logged
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed field validation
    #[error("One or more validation errors occurred")]
    Validation(FieldErrors),

    /// Body could not be parsed
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Send(#[from] SendError),
}

/// JSON error body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "INVALID_REQUEST",
            AppError::Send(SendError::Build(_)) => "VALIDATION_ERROR",
            AppError::Send(SendError::Credential(_)) => "CREDENTIAL_ERROR",
            AppError::Send(SendError::Transport(_)) => "FCM_ERROR",
            AppError::Send(SendError::Cancelled) => "REQUEST_CANCELLED",
        }
    }

    fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors.clone()),
            AppError::Send(SendError::Build(e @ BuildError::NoTarget)) => {
                Some(FieldErrors::from([("target".to_string(), vec![e.to_string()])]))
            }
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Send(SendError::Build(_)) => StatusCode::BAD_REQUEST,
            AppError::Send(SendError::Credential(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Send(SendError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::Send(SendError::Cancelled) => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                .unwrap_or(StatusCode::SERVICE_UNAVAILABLE),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let upstream_status = match self {
            AppError::Send(SendError::Transport(e)) => e.status(),
            _ => None,
        };

        let response = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Client Closed Request")
                .to_string(),
            message: self.to_string(),
            status: status.as_u16(),
            code: self.code().to_string(),
            errors: self.field_errors(),
            upstream_status,
        };

        HttpResponse::build(status).json(response)
    }
}
