use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::services::{AccountError, EventError};
use crate::store::StoreError;
use crate::utils::response::error as error_response;
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(ValidationErrors),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Event is locked: {0}")]
    EventLocked(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Email taken: {0}")]
    EmailTaken(String),

    #[error("Database error")]
    DatabaseError(#[from] StoreError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn event_not_found(id: impl std::fmt::Display) -> Self {
        AppError::EventNotFound(format!("Event '{}' does not exist", id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::EventLocked(_) => StatusCode::BAD_REQUEST,
            AppError::EventNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailTaken(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPayload(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::EventLocked(_) => "EVENT_IS_LOCKED",
            AppError::EventNotFound(_) => "EVENT_NOT_FOUND",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::EmailTaken(_) => "EMAIL_TAKEN",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal server error");
            }
            _ => {
                warn!(code = self.code(), message = %self, "Request rejected");
            }
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(errors) => AppError::InvalidPayload(errors),
            EventError::NotFound(id) => AppError::event_not_found(id),
            EventError::Unauthorized { .. } => AppError::Unauthorized(
                "You do not have permission to perform this action".to_string(),
            ),
            EventError::Locked { action, .. } => {
                AppError::EventLocked(format!("Cannot {} event tied to a booking", action.as_str()))
            }
            EventError::Persistence(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(errors) => AppError::InvalidPayload(errors),
            AccountError::EmailTaken(email) => {
                AppError::EmailTaken(format!("Email '{}' is already registered", email))
            }
            AccountError::InvalidCredentials => {
                AppError::AuthError("Invalid email or password".to_string())
            }
            AccountError::Hashing(msg) => AppError::InternalServerError(msg),
            AccountError::Persistence(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        let (public_message, details) = match self {
            AppError::InvalidPayload(errors) => (
                "The request payload is invalid".to_string(),
                serde_json::to_value(&errors).ok(),
            ),
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Unauthorized(msg)
            | AppError::EventLocked(msg)
            | AppError::EventNotFound(msg)
            | AppError::NotFound(msg)
            | AppError::EmailTaken(msg) => (msg, None::<Value>),
            // Do not expose internal details in the API response
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::InternalServerError(_) => ("Internal server error".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}

/// Parses an event id from a path segment. Anything that is not a UUID cannot
/// name a stored event, so it is reported as not found.
pub fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::event_not_found(raw))
}
