// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid amount for '{field}': {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Customer {0} does not exist")]
    DanglingReference(Uuid),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Customer email already exists")]
    CustomerEmailTaken,

    #[error("Invoice number already exists")]
    InvoiceNumberTaken,

    #[error("E-mail already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn invalid_amount(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::InvalidAmount { field, reason: reason.into() }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        AppError::InvalidState(reason.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ref e @ AppError::InvalidAmount { .. } => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ref e @ AppError::InvalidState(_) => (StatusCode::CONFLICT, e.to_string()),
            ref e @ AppError::DanglingReference(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ref e @ AppError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
            ref e @ AppError::MissingField(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::CustomerEmailTaken => (
                StatusCode::CONFLICT,
                "A customer with this email already exists.".to_string(),
            ),
            AppError::InvoiceNumberTaken => (
                StatusCode::CONFLICT,
                "Could not allocate a unique invoice number.".to_string(),
            ),
            AppError::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "This email is already registered. Please sign in instead.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Authentication token is invalid or missing.".to_string(),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found.".to_string()),

            // Everything else is a 500; the detail only goes to the log.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (AppError::invalid_amount("quantity", "negative"), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::invalid_state("invoice is not a draft"), StatusCode::CONFLICT),
            (AppError::DanglingReference(Uuid::nil()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NotFound("Invoice"), StatusCode::NOT_FOUND),
            (AppError::MissingField("dueDate"), StatusCode::BAD_REQUEST),
            (AppError::CustomerEmailTaken, StatusCode::CONFLICT),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("pool exhausted")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
