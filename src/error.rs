//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure surfaced to a caller carries a user-facing message and an HTTP-style
//! status code, whether it leaves through a REST handler or a GraphQL resolver.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly, and `async_graphql::ErrorExtensions` so resolvers expose the same status.
//! `From` implementations for `sqlx::Error` and `bcrypt::BcryptError` allow the `?`
//! operator inside the store and the service.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use async_graphql::ErrorExtensions;
use serde_json::json;
use std::fmt;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// A client-side error (HTTP 400): duplicate email or cpf, wrong password,
    /// or a failed operation rewrapped by the service.
    BadRequest(String),
    /// The requested user does not exist or was soft-deleted (HTTP 404).
    NotFound(String),
    /// Field validation failed (HTTP 400). Holds one localized message per failed rule.
    ValidationError(Vec<String>),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    /// Wraps errors from the `sqlx` crate.
    DatabaseError(String),
}

impl AppError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The user-facing message. Validation messages are joined with a space.
    pub fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg) => msg.clone(),
            AppError::ValidationError(messages) => messages.join(" "),
        }
    }

    /// Whether the error was raised deliberately by the service and should reach
    /// the caller unchanged.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            AppError::BadRequest(_) | AppError::NotFound(_) | AppError::ValidationError(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(messages) => {
                write!(f, "Validation Error: {}", messages.join("; "))
            }
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// The body is always `{ "status": <code>, "message": ... }`; validation errors
/// carry the message list instead of a single string.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let body = match self {
            AppError::ValidationError(messages) => json!({
                "status": status.as_u16(),
                "message": messages
            }),
            _ => json!({
                "status": status.as_u16(),
                "message": self.message()
            }),
        };
        HttpResponse::build(status).json(body)
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.message()).extend_with(|_, e| {
            e.set("status", i32::from(self.status().as_u16()));
        })
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
