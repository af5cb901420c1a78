//!
//! # Custom Error Handling
//!
//! This module defines the two error types used throughout the application:
//!
//! * [`PersistenceError`]: the only error the store layer ([`crate::db`]) ever
//!   surfaces. Absence of a record is never an error there; it is reported as
//!   `None`, `false` or a zero count.
//! * [`AppError`]: the application-level taxonomy. "Not found" and "forbidden"
//!   are service-layer decisions made on top of absence and the authorization
//!   policy; they never originate inside the repository.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into HTTP responses with JSON bodies, and provides `From`
//! implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` so handlers can use
//! the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// A failure of the underlying document store.
///
/// Nothing in the core retries these; they propagate to the caller as distinct,
/// inspectable values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A store-level constraint was violated (unique index, check constraint,
    /// foreign key, or an injected field validator).
    ConstraintViolation(String),
    /// The store could not be reached or answered with a protocol-level fault.
    Unreachable(String),
    /// The store client's own I/O timeout elapsed.
    Timeout(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PersistenceError::ConstraintViolation(msg) => {
                write!(f, "Constraint violation: {}", msg)
            }
            PersistenceError::Unreachable(msg) => write!(f, "Store unreachable: {}", msg),
            PersistenceError::Timeout(msg) => write!(f, "Store timeout: {}", msg),
        }
    }
}

/// Maps `sqlx::Error` onto the three persistence failure kinds.
///
/// SQLSTATE class 23 covers integrity constraint violations; pool exhaustion is
/// the client-side timeout; everything else is treated as the store being
/// unreachable.
impl From<sqlx::Error> for PersistenceError {
    fn from(error: sqlx::Error) -> PersistenceError {
        match error {
            sqlx::Error::Database(db) if db.code().map_or(false, |c| c.starts_with("23")) => {
                PersistenceError::ConstraintViolation(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut => {
                PersistenceError::Timeout("connection pool timed out".into())
            }
            other => PersistenceError::Unreachable(other.to_string()),
        }
    }
}

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// A requested record does not exist (HTTP 404).
    NotFound(String),
    /// The authorization policy denied the operation (HTTP 403).
    Forbidden(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// A store-layer failure surfaced by the repository.
    Persistence(PersistenceError),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::Persistence(err) => write!(f, "Persistence Error: {}", err),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            // A constraint violation is a conflict with existing state; the
            // remaining persistence failures are opaque server errors.
            AppError::Persistence(PersistenceError::ConstraintViolation(msg)) => {
                HttpResponse::Conflict().json(json!({
                    "error": msg
                }))
            }
            AppError::Persistence(err) => HttpResponse::InternalServerError().json(json!({
                "error": err.to_string()
            })),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

impl From<PersistenceError> for AppError {
    fn from(error: PersistenceError) -> AppError {
        AppError::Persistence(error)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::Persistence(error.into())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        let response = error.error_response();
        assert_eq!(response.status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);

        let error = AppError::NotFound("Task not found".into());
        let response = error.error_response();
        assert_eq!(response.status(), 404);

        let error = AppError::Forbidden("You are not allowed to update this task".into());
        let response = error.error_response();
        assert_eq!(response.status(), 403);

        let error = AppError::InternalServerError("Server error".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);

        let error = AppError::ValidationError("Title is required".into());
        let response = error.error_response();
        assert_eq!(response.status(), 422);
    }

    #[test]
    fn test_persistence_error_responses() {
        let error = AppError::Persistence(PersistenceError::ConstraintViolation(
            "duplicate key value violates unique constraint".into(),
        ));
        assert_eq!(error.error_response().status(), 409);

        let error =
            AppError::Persistence(PersistenceError::Unreachable("connection refused".into()));
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::Persistence(PersistenceError::Timeout("pool timed out".into()));
        assert_eq!(error.error_response().status(), 500);
    }

    #[test]
    fn test_sqlx_timeout_maps_to_timeout_kind() {
        let err: PersistenceError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(
            err,
            PersistenceError::Timeout("connection pool timed out".into())
        );
    }

    #[test]
    fn test_sqlx_row_not_found_is_not_a_not_found() {
        // Absence is reported by the repository as None, never as an error, so
        // a stray RowNotFound from the driver is a store fault here.
        let err: PersistenceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, PersistenceError::Unreachable(_)));
    }
}
