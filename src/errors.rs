// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the routing engine and its HTTP surface

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Engine kinds (range, resolution, search, freshness, timeout)
/// are surfaced unchanged from the core; the remaining kinds belong to the
/// collaborators and the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Resolution mismatch: {0} vs {1}")]
    ResolutionMismatch(u8, u8),

    #[error("No path found between {from} and {to}")]
    NoPathFound { from: String, to: String },

    #[error("Search bound exceeded after {expansions} expansions")]
    SearchBoundExceeded { expansions: usize },

    #[error("Location for user {user_id} is stale ({age_secs}s old, window {window_secs}s)")]
    StaleLocation {
        user_id: String,
        age_secs: i64,
        window_secs: i64,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search timed out after {expansions} expansions")]
    Timeout { expansions: usize },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing or invalid session token")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl RouteError {
    fn error_code(&self) -> &'static str {
        match self {
            RouteError::OutOfRange(_) => "OUT_OF_RANGE",
            RouteError::ResolutionMismatch(..) => "RESOLUTION_MISMATCH",
            RouteError::NoPathFound { .. } => "NO_PATH_FOUND",
            RouteError::SearchBoundExceeded { .. } => "SEARCH_BOUND_EXCEEDED",
            RouteError::StaleLocation { .. } => "STALE_LOCATION",
            RouteError::NotFound(_) => "NOT_FOUND",
            RouteError::Timeout { .. } => "TIMEOUT",
            RouteError::DatabaseError(_) => "DATABASE_ERROR",
            RouteError::ValidationError(_) => "VALIDATION_ERROR",
            RouteError::Unauthorized => "UNAUTHORIZED",
            RouteError::SessionExpired => "SESSION_EXPIRED",
            RouteError::Forbidden(_) => "FORBIDDEN",
            RouteError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for RouteError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("Database error: {}", e);
        RouteError::DatabaseError(e.to_string())
    }
}

/// Convert RouteError to HTTP response
/// DOCUMENTATION: Maps error kinds to HTTP status codes and JSON responses
impl ResponseError for RouteError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            RouteError::OutOfRange(_) => StatusCode::BAD_REQUEST,
            RouteError::ResolutionMismatch(..) => StatusCode::BAD_REQUEST,
            RouteError::ValidationError(_) => StatusCode::BAD_REQUEST,
            RouteError::Unauthorized => StatusCode::UNAUTHORIZED,
            RouteError::SessionExpired => StatusCode::UNAUTHORIZED,
            RouteError::Forbidden(_) => StatusCode::FORBIDDEN,
            RouteError::NotFound(_) => StatusCode::NOT_FOUND,
            RouteError::StaleLocation { .. } => StatusCode::CONFLICT,
            RouteError::NoPathFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RouteError::SearchBoundExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RouteError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RouteError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RouteError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_client_statuses() {
        assert_eq!(
            RouteError::OutOfRange("latitude".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RouteError::SearchBoundExceeded { expansions: 3 }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RouteError::Timeout { expansions: 1000 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_stale_location_message() {
        let err = RouteError::StaleLocation {
            user_id: "u1".into(),
            age_secs: 900,
            window_secs: 600,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("900s old"));
    }
}
