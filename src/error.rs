//! Service error types with HTTP status code mapping.
//!
//! [`TicketingError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "not enough vip tickets: requested 3, available 1",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status               |
/// |-----------|---------------------|---------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request           |
/// | 2000–2999 | Not Found           | 404 Not Found             |
/// | 3000–3999 | Server              | 500 Internal Server Error |
/// | 4000–4999 | Inventory / State   | 409 Conflict              |
/// | 5000–5999 | Authentication      | 401 / 403                 |
#[derive(Debug, thiserror::Error)]
pub enum TicketingError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown ticket tier name.
    #[error("invalid ticket tier: {0}")]
    InvalidTier(String),

    /// Purchase quantity outside the accepted range.
    #[error("invalid quantity {0}: must be between 1 and {max}", max = crate::domain::MAX_TICKETS_PER_PURCHASE)]
    InvalidQuantity(u32),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// Account with the given ID was not found.
    #[error("account not found: {0}")]
    AccountNotFound(uuid::Uuid),

    /// Purchase with the given ID was not found.
    #[error("purchase not found: {0}")]
    PurchaseNotFound(uuid::Uuid),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// The requested tier does not have enough tickets left.
    #[error("not enough {tier} tickets: requested {requested}, available {available}")]
    InsufficientTickets {
        /// Tier name.
        tier: String,
        /// Quantity asked for.
        requested: u32,
        /// Quantity left at the time of the request.
        available: u32,
    },

    /// An account with this email already exists.
    #[error("an account with email {0} already exists")]
    EmailTaken(String),

    /// Purchase was refunded already.
    #[error("purchase {0} is already refunded")]
    AlreadyRefunded(uuid::Uuid),

    /// Idempotency key reused for a different or still-running request.
    #[error("idempotency conflict: {0}")]
    IdempotencyConflict(String),

    /// Missing, malformed, expired or revoked bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Email and password did not match an account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Authenticated, but not allowed to perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl TicketingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTier(_) => 1002,
            Self::InvalidQuantity(_) => 1003,
            Self::EventNotFound(_) => 2001,
            Self::AccountNotFound(_) => 2002,
            Self::PurchaseNotFound(_) => 2003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::InsufficientTickets { .. } => 4001,
            Self::EmailTaken(_) => 4002,
            Self::AlreadyRefunded(_) => 4003,
            Self::IdempotencyConflict(_) => 4004,
            Self::Unauthorized(_) => 5001,
            Self::InvalidCredentials => 5002,
            Self::Forbidden(_) => 5003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidTier(_) | Self::InvalidQuantity(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::EventNotFound(_) | Self::AccountNotFound(_) | Self::PurchaseNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InsufficientTickets { .. }
            | Self::EmailTaken(_)
            | Self::AlreadyRefunded(_)
            | Self::IdempotencyConflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message safe to return to clients. Server-side causes stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::PersistenceError(_) | Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for TicketingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_conflicts_map_to_409() {
        let err = TicketingError::InsufficientTickets {
            tier: "vip".to_string(),
            requested: 3,
            available: 1,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 4001);
        assert!(err.to_string().contains("requested 3"));
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = TicketingError::PersistenceError("connection refused on 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "internal server error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            TicketingError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            TicketingError::Forbidden("organizers only".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn into_response_sets_status() {
        let response = TicketingError::EventNotFound(uuid::Uuid::new_v4()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
