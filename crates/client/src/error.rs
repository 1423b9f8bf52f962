//! Client error type.
//!
//! Every provider operation returns `Result<T, ClientError>`. The variants
//! follow the failure taxonomy of the storefront: transport failures, HTTP
//! error responses, session expiry, local validation, and persistence.

use reqwest::StatusCode;
use solar_market_core::{EmailError, OrderStatus};
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors that can occur when talking to the marketplace backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend's own `message` field when present, otherwise
    /// `HTTP <status>`.
    #[error("{message}")]
    Api {
        /// Response status.
        status: StatusCode,
        /// Human-readable error message.
        message: String,
    },

    /// The backend rejected the access token. The session has already been
    /// torn down when this is returned.
    #[error("Session expired, please log in again")]
    Unauthorized,

    /// The operation needs a logged-in user and there is none.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal order status change.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted session state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Build an API error from a status and an optional backend message.
    pub(crate) fn api(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        Self::Api { status, message }
    }

    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Whether the error should be reported to error tracking.
    ///
    /// Validation failures, client errors and expired sessions are expected
    /// and stay local.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::Storage(_) | Self::Config(_) => true,
            Self::Api { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

impl From<EmailError> for ClientError {
    fn from(err: EmailError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_backend_message() {
        let err = ClientError::api(StatusCode::CONFLICT, Some("Email already in use".into()));
        assert_eq!(err.to_string(), "Email already in use");
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }

    #[test]
    fn test_api_error_falls_back_to_status() {
        let err = ClientError::api(StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.to_string(), "HTTP 502");

        let blank = ClientError::api(StatusCode::NOT_FOUND, Some("  ".into()));
        assert_eq!(blank.to_string(), "HTTP 404");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = ClientError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Cannot move order from shipped to cancelled");
    }

    #[test]
    fn test_reportable() {
        assert!(ClientError::api(StatusCode::INTERNAL_SERVER_ERROR, None).is_reportable());
        assert!(!ClientError::api(StatusCode::BAD_REQUEST, None).is_reportable());
        assert!(!ClientError::Unauthorized.is_reportable());
        assert!(!ClientError::Validation("quantity".into()).is_reportable());
    }

    #[test]
    fn test_email_error_becomes_validation() {
        let err: ClientError = EmailError::MissingAtSymbol.into();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
