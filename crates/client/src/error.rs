//! Client error taxonomy.
//!
//! Two families matter for the UI: errors that end the session
//! ([`ClientError::Unauthenticated`], [`ClientError::SessionExpired`], both
//! surfaced as "please log in again") and errors the user can correct and
//! retry ([`ClientError::RequestFailed`], [`ClientError::Validation`]),
//! which leave the session untouched.

use thiserror::Error;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable credential at all (not logged in, nothing persisted).
    #[error("not logged in")]
    Unauthenticated,

    /// The access credential expired and could not be renewed.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Any other non-success HTTP outcome.
    #[error("request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// Server-reported per-field errors, flattened into one message.
    #[error("{0}")]
    Validation(String),

    /// Checkout attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A page outside `[1, total]` was requested.
    #[error("page {requested} is out of range (1..={total})")]
    InvalidPage { requested: u32, total: u32 },

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Token storage I/O failed.
    #[error("token storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl ClientError {
    /// Whether the UI should route to the login view.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionExpired)
    }
}

/// Result type alias for [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::RequestFailed {
            status: 404,
            message: "Not found.".to_string(),
        };
        assert_eq!(err.to_string(), "request failed (404): Not found.");

        let err = ClientError::InvalidPage {
            requested: 11,
            total: 10,
        };
        assert_eq!(err.to_string(), "page 11 is out of range (1..=10)");
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::Unauthenticated.requires_login());
        assert!(ClientError::SessionExpired.requires_login());
        assert!(!ClientError::EmptyCart.requires_login());
        assert!(
            !ClientError::Validation("username taken".to_string()).requires_login()
        );
    }
}
