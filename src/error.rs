//! Error types for Spottoken
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Spottoken operations
///
/// This enum encompasses all possible errors that can occur during the
/// authorization code flow: starting the local callback listener, the
/// browser authorization step, and the token exchange.
#[derive(Error, Debug)]
pub enum SpottokenError {
    /// Configuration-related errors (bad endpoint URLs, invalid flags)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Callback listener errors (port already bound, accept failures)
    #[error("Listener error: {0}")]
    Listener(String),

    /// Authorization-phase errors (denied, state mismatch, no code received)
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// The token endpoint rejected the code exchange
    #[error("Token exchange failed: status={status}, {body}")]
    TokenExchange {
        /// HTTP status code returned by the token endpoint
        status: u16,
        /// Raw response body as returned by the token endpoint
        body: String,
    },

    /// Clipboard access errors
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Spottoken operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = SpottokenError::Config("invalid token endpoint".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: invalid token endpoint"
        );
    }

    #[test]
    fn test_listener_error_display() {
        let error = SpottokenError::Listener("address already in use".to_string());
        assert_eq!(error.to_string(), "Listener error: address already in use");
    }

    #[test]
    fn test_authorization_error_display() {
        let error = SpottokenError::Authorization("access_denied".to_string());
        assert_eq!(error.to_string(), "Authorization error: access_denied");
    }

    #[test]
    fn test_token_exchange_error_display() {
        let error = SpottokenError::TokenExchange {
            status: 400,
            body: "invalid_grant".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("status=400"));
        assert!(s.contains("invalid_grant"));
    }

    #[test]
    fn test_clipboard_error_display() {
        let error = SpottokenError::Clipboard("no display".to_string());
        assert_eq!(error.to_string(), "Clipboard error: no display");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port busy");
        let error: SpottokenError = io_error.into();
        assert!(matches!(error, SpottokenError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: SpottokenError = json_error.into();
        assert!(matches!(error, SpottokenError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpottokenError>();
    }
}
