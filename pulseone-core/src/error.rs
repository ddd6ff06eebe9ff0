//! Error types for the Pulse One client core

use thiserror::Error;

/// Errors produced at the HTTP boundary.
///
/// Every backend response is validated into either a decoded value or one of
/// these variants, so callers never inspect raw response shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    /// 401/403 from the backend
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("session is not valid"))]
    Unauthorized(Option<String>),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// The envelope came back with `success: false`
    #[error("Request rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Message supplied by the backend, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(message)
            | ApiError::Http { message, .. }
            | ApiError::Rejected(message) => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Errors from the persistent credential store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine data directory")]
    DataDir,

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize stored value: {0}")]
    Serialize(String),
}

/// Top-level error for constructing the client core
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_network() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_display_http_without_message() {
        let err = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 500: request failed");
    }

    #[test]
    fn test_server_message_prefers_backend_text() {
        let err = ApiError::Unauthorized(Some("Invalid credentials".to_string()));
        assert_eq!(err.server_message(), Some("Invalid credentials"));

        let err = ApiError::Http {
            status: 422,
            message: Some("   ".to_string()),
        };
        assert_eq!(err.server_message(), None);

        assert_eq!(ApiError::Network("down".to_string()).server_message(), None);
    }

    #[test]
    fn test_cancelled_is_matchable() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::Decode("x".to_string()).is_cancelled());
    }

    #[test]
    fn test_storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io.into();
        assert_eq!(err.to_string(), "Storage IO error: denied");
    }
}
