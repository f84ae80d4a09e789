//! Error types for remote background removal

use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, BgRemovalError>;

/// User-facing messages shown when a removal request fails
pub mod messages {
    /// Shown for network failures and non-success HTTP responses
    pub const TRANSPORT_FAILURE: &str =
        "The background removal service could not process the image. Please try again.";

    /// Shown for every other failure
    pub const UNEXPECTED_FAILURE: &str = "An unexpected error occurred while removing the background.";
}

/// Comprehensive error type for remote background removal operations
#[derive(Error, Debug)]
pub enum BgRemovalError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Network failure or non-success HTTP status from the removal service
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Diagnostic details
        message: String,
    },

    /// The service answered with success but the payload is unusable
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The selected file is not an acceptable image
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation not allowed in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a failed removal, driving the user message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or HTTP-layer failure; retrying may help
    Transport,
    /// Anything else
    Unexpected,
}

impl FailureKind {
    /// Message presented to the user for this kind of failure
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Transport => messages::TRANSPORT_FAILURE,
            Self::Unexpected => messages::UNEXPECTED_FAILURE,
        }
    }
}

impl BgRemovalError {
    /// Create a new transport error
    pub fn transport<S: Into<String>>(status: Option<u16>, msg: S) -> Self {
        Self::Transport {
            status,
            message: msg.into(),
        }
    }

    /// Create a new unexpected response error
    pub fn unexpected_response<S: Into<String>>(msg: S) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    // Enhanced contextual error creators

    /// Create a transport error from a lower-level network failure
    pub fn network_error<S: Into<String>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Transport {
            status: None,
            message: format!("{}: {}", context.into(), error),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        expected: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (expected: {})",
            parameter, value, expected
        ))
    }

    /// Whether this error came from the transport/HTTP layer
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status attached to a transport error
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Classify this error for user presentation
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        if self.is_transport() {
            FailureKind::Transport
        } else {
            FailureKind::Unexpected
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = BgRemovalError::invalid_config("missing key");
        assert!(matches!(err, BgRemovalError::InvalidConfig(_)));

        let err = BgRemovalError::transport(Some(403), "forbidden");
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_error_display() {
        let err = BgRemovalError::invalid_config("Invalid endpoint");
        assert_eq!(err.to_string(), "Invalid configuration: Invalid endpoint");

        let err = BgRemovalError::transport(Some(500), "boom");
        assert_eq!(err.to_string(), "Transport error (HTTP 500): boom");

        let err = BgRemovalError::transport(None, "connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            BgRemovalError::transport(Some(429), "slow down").failure_kind(),
            FailureKind::Transport
        );
        assert_eq!(
            BgRemovalError::network_error("send", "timed out").failure_kind(),
            FailureKind::Transport
        );
        assert_eq!(
            BgRemovalError::unexpected_response("empty body").failure_kind(),
            FailureKind::Unexpected
        );
        assert_eq!(
            BgRemovalError::internal("oops").failure_kind(),
            FailureKind::Unexpected
        );
        assert_eq!(
            FailureKind::Transport.user_message(),
            messages::TRANSPORT_FAILURE
        );
        assert_eq!(
            FailureKind::Unexpected.user_message(),
            messages::UNEXPECTED_FAILURE
        );
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = BgRemovalError::file_io_error("read image", Path::new("/tmp/photo.png"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("read image"));
        assert!(error_string.contains("/tmp/photo.png"));

        let err = BgRemovalError::config_value_error("endpoint", "ftp://x", "http(s) URL");
        let error_string = err.to_string();
        assert!(error_string.contains("endpoint"));
        assert!(error_string.contains("ftp://x"));
        assert!(error_string.contains("http(s) URL"));
    }
}
