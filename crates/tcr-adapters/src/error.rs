//! Adapter errors

use thiserror::Error;

/// Failure of one service call
///
/// Every variant is recoverable from the pipeline's point of view; the
/// classifiers only decide which message the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("service returned an empty response for {0}")]
    EmptyResponse(&'static str),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },
}

impl AdapterError {
    /// Resubmitting the same request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } | Self::EmptyResponse(_) => true,
            Self::Service { status, .. } => *status == 429 || *status >= 500,
            Self::Authentication(_) | Self::Malformed(_) => false,
        }
    }

    /// The service rejected the credentials
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Map an HTTP status and body to an error
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Authentication(message),
            _ => Self::Service { status, message },
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Adapter configuration could not be built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured; set GEMINI_API_KEY or API_KEY")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
