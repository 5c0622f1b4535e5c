//! Custom error types for translation operations

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the remote completion client
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider answered with a non-success status or an error envelope
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Connection could not be established or was dropped
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// No answer within the configured timeout
    #[error("Request timeout after {}s", .timeout.as_secs_f64())]
    TimeoutError {
        timeout: Duration,
    },

    /// Body was not a usable chat completion
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// The outbound request could not be built (bad header value, bad URL)
    #[error("Request error: {message}")]
    RequestError {
        message: String,
    },
}

impl ProviderError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::NetworkError { .. } | ProviderError::TimeoutError { .. } => true,
            ProviderError::ApiError { status, .. } => {
                matches!(status, 408 | 409 | 429) || *status >= 500
            }
            ProviderError::InvalidResponseError { .. } | ProviderError::RequestError { .. } => false,
        }
    }
}

/// Category of a failed translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConfigured,
    EmptyInput,
    RemoteFailure,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotConfigured => write!(f, "not_configured"),
            ErrorKind::EmptyInput => write!(f, "empty_input"),
            ErrorKind::RemoteFailure => write!(f, "remote_failure"),
            ErrorKind::InternalError => write!(f, "internal_error"),
        }
    }
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// No provider credential was configured at start-up
    #[error("Translation service not initialized. Please set OPENROUTER_API_KEY.")]
    NotConfigured,

    /// Text was blank after trimming
    #[error("Empty text provided")]
    EmptyInput,

    /// Any failure of the completion call
    #[error("{0}")]
    RemoteFailure(#[from] ProviderError),

    /// Unexpected failure that should surface as a server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslationError::NotConfigured => ErrorKind::NotConfigured,
            TranslationError::EmptyInput => ErrorKind::EmptyInput,
            TranslationError::RemoteFailure(_) => ErrorKind::RemoteFailure,
            TranslationError::InternalError(_) => ErrorKind::InternalError,
        }
    }
}

/// Invalid process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value for {key}: {value:?} ({message})")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    /// A required value is missing or empty
    #[error("Missing required setting: {key}")]
    MissingValue {
        key: String,
    },
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
