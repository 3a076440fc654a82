//! Error types for the campus SDK
//!
//! Every transport failure is normalized into an [`ApiError`] carrying a
//! status-derived [`ErrorKind`], a human-readable message and the original
//! status code (when a response was received).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Normalized error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No response was received (connect failure, timeout, reset)
    Network,
    /// 401/403 - the session is missing or expired
    Unauthorized,
    /// Other 4xx - the request was rejected, possibly with field errors
    Validation,
    /// 404
    NotFound,
    /// 5xx, or a success response whose body could not be decoded
    ServerError,
}

impl ErrorKind {
    /// Derive the category from an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400..=499 => Self::Validation,
            _ => Self::ServerError,
        }
    }

    /// Whether the query cache may silently retry a fetch that failed this way
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniform error shape for every resource call
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} error: {message}")]
pub struct ApiError {
    /// Status-derived category
    pub kind: ErrorKind,
    /// Message from the response body, or an operation-specific fallback
    pub message: String,
    /// HTTP status code, absent for network failures
    pub status: Option<u16>,
    /// Field-level messages carried by validation responses
    pub field_errors: BTreeMap<String, String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            field_errors: BTreeMap::new(),
        }
    }

    /// Build an error from a non-success response status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::from_status(status), message)
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn with_field_errors(mut self, field_errors: BTreeMap<String, String>) -> Self {
        self.field_errors = field_errors;
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::new(ErrorKind::ServerError, format!("Invalid payload: {}", err))
    }
}

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Base URL is empty or not an http(s) URL
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Cache capacity must be at least one entry
    #[error("Cache capacity must be greater than zero")]
    ZeroCapacity,

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
