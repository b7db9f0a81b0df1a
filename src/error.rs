//! Error types for hellahella
//!
//! This module provides error handling for the control panel, including:
//! - Domain-specific error types (RPC transport, validation, authentication)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for hellahella operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hellahella
///
/// This is the primary error type used throughout the crate. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "daemon.host")
        key: Option<String>,
    },

    /// XML-RPC call against the daemon failed
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Request input failed validation (no daemon call was attempted)
    #[error("validation error: {0}")]
    Validation(String),

    /// A protected route was accessed without an authenticated session
    #[error("Please log in")]
    AuthenticationRequired,

    /// Login attempt did not match the configured credentials
    #[error("Invalid user/password combination")]
    InvalidCredentials,

    /// Session store is at capacity
    #[error("session limit reached: {active}/{max} sessions active")]
    SessionLimit {
        /// Number of sessions currently active
        active: usize,
        /// Configured maximum number of sessions
        max: usize,
    },

    /// Referenced session or resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// XML-RPC transport and protocol errors
///
/// A failed call propagates as-is to the handler; there is no retry logic
/// anywhere in this crate.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Cannot reach the daemon's RPC endpoint
    #[error("cannot reach daemon: {0}")]
    Connection(String),

    /// The RPC transport timed out
    #[error("daemon call timed out: {0}")]
    Timeout(String),

    /// The daemon answered with an XML-RPC fault
    #[error("daemon fault {code}: {message}")]
    Fault {
        /// XML-RPC fault code reported by the daemon
        code: i32,
        /// XML-RPC fault string reported by the daemon
        message: String,
    },

    /// The daemon's response could not be decoded as XML-RPC
    #[error("malformed daemon response: {0}")]
    Malformed(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
/// It follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "daemon_fault",
///     "message": "daemon fault 8001: no such method",
///     "details": {
///       "fault_code": 8001
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error", "daemon_unreachable")
    ///
    /// Clients can use this for programmatic error handling.
    pub code: String,

    /// Human-readable error message
    ///
    /// This is suitable for displaying to end users.
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - invalid configuration input
            Error::Config { .. } => 400,

            // 401 Unauthorized - login required or rejected
            Error::AuthenticationRequired => 401,
            Error::InvalidCredentials => 401,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 422 Unprocessable Entity - semantic errors in request input
            Error::Validation(_) => 422,

            // 500 Internal Server Error - server-side issues
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway / 504 Gateway Timeout - daemon errors
            Error::Rpc(RpcError::Timeout(_)) => 504,
            Error::Rpc(_) => 502,

            // 503 Service Unavailable
            Error::SessionLimit { .. } => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "configuration_error",
            Error::Rpc(RpcError::Connection(_)) => "daemon_unreachable",
            Error::Rpc(RpcError::Timeout(_)) => "daemon_timeout",
            Error::Rpc(RpcError::Fault { .. }) => "daemon_fault",
            Error::Rpc(RpcError::Malformed(_)) => "daemon_malformed_response",
            Error::Validation(_) => "validation_error",
            Error::AuthenticationRequired => "authentication_required",
            Error::InvalidCredentials => "invalid_credentials",
            Error::SessionLimit { .. } => "session_limit",
            Error::NotFound(_) => "not_found",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Rpc(RpcError::Fault { code, .. }) => {
                Some(serde_json::json!({ "fault_code": code }))
            }
            Error::SessionLimit { active, max } => {
                Some(serde_json::json!({ "active": active, "max": max }))
            }
            _ => None,
        };

        Self {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
