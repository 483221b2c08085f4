//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the workgate server.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or out-of-bound request (maps to HTTP 400).
    /// Reported before any authorization check or side effect.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, invalid, or expired credential (maps to HTTP 401).
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller lacks one or more required scopes (maps to HTTP 403).
    /// The missing scopes are always named; the request is rejected whole
    /// rather than narrowed to the authorized subset.
    #[error("insufficient permissions; missing scopes: {}", .missing.join(", "))]
    Authorization {
        /// Required scopes absent from the caller's grant, in request order.
        missing: Vec<String>,
    },

    /// Resource not found (maps to HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Overall request deadline elapsed (maps to HTTP 504).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Request cancelled before aggregation (maps to HTTP 503).
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// A single source connector failed. Isolated per source by the
    /// dispatcher; surfaces in aggregate metadata, not as a response status.
    #[error("connector error: {0}")]
    Connector(String),

    /// Internal errors (maps to HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Outbound HTTP transport errors (verifier, connectors, telemetry).
    #[error("upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to an HTTP status code.
    pub fn to_http_status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Authorization { .. } => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Connector(_) | Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) | Error::Serialization(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable error code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION",
            Error::Unauthenticated(_) => "UNAUTHENTICATED",
            Error::Authorization { .. } => "FORBIDDEN",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Timeout(_) => "TIMEOUT",
            Error::Cancelled(_) => "CANCELLED",
            Error::Connector(_) => "CONNECTOR",
            Error::Upstream(_) => "UPSTREAM",
            Error::Internal(_) => "INTERNAL",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Io(_) => "IO",
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn connector(msg: impl Into<String>) -> Self {
        Self::Connector(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// Render errors as structured JSON bodies so handlers can use `?` directly.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_http_status();
        let mut error = serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Error::Authorization { missing } = &self {
            error["missing_scopes"] = serde_json::json!(missing);
        }
        (status, Json(serde_json::json!({ "error": error }))).into_response()
    }
}
