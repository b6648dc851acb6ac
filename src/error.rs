//! Error types with HTTP status code and envelope code mapping.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// Error type for gangway operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Configuration errors, raised while route tables are built or mounted
    #[error("Route `{method}` has no verb/path mapping")]
    MissingRoute { method: String },

    #[error("Invalid parameter index {index} on route `{method}`")]
    InvalidParameterIndex { method: String, index: i64 },

    #[error("Configuration error: {0}")]
    Config(String),

    // Auth errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Payload too large")]
    PayloadTooLarge,

    /// Failure reported by controller business logic. Its code and message
    /// are forwarded to the client verbatim.
    #[error("{message}")]
    Handler {
        status: StatusCode,
        code: u32,
        message: String,
    },

    // System errors
    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a handler error answered with 400 Bad Request.
    pub fn handler(code: u32, message: impl Into<String>) -> Self {
        Error::Handler {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    /// Whether this error must abort startup instead of being answered.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingRoute { .. } | Error::InvalidParameterIndex { .. } | Error::Config(_)
        )
    }

    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::TokenExpired => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,

            Error::BadRequest(_) | Error::AddrParse(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Handler { status, .. } => *status,

            // Shouldn't happen at runtime
            Error::MissingRoute { .. } | Error::InvalidParameterIndex { .. } | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            Error::Io(_) | Error::Json(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Envelope code reported alongside the message.
    pub fn code(&self) -> u32 {
        match self {
            Error::Unauthorized => 1001,
            Error::TokenExpired => 1002,
            Error::Forbidden(_) => 1003,
            Error::BadRequest(_) | Error::AddrParse(_) => 1004,
            Error::NotFound(_) => 1005,
            Error::MethodNotAllowed => 1007,
            Error::PayloadTooLarge => 1008,
            Error::MissingRoute { .. } | Error::InvalidParameterIndex { .. } | Error::Config(_) => {
                1006
            }
            Error::Handler { code, .. } => *code,
            Error::Io(_) | Error::Json(_) | Error::Internal(_) => 1099,
        }
    }

    /// Convert error into the normalized `{code, message}` HTTP response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        let message = if status.is_server_error() && !matches!(self, Error::Handler { .. }) {
            tracing::error!("Internal error: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = serde_json::json!({
            "code": self.code(),
            "message": message,
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }
}

/// Result type alias using gangway's Error.
pub type Result<T> = std::result::Result<T, Error>;
