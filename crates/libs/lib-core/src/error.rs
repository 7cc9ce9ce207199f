//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across all backend modules. It follows the `thiserror` pattern for ergonomic error handling.
//!
//! ## Design Philosophy
//!
//! - **Single Error Type**: All modules use `AppError` for consistency
//! - **Descriptive Messages**: Each variant includes a context string
//! - **HTTP Mapping**: Errors map naturally to HTTP status codes
//! - **Failover Classification**: [`AppError::is_transport`] distinguishes
//!   endpoint-level failures (worth rotating to another node) from provider
//!   and validation failures (which are not)
//!
//! ## Error Categories
//!
//! 1. **Configuration** — [`Config`](AppError::Config): no endpoints configured,
//!    malformed environment. Fatal, surfaced immediately with no retry.
//!
//! 2. **Transport** — [`Rpc`](AppError::Rpc): network/timeout/node-specific
//!    rejection while talking to a node endpoint. Triggers endpoint rotation.
//!
//! 3. **Provider** — [`Quote`](AppError::Quote),
//!    [`Execution`](AppError::Execution), [`Broadcast`](AppError::Broadcast):
//!    well-formed error responses from the quoting/execution service or a node.
//!    The affected batch item is marked failed; siblings continue.
//!
//! 4. **Batch preconditions** — [`WalletCapability`](AppError::WalletCapability):
//!    the signer cannot batch-sign, which aborts the whole batch before any
//!    network call.
//!
//! 5. **Ambiguity** — [`AmbiguousExecution`](AppError::AmbiguousExecution):
//!    the execution request transport-failed after submission, so the on-chain
//!    outcome is unknown. Reported distinctly from a confirmed provider
//!    failure and never retried automatically.

use thiserror::Error;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Node RPC transport error (network, timeout, node issues).
    ///
    /// **HTTP Status**: 502 Bad Gateway (external service failure)
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The quoting service returned an error response for an order request.
    ///
    /// **HTTP Status**: 502 Bad Gateway
    #[error("Quote failed: {0}")]
    Quote(String),

    /// The execution service confirmed the order did not land on chain.
    ///
    /// Carries the provider-supplied failure code and message.
    ///
    /// **HTTP Status**: 502 Bad Gateway
    #[error("Execution failed ({}): {message}", .code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    Execution {
        code: Option<i64>,
        message: String,
    },

    /// A node rejected a locally-constructed signed transaction
    /// (double-submission, stale blockhash, simulation failure).
    ///
    /// **HTTP Status**: 502 Bad Gateway
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// The connected signer cannot sign a batch in one interaction.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Wallet capability error: {0}")]
    WalletCapability(String),

    /// The execution call transport-failed after the request may have been
    /// submitted; the on-chain outcome is unknown.
    ///
    /// **HTTP Status**: 502 Bad Gateway
    #[error("Execution outcome unknown: {0}")]
    AmbiguousExecution(String),

    /// Invalid user input validation error.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data decoding error (base64, bincode deserialization).
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Internal server error (unexpected failures).
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::WalletCapability(_) => StatusCode::BAD_REQUEST,
            AppError::Rpc(_)
            | AppError::Quote(_)
            | AppError::Execution { .. }
            | AppError::Broadcast(_)
            | AppError::AmbiguousExecution(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) | AppError::Decoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Provider errors pass the provider text through; internal errors return
    /// a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::WalletCapability(msg)
            | AppError::Quote(msg)
            | AppError::Broadcast(msg) => msg.clone(),
            AppError::Execution { message, .. } => message.clone(),
            AppError::AmbiguousExecution(_) => {
                "Execution outcome unknown; check the wallet before retrying".to_string()
            }
            AppError::Rpc(_) => "Service temporarily unavailable".to_string(),
            AppError::Config(_) | AppError::Internal(_) | AppError::Decoding(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    /// Whether this error is an endpoint-level transport failure.
    ///
    /// Used as a rotation predicate: only transport failures justify trying
    /// the same operation against another node endpoint.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Rpc(_))
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        // Full error text goes to the server log, not the client
        match status {
            StatusCode::BAD_REQUEST => tracing::debug!("Client error: {}", self),
            _ => tracing::error!("Server error: {}", self),
        }

        let error_code = match self {
            AppError::Config(_) => "Config",
            AppError::Rpc(_) => "Rpc",
            AppError::Quote(_) => "Quote",
            AppError::Execution { .. } => "Execution",
            AppError::Broadcast(_) => "Broadcast",
            AppError::WalletCapability(_) => "WalletCapability",
            AppError::AmbiguousExecution(_) => "AmbiguousExecution",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Decoding(_) => "Decoding",
            AppError::Internal(_) => "Internal",
        };

        let body = Json(json!({
            "error": message,
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decoding(format!("JSON error: {}", err))
    }
}
