//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;

/// Transient failure talking to the balance store.
///
/// Nothing here is a domain outcome: the operation may or may not be
/// worth retrying, and that decision belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection, pool or query failure reported by sqlx.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The store did not answer within the configured bound.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Application-wide error type.
///
/// Domain outcomes (`WalletNotFound`, `InsufficientFunds`, ...) are ordinary
/// variants so the HTTP layer can tell them apart on every call.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Deposit or withdrawal amount is zero or negative.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Amount must be positive")]
    InvalidAmount,

    /// Operation tag is neither `DEPOSIT` nor `WITHDRAW`.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Unknown operation type: {0}")]
    UnknownOperation(String),

    /// Request body or parameters are malformed.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// No wallet with the requested id has ever been funded.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Wallet not found")]
    WalletNotFound,

    /// Withdrawal exceeds the current balance. The balance is left untouched.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// The store failed or timed out.
    ///
    /// Returns HTTP 503 Service Unavailable (hides details from client).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(StoreError::Database(err))
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidAmount`, `UnknownOperation`, `InvalidRequest` → 400 Bad Request
/// - `WalletNotFound` → 404 Not Found
/// - `InsufficientFunds` → 409 Conflict
/// - `StoreUnavailable` → 503 Service Unavailable
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidAmount => (StatusCode::BAD_REQUEST, "invalid_amount", self.to_string()),
            AppError::UnknownOperation(_) => (
                StatusCode::BAD_REQUEST,
                "unknown_operation",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::WalletNotFound => {
                (StatusCode::NOT_FOUND, "wallet_not_found", self.to_string())
            }
            AppError::InsufficientFunds => {
                (StatusCode::CONFLICT, "insufficient_funds", self.to_string())
            }
            AppError::StoreUnavailable(ref err) => {
                tracing::error!(error = %err, "balance store failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "The wallet store is temporarily unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
