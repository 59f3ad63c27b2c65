//! Wallet HTTP handlers.
//!
//! This module implements the wallet API endpoints:
//! - POST /api/v1/wallet - Deposit into or withdraw from a wallet
//! - GET /api/v1/wallets/:id - Get wallet balance

use crate::{
    error::AppError,
    models::wallet::{BalanceResponse, OperationKind, WalletOperationRequest},
    services::wallet_service::WalletService,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use uuid::Uuid;

/// Apply a deposit or withdrawal.
///
/// # Request Body
///
/// ```json
/// {
///   "walletId": "550e8400-...",
///   "operationType": "DEPOSIT",
///   "amount": 1000
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{"walletId": "550e8400-...", "balance": 1000}`
/// - **Error (400)**: Malformed body, bad UUID, non-positive amount or unknown operation
/// - **Error (404)**: Withdrawal from a wallet that was never funded
/// - **Error (409)**: Withdrawal exceeds the balance
/// - **Error (503)**: Store failure or timeout
pub async fn apply_operation(
    State(service): State<WalletService>,
    request: Result<Json<WalletOperationRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    // Axum would answer 415/422 on its own; every malformed body is a 400 here
    let Json(request) = request.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let kind: OperationKind = request.operation_type.parse()?;

    let balance = service
        .apply_operation(request.wallet_id, kind, request.amount)
        .await?;

    Ok(Json(BalanceResponse {
        wallet_id: request.wallet_id,
        balance,
    }))
}

/// Get a wallet balance.
///
/// # URL Parameters
///
/// - `id` - UUID of the wallet
///
/// # Response
///
/// - **Success (200 OK)**: `{"walletId": "550e8400-...", "balance": 1000}`
/// - **Error (400)**: `id` is not a UUID
/// - **Error (404)**: Wallet was never funded
/// - **Error (503)**: Store failure or timeout
pub async fn get_wallet(
    State(service): State<WalletService>,
    wallet_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let Path(wallet_id) =
        wallet_id.map_err(|_| AppError::InvalidRequest("Invalid wallet ID".to_string()))?;

    let balance = service.get_balance(wallet_id).await?;

    Ok(Json(BalanceResponse { wallet_id, balance }))
}
