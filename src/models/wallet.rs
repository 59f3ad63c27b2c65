//! Wallet API request/response types.
//!
//! This module defines:
//! - `OperationKind`: the closed set of balance mutations
//! - `WalletOperationRequest`: request body for `POST /api/v1/wallet`
//! - `BalanceResponse`: response body for both wallet endpoints

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A balance mutation requested by a client.
///
/// The wire tags are upper-case (`DEPOSIT`, `WITHDRAW`); anything else is
/// rejected with [`AppError::UnknownOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "DEPOSIT",
            OperationKind::Withdraw => "WITHDRAW",
        }
    }
}

impl FromStr for OperationKind {
    type Err = AppError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "DEPOSIT" => Ok(OperationKind::Deposit),
            "WITHDRAW" => Ok(OperationKind::Withdraw),
            other => Err(AppError::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to deposit into or withdraw from a wallet.
///
/// # JSON Example
///
/// ```json
/// {
///   "walletId": "550e8400-e29b-41d4-a716-446655440000",
///   "operationType": "DEPOSIT",
///   "amount": 1000
/// }
/// ```
///
/// Older clients send the id as `valletId`; it is accepted as an alias.
///
/// # Validation
///
/// - `walletId` must be a UUID (checked during deserialization)
/// - `operationType` is parsed into [`OperationKind`] by the handler
/// - `amount` must be positive (checked by the wallet service)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOperationRequest {
    #[serde(alias = "valletId")]
    pub wallet_id: Uuid,

    pub operation_type: String,

    /// Amount in minor currency units
    pub amount: i64,
}

/// Response body for wallet endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "walletId": "550e8400-e29b-41d4-a716-446655440000",
///   "balance": 1000
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub wallet_id: Uuid,

    /// Current balance in minor currency units
    pub balance: i64,
}
