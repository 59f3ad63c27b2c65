//! Wallet service - core ledger operations.
//!
//! This service handles:
//! - Amount validation
//! - Dispatch of deposit/withdraw operations
//! - Bounding every store call with a timeout
//!
//! # Concurrency
//!
//! The service keeps no balances and takes no locks. Every call is a fresh
//! round-trip to the [`BalanceStore`], whose atomic operations serialize
//! concurrent mutators of the same wallet. Nothing is retried here.

use crate::{
    error::{AppError, StoreError},
    models::wallet::OperationKind,
    store::BalanceStore,
};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct WalletService {
    store: Arc<dyn BalanceStore>,
    op_timeout: Duration,
}

impl WalletService {
    pub fn new(store: Arc<dyn BalanceStore>, op_timeout: Duration) -> Self {
        Self { store, op_timeout }
    }

    /// Read the current balance of a wallet.
    ///
    /// # Errors
    ///
    /// - `WalletNotFound`: the wallet was never funded
    /// - `StoreUnavailable`: store failure or timeout
    #[instrument(skip(self))]
    pub async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, AppError> {
        self.bounded(self.store.read(wallet_id)).await
    }

    /// Add funds, creating the wallet on its first deposit.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`: amount is zero or negative
    /// - `StoreUnavailable`: store failure or timeout
    #[instrument(skip(self))]
    pub async fn deposit(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError> {
        ensure_positive(amount)?;
        self.bounded(self.store.upsert_add(wallet_id, amount)).await
    }

    /// Remove funds if the wallet holds enough.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`: amount is zero or negative
    /// - `WalletNotFound`: the wallet was never funded
    /// - `InsufficientFunds`: balance is below `amount` (balance unchanged)
    /// - `StoreUnavailable`: store failure or timeout
    #[instrument(skip(self))]
    pub async fn withdraw(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError> {
        ensure_positive(amount)?;
        self.bounded(self.store.conditional_subtract(wallet_id, amount))
            .await
    }

    /// Dispatch an operation by kind. Returns the resulting balance.
    #[instrument(skip(self, kind), fields(operation = %kind))]
    pub async fn apply_operation(
        &self,
        wallet_id: Uuid,
        kind: OperationKind,
        amount: i64,
    ) -> Result<i64, AppError> {
        match kind {
            OperationKind::Deposit => self.deposit(wallet_id, amount).await,
            OperationKind::Withdraw => self.withdraw(wallet_id, amount).await,
        }
    }

    /// Liveness of the underlying store, bounded like any other call.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.bounded(self.store.ping()).await
    }

    // Dropping the store future on timeout cancels the in-flight call. Store
    // operations are single atomic steps, so a cancelled one applied fully or not at all.
    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| StoreError::Timeout(self.op_timeout))?
    }
}

fn ensure_positive(amount: i64) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::InvalidAmount);
    }
    Ok(())
}
