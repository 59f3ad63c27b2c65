//! Balance store: the only owner of wallet balances.
//!
//! Every operation is a single atomic step with respect to concurrent
//! operations on the same wallet. Callers never read a balance and then
//! write it back; read-modify-write happens inside the store.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryBalanceStore;
pub use postgres::PgBalanceStore;

#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Add `amount` to the wallet, creating it with `balance = amount` if it
    /// does not exist yet. Returns the resulting balance.
    ///
    /// `amount` must be positive.
    async fn upsert_add(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError>;

    /// Subtract `amount` if the wallet exists and holds at least `amount`.
    ///
    /// Fails with [`AppError::WalletNotFound`] or [`AppError::InsufficientFunds`]
    /// without touching the balance. `amount` must be positive.
    async fn conditional_subtract(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError>;

    /// Current balance, or [`AppError::WalletNotFound`].
    async fn read(&self, wallet_id: Uuid) -> Result<i64, AppError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), AppError>;
}
