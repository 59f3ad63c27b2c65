//! In-memory balance store for development and tests.

use super::BalanceStore;
use crate::error::AppError;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Balances kept in a process-local map.
///
/// Mutations hold the write lock for their whole check-and-apply, which makes
/// each of them one indivisible step, the same guarantee the PostgreSQL store
/// gets from a single conditional UPDATE.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBalanceStore {
    balances: Arc<RwLock<HashMap<Uuid, i64>>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn upsert_add(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError> {
        let mut balances = self.balances.write().await;
        let balance = balances.entry(wallet_id).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(AppError::InvalidAmount)?;
        Ok(*balance)
    }

    async fn conditional_subtract(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError> {
        let mut balances = self.balances.write().await;
        let balance = balances
            .get_mut(&wallet_id)
            .ok_or(AppError::WalletNotFound)?;
        if *balance < amount {
            return Err(AppError::InsufficientFunds);
        }
        *balance -= amount;
        Ok(*balance)
    }

    async fn read(&self, wallet_id: Uuid) -> Result<i64, AppError> {
        self.balances
            .read()
            .await
            .get(&wallet_id)
            .copied()
            .ok_or(AppError::WalletNotFound)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
