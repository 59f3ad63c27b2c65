//! PostgreSQL balance store.
//!
//! Each operation is one SQL statement, so row-level locking inside
//! PostgreSQL serializes concurrent mutators of the same wallet while
//! different wallets proceed in parallel.

use super::BalanceStore;
use crate::{db::DbPool, error::AppError};
use async_trait::async_trait;
use uuid::Uuid;

/// SQLSTATE `numeric_value_out_of_range`, raised when a balance would leave BIGINT.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

#[derive(Debug, Clone)]
pub struct PgBalanceStore {
    pool: DbPool,
}

impl PgBalanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, wallet_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM wallets WHERE id = $1)")
            .bind(wallet_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

fn is_out_of_range(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == NUMERIC_OUT_OF_RANGE)
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn upsert_add(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError> {
        // Insert-or-increment in one statement; two concurrent first deposits
        // cannot both insert, the loser takes the ON CONFLICT branch.
        sqlx::query_scalar(
            r#"
            INSERT INTO wallets (id, balance)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET balance = wallets.balance + EXCLUDED.balance
            RETURNING balance
            "#,
        )
        .bind(wallet_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_out_of_range(&err) {
                AppError::InvalidAmount
            } else {
                err.into()
            }
        })
    }

    async fn conditional_subtract(&self, wallet_id: Uuid, amount: i64) -> Result<i64, AppError> {
        // The sufficiency check lives in the WHERE clause, so it is evaluated
        // against the row version the UPDATE actually locks.
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE wallets
            SET balance = balance - $2
            WHERE id = $1 AND balance >= $2
            RETURNING balance
            "#,
        )
        .bind(wallet_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        match balance {
            Some(balance) => Ok(balance),
            // Wallets are never deleted, so existing now means it existed when the UPDATE ran
            None if self.exists(wallet_id).await? => Err(AppError::InsufficientFunds),
            None => Err(AppError::WalletNotFound),
        }
    }

    async fn read(&self, wallet_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1")
            .bind(wallet_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::WalletNotFound)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// These need a live PostgreSQL; run with `DATABASE_URL=... cargo test -- --ignored`.
// `sqlx::test` creates a throwaway database per test and applies ./migrations.
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn first_deposit_creates_wallet(pool: DbPool) {
        let store = PgBalanceStore::new(pool);
        let id = Uuid::new_v4();

        assert!(matches!(store.read(id).await, Err(AppError::WalletNotFound)));
        assert_eq!(store.upsert_add(id, 100).await.unwrap(), 100);
        assert_eq!(store.upsert_add(id, 25).await.unwrap(), 125);
        assert_eq!(store.read(id).await.unwrap(), 125);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn subtract_distinguishes_missing_from_insufficient(pool: DbPool) {
        let store = PgBalanceStore::new(pool);
        let id = Uuid::new_v4();

        assert!(matches!(
            store.conditional_subtract(id, 1).await,
            Err(AppError::WalletNotFound)
        ));

        store.upsert_add(id, 50).await.unwrap();
        assert!(matches!(
            store.conditional_subtract(id, 100).await,
            Err(AppError::InsufficientFunds)
        ));
        assert_eq!(store.read(id).await.unwrap(), 50);

        assert_eq!(store.conditional_subtract(id, 50).await.unwrap(), 0);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn overflowing_deposit_is_rejected(pool: DbPool) {
        let store = PgBalanceStore::new(pool);
        let id = Uuid::new_v4();

        store.upsert_add(id, i64::MAX).await.unwrap();
        assert!(matches!(
            store.upsert_add(id, 1).await,
            Err(AppError::InvalidAmount)
        ));
        assert_eq!(store.read(id).await.unwrap(), i64::MAX);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_deposits_are_not_lost(pool: DbPool) {
        let store = Arc::new(PgBalanceStore::new(pool));
        let id = Uuid::new_v4();

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.upsert_add(id, 10).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.read(id).await.unwrap(), 1000);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_withdrawals_never_overdraw(pool: DbPool) {
        let store = Arc::new(PgBalanceStore::new(pool));
        let id = Uuid::new_v4();
        store.upsert_add(id, 200).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let mut succeeded = 0u32;
                    loop {
                        match store.conditional_subtract(id, 3).await {
                            Ok(balance) => {
                                assert!(balance >= 0);
                                succeeded += 1;
                            }
                            Err(AppError::InsufficientFunds) => return succeeded,
                            Err(err) => panic!("unexpected error: {err}"),
                        }
                    }
                })
            })
            .collect();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 66);
        assert_eq!(store.read(id).await.unwrap(), 2);
    }
}
