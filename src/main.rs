//! Wallet Ledger Service - Main Application Entry Point
//!
//! A REST API for depositing into, withdrawing from and reading the balance of
//! wallets. Concurrent mutations of the same wallet are serialized by atomic
//! conditional updates in the store, so balances never go negative and no
//! deposit is ever lost.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries), or an in-memory store
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations (postgres backend)
//! 3. Build HTTP router around the wallet service
//! 4. Serve until SIGINT/SIGTERM, then drain and close the pool

mod app;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use config::{Config, StoreBackend};
use services::wallet_service::WalletService;
use std::{sync::Arc, time::Duration};
use store::{BalanceStore, InMemoryBalanceStore, PgBalanceStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(backend = ?config.store_backend, "Configuration loaded");

    let (store, pool): (Arc<dyn BalanceStore>, Option<db::DbPool>) = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(config::ConfigError::MissingDatabaseUrl)?;

            let pool = db::create_pool(database_url, &config).await?;
            tracing::info!(
                max_connections = config.db_max_connections,
                "Database pool created"
            );

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            let store: Arc<dyn BalanceStore> = Arc::new(PgBalanceStore::new(pool.clone()));
            (store, Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; balances are lost on restart");
            let store: Arc<dyn BalanceStore> = Arc::new(InMemoryBalanceStore::new());
            (store, None)
        }
    };

    let service = WalletService::new(store, config.request_timeout());
    let app = app::router(service);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_grace()))
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }
    tracing::info!("Server exited");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
///
/// Once it resolves axum stops accepting connections and waits for in-flight
/// requests. A second task aborts the process if draining exceeds `grace`.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!(grace = ?grace, "Shutdown signal received, draining requests");
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
