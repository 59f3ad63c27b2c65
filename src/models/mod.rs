//! Data models representing database entities and API payloads.

/// Wallet record, operation kinds and wire types
pub mod wallet;
