//! SQLite-backed named cache stores.
//!
//! This module provides persistent request/response caching using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Multiple named stores living side by side in one database
//! - Request keys hashed from method, canonical URL and vary headers
//! - Atomic multi-entry writes for manifest seeding
//! - A record of the last activated version's stores
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod stores;
pub mod versions;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::CacheKey;
pub use stores::{CacheStore, CachedEntry, StoreSummary};
pub use versions::ActiveVersion;
