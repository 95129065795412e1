//! Core types and shared functionality for smartnav.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - The append-only trip point store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod trips;

pub use cache::{ActiveVersion, CacheDb, CacheKey, CacheStore, CachedEntry, StoreSummary};
pub use config::{AppConfig, ConfigError, DefaultPolicy};
pub use error::Error;
pub use trips::TripPoint;
