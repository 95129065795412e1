//! MCP tool implementations.
//!
//! This module contains all tools exposed by the smartnav server.

pub mod cache;
pub mod geocode;
pub mod nav_fetch;
pub mod trips;

pub use cache::{CachePurgeParams, CacheStoresParams};
pub use geocode::GeocodeParams;
pub use nav_fetch::NavFetchParams;
pub use trips::TripListParams;
