//! Cache store MCP tools.

pub mod purge;
pub mod stores;

pub use purge::{CachePurgeParams, purge_impl};
pub use stores::{CacheStoresParams, stores_impl};
