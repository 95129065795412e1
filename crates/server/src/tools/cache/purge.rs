//! cache_purge tool implementation.
//!
//! Deletes one named cache store and every entry in it.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartnav_core::{CacheDb, Error};

use crate::error::ToolError;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Name of the store to delete.
    pub store: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub store: String,
    /// Entries removed along with the store.
    pub entries: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(db: &CacheDb, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let name = params.store.trim();
    if name.is_empty() {
        return Err(ToolError::InvalidInput("store cannot be empty".into()).into());
    }

    let entries = db
        .store_summaries()
        .await?
        .into_iter()
        .find(|s| s.name == name)
        .map(|s| s.entries)
        .ok_or_else(|| Error::StoreNotFound(name.to_string()))?;

    if !db.delete_store(name).await? {
        return Err(Error::StoreNotFound(name.to_string()).into());
    }
    tracing::info!(store = name, entries, "store purged");

    let output = CachePurgeOutput { store: name.to_string(), entries };
    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
