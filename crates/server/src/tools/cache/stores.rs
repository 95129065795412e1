//! cache_stores tool implementation.
//!
//! Lists the named cache stores with their entry counts.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartnav_client::Coordinator;
use smartnav_core::StoreSummary;

use crate::error::ToolError;

/// Parameters for the cache_stores tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresParams {}

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Coordinator lifecycle state.
    pub state: String,
    /// Primary store answering requests; absent while requests pass straight through.
    pub serving_store: Option<String>,
    pub stores: Vec<StoreSummary>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(coordinator: &Coordinator, _params: CacheStoresParams) -> Result<CallToolResult, McpError> {
    let stores = coordinator.db().store_summaries().await?;
    let serving_store = coordinator.serving().await.map(|settings| settings.static_store.clone());
    let output = CacheStoresOutput { state: coordinator.state().await.as_str().to_string(), serving_store, stores };

    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{coordinator, output_json};

    #[tokio::test]
    async fn test_lists_seeded_store() {
        let (coordinator, _db) = coordinator(&[]).await;
        let output = output_json(&stores_impl(&coordinator, CacheStoresParams::default()).await.unwrap());

        assert_eq!(output["state"], "active");
        assert_eq!(output["serving_store"], "smartnav-2050-v1");
        let stores = output["stores"].as_array().unwrap();
        let primary = stores.iter().find(|s| s["name"] == "smartnav-2050-v1").unwrap();
        assert_eq!(primary["entries"], 1);
    }
}
