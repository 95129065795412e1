//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    CachePurgeParams, CacheStoresParams, GeocodeParams, NavFetchParams, TripListParams, cache, geocode, nav_fetch,
    trips,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use smartnav_client::{Coordinator, GeocodeClient};
use smartnav_core::CacheDb;

/// The main MCP server handler for smartnav.
#[derive(Clone)]
pub struct SmartNavServer {
    coordinator: Arc<Coordinator>,
    geocoder: GeocodeClient,
    db: CacheDb,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl SmartNavServer {
    /// Create a new server handler.
    pub fn new(coordinator: Arc<Coordinator>, geocoder: GeocodeClient) -> Self {
        let db = coordinator.db().clone();
        Self { coordinator, geocoder, db, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Fetch a URL through the offline cache coordinator. Returns status, body and whether it came from the network, a cache store or the offline page."
    )]
    async fn nav_fetch(&self, params: Parameters<NavFetchParams>) -> Result<CallToolResult, McpError> {
        nav_fetch::fetch_impl(&self.coordinator, params.0).await
    }

    #[tool(description = "Resolve a place name to coordinates. Returns the best match or found=false.")]
    async fn geocode(&self, params: Parameters<GeocodeParams>) -> Result<CallToolResult, McpError> {
        geocode::geocode_impl(&self.geocoder, params.0).await
    }

    #[tool(description = "List cache stores with entry counts and the coordinator state.")]
    async fn cache_stores(&self, params: Parameters<CacheStoresParams>) -> Result<CallToolResult, McpError> {
        cache::stores_impl(&self.coordinator, params.0).await
    }

    #[tool(description = "Delete a named cache store and all of its entries.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.db, params.0).await
    }

    #[tool(description = "List the most recent recorded trip points, newest first.")]
    async fn trip_list(&self, params: Parameters<TripListParams>) -> Result<CallToolResult, McpError> {
        trips::list_impl(&self.db, params.0).await
    }
}

impl ServerHandler for SmartNavServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "smartnav".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::coordinator;
    use smartnav_client::GeocodeConfig;

    #[tokio::test]
    async fn test_lists_all_tools() {
        let (coordinator, _db) = coordinator(&[]).await;
        let geocoder = GeocodeClient::new(coordinator.clone(), GeocodeConfig::default());
        let server = SmartNavServer::new(coordinator, geocoder);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["cache_purge", "cache_stores", "geocode", "nav_fetch", "trip_list"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let (coordinator, _db) = coordinator(&[]).await;
        let geocoder = GeocodeClient::new(coordinator.clone(), GeocodeConfig::default());
        let info = SmartNavServer::new(coordinator, geocoder).get_info();
        assert_eq!(info.server_info.name, "smartnav");
    }
}
