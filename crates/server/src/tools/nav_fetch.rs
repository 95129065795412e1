//! nav_fetch tool implementation.
//!
//! Issues a request through the offline cache coordinator and reports where
//! the answer came from.

use chrono::Utc;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartnav_client::{Coordinator, Request, fetch::canonicalize};
use smartnav_core::Error;

use crate::error::ToolError;

/// Input parameters for the nav_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavFetchParams {
    /// Absolute http(s) URL to request.
    pub url: String,

    /// Treat the request as a page navigation (eligible for the offline page).
    #[serde(default)]
    pub navigate: bool,
}

/// Output structure for the nav_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavFetchOutput {
    /// Canonical URL of the response.
    pub url: String,
    pub status: u16,
    /// network, cache, offline_fallback or synthetic.
    pub source: String,
    /// Request class the coordinator assigned.
    pub class: String,
    pub content_type: Option<String>,
    pub bytes: usize,
    /// Body as text; absent for binary bodies.
    pub body: Option<String>,
    /// ISO8601 timestamp of when the answer was produced.
    pub served_at: String,
}

/// Implementation of the nav_fetch tool.
pub async fn fetch_impl(coordinator: &Coordinator, params: NavFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let url = canonicalize(&params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let request = if params.navigate { Request::navigate(url) } else { Request::get(url) };
    let class = coordinator.classify(&request);

    let response = coordinator
        .handle(&request)
        .await
        .ok_or_else(|| ToolError::NoResponse(request.url.to_string()))?;

    let output = NavFetchOutput {
        url: response.url.to_string(),
        status: response.status.as_u16(),
        source: response.source.as_str().to_string(),
        class: class.as_str().to_string(),
        content_type: response.content_type().map(str::to_string),
        bytes: response.body.len(),
        body: std::str::from_utf8(&response.body).ok().map(str::to_string),
        served_at: Utc::now().to_rfc3339(),
    };

    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
