//! trip_list tool implementation.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartnav_core::{CacheDb, TripPoint};

use crate::error::ToolError;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 1000;

/// Input parameters for the trip_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TripListParams {
    /// Number of points to return, newest first (default 50, max 1000).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output structure for the trip_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TripListOutput {
    /// Total points recorded.
    pub total: u64,
    pub points: Vec<TripPoint>,
}

/// Implementation of the trip_list tool.
pub async fn list_impl(db: &CacheDb, params: TripListParams) -> Result<CallToolResult, McpError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ToolError::InvalidInput(format!("limit must be between 1 and {MAX_LIMIT}")).into());
    }

    let points = db.recent_trip_points(limit).await?;
    let total = db.trip_point_count().await?;

    let json = serde_json::to_string_pretty(&TripListOutput { total, points }).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
