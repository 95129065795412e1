//! geocode tool implementation.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smartnav_client::{GeocodeClient, Place};
use smartnav_core::Error;

use crate::error::ToolError;

/// Input parameters for the geocode tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeParams {
    /// Free-form place query, e.g. "KLCC".
    pub query: String,
}

/// Output structure for the geocode tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GeocodeOutput {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<Place>,
}

/// Implementation of the geocode tool.
pub async fn geocode_impl(geocoder: &GeocodeClient, params: GeocodeParams) -> Result<CallToolResult, McpError> {
    let place = geocoder.search(&params.query).await.map_err(Error::from)?;
    let output = GeocodeOutput { found: place.is_some(), place };

    let json = serde_json::to_string_pretty(&output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{coordinator, output_json};
    use smartnav_client::GeocodeConfig;
    use std::time::Duration;

    const KLCC: &str = "https://nominatim.openstreetmap.org/search?format=json&q=KLCC&limit=1";

    async fn geocoder(routes: &[(&str, u16, &str)]) -> GeocodeClient {
        let (coordinator, _db) = coordinator(routes).await;
        GeocodeClient::new(coordinator, GeocodeConfig { min_interval: Duration::ZERO, ..Default::default() })
    }

    #[tokio::test]
    async fn test_geocode_found() {
        let geocoder = geocoder(&[(KLCC, 200, r#"[{"lat":"3.1578","lon":"101.7123","display_name":"KLCC"}]"#)]).await;
        let output = output_json(&geocode_impl(&geocoder, GeocodeParams { query: "KLCC".into() }).await.unwrap());

        assert_eq!(output["found"], true);
        assert_eq!(output["place"]["lat"], 3.1578);
        assert_eq!(output["place"]["display_name"], "KLCC");
    }

    #[tokio::test]
    async fn test_geocode_not_found() {
        let geocoder = geocoder(&[(KLCC, 200, "[]")]).await;
        let output = output_json(&geocode_impl(&geocoder, GeocodeParams { query: "KLCC".into() }).await.unwrap());

        assert_eq!(output["found"], false);
        assert!(output.get("place").is_none());
    }

    #[tokio::test]
    async fn test_geocode_empty_query() {
        let geocoder = geocoder(&[]).await;
        let err = geocode_impl(&geocoder, GeocodeParams { query: " ".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
