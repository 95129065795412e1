//! Fixtures shared by the tool tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use rmcp::model::CallToolResult;
use smartnav_client::{Coordinator, Network, NetworkError, Request, Response};
use smartnav_core::{AppConfig, CacheDb};

pub(crate) const INDEX: &str = "https://app.test/index.html";

/// Fixed per-URL answers; anything else is unreachable.
pub(crate) struct StaticNetwork {
    routes: HashMap<String, (u16, String)>,
}

impl StaticNetwork {
    pub(crate) fn new(routes: &[(&str, u16, &str)]) -> Self {
        let routes = routes
            .iter()
            .map(|(url, status, body)| (url.to_string(), (*status, body.to_string())))
            .collect();
        Self { routes }
    }
}

#[async_trait]
impl Network for StaticNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let (status, body) = self
            .routes
            .get(request.url.as_str())
            .ok_or_else(|| NetworkError::Connect(format!("no route to {}", request.url)))?;
        Ok(Response::new(
            request.url.clone(),
            StatusCode::from_u16(*status).unwrap(),
            HeaderMap::new(),
            Bytes::from(body.clone()),
        ))
    }
}

pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        app_base_url: "https://app.test/".into(),
        asset_manifest: vec!["./index.html".into()],
        network_first_timeout_ms: 200,
        ..Default::default()
    }
}

/// An active coordinator over an in-memory database; `routes` are served alongside the manifest.
pub(crate) async fn coordinator(routes: &[(&str, u16, &str)]) -> (Arc<Coordinator>, CacheDb) {
    let mut all = vec![(INDEX, 200, "<html>offline shell</html>")];
    all.extend_from_slice(routes);
    let network = Arc::new(StaticNetwork::new(&all));

    let db = CacheDb::open_in_memory().await.unwrap();
    let coordinator = Coordinator::from_config(&test_config(), db.clone(), network).unwrap();
    coordinator.install().await.unwrap();
    coordinator.activate().await.unwrap();
    (Arc::new(coordinator), db)
}

/// Parse the JSON text payload of a tool result.
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
