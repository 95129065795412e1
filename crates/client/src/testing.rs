//! Scripted network and fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use smartnav_core::{AppConfig, CacheDb};

use crate::coordinator::Coordinator;
use crate::fetch::{Network, NetworkError, Request, Response};

#[derive(Clone)]
struct Route {
    status: StatusCode,
    body: Bytes,
    delay: Duration,
}

/// Per-URL scripted responses with optional latency and an offline switch.
///
/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub(crate) struct MockNetwork {
    routes: Mutex<HashMap<String, Route>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
        self.respond_slow(url, status, body, Duration::ZERO);
    }

    pub(crate) fn respond_slow(&self, url: &str, status: u16, body: &str, delay: Duration) {
        let route = Route {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from(body.to_string()),
            delay,
        };
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }

    pub(crate) fn last_call(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.calls.lock().unwrap().push(request.url.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Connect("offline".into()));
        }

        let route = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        let Some(route) = route else {
            return Err(NetworkError::Connect(format!("no route to {}", request.url)));
        };

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        Ok(Response::new(request.url.clone(), route.status, HeaderMap::new(), route.body))
    }
}

pub(crate) const APP: &str = "https://app.test/";
pub(crate) const INDEX: &str = "https://app.test/index.html";
pub(crate) const APP_JS: &str = "https://app.test/app.js";

/// Small deployment rooted at `https://app.test/`.
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        app_base_url: APP.into(),
        asset_manifest: vec!["./".into(), "./index.html".into(), "./app.js".into()],
        network_first_timeout_ms: 200,
        ..Default::default()
    }
}

/// Answer every manifest URL of [`test_config`].
pub(crate) fn serve_manifest(network: &MockNetwork) {
    network.respond(APP, 200, "<html>root</html>");
    network.respond(INDEX, 200, "<html>offline shell</html>");
    network.respond(APP_JS, 200, "console.log('smartnav')");
}

/// An installed and activated coordinator over an in-memory database.
pub(crate) async fn active_coordinator(network: Arc<MockNetwork>, config: &AppConfig) -> (Coordinator, CacheDb) {
    serve_manifest(&network);
    let db = CacheDb::open_in_memory().await.unwrap();
    let coordinator = Coordinator::from_config(config, db.clone(), network).unwrap();
    coordinator.install().await.unwrap();
    coordinator.activate().await.unwrap();
    (coordinator, db)
}
