//! Place search against a Nominatim-compatible geocoder.
//!
//! ### Behavior
//!
//! - **Endpoint**: `{base}/search?format=json&q={query}&limit=1`
//! - **Language**: `Accept-Language` header, Malay by default.
//! - **Routing**: requests go through the [`Coordinator`], which classifies
//!   them as live search, so answers are never cached.
//! - **Rate limiting**: at most one request per second (public Nominatim
//!   usage policy).
//! - **Ranking**: delegated to the service; only the first candidate is used.

pub mod error;
pub mod response;

pub use error::GeocodeError;
pub use response::{NominatimPlace, Place};

use reqwest::header::{self, HeaderValue};
use smartnav_core::AppConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

use crate::coordinator::Coordinator;
use crate::fetch::Request;

/// Minimum interval between requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Geocoder configuration.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Service base URL (default: https://nominatim.openstreetmap.org).
    pub base_url: String,
    /// `Accept-Language` value (default: ms).
    pub language: String,
    /// Minimum spacing between requests (default: 1s).
    pub min_interval: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for GeocodeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.geocode_base_url.clone(),
            language: config.geocode_language.clone(),
            min_interval: MIN_REQUEST_INTERVAL,
        }
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    /// Wait until a request may be issued.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// Geocoding client.
#[derive(Clone)]
pub struct GeocodeClient {
    coordinator: Arc<Coordinator>,
    config: GeocodeConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl GeocodeClient {
    pub fn new(coordinator: Arc<Coordinator>, config: GeocodeConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.min_interval));
        Self { coordinator, config, rate_limiter }
    }

    pub(crate) fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Search URL for `query`.
    pub fn search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let endpoint = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, &[("format", "json"), ("q", query), ("limit", "1")])
            .map_err(|e| GeocodeError::InvalidUrl(e.to_string()))
    }

    /// Resolve `query` to the best-ranked place.
    ///
    /// `Ok(None)` when the service knows no match.
    pub async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let url = self.search_url(query)?;
        let language =
            HeaderValue::from_str(&self.config.language).map_err(|e| GeocodeError::InvalidUrl(e.to_string()))?;
        let request = Request::get(url).with_header(header::ACCEPT_LANGUAGE, language);

        self.rate_limiter.acquire().await;

        let start = Instant::now();
        tracing::debug!(query, "geocoding");

        let response = self.coordinator.handle(&request).await.ok_or(GeocodeError::Unavailable)?;
        if !response.is_success() {
            return Err(GeocodeError::HttpError { status: response.status.as_u16() });
        }

        let place = response::first_place(&response.body)?;
        tracing::debug!(
            query,
            found = place.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "geocode completed"
        );
        Ok(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockNetwork, active_coordinator, test_config};
    use smartnav_core::CacheKey;

    const KLCC: &str = "https://nominatim.openstreetmap.org/search?format=json&q=KLCC&limit=1";

    fn fast_config() -> GeocodeConfig {
        GeocodeConfig { min_interval: Duration::ZERO, ..Default::default() }
    }

    async fn client(network: Arc<MockNetwork>, config: GeocodeConfig) -> (GeocodeClient, smartnav_core::CacheDb) {
        let (coordinator, db) = active_coordinator(network, &test_config()).await;
        (GeocodeClient::new(Arc::new(coordinator), config), db)
    }

    #[tokio::test]
    async fn test_klcc_resolves_without_caching() {
        let network = MockNetwork::new();
        network.respond(KLCC, 200, r#"[{"lat":"3.1578","lon":"101.7123","display_name":"KLCC"}]"#);
        let (geocoder, db) = client(network.clone(), fast_config()).await;

        let place = geocoder.search("KLCC").await.unwrap().unwrap();
        assert_eq!(place, Place { lat: 3.1578, lon: 101.7123, display_name: "KLCC".into() });
        assert_eq!(network.last_call().as_deref(), Some(KLCC));
        assert!(db.lookup_any(&CacheKey::new("GET", KLCC, "")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_match_is_none() {
        let network = MockNetwork::new();
        let url = "https://nominatim.openstreetmap.org/search?format=json&q=Atlantis&limit=1";
        network.respond(url, 200, "[]");
        let (geocoder, _db) = client(network, fast_config()).await;

        assert_eq!(geocoder.search("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_query_is_encoded() {
        let network = MockNetwork::new();
        let (geocoder, _db) = client(network, fast_config()).await;
        let url = geocoder.search_url("Menara KL & Tower").unwrap();
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/search?format=json&q=Menara+KL+%26+Tower&limit=1"
        );
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let network = MockNetwork::new();
        let (geocoder, _db) = client(network.clone(), fast_config()).await;
        let before = network.last_call();

        assert!(matches!(geocoder.search("   ").await, Err(GeocodeError::EmptyQuery)));
        assert_eq!(network.last_call(), before);
    }

    #[tokio::test]
    async fn test_offline_is_unavailable() {
        let network = MockNetwork::new();
        let (geocoder, _db) = client(network.clone(), fast_config()).await;
        network.set_offline(true);

        assert!(matches!(geocoder.search("KLCC").await, Err(GeocodeError::Unavailable)));
    }

    #[tokio::test]
    async fn test_error_status() {
        let network = MockNetwork::new();
        network.respond(KLCC, 429, "slow down");
        let (geocoder, _db) = client(network, fast_config()).await;

        assert!(matches!(geocoder.search("KLCC").await, Err(GeocodeError::HttpError { status: 429 })));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let network = MockNetwork::new();
        network.respond(KLCC, 200, "[]");
        let config = GeocodeConfig { min_interval: Duration::from_millis(200), ..Default::default() };
        let (geocoder, _db) = client(network, config).await;

        let start = Instant::now();
        geocoder.search("KLCC").await.unwrap();
        geocoder.search("KLCC").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[test]
    fn test_config_from_app_config() {
        let config = GeocodeConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.language, "ms");
        assert_eq!(config.min_interval, Duration::from_secs(1));
    }
}
