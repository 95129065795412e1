//! Request and response values passed through the coordinator.

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use smartnav_core::{CacheKey, CachedEntry, Error};
use url::Url;

use super::url::{UrlError, canonicalize};

/// Request headers that take part in the cache key.
///
/// A ranged request must never be answered with a full cached body.
const VARY_HEADERS: [HeaderName; 1] = [header::RANGE];

/// What kind of load a request represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// A full-page navigation; eligible for the offline fallback page.
    Navigate,
    /// Any subresource load (script, tile, JSON, ...).
    #[default]
    Resource,
}

/// An outbound request as seen by the coordinator.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub mode: RequestMode,
}

impl Request {
    /// A subresource GET for an already-parsed URL.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, headers: HeaderMap::new(), mode: RequestMode::Resource }
    }

    /// A navigation GET for an already-parsed URL.
    pub fn navigate(url: Url) -> Self {
        Self { mode: RequestMode::Navigate, ..Self::get(url) }
    }

    /// Parse and canonicalize `url` into a subresource GET.
    pub fn parse(url: &str) -> Result<Self, UrlError> {
        Ok(Self::get(canonicalize(url)?))
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Normalized store key: method, canonical URL and vary headers.
    pub fn cache_key(&self) -> CacheKey {
        let vary = VARY_HEADERS
            .iter()
            .filter_map(|name| {
                self.headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| format!("{}={}", name.as_str(), v.trim()))
            })
            .collect::<Vec<_>>()
            .join("&");
        CacheKey::new(self.method.as_str(), self.url.as_str(), &vary)
    }
}

/// Where a response handed back to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    OfflineFallback,
    /// Produced locally, e.g. the not-found answer for an unreachable dataset.
    Synthetic,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::OfflineFallback => "offline_fallback",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

/// A response returned by the network or replayed from a store.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl Response {
    /// A network response.
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { url, status, headers, body, source: ResponseSource::Network }
    }

    /// The locally generated answer for a resource that is neither cached nor reachable.
    pub fn not_found(url: Url) -> Self {
        Self {
            url,
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            source: ResponseSource::Synthetic,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether this response may be written to a store.
    ///
    /// Partial content is never stored.
    pub fn is_cacheable(&self) -> bool {
        self.is_success() && self.status != StatusCode::PARTIAL_CONTENT
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// Capture this response for storage under `key`.
    ///
    /// Header values that are not valid UTF-8 are dropped.
    pub fn to_entry(&self, key: CacheKey) -> CachedEntry {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        CachedEntry::new(key, self.status.as_u16(), headers, self.body.to_vec())
    }

    /// Rebuild a response from a stored entry.
    pub fn from_entry(url: Url, entry: CachedEntry, source: ResponseSource) -> Result<Self, Error> {
        let status = StatusCode::from_u16(entry.status_code)
            .map_err(|_| Error::CorruptEntry(format!("invalid status {}", entry.status_code)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &entry.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            headers.append(name, value);
        }

        Ok(Self { url, status, headers, body: Bytes::from(entry.body), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_url() -> Url {
        Url::parse("https://tiles.openfreemap.org/planet/14/13000/7900.pbf").unwrap()
    }

    #[test]
    fn test_cache_key_ignores_unrelated_headers() {
        let plain = Request::get(tile_url());
        let localized = Request::get(tile_url()).with_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("ms"));
        assert_eq!(plain.cache_key(), localized.cache_key());
    }

    #[test]
    fn test_cache_key_varies_on_range() {
        let plain = Request::get(tile_url());
        let ranged = Request::get(tile_url()).with_header(header::RANGE, HeaderValue::from_static("bytes=0-99"));
        assert_ne!(plain.cache_key(), ranged.cache_key());
    }

    #[test]
    fn test_navigation_mode() {
        assert!(Request::navigate(tile_url()).is_navigation());
        assert!(!Request::get(tile_url()).is_navigation());
    }

    #[test]
    fn test_partial_content_not_cacheable() {
        let partial = Response::new(tile_url(), StatusCode::PARTIAL_CONTENT, HeaderMap::new(), Bytes::new());
        assert!(partial.is_success());
        assert!(!partial.is_cacheable());
    }

    #[test]
    fn test_entry_restores_response() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/x-protobuf"));
        let response = Response::new(tile_url(), StatusCode::OK, headers, Bytes::from_static(b"tile"));
        let key = Request::get(tile_url()).cache_key();

        let entry = response.to_entry(key);
        let restored = Response::from_entry(tile_url(), entry, ResponseSource::Cache).unwrap();

        assert_eq!(restored.status, StatusCode::OK);
        assert_eq!(restored.body, Bytes::from_static(b"tile"));
        assert_eq!(restored.content_type(), Some("application/x-protobuf"));
        assert_eq!(restored.source, ResponseSource::Cache);
    }

    #[test]
    fn test_not_found_is_synthetic() {
        let response = Response::not_found(tile_url());
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.source, ResponseSource::Synthetic);
    }
}
