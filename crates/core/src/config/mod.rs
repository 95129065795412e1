//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SMARTNAV_*)
//! 2. TOML config file (if SMARTNAV_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The cache store names carry the deployed version. Bumping them is how a
//! new version supersedes the stores of the previous one.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Policy governing static assets and unclassified requests.
///
/// Exactly one is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Serve from cache when present, otherwise fetch and fill the cache.
    CacheFirst,
    /// Race the network against a timeout, falling back to cache.
    #[default]
    NetworkFirst,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SMARTNAV_*)
/// 2. TOML config file (if SMARTNAV_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite database holding cache stores and trips.
    ///
    /// Set via SMARTNAV_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SMARTNAV_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Overall HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base URL that relative manifest entries resolve against.
    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,

    /// Primary store for application assets.
    #[serde(default = "default_static_store")]
    pub static_store: String,

    /// Store for map tile imagery.
    #[serde(default = "default_tile_store")]
    pub tile_store: String,

    /// Store for pinned remote JSON datasets.
    #[serde(default = "default_data_store")]
    pub data_store: String,

    /// Ordered asset manifest seeded into the primary store on install.
    #[serde(default = "default_asset_manifest")]
    pub asset_manifest: Vec<String>,

    /// URL patterns (regex) for map tile requests.
    #[serde(default = "default_tile_patterns")]
    pub tile_patterns: Vec<String>,

    /// URL patterns (regex) for remote dataset requests.
    #[serde(default = "default_dataset_patterns")]
    pub dataset_patterns: Vec<String>,

    /// URL patterns (regex) for live search requests; never cached.
    #[serde(default = "default_search_patterns")]
    pub search_patterns: Vec<String>,

    /// Policy for static assets and unclassified requests.
    ///
    /// Set via SMARTNAV_DEFAULT_POLICY (`network_first` or `cache_first`).
    #[serde(default)]
    pub default_policy: DefaultPolicy,

    /// Network window for the network-first policy, in milliseconds.
    #[serde(default = "default_network_first_timeout_ms")]
    pub network_first_timeout_ms: u64,

    /// Page served to navigation requests when neither network nor cache answers.
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: Option<String>,

    /// Geocoding service base URL.
    #[serde(default = "default_geocode_base_url")]
    pub geocode_base_url: String,

    /// Accept-Language sent with geocoding requests.
    #[serde(default = "default_geocode_language")]
    pub geocode_language: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./smartnav-cache.sqlite")
}

fn default_user_agent() -> String {
    "smartnav/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_app_base_url() -> String {
    "http://localhost:8080/".into()
}

fn default_static_store() -> String {
    "smartnav-2050-v1".into()
}

fn default_tile_store() -> String {
    "smartnav-tiles-v1".into()
}

fn default_data_store() -> String {
    "smartnav-data-v1".into()
}

fn default_asset_manifest() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./app.js",
        "./manifest.json",
        "./smartnav2050.png",
        "https://unpkg.com/maplibre-gl@3.x/dist/maplibre-gl.js",
        "https://unpkg.com/maplibre-gl@3.x/dist/maplibre-gl.css",
        "https://raw.githubusercontent.com/aimanrafee/SmartNav-API/main/data/semenanjung-poi.json",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_tile_patterns() -> Vec<String> {
    vec![r"^https?://tiles\.openfreemap\.org/".into()]
}

fn default_dataset_patterns() -> Vec<String> {
    vec![r"^https://raw\.githubusercontent\.com/aimanrafee/SmartNav-API/".into()]
}

fn default_search_patterns() -> Vec<String> {
    vec![r"^https://nominatim\.openstreetmap\.org/".into()]
}

fn default_network_first_timeout_ms() -> u64 {
    3_000
}

fn default_offline_fallback() -> Option<String> {
    Some("./index.html".into())
}

fn default_geocode_base_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}

fn default_geocode_language() -> String {
    "ms".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            app_base_url: default_app_base_url(),
            static_store: default_static_store(),
            tile_store: default_tile_store(),
            data_store: default_data_store(),
            asset_manifest: default_asset_manifest(),
            tile_patterns: default_tile_patterns(),
            dataset_patterns: default_dataset_patterns(),
            search_patterns: default_search_patterns(),
            default_policy: DefaultPolicy::default(),
            network_first_timeout_ms: default_network_first_timeout_ms(),
            offline_fallback: default_offline_fallback(),
            geocode_base_url: default_geocode_base_url(),
            geocode_language: default_geocode_language(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Network window for the network-first policy.
    pub fn network_first_timeout(&self) -> Duration {
        Duration::from_millis(self.network_first_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SMARTNAV_`
    /// 2. TOML file from `SMARTNAV_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SMARTNAV_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SMARTNAV_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
