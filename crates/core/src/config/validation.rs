//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is outside 100ms..=5 minutes
    /// - `network_first_timeout_ms` is outside 100ms..=60s
    /// - `user_agent` is empty
    /// - store names are empty or not distinct
    /// - a URL does not parse or a manifest entry does not resolve
    /// - a classification pattern is not a valid regex
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if !(100..=60_000).contains(&self.network_first_timeout_ms) {
            return Err(invalid("network_first_timeout_ms", "must be between 100ms and 60000ms"));
        }
        if self.network_first_timeout_ms > self.timeout_ms {
            tracing::warn!(
                network_first_timeout_ms = self.network_first_timeout_ms,
                timeout_ms = self.timeout_ms,
                "network-first window exceeds the HTTP timeout; the HTTP timeout will fire first"
            );
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        let stores = [&self.static_store, &self.tile_store, &self.data_store];
        for (field, name) in ["static_store", "tile_store", "data_store"].iter().zip(stores) {
            if name.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        if stores[0] == stores[1] || stores[0] == stores[2] || stores[1] == stores[2] {
            return Err(invalid("static_store", "store names must be distinct"));
        }

        let base = url::Url::parse(&self.app_base_url).map_err(|e| invalid("app_base_url", e.to_string()))?;
        for entry in &self.asset_manifest {
            base.join(entry)
                .map_err(|e| invalid("asset_manifest", format!("{entry}: {e}")))?;
        }
        if let Some(fallback) = &self.offline_fallback {
            base.join(fallback)
                .map_err(|e| invalid("offline_fallback", format!("{fallback}: {e}")))?;
        }

        url::Url::parse(&self.geocode_base_url).map_err(|e| invalid("geocode_base_url", e.to_string()))?;

        for (field, patterns) in [
            ("tile_patterns", &self.tile_patterns),
            ("dataset_patterns", &self.dataset_patterns),
            ("search_patterns", &self.search_patterns),
        ] {
            for pattern in patterns {
                regex::Regex::new(pattern).map_err(|e| invalid(field, e.to_string()))?;
            }
        }

        Ok(())
    }
}
