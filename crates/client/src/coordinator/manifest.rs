//! Asset manifest resolution.

use std::collections::HashSet;

use smartnav_core::{AppConfig, Error};
use url::Url;

use crate::fetch::resolve;

/// Ordered, de-duplicated list of URLs seeded into the primary store on install.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    urls: Vec<Url>,
}

impl AssetManifest {
    /// Resolve `entries` against `base`, keeping the first occurrence of each URL.
    pub fn resolve(base: &Url, entries: &[String]) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        let mut urls = Vec::with_capacity(entries.len());
        for entry in entries {
            let url = resolve(base, entry).map_err(|e| Error::InvalidUrl(format!("{entry}: {e}")))?;
            if seen.insert(url.to_string()) {
                urls.push(url);
            }
        }
        Ok(Self { urls })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let base = Url::parse(&config.app_base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Self::resolve(&base, &config.asset_manifest)
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_order() {
        let base = Url::parse("https://app.test/").unwrap();
        let manifest =
            AssetManifest::resolve(&base, &["./index.html".into(), "./app.js".into(), "./".into()]).unwrap();
        let urls: Vec<&str> = manifest.urls().iter().map(Url::as_str).collect();
        assert_eq!(urls, vec!["https://app.test/index.html", "https://app.test/app.js", "https://app.test/"]);
    }

    #[test]
    fn test_resolve_dedupes() {
        let base = Url::parse("https://app.test/").unwrap();
        let manifest = AssetManifest::resolve(
            &base,
            &["./app.js".into(), "https://APP.test/app.js".into(), "app.js#v2".into()],
        )
        .unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.urls()[0].as_str(), "https://app.test/app.js");
    }

    #[test]
    fn test_default_manifest() {
        let manifest = AssetManifest::from_config(&AppConfig::default()).unwrap();
        assert_eq!(manifest.len(), 8);
        assert_eq!(manifest.urls()[0].as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let base = Url::parse("https://app.test/").unwrap();
        assert!(AssetManifest::resolve(&base, &["ftp://files.test/a".into()]).is_err());
    }
}
