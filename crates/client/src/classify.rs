//! Request classification.
//!
//! An ordered table of (matcher, class) rules evaluated top to bottom; the
//! first match wins and anything unmatched is [`RequestClass::Other`].

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;
use smartnav_core::{AppConfig, Error};
use url::Url;

use crate::coordinator::AssetManifest;

/// Traffic class of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Geocoding and other answers that must always be live.
    LiveSearch,
    MapTile,
    /// Large pinned JSON datasets.
    RemoteDataset,
    /// Application files and pinned libraries.
    StaticAsset,
    Other,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::LiveSearch => "live_search",
            RequestClass::MapTile => "map_tile",
            RequestClass::RemoteDataset => "remote_dataset",
            RequestClass::StaticAsset => "static_asset",
            RequestClass::Other => "other",
        }
    }
}

/// Predicate over a canonical request URL.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Regex over the full URL string.
    Pattern(Regex),
    /// Exact membership in a URL set.
    AnyOf(HashSet<String>),
}

impl Matcher {
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(url.as_str()),
            Matcher::AnyOf(urls) => urls.contains(url.as_str()),
        }
    }
}

/// One row of the classification table.
#[derive(Debug, Clone)]
pub struct Rule {
    pub class: RequestClass,
    pub matcher: Matcher,
}

impl Rule {
    pub fn pattern(class: RequestClass, pattern: &str) -> Result<Self, Error> {
        let re = Regex::new(pattern).map_err(|e| Error::InvalidInput(format!("bad pattern {pattern}: {e}")))?;
        Ok(Self { class, matcher: Matcher::Pattern(re) })
    }
}

/// Ordered classification table.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build the table from configuration.
    ///
    /// Precedence: the geocoder endpoint, live search, map tiles, remote
    /// datasets, manifest entries, then anything under the application base URL.
    /// The geocoder endpoint is always live even when no search pattern covers it.
    pub fn from_config(config: &AppConfig, manifest: &AssetManifest) -> Result<Self, Error> {
        let geocoder = Url::parse(&config.geocode_base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let mut rules = vec![Rule::pattern(
            RequestClass::LiveSearch,
            &format!("^{}", regex::escape(geocoder.as_str())),
        )?];
        for (class, patterns) in [
            (RequestClass::LiveSearch, &config.search_patterns),
            (RequestClass::MapTile, &config.tile_patterns),
            (RequestClass::RemoteDataset, &config.dataset_patterns),
        ] {
            for pattern in patterns {
                rules.push(Rule::pattern(class, pattern)?);
            }
        }

        rules.push(Rule {
            class: RequestClass::StaticAsset,
            matcher: Matcher::AnyOf(manifest.urls().iter().map(|u| u.to_string()).collect()),
        });

        let base = Url::parse(&config.app_base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        rules.push(Rule::pattern(RequestClass::StaticAsset, &format!("^{}", regex::escape(base.as_str())))?);

        Ok(Self::new(rules))
    }

    /// Class of `url`; total, defaulting to [`RequestClass::Other`].
    pub fn classify(&self, url: &Url) -> RequestClass {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(url))
            .map(|rule| rule.class)
            .unwrap_or(RequestClass::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        let config = AppConfig::default();
        let manifest = AssetManifest::from_config(&config).unwrap();
        Classifier::from_config(&config, &manifest).unwrap()
    }

    fn class_of(url: &str) -> RequestClass {
        classifier().classify(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_live_search() {
        assert_eq!(
            class_of("https://nominatim.openstreetmap.org/search?format=json&q=KLCC&limit=1"),
            RequestClass::LiveSearch
        );
    }

    #[test]
    fn test_geocoder_endpoint_is_live_without_search_pattern() {
        let config = AppConfig {
            geocode_base_url: "https://geo.example.com".into(),
            search_patterns: vec![],
            ..AppConfig::default()
        };
        let manifest = AssetManifest::from_config(&config).unwrap();
        let classifier = Classifier::from_config(&config, &manifest).unwrap();

        let search = Url::parse("https://geo.example.com/search?format=json&q=KLCC&limit=1").unwrap();
        assert_eq!(classifier.classify(&search), RequestClass::LiveSearch);
        let elsewhere = Url::parse("https://geo.example.org/search").unwrap();
        assert_eq!(classifier.classify(&elsewhere), RequestClass::Other);
    }

    #[test]
    fn test_map_tile() {
        assert_eq!(class_of("https://tiles.openfreemap.org/planet/14/13000/7900.pbf"), RequestClass::MapTile);
        assert_eq!(class_of("https://tiles.openfreemap.org/styles/liberty"), RequestClass::MapTile);
    }

    #[test]
    fn test_remote_dataset_beats_manifest() {
        // The POI dataset is also pinned in the manifest; the dataset rule comes first.
        assert_eq!(
            class_of("https://raw.githubusercontent.com/aimanrafee/SmartNav-API/main/data/semenanjung-poi.json"),
            RequestClass::RemoteDataset
        );
    }

    #[test]
    fn test_static_assets() {
        assert_eq!(class_of("https://unpkg.com/maplibre-gl@3.x/dist/maplibre-gl.js"), RequestClass::StaticAsset);
        assert_eq!(class_of("http://localhost:8080/app.js"), RequestClass::StaticAsset);
        assert_eq!(class_of("http://localhost:8080/icons/new.png"), RequestClass::StaticAsset);
    }

    #[test]
    fn test_other_is_catch_all() {
        assert_eq!(class_of("https://example.com/anything"), RequestClass::Other);
        assert_eq!(Classifier::default().classify(&Url::parse("https://a.b/").unwrap()), RequestClass::Other);
    }

    #[test]
    fn test_first_match_wins() {
        let classifier = Classifier::new(vec![
            Rule::pattern(RequestClass::LiveSearch, "example").unwrap(),
            Rule::pattern(RequestClass::MapTile, "example").unwrap(),
        ]);
        assert_eq!(classifier.classify(&Url::parse("https://example.com/").unwrap()), RequestClass::LiveSearch);
    }

    #[test]
    fn test_bad_pattern_rejected() {
        assert!(Rule::pattern(RequestClass::MapTile, "(").is_err());
    }
}
