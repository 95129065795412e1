//! URL canonicalization for stable cache keys.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute URL string.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http(s) scheme
/// 3. Lowercase the host (the parser also drops default ports)
/// 4. Remove fragment (#...); it never reaches the network
/// 5. Keep query string intact; tile and geocode URLs are order-sensitive
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(parsed)
}

/// Resolve a manifest-style entry (`./app.js`, `/`, or an absolute URL)
/// against `base` and canonicalize the result.
pub fn resolve(base: &url::Url, entry: &str) -> Result<url::Url, UrlError> {
    let trimmed = entry.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    normalize(joined)
}

fn normalize(mut parsed: url::Url) -> Result<url::Url, UrlError> {
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://TILES.OpenFreeMap.org/planet/1/2/3.pbf").unwrap();
        assert_eq!(url.host_str(), Some("tiles.openfreemap.org"));
        assert_eq!(url.path(), "/planet/1/2/3.pbf");
    }

    #[test]
    fn test_canonicalize_remove_fragment_keep_query() {
        let url = canonicalize("https://nominatim.openstreetmap.org/search?format=json&q=KLCC#top").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("format=json&q=KLCC"));
    }

    #[test]
    fn test_canonicalize_requires_scheme() {
        assert!(matches!(canonicalize("example.com/app.js"), Err(UrlError::InvalidUrl(_))));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_relative_entries() {
        let base = url::Url::parse("http://localhost:8080/smartnav/").unwrap();
        assert_eq!(resolve(&base, "./").unwrap().as_str(), "http://localhost:8080/smartnav/");
        assert_eq!(
            resolve(&base, "./index.html").unwrap().as_str(),
            "http://localhost:8080/smartnav/index.html"
        );
    }

    #[test]
    fn test_resolve_absolute_entry() {
        let base = url::Url::parse("http://localhost:8080/").unwrap();
        let url = resolve(&base, "https://unpkg.com/maplibre-gl@3.x/dist/maplibre-gl.js").unwrap();
        assert_eq!(url.host_str(), Some("unpkg.com"));
    }
}
