//! Request key generation for cache stores.

use sha2::{Digest, Sha256};

/// Normalized request descriptor used as a cache store key.
///
/// `hash` is the lookup key; `method` and `url` are kept alongside it so
/// stored entries stay inspectable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub hash: String,
    pub method: String,
    pub url: String,
}

impl CacheKey {
    /// Build a key from an upper-cased method, a canonical URL and the
    /// already-normalized vary header string.
    pub fn new(method: &str, url: &str, vary_headers: &str) -> Self {
        let method = method.to_ascii_uppercase();
        let hash = compute_cache_key(&method, url, vary_headers);
        Self { hash, method, url: url.to_string() }
    }
}

/// Compute the SHA-256 hex key for a request descriptor.
pub fn compute_cache_key(method: &str, url: &str, vary_headers: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(vary_headers.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "https://tiles.openfreemap.org/a.pbf", "");
        let hash2 = compute_cache_key("GET", "https://tiles.openfreemap.org/a.pbf", "");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_cache_key("GET", "https://example.com/", "");
        let head = compute_cache_key("HEAD", "https://example.com/", "");
        assert_ne!(get, head);
    }

    #[test]
    fn test_hash_different_headers() {
        let hash1 = compute_cache_key("GET", "https://example.com/", "accept-language=ms");
        let hash2 = compute_cache_key("GET", "https://example.com/", "accept-language=en");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", "https://example.com/", "");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_method_case_insensitive() {
        let lower = CacheKey::new("get", "https://example.com/", "");
        let upper = CacheKey::new("GET", "https://example.com/", "");
        assert_eq!(lower, upper);
        assert_eq!(upper.method, "GET");
    }
}
