//! Caching policies.
//!
//! Every policy resolves to `Option<Response>`: `None` only when neither the
//! network nor a store had anything to offer.

use smartnav_core::{CacheDb, CacheKey};
use tokio::time::timeout;

use super::{Coordinator, CoordinatorSettings};
use crate::fetch::{Network, Request, Response, ResponseSource};

/// Fetch from the network, folding transport failures into `None`.
pub(super) async fn fetch_from(network: &dyn Network, request: &Request) -> Option<Response> {
    match network.fetch(request).await {
        Ok(response) => Some(response),
        Err(e) => {
            tracing::debug!(url = %request.url, error = %e, "network unavailable");
            None
        }
    }
}

/// Write `response` into `store` if it is cacheable. Failures are logged.
pub(super) async fn put_swallowed(db: &CacheDb, store: &str, key: &CacheKey, response: &Response) {
    if !response.is_cacheable() {
        return;
    }
    let result = match db.open_store(store).await {
        Ok(handle) => handle.put(&response.to_entry(key.clone())).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!(store, url = %response.url, error = %e, "cache write failed");
    }
}

impl Coordinator {
    /// Look up `key` in `store`; read failures and corrupt entries count as misses.
    async fn lookup(&self, store: &str, request: &Request) -> Option<Response> {
        match self.db.lookup_in(store, &request.cache_key()).await {
            Ok(Some(entry)) => match Response::from_entry(request.url.clone(), entry, ResponseSource::Cache) {
                Ok(response) => Some(response),
                Err(e) => {
                    tracing::warn!(store, url = %request.url, error = %e, "ignoring unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(store, url = %request.url, error = %e, "cache read failed");
                None
            }
        }
    }

    pub(super) async fn network_only(&self, request: &Request) -> Option<Response> {
        fetch_from(self.network.as_ref(), request).await
    }

    /// Serve a hit immediately and refresh it in the background; a miss waits for the network.
    pub(super) async fn stale_while_revalidate(&self, request: &Request, store: &str) -> Option<Response> {
        if let Some(cached) = self.lookup(store, request).await {
            let db = self.db.clone();
            let network = self.network.clone();
            let request = request.clone();
            let store = store.to_string();
            tokio::spawn(async move {
                if let Some(fresh) = fetch_from(network.as_ref(), &request).await {
                    put_swallowed(&db, &store, &request.cache_key(), &fresh).await;
                    tracing::debug!(url = %request.url, store = %store, "revalidated");
                }
            });
            return Some(cached);
        }

        let response = self.network_only(request).await?;
        put_swallowed(&self.db, store, &request.cache_key(), &response).await;
        Some(response)
    }

    /// Serve from `store` (then `fallbacks`, read-only) and only go to the network on a miss.
    pub(super) async fn cache_first(&self, request: &Request, store: &str, fallbacks: &[&str]) -> Option<Response> {
        for name in std::iter::once(store).chain(fallbacks.iter().copied()) {
            if let Some(cached) = self.lookup(name, request).await {
                return Some(cached);
            }
        }

        let response = self.network_only(request).await?;
        put_swallowed(&self.db, store, &request.cache_key(), &response).await;
        Some(response)
    }

    /// Remote datasets: cache first, with a local not-found when nothing answers.
    pub(super) async fn remote_dataset(&self, request: &Request, settings: &CoordinatorSettings) -> Option<Response> {
        let response = self
            .cache_first(request, &settings.data_store, &[settings.static_store.as_str()])
            .await
            .unwrap_or_else(|| Response::not_found(request.url.clone()));
        Some(response)
    }

    /// Prefer a fresh network answer within the configured window, else the cache.
    ///
    /// A navigation with neither gets the offline page.
    pub(super) async fn network_first(&self, request: &Request, settings: &CoordinatorSettings) -> Option<Response> {
        let store = settings.static_store.as_str();
        let window = settings.network_timeout;
        let fetched = match timeout(window, self.network_only(request)).await {
            Ok(fetched) => fetched,
            Err(_) => {
                tracing::debug!(url = %request.url, window_ms = window.as_millis() as u64, "network window elapsed");
                None
            }
        };

        match fetched {
            Some(response) if response.is_cacheable() => {
                put_swallowed(&self.db, store, &request.cache_key(), &response).await;
                Some(response)
            }
            Some(response) => Some(self.lookup(store, request).await.unwrap_or(response)),
            None => {
                if let Some(cached) = self.lookup(store, request).await {
                    return Some(cached);
                }
                if request.is_navigation() {
                    return self.offline_fallback(settings).await;
                }
                None
            }
        }
    }

    /// The cached offline page from the primary store, if configured and present.
    async fn offline_fallback(&self, settings: &CoordinatorSettings) -> Option<Response> {
        let url = settings.offline_fallback.clone()?;
        let fallback = self.lookup(&settings.static_store, &Request::get(url)).await?;
        Some(fallback.with_source(ResponseSource::OfflineFallback))
    }
}
