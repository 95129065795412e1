//! Install and activate transitions.

use std::sync::Arc;

use futures_util::future::try_join_all;
use smartnav_core::{CachedEntry, Error};

use super::{Coordinator, WorkerState};
use crate::fetch::Request;

impl Coordinator {
    /// Move from `from` to `to`, or fail if the current state is not `from`.
    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::Lifecycle(format!(
                "cannot move to {} from {} (expected {})",
                to.as_str(),
                state.as_str(),
                from.as_str()
            )));
        }
        *state = to;
        Ok(())
    }

    async fn set_state(&self, to: WorkerState) {
        *self.state.write().await = to;
    }

    /// Seed the primary store with every manifest URL.
    ///
    /// All-or-nothing: if any entry fails to fetch or is not cacheable, nothing
    /// is written and this coordinator becomes [`WorkerState::Redundant`].
    /// A redundant coordinator keeps serving through the stores of the last
    /// activated version when one is recorded.
    /// Returns the number of seeded entries.
    pub async fn install(&self) -> Result<usize, Error> {
        self.transition(WorkerState::Parsed, WorkerState::Installing).await?;
        tracing::info!(entries = self.manifest.len(), store = %self.settings.static_store, "installing");

        match self.seed().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed).await;
                tracing::info!(entries = count, "installed");
                Ok(count)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                tracing::error!(error = %e, "install failed; version is redundant");
                self.serve_previous().await;
                Err(e)
            }
        }
    }

    /// Route requests through the last recorded version's stores.
    async fn serve_previous(&self) {
        match self.db.active_version().await {
            Ok(Some(previous)) => {
                tracing::warn!(
                    static_store = %previous.static_store,
                    activated_at = %previous.activated_at,
                    "serving previous version"
                );
                *self.serving.write().await = Some(Arc::new(self.settings.with_stores(&previous)));
            }
            Ok(None) => tracing::warn!("no previous version; passing requests through"),
            Err(e) => tracing::warn!(error = %e, "could not read previous version; passing requests through"),
        }
    }

    async fn seed(&self) -> Result<usize, Error> {
        let fetches = self.manifest.urls().iter().map(|url| {
            let request = Request::get(url.clone());
            async move {
                let response = self
                    .network
                    .fetch(&request)
                    .await
                    .map_err(|e| Error::ManifestSeedFailed(format!("{url}: {e}")))?;
                if !response.is_cacheable() {
                    return Err(Error::ManifestSeedFailed(format!("{url}: status {}", response.status.as_u16())));
                }
                Ok::<CachedEntry, Error>(response.to_entry(request.cache_key()))
            }
        });
        let entries = try_join_all(fetches).await?;

        let store = self
            .db
            .open_store(&self.settings.static_store)
            .await
            .map_err(|e| Error::ManifestSeedFailed(e.to_string()))?;
        store.put_all(&entries).await.map_err(|e| Error::ManifestSeedFailed(e.to_string()))?;
        Ok(entries.len())
    }

    /// Delete every store this version does not own, record this version, then
    /// start intercepting.
    ///
    /// Cleanup and record failures are logged; the coordinator becomes active regardless.
    /// Returns the names of the deleted stores.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating).await?;

        let allowed = self.settings.allowed_stores();
        let mut deleted = Vec::new();
        match self.db.store_names().await {
            Ok(names) => {
                for name in names.into_iter().filter(|n| !allowed.contains(&n.as_str())) {
                    match self.db.delete_store(&name).await {
                        Ok(true) => {
                            tracing::info!(store = %name, "deleted stale store");
                            deleted.push(name);
                        }
                        Ok(false) => {}
                        Err(e) => tracing::warn!(store = %name, error = %e, "failed to delete stale store"),
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not list stores during activation"),
        }

        if let Err(e) = self.db.record_active_version(&self.settings.to_version()).await {
            tracing::warn!(error = %e, "failed to record active version");
        }

        *self.serving.write().await = Some(Arc::new(self.settings.clone()));
        self.set_state(WorkerState::Active).await;
        tracing::info!(deleted = deleted.len(), "active");
        Ok(deleted)
    }
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }
}
