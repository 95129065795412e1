//! Offline cache coordinator.
//!
//! Mediates every outbound request so the map stays usable without
//! connectivity while cached content is kept reasonably fresh.
//!
//! ### Lifecycle
//! - `install` seeds the primary store with the whole asset manifest, or
//!   fails and marks this version redundant.
//! - `activate` deletes every store not owned by this version and records
//!   its store names in the database.
//! - A redundant version keeps intercepting through the stores of the last
//!   recorded version. With no recorded version, or before install finishes,
//!   requests go straight to the network.
//!
//! ### Dispatch
//! | class          | policy                 | store   |
//! |----------------|------------------------|---------|
//! | live search    | network only           | none    |
//! | map tile       | stale-while-revalidate | tiles   |
//! | remote dataset | cache first            | data    |
//! | static / other | configured default     | primary |
//!
//! Store failures are logged and never fail a request. Network failures
//! become "no network result".

mod lifecycle;
pub mod manifest;
mod policy;

pub use manifest::AssetManifest;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use smartnav_core::{ActiveVersion, AppConfig, CacheDb, DefaultPolicy, Error};
use tokio::sync::RwLock;
use url::Url;

use crate::classify::{Classifier, RequestClass};
use crate::fetch::{Network, Request, Response, resolve};

/// Lifecycle state of one coordinator version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Constructed, not yet installed.
    Parsed,
    Installing,
    Installed,
    Activating,
    Active,
    /// Install failed; this version never activates.
    Redundant,
}

/// Caching policy applied to a request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    NetworkOnly,
    StaleWhileRevalidate,
    CacheFirst,
    NetworkFirst,
}

/// Store names and policy knobs for one deployed version.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub static_store: String,
    pub tile_store: String,
    pub data_store: String,
    pub default_policy: DefaultPolicy,
    /// Network window for [`Policy::NetworkFirst`].
    pub network_timeout: Duration,
    /// Page served to navigations when nothing else answers.
    pub offline_fallback: Option<Url>,
}

impl CoordinatorSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let base = Url::parse(&config.app_base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let offline_fallback = config
            .offline_fallback
            .as_deref()
            .map(|entry| resolve(&base, entry).map_err(|e| Error::InvalidUrl(format!("{entry}: {e}"))))
            .transpose()?;

        Ok(Self {
            static_store: config.static_store.clone(),
            tile_store: config.tile_store.clone(),
            data_store: config.data_store.clone(),
            default_policy: config.default_policy,
            network_timeout: config.network_first_timeout(),
            offline_fallback,
        })
    }

    /// Stores kept on activation.
    pub fn allowed_stores(&self) -> [&str; 3] {
        [self.static_store.as_str(), self.tile_store.as_str(), self.data_store.as_str()]
    }

    /// These settings pointed at the stores of `version`.
    pub fn with_stores(&self, version: &ActiveVersion) -> Self {
        Self {
            static_store: version.static_store.clone(),
            tile_store: version.tile_store.clone(),
            data_store: version.data_store.clone(),
            ..self.clone()
        }
    }

    fn to_version(&self) -> ActiveVersion {
        ActiveVersion::new(&self.static_store, &self.tile_store, &self.data_store)
    }
}

/// The offline cache coordinator for one deployed version.
pub struct Coordinator {
    db: CacheDb,
    network: Arc<dyn Network>,
    classifier: Classifier,
    manifest: AssetManifest,
    settings: CoordinatorSettings,
    state: RwLock<WorkerState>,
    /// Stores answering requests: this version once active, or the last
    /// recorded version after a failed install.
    serving: RwLock<Option<Arc<CoordinatorSettings>>>,
}

impl Coordinator {
    pub fn new(
        db: CacheDb, network: Arc<dyn Network>, classifier: Classifier, manifest: AssetManifest,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            db,
            network,
            classifier,
            manifest,
            settings,
            state: RwLock::new(WorkerState::Parsed),
            serving: RwLock::new(None),
        }
    }

    /// Build a coordinator, its manifest and its classification table from configuration.
    pub fn from_config(config: &AppConfig, db: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        let manifest = AssetManifest::from_config(config)?;
        let classifier = Classifier::from_config(config, &manifest)?;
        let settings = CoordinatorSettings::from_config(config)?;
        Ok(Self::new(db, network, classifier, manifest, settings))
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Settings currently answering requests, if any version is serving.
    pub async fn serving(&self) -> Option<Arc<CoordinatorSettings>> {
        self.serving.read().await.clone()
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn classify(&self, request: &Request) -> RequestClass {
        self.classifier.classify(&request.url)
    }

    /// Policy governing a request class in this deployment.
    pub fn policy_for(&self, class: RequestClass) -> Policy {
        match class {
            RequestClass::LiveSearch => Policy::NetworkOnly,
            RequestClass::MapTile => Policy::StaleWhileRevalidate,
            RequestClass::RemoteDataset => Policy::CacheFirst,
            RequestClass::StaticAsset | RequestClass::Other => match self.settings.default_policy {
                DefaultPolicy::CacheFirst => Policy::CacheFirst,
                DefaultPolicy::NetworkFirst => Policy::NetworkFirst,
            },
        }
    }

    /// Answer a request.
    ///
    /// `None` means neither the network nor any store produced a usable
    /// response; the caller must handle the absence.
    pub async fn handle(&self, request: &Request) -> Option<Response> {
        let Some(settings) = self.serving().await else {
            let state = self.state().await;
            tracing::debug!(url = %request.url, state = state.as_str(), "nothing serving; passing through");
            return self.network_only(request).await;
        };

        if request.method != Method::GET {
            return self.network_only(request).await;
        }

        let class = self.classify(request);
        let policy = self.policy_for(class);
        tracing::debug!(url = %request.url, class = class.as_str(), ?policy, "dispatching request");

        match (class, policy) {
            (_, Policy::NetworkOnly) => self.network_only(request).await,
            (_, Policy::StaleWhileRevalidate) => self.stale_while_revalidate(request, &settings.tile_store).await,
            (RequestClass::RemoteDataset, _) => self.remote_dataset(request, &settings).await,
            (_, Policy::CacheFirst) => self.cache_first(request, &settings.static_store, &[]).await,
            (_, Policy::NetworkFirst) => self.network_first(request, &settings).await,
        }
    }
}
