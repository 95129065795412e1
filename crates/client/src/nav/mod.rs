//! Navigation session: position tracking, place search and camera control.
//!
//! A [`NavSession`] owns the [`NavState`] and drives a [`MapControl`]
//! surface and, optionally, a [`Speaker`]. Geocoding and dataset loads go
//! through the coordinator like every other request; the coordinator never
//! sees navigation state. Connectivity is inferred from where those answers
//! came from.
//!
//! The MCP server does not drive a session: it has no map surface. Hosts
//! that render a map embed this module directly.

pub mod camera;
pub mod layers;
pub mod position;
pub mod speech;
pub mod state;

pub use camera::{Camera, Easing, MapControl, Marker, MarkerId, Transition};
pub use layers::{Dataset, Feature, Layer, LayerKind};
pub use position::{Geolocation, GeolocationError, PositionSample, WatchOptions};
pub use speech::{Speaker, Utterance};
pub use state::{Connectivity, Coordinates, MapStyle, NavState};

use smartnav_core::{CacheDb, TripPoint};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::fetch::{Request, ResponseSource};
use crate::geocode::{GeocodeClient, GeocodeError, Place};

/// One user's navigation session.
#[derive(Clone)]
pub struct NavSession {
    map: Arc<dyn MapControl>,
    speaker: Option<Arc<dyn Speaker>>,
    geocoder: GeocodeClient,
    db: CacheDb,
    state: Arc<RwLock<NavState>>,
}

impl NavSession {
    pub fn new(map: Arc<dyn MapControl>, geocoder: GeocodeClient, db: CacheDb) -> Self {
        Self { map, speaker: None, geocoder, db, state: Arc::new(RwLock::new(NavState::default())) }
    }

    /// Announce style changes and found destinations through `speaker`.
    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    fn speak(&self, text: impl Into<String>) {
        if let Some(speaker) = &self.speaker {
            speaker.speak(Utterance::new(text));
        }
    }

    /// Record connectivity; returns true when it changed.
    pub async fn set_connectivity(&self, connectivity: Connectivity) -> bool {
        let mut state = self.state.write().await;
        let changed = state.connectivity != connectivity;
        state.connectivity = connectivity;
        if changed {
            tracing::info!(status = connectivity.label(), "connectivity changed");
        }
        changed
    }

    /// A network answer means online; a locally produced one means the network failed.
    async fn observe(&self, source: ResponseSource) {
        match source {
            ResponseSource::Network => {
                self.set_connectivity(Connectivity::Online).await;
            }
            ResponseSource::Synthetic | ResponseSource::OfflineFallback => {
                self.set_connectivity(Connectivity::Offline).await;
            }
            ResponseSource::Cache => {}
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> NavState {
        self.state.read().await.clone()
    }

    /// Apply one position sample: state, user marker, camera, then trip log.
    ///
    /// Trip persistence failures are logged and do not interrupt tracking.
    pub async fn on_sample(&self, sample: PositionSample) {
        let position = sample.coordinates();
        {
            let mut state = self.state.write().await;
            state.position = position;
            state.user_marker_placed = true;
        }

        self.map.set_marker(
            MarkerId::User,
            Marker { position, color: camera::USER_MARKER_COLOR, popup: None },
        );
        self.map.set_camera(Camera::follow(&sample));

        let point = TripPoint::now(sample.latitude, sample.longitude, sample.accuracy);
        if let Err(e) = self.db.record_trip_point(&point).await {
            tracing::warn!(error = %e, "failed to record trip point");
        }
    }

    /// Subscribe to `geolocation` and apply samples until the subscription ends.
    pub fn track(&self, geolocation: &dyn Geolocation) -> JoinHandle<()> {
        let mut samples = geolocation.watch(WatchOptions::default());
        let session = self.clone();
        tokio::spawn(async move {
            while let Some(sample) = samples.recv().await {
                match sample {
                    Ok(sample) => session.on_sample(sample).await,
                    Err(e) => tracing::warn!(error = %e, "geolocation error"),
                }
            }
            tracing::debug!("position subscription ended");
        })
    }

    /// Geocode `query` and, on a hit, fly to it, drop the destination marker
    /// and announce it.
    pub async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        let place = match self.geocoder.search(query).await {
            Ok(place) => {
                self.set_connectivity(Connectivity::Online).await;
                place
            }
            Err(GeocodeError::Unavailable) => {
                self.set_connectivity(Connectivity::Offline).await;
                return Err(GeocodeError::Unavailable);
            }
            Err(e) => return Err(e),
        };
        if let Some(place) = &place {
            let destination = Coordinates { lat: place.lat, lon: place.lon };
            self.map.set_camera(Camera::destination(destination));
            self.map.set_marker(
                MarkerId::Destination,
                Marker {
                    position: destination,
                    color: camera::DESTINATION_MARKER_COLOR,
                    popup: Some(place.display_name.clone()),
                },
            );
            self.speak(format!("Destinasi ditemui. Menghalakan sistem ke {}", place.display_name));
            tracing::info!(destination = %place.display_name, "destination set");
        }
        Ok(place)
    }

    pub async fn recenter(&self) {
        let position = self.state.read().await.position;
        self.map.set_camera(Camera::recenter(position));
    }

    /// Switch between the vector and hybrid styles; returns the new style.
    pub async fn toggle_style(&self) -> MapStyle {
        let style = {
            let mut state = self.state.write().await;
            state.style = state.style.toggled();
            state.style
        };
        self.map.set_style(style.url());
        self.speak(style.announcement());
        style
    }

    /// Load `dataset` through the coordinator, then add its source and layer.
    ///
    /// Returns false, leaving the map untouched, when no usable copy exists.
    pub async fn show_dataset(&self, dataset: &Dataset) -> bool {
        let request = Request::get(dataset.data_url.clone());
        let Some(response) = self.geocoder.coordinator().handle(&request).await else {
            self.set_connectivity(Connectivity::Offline).await;
            tracing::warn!(dataset = %dataset.id, "dataset unreachable");
            return false;
        };
        self.observe(response.source).await;

        if !response.is_success() {
            tracing::warn!(dataset = %dataset.id, status = response.status.as_u16(), "dataset not available");
            return false;
        }

        self.map.add_source(&dataset.id, dataset.data_url.as_str());
        self.map.add_layer(dataset.layer());
        tracing::debug!(dataset = %dataset.id, source = ?response.source, "dataset shown");
        true
    }

    /// Features of `source` currently in view.
    pub fn features_in_view(&self, source: &str) -> Vec<Feature> {
        let features = self.map.query_features(source);
        tracing::debug!(source, count = features.len(), "queried features");
        features
    }

    /// Link to the current position on a public map.
    pub async fn share_url(&self) -> String {
        let position = self.state.read().await.position;
        format!("https://www.google.com/maps?q={},{}", position.lat, position.lon)
    }
}
