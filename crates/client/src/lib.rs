//! Client code for smartnav.
//!
//! This crate provides the network seam, request classification, the
//! offline cache coordinator and the geocoder used by the server, plus the
//! navigation session for hosts that render a map.

pub mod classify;
pub mod coordinator;
pub mod fetch;
pub mod geocode;
pub mod nav;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Classifier, RequestClass};
pub use coordinator::{AssetManifest, Coordinator, CoordinatorSettings, Policy, WorkerState};
pub use fetch::{FetchConfig, HttpNetwork, Network, NetworkError, Request, RequestMode, Response, ResponseSource};
pub use geocode::{GeocodeClient, GeocodeConfig, GeocodeError, Place};
pub use nav::{Connectivity, Dataset, Geolocation, MapControl, NavSession, NavState, PositionSample, Speaker};
