//! Map surface seam and camera rules.

use serde::Serialize;
use std::time::Duration;

use super::layers::{Feature, Layer};
use super::position::PositionSample;
use super::state::Coordinates;

/// Above this speed (m/s) the camera tilts further for driving.
const DRIVING_SPEED: f64 = 10.0;

pub const USER_MARKER_COLOR: &str = "#00d4ff";
pub const DESTINATION_MARKER_COLOR: &str = "#ff4b2b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Smooth pan along the ground.
    Ease,
    /// Zoom out, travel, zoom in.
    Fly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Whatever the map surface uses by default.
    Default,
}

/// A camera move. `None` fields keep the current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub center: Coordinates,
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
    pub duration: Option<Duration>,
    pub easing: Easing,
    pub transition: Transition,
}

impl Camera {
    /// Follow the device: heading-up, steeper when driving fast.
    pub fn follow(sample: &PositionSample) -> Self {
        let pitch = if sample.speed_or_zero() > DRIVING_SPEED { 75.0 } else { 65.0 };
        Self {
            center: sample.coordinates(),
            zoom: None,
            bearing: Some(sample.heading_or_zero()),
            pitch: Some(pitch),
            duration: Some(Duration::from_millis(2000)),
            easing: Easing::Linear,
            transition: Transition::Ease,
        }
    }

    /// North-up close view of the current position.
    pub fn recenter(position: Coordinates) -> Self {
        Self {
            center: position,
            zoom: Some(18.0),
            bearing: Some(0.0),
            pitch: Some(65.0),
            duration: Some(Duration::from_millis(1500)),
            easing: Easing::Default,
            transition: Transition::Fly,
        }
    }

    pub fn destination(place: Coordinates) -> Self {
        Self {
            center: place,
            zoom: Some(17.0),
            bearing: None,
            pitch: Some(70.0),
            duration: None,
            easing: Easing::Default,
            transition: Transition::Fly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerId {
    User,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinates,
    pub color: &'static str,
    pub popup: Option<String>,
}

/// The map rendering surface. Calls are fire-and-forget.
pub trait MapControl: Send + Sync {
    fn set_camera(&self, camera: Camera);

    /// Place the marker, or move it if it already exists.
    fn set_marker(&self, id: MarkerId, marker: Marker);

    fn set_style(&self, url: &str);

    /// Register a GeoJSON source fetched from `data_url`.
    fn add_source(&self, id: &str, data_url: &str);

    fn add_layer(&self, layer: Layer);

    /// Features of `source` rendered in the current viewport.
    fn query_features(&self, source: &str) -> Vec<Feature>;
}
