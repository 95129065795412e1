//! Device position samples and the geolocation seam.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

use super::state::Coordinates;

/// One fix from the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees clockwise from north.
    pub heading: Option<f64>,
    /// Metres per second.
    pub speed: Option<f64>,
    /// Metres.
    pub accuracy: Option<f64>,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, heading: None, speed: None, accuracy: None }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.latitude, lon: self.longitude }
    }

    pub fn heading_or_zero(&self) -> f64 {
        self.heading.filter(|h| h.is_finite()).unwrap_or(0.0)
    }

    pub fn speed_or_zero(&self) -> f64 {
        self.speed.filter(|s| s.is_finite()).unwrap_or(0.0)
    }
}

/// Options for a position subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Longest wait for a single fix.
    pub timeout: Duration,
    /// Oldest cached fix accepted.
    pub max_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { high_accuracy: true, timeout: Duration::from_millis(5000), max_age: Duration::from_millis(1000) }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    Unavailable,

    #[error("timed out waiting for a fix")]
    Timeout,
}

/// Host geolocation service.
///
/// The subscription ends when the sender side is dropped.
pub trait Geolocation: Send + Sync {
    fn watch(&self, options: WatchOptions) -> mpsc::Receiver<Result<PositionSample, GeolocationError>>;
}
