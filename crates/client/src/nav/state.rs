//! Navigation state owned by a session.

use serde::Serialize;

/// Kuala Lumpur city centre.
pub const DEFAULT_POSITION: Coordinates = Coordinates { lat: 3.1390, lon: 101.6869 };

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Base map style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    /// Street vector map.
    #[default]
    Vector,
    /// Hybrid map with road labels.
    Hybrid,
}

impl MapStyle {
    pub fn url(&self) -> &'static str {
        match self {
            MapStyle::Vector => "https://tiles.openfreemap.org/styles/liberty",
            MapStyle::Hybrid => "https://tiles.openfreemap.org/styles/bright",
        }
    }

    /// Announcement when this style becomes active.
    pub fn announcement(&self) -> &'static str {
        match self {
            MapStyle::Vector => "Mod Peta Vektor Aktif",
            MapStyle::Hybrid => "Mod Satellite Hybrid Aktif",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MapStyle::Vector => MapStyle::Hybrid,
            MapStyle::Hybrid => MapStyle::Vector,
        }
    }
}

/// Whether the network answered the last request that needed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    #[default]
    Online,
    Offline,
}

impl Connectivity {
    /// Status line shown to the driver.
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Online => "Sistem Online (3D Engine)",
            Connectivity::Offline => "Mod Offline Aktif",
        }
    }
}

/// Mutable state of one navigation session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavState {
    /// Last known device position.
    pub position: Coordinates,
    pub style: MapStyle,
    /// Whether the user marker has been placed on the map yet.
    pub user_marker_placed: bool,
    pub connectivity: Connectivity,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            style: MapStyle::default(),
            user_marker_placed: false,
            connectivity: Connectivity::default(),
        }
    }
}
