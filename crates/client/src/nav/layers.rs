//! Dataset overlays and features read back from the map.

use serde::Serialize;
use url::Url;

/// Pinned points-of-interest dataset for Peninsular Malaysia.
pub const POI_DATASET_URL: &str =
    "https://raw.githubusercontent.com/aimanrafee/SmartNav-API/main/data/semenanjung-poi.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// One dot per point feature.
    Circle,
    /// Stroked line features such as roads.
    Line,
}

/// A style layer drawing one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub color: &'static str,
}

/// A remote GeoJSON dataset shown as one source plus one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Source id; the layer id is derived from it.
    pub id: String,
    pub data_url: Url,
    pub kind: LayerKind,
    pub color: &'static str,
}

impl Dataset {
    pub fn new(id: impl Into<String>, data_url: Url, kind: LayerKind, color: &'static str) -> Self {
        Self { id: id.into(), data_url, kind, color }
    }

    /// The pinned POI dataset as amber dots.
    pub fn poi() -> Result<Self, url::ParseError> {
        Ok(Self::new("poi", Url::parse(POI_DATASET_URL)?, LayerKind::Circle, "#ffb800"))
    }

    pub fn layer(&self) -> Layer {
        Layer { id: format!("{}-layer", self.id), source: self.id.clone(), kind: self.kind, color: self.color }
    }
}

/// A rendered feature returned by a viewport query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub name: Option<String>,
    /// GeoJSON geometry object.
    pub geometry: serde_json::Value,
}
