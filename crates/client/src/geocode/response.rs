//! Nominatim response types and normalization.

use serde::{Deserialize, Serialize};

use super::GeocodeError;

/// Raw candidate from the Nominatim `search` endpoint.
///
/// Coordinates arrive as decimal strings.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, schemars::JsonSchema)]
pub struct Place {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl TryFrom<NominatimPlace> for Place {
    type Error = GeocodeError;

    fn try_from(raw: NominatimPlace) -> Result<Self, Self::Error> {
        let lat = raw
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("lat {:?}: {e}", raw.lat)))?;
        let lon = raw
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("lon {:?}: {e}", raw.lon)))?;
        Ok(Place { lat, lon, display_name: raw.display_name })
    }
}

/// First candidate of a response body, if any.
pub fn first_place(body: &[u8]) -> Result<Option<Place>, GeocodeError> {
    let candidates: Vec<NominatimPlace> =
        serde_json::from_slice(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;
    candidates.into_iter().next().map(Place::try_from).transpose()
}
