//! Geocoder error types.

/// Errors from a geocoding lookup.
///
/// "No match" is not an error; see [`super::GeocodeClient::search`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodeError {
    /// Query was empty after trimming.
    #[error("empty query")]
    EmptyQuery,

    /// Neither the network nor anything else answered.
    #[error("geocoding service unreachable")]
    Unavailable,

    /// The service answered with a non-success status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Response body was not a candidate list.
    #[error("parse error: {0}")]
    Parse(String),

    /// Base URL could not be combined with the query.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<GeocodeError> for smartnav_core::Error {
    fn from(err: GeocodeError) -> Self {
        use smartnav_core::Error;
        match err {
            GeocodeError::EmptyQuery => Error::InvalidInput("query must not be empty".into()),
            GeocodeError::Unavailable => Error::Network(err.to_string()),
            GeocodeError::HttpError { status } => Error::HttpError(format!("geocoder returned {status}")),
            GeocodeError::Parse(msg) => Error::GeocodeFailed(msg),
            GeocodeError::InvalidUrl(msg) => Error::InvalidUrl(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(GeocodeError::EmptyQuery.to_string().contains("empty"));
        assert!(GeocodeError::HttpError { status: 503 }.to_string().contains("503"));
    }

    #[test]
    fn test_into_core_error() {
        let err: smartnav_core::Error = GeocodeError::EmptyQuery.into();
        assert!(err.to_string().starts_with("INVALID_INPUT"));

        let err: smartnav_core::Error = GeocodeError::Parse("bad lat".into()).into();
        assert!(err.to_string().starts_with("GEOCODE_FAILED"));
    }
}
