use thiserror::Error;

/// Failures of a single remote lookup.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream unreachable, connection dropped or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status, e.g. an unknown city.
    #[error("{message} (status {status})")]
    Upstream { status: u16, message: String },

    /// Payload did not match the expected shape.
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// Rejected before any lookup is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("city name is empty")]
    EmptyCityName,
}
