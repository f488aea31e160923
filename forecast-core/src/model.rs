use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Where to look up weather for. Created per user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    CityName { name: String },
}

impl LocationQuery {
    /// Build a coordinate query, rejecting values outside the WGS84 ranges.
    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, QueryError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(QueryError::LatitudeOutOfRange(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(QueryError::LongitudeOutOfRange(lon));
        }

        Ok(Self::Coordinates { lat, lon })
    }

    /// Build a city query. The name is trimmed and must not be blank; upstream
    /// resolves it.
    pub fn city(name: &str) -> Result<Self, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyCityName);
        }

        Ok(Self::CityName { name: name.to_string() })
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates { lat, lon } => write!(f, "({lat:.4}, {lon:.4})"),
            LocationQuery::CityName { name } => f.write_str(name),
        }
    }
}

/// Conditions observed now at the queried place. Temperatures are metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_label: String,
    pub observed_at_epoch_seconds: i64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub humidity_percent: u8,
    pub wind_speed_ms: f64,
    pub condition_summary: String,
    pub condition_description: String,
    pub condition_icon_id: String,
}

impl CurrentConditions {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.observed_at_epoch_seconds, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// `yyyy-MM-dd HH:mm:ss` as sent upstream; not re-validated.
    pub timestamp_text: String,
    pub epoch_seconds: i64,
    pub temperature_c: f64,
    pub condition_summary: String,
    pub condition_icon_id: String,
}

/// Chronological forecast samples for one location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub location_label: String,
    pub country_code: String,
    pub samples: Vec<ForecastSample>,
}

impl ForecastSeries {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// The single snapshot presentation code renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Loading,
    Success {
        current: CurrentConditions,
        forecast: ForecastSeries,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}
