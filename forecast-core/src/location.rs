//! Choosing a query when the device position may be unavailable.

use crate::{error::QueryError, model::LocationQuery};

/// What the platform reported when asked for the device position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceLocation {
    Fix { lat: f64, lon: f64 },
    PermissionDenied,
    NoLastKnownFix,
}

/// The query to issue for a device location report.
///
/// A usable fix becomes a coordinate query. A denied permission, a missing
/// fix, or a fix outside valid coordinate ranges falls back to `default_city`,
/// which must itself be a valid city name.
pub fn query_for(
    device: DeviceLocation,
    default_city: &str,
) -> Result<LocationQuery, QueryError> {
    if let DeviceLocation::Fix { lat, lon } = device {
        match LocationQuery::coordinates(lat, lon) {
            Ok(query) => return Ok(query),
            Err(err) => tracing::warn!(%err, "ignoring invalid device fix"),
        }
    }

    LocationQuery::city(default_city)
}
