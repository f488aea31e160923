use crate::model::ForecastSeries;

const MIDDAY: &str = "12:00:00";

/// Keep one sample per day: the one stamped at noon.
///
/// Order is preserved. A series with no noon samples (for example a window
/// that starts in the afternoon and is cut short) reduces to an empty series.
pub fn reduce_to_daily(series: &ForecastSeries) -> ForecastSeries {
    ForecastSeries {
        location_label: series.location_label.clone(),
        country_code: series.country_code.clone(),
        samples: series
            .samples
            .iter()
            .filter(|s| s.timestamp_text.contains(MIDDAY))
            .cloned()
            .collect(),
    }
}
