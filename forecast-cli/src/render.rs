use chrono::NaiveDateTime;
use forecast_core::{CurrentConditions, ForecastSeries, ViewState};

/// Whole degrees, truncated toward zero: `-5.2` renders as `-5°C`.
pub fn temperature(celsius: f64) -> String {
    let whole = celsius.trunc() as i64;
    format!("{whole}°C")
}

/// `2024-01-01 12:00:00` → `Mon 12:00`. Unparsable input is returned as is.
pub fn sample_time(timestamp_text: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp_text, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%a %H:%M").to_string())
        .unwrap_or_else(|_| timestamp_text.to_string())
}

fn current_block(current: &CurrentConditions, country_code: &str) -> String {
    let mut out = String::new();

    if country_code.is_empty() {
        out.push_str(&current.location_label);
    } else {
        out.push_str(&format!("{}, {country_code}", current.location_label));
    }
    out.push('\n');

    out.push_str(&format!("  {}", temperature(current.temperature_c)));
    if !current.condition_description.is_empty() {
        out.push_str(&format!("  {}", current.condition_description));
    }
    out.push('\n');

    out.push_str(&format!(
        "  feels like {}  min {}  max {}\n",
        temperature(current.feels_like_c),
        temperature(current.min_temperature_c),
        temperature(current.max_temperature_c),
    ));
    out.push_str(&format!(
        "  humidity {}%  wind {:.1} m/s\n",
        current.humidity_percent, current.wind_speed_ms
    ));

    if let Some(at) = current.observed_at() {
        out.push_str(&format!("  observed {}\n", at.format("%Y-%m-%d %H:%M UTC")));
    }

    out
}

fn forecast_block(forecast: &ForecastSeries) -> String {
    let mut out = String::from("Forecast\n");
    for sample in &forecast.samples {
        out.push_str(&format!(
            "  {:<10} {:>6}  {}\n",
            sample_time(&sample.timestamp_text),
            temperature(sample.temperature_c),
            sample.condition_summary,
        ));
    }
    out
}

/// Human-readable rendering of a published state.
pub fn view_state(state: &ViewState) -> String {
    match state {
        ViewState::Loading => "Loading weather...\n".to_string(),
        ViewState::Success { current, forecast } => {
            format!(
                "{}\n{}",
                current_block(current, &forecast.country_code),
                forecast_block(forecast)
            )
        }
        ViewState::Error { message } => format!("{message}\n"),
    }
}
