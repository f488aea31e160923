use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
    error::SourceError,
    model::{CurrentConditions, ForecastSample, ForecastSeries, LocationQuery},
};

use super::WeatherSource;

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherSourceBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenWeatherSourceBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> anyhow::Result<OpenWeatherSource> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(OpenWeatherSource {
            api_key: self.api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

impl OpenWeatherSource {
    pub fn builder(api_key: String) -> OpenWeatherSourceBuilder {
        OpenWeatherSourceBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    async fn get_json<T>(&self, endpoint: &str, query: &LocationQuery) -> Result<T, SourceError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{endpoint}", self.base_url);

        let mut params: Vec<(&str, String)> = match query {
            LocationQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            LocationQuery::CityName { name } => vec![("q", name.clone())],
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        tracing::debug!(%endpoint, %query, "requesting OpenWeather");

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwErrorBody>(&body)
                .ok()
                .and_then(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| truncate_body(&body));

            tracing::debug!(%endpoint, %status, %message, "OpenWeather request rejected");

            return Err(SourceError::Upstream { status: status.as_u16(), message });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (summary, description, icon) = match parsed.weather.into_iter().next() {
            Some(w) => (w.main, w.description, w.icon),
            None => Default::default(),
        };

        CurrentConditions {
            location_label: parsed.name,
            observed_at_epoch_seconds: parsed.dt,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            min_temperature_c: parsed.main.temp_min,
            max_temperature_c: parsed.main.temp_max,
            humidity_percent: parsed.main.humidity.min(100),
            wind_speed_ms: parsed.wind.speed,
            condition_summary: summary,
            condition_description: description,
            condition_icon_id: icon,
        }
    }
}

impl From<OwForecastResponse> for ForecastSeries {
    fn from(parsed: OwForecastResponse) -> Self {
        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let (summary, icon) = match entry.weather.into_iter().next() {
                    Some(w) => (w.main, w.icon),
                    None => Default::default(),
                };

                ForecastSample {
                    timestamp_text: entry.dt_txt,
                    epoch_seconds: entry.dt,
                    temperature_c: entry.main.temp,
                    condition_summary: summary,
                    condition_icon_id: icon,
                }
            })
            .collect();

        ForecastSeries {
            location_label: parsed.city.name,
            country_code: parsed.city.country,
            samples,
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn fetch_current(&self, query: &LocationQuery) -> Result<CurrentConditions, SourceError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query).await?;
        Ok(parsed.into())
    }

    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, SourceError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query).await?;
        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else if body.is_empty() {
        "empty response".to_string()
    } else {
        body.to_string()
    }
}
