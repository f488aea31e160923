use crate::{
    Config,
    error::SourceError,
    model::{CurrentConditions, ForecastSeries, LocationQuery},
    source::openweather::OpenWeatherSource,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Remote lookups the orchestrator depends on.
///
/// The two calls are independent; implementations make no assumption about
/// their ordering and do not retry.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, query: &LocationQuery) -> Result<CurrentConditions, SourceError>;

    async fn fetch_forecast(&self, query: &LocationQuery) -> Result<ForecastSeries, SourceError>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherSource>> {
    let api_key = config.api_key()?;

    let source = OpenWeatherSource::builder(api_key.to_owned())
        .base_url(config.base_url())
        .timeout(config.timeout())
        .build()?;

    Ok(Arc::new(source))
}
