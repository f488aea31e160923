//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Shared domain models (queries, conditions, forecast series, view state)
//! - Abstraction over the weather source, with an OpenWeather implementation
//! - Daily reduction of the forecast series
//! - The orchestrator that publishes the view state
//! - Configuration & credentials handling
//!
//! It is used by `forecast-cli`, but can also be embedded in other front ends.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod reducer;
pub mod source;

pub use config::{Config, OpenWeatherConfig};
pub use error::{QueryError, SourceError};
pub use location::DeviceLocation;
pub use model::{CurrentConditions, ForecastSample, ForecastSeries, LocationQuery, ViewState};
pub use orchestrator::WeatherOrchestrator;
pub use reducer::reduce_to_daily;
pub use source::{WeatherSource, openweather::OpenWeatherSource, source_from_config};
