use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{Config, DeviceLocation, ViewState, WeatherOrchestrator, source_from_config};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather and a daily forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and the default city.
    Configure,

    /// Show current weather and the daily forecast.
    ///
    /// Without `--city` or coordinates the configured default city is used.
    Show {
        /// City name, resolved by the weather service.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        /// Latitude in degrees, [-90, 90].
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees, [-180, 180].
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the published state as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon, json } => show(city, lat.zip(lon), json).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let current_city = config.default_city().to_string();
    let city = inquire::Text::new("Default city:")
        .with_default(&current_city)
        .with_help_message("Used when no location is given")
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.trim().to_string());
    config.set_default_city(city.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    city: Option<String>,
    coordinates: Option<(f64, f64)>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(
        base_url = config.base_url(),
        default_city = config.default_city(),
        "configuration loaded"
    );
    let source = source_from_config(&config)?;

    let orchestrator = WeatherOrchestrator::new(source);
    let mut transitions = orchestrator.transitions();

    let task = match (city, coordinates) {
        (Some(city), _) => orchestrator.request_by_city(&city),
        (None, Some((lat, lon))) => orchestrator.request_by_location(lat, lon),
        // A terminal has no position of its own.
        (None, None) => {
            orchestrator.request_for_device(DeviceLocation::NoLastKnownFix, config.default_city())
        }
    };

    if let Some(state) = transitions.recv().await {
        if !json {
            eprint!("{}", render::view_state(&state));
        }
    }

    task.await.context("Weather request task failed")?;
    let state = orchestrator.state();

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    match state {
        ViewState::Error { message } => anyhow::bail!(message),
        state if !json => print!("{}", render::view_state(&state)),
        _ => {}
    }

    Ok(())
}
