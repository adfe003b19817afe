//! Skycast CLI
//!
//! Command-line front end for weather lookups and city search.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use domain::{ErrorKind, Location, WeatherError};
use infrastructure::{LogFormat, TelemetryConfig, init_tracing};
use integration_weather::{CityLookup, Units, WeatherClient, WeatherConfig, WeatherService};
use serde::Serialize;
use tracing::debug;

/// Skycast CLI
#[derive(Parser)]
#[command(name = "skycast-cli")]
#[command(author, version, about = "Weather lookups from the command line", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (default: ./skycast.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Provider API key (overrides config and SKYCAST_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Measurement system
    #[arg(long, global = true, value_enum)]
    units: Option<UnitsArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current conditions, forecast and UV index
    ///
    /// Example: skycast-cli weather --city London
    /// Example: skycast-cli weather --lat 40.71 --lon -74.01 --daily
    Weather {
        /// City name
        #[arg(long, conflicts_with_all = ["lat", "lon"], required_unless_present = "lat")]
        city: Option<String>,

        /// Latitude in degrees
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print per-day summaries instead of three-hour steps
        #[arg(long)]
        daily: bool,
    },

    /// Search for cities by name
    ///
    /// Example: skycast-cli search "new york" --limit 3
    Search {
        /// Query text (at least two characters)
        query: String,

        /// Maximum results (clamped to 1-5)
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
    Standard,
}

impl From<UnitsArg> for Units {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Metric => Self::Metric,
            UnitsArg::Imperial => Self::Imperial,
            UnitsArg::Standard => Self::Standard,
        }
    }
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the lookup target from the weather arguments
fn location_from_args(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Location, WeatherError> {
    match (city, lat, lon) {
        (Some(city), None, None) => Location::city(city),
        (None, Some(lat), Some(lon)) => Location::coordinates(lat, lon),
        _ => Err(WeatherError::validation(
            "pass either --city or both --lat and --lon",
        )),
    }
}

/// Message shown to the user for each error kind
fn user_message(error: &WeatherError) -> &'static str {
    match (error.kind(), error.status()) {
        (ErrorKind::Validation, _) => "Invalid input. Check the city name or coordinates.",
        (ErrorKind::RateLimit, _) => "Too many requests. Wait a minute and try again.",
        (ErrorKind::Network, _) => "Could not reach the weather service. Try again later.",
        (ErrorKind::Provider, Some(404)) => "Location not found.",
        (ErrorKind::Provider, Some(401)) => "The weather service rejected the API key.",
        (ErrorKind::Provider, _) => "The weather service returned an error. Try again later.",
        (ErrorKind::DataShape, _) => "The weather service sent an unexpected response.",
    }
}

fn friendly(error: WeatherError) -> anyhow::Error {
    let message = user_message(&error);
    anyhow::Error::new(error).context(message)
}

fn load_config(cli: &Cli) -> anyhow::Result<WeatherConfig> {
    let mut config = WeatherConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(units) = cli.units {
        config.units = units.into();
    }
    config.validate().map_err(friendly)?;
    debug!(config = ?config, "Configuration loaded");
    Ok(config)
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Look up weather and render it as pretty JSON
async fn run_weather(
    service: &dyn WeatherService,
    location: &Location,
    daily: bool,
) -> anyhow::Result<String> {
    let weather = service
        .get_complete_weather_data(location)
        .await
        .map_err(friendly)?;
    if daily {
        to_json(&weather.daily())
    } else {
        to_json(&weather)
    }
}

/// Search cities and render the candidates as pretty JSON
async fn run_search(lookup: &dyn CityLookup, query: &str, limit: usize) -> anyhow::Result<String> {
    let results = lookup.search(query, limit).await.map_err(friendly)?;
    to_json(&results)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig {
        format: if cli.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Compact
        },
        ..TelemetryConfig::with_filter(log_filter_from_verbosity(cli.verbose))
    };
    init_tracing(&telemetry)?;

    let config = load_config(&cli)?;
    let client = WeatherClient::new(config).map_err(friendly)?;

    let output = match cli.command {
        Commands::Weather {
            city,
            lat,
            lon,
            daily,
        } => {
            let location = location_from_args(city, lat, lon).map_err(friendly)?;
            run_weather(&client, &location, daily).await?
        },

        Commands::Search { query, limit } => {
            run_search(&client.city_search(), &query, limit).await?
        },
    };
    println!("{output}");

    Ok(())
}
