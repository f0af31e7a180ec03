//! Skycast CLI
//!
//! Usage:
//!   skycast current                  # Current weather at the configured location
//!   skycast forecast [--json]        # Five-day forecast grouped by weekday
//!   skycast air [--history]          # Air quality now and over the next 24 hours
//!   skycast compare <city>           # Compare home with a preset or searched city
//!   skycast dashboard [--watch]      # All cards, optionally refreshing

mod dashboard;
mod error_mapping;
mod render;

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use skycast_core::{AppError, Config, ConfigError};
use skycast_prayer::{AladhanClient, CalculationMethod};
use skycast_weather::{ApiKey, CityDirectory, Location, WeatherProvider};
use std::time::Duration;

use crate::dashboard::Dashboard;
use crate::error_mapping::IntoAppError;

/// Skycast - weather, air quality and prayer times in the terminal
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Current(CurrentArgs),
    Forecast(ForecastArgs),
    Air(AirArgs),
    Compare(CompareArgs),
    Dashboard(DashboardArgs),
}

/// Show current conditions
#[derive(FromArgs)]
#[argh(subcommand, name = "current")]
struct CurrentArgs {}

/// Show the forecast grouped by day
#[derive(FromArgs)]
#[argh(subcommand, name = "forecast")]
struct ForecastArgs {
    /// output the day buckets as JSON
    #[argh(switch)]
    json: bool,
}

/// Show air quality and the 24 hour outlook
#[derive(FromArgs)]
#[argh(subcommand, name = "air")]
struct AirArgs {
    /// show the last five days on the US AQI scale
    #[argh(switch)]
    history: bool,
}

/// Compare the home location with another city
#[derive(FromArgs)]
#[argh(subcommand, name = "compare")]
struct CompareArgs {
    /// preset key or name, or a city name to search for
    #[argh(positional)]
    city: String,
}

/// Show every card
#[derive(FromArgs)]
#[argh(subcommand, name = "dashboard")]
struct DashboardArgs {
    /// keep refreshing every `refresh_minutes`
    #[argh(switch, short = 'w')]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    skycast_core::init()?;

    let (config, _) = Config::load_validated()?;

    let dashboard = build_dashboard(&config)?;
    let tz = dashboard.time_zone();
    let mut out = String::new();

    match args.command {
        Command::Current(_) => {
            let weather = dashboard
                .current()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            render::current(&mut out, &weather, &tz)?;
        }
        Command::Forecast(ForecastArgs { json }) => {
            let forecast = dashboard
                .forecast()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                render::forecast(&mut out, &forecast)?;
            }
        }
        Command::Air(AirArgs { history: true }) => {
            let history = dashboard
                .air_history()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            render::air_history(&mut out, &history, &tz)?;
        }
        Command::Air(AirArgs { history: false }) => {
            let (reading, outlook) =
                tokio::join!(dashboard.air_quality(), dashboard.air_forecast());
            let reading = reading.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            let outlook = outlook.unwrap_or_default();
            render::air(&mut out, &reading, &outlook, &tz)?;
        }
        Command::Compare(CompareArgs { city }) => {
            let other = resolve_city(&config, &city)?;
            let (home, away) = dashboard
                .compare(&other)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            render::comparison(&mut out, &home, &away)?;
        }
        Command::Dashboard(DashboardArgs { watch }) => {
            if watch {
                watch_dashboard(&dashboard, config.weather.refresh_minutes).await?;
            } else {
                render::snapshot(&mut out, &dashboard.snapshot().await, &tz)?;
            }
        }
    }

    print!("{}", out);
    Ok(())
}

fn build_dashboard(config: &Config) -> Result<Dashboard, AppError> {
    let Some(api_key) = config.weather.api_key() else {
        tracing::error!("No OpenWeatherMap API key configured (set SKYCAST__WEATHER__API_KEY)");
        return Err(ConfigError::MissingSetting("weather.api_key".into()).into());
    };
    let tz = config.weather.time_zone()?;

    let weather = WeatherProvider::with_base_url(ApiKey::new(api_key), &config.weather.base_url)
        .map_err(IntoAppError::into_app_error)?;

    let prayer = if config.prayer.enabled {
        let client = AladhanClient::with_base_url(
            &config.prayer.base_url,
            CalculationMethod(config.prayer.method),
        )
        .map_err(IntoAppError::into_app_error)?;
        Some(client)
    } else {
        None
    };

    let home = &config.location;
    let location = match &home.name {
        Some(name) => Location::named(home.latitude, home.longitude, name.clone()),
        None => Location::new(home.latitude, home.longitude),
    };

    tracing::info!("Skycast started for {}", location.display_name());
    Ok(Dashboard::new(weather, prayer, location, tz))
}

/// A preset first, then the city directory if one is configured.
fn resolve_city(config: &Config, query: &str) -> Result<Location> {
    if let Some(preset) = config.comparison.preset(query) {
        return Ok(Location::named(
            preset.latitude,
            preset.longitude,
            preset.name.clone(),
        ));
    }

    let Some(path) = &config.comparison.city_data_path else {
        bail!("'{}' is not a preset city and no city directory is configured", query);
    };

    let directory = CityDirectory::load(path)
        .map_err(IntoAppError::into_app_error)
        .with_context(|| format!("Failed to load city directory {}", path.display()))?;
    if directory.is_empty() {
        bail!("City directory {} has no entries", path.display());
    }
    let matches = directory.search(query);

    match matches.as_slice() {
        [] => bail!("No city matching '{}'", query),
        [city, rest @ ..] => {
            if !rest.is_empty() {
                let others: Vec<String> = rest
                    .iter()
                    .map(|c| format!("{}, {}", c.name, c.country))
                    .collect();
                tracing::info!("Also matched: {}", others.join("; "));
            }
            Ok(city.location())
        }
    }
}

async fn watch_dashboard(dashboard: &Dashboard, refresh_minutes: u32) -> Result<()> {
    let period = Duration::from_secs(u64::from(refresh_minutes.max(1)) * 60);
    let mut interval = tokio::time::interval(period);
    let tz = dashboard.time_zone();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut out = String::new();
                render::snapshot(&mut out, &dashboard.snapshot().await, &tz)?;
                print!("\x1B[2J\x1B[H{}", out);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping dashboard");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let mut config = Config::default();
        config.weather.api_key = Some("YOUR_API_KEY".into());

        let err = build_dashboard(&config).err().unwrap();

        assert!(matches!(
            err,
            AppError::Config(ConfigError::MissingSetting(ref key)) if key == "weather.api_key"
        ));
    }

    #[test]
    fn test_unknown_time_zone_is_a_config_error() {
        let mut config = Config::default();
        config.weather.api_key = Some("k".into());
        config.weather.timezone = "Mars/Olympus".into();

        let err = build_dashboard(&config).err().unwrap();

        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unreadable_city_directory_reports_file_error() {
        let mut config = Config::default();
        config.comparison.city_data_path = Some("/nonexistent/skycast/cities.json".into());

        let err = resolve_city(&config, "Chittagong").unwrap_err();

        assert!(err.to_string().contains("Failed to load city directory"));
        let app = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(app, AppError::Io(_)));
    }

    #[test]
    fn test_empty_city_directory_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "cities": [] }}"#).unwrap();

        let mut config = Config::default();
        config.comparison.city_data_path = Some(file.path().to_path_buf());

        let err = resolve_city(&config, "Chittagong").unwrap_err();
        assert!(err.to_string().contains("has no entries"));
    }
}
