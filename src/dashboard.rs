//! Concurrent fetch of every dashboard card, plus city comparison.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use skycast_core::AppError;
use skycast_prayer::{AladhanClient, PrayerTimes};
use skycast_weather::{
    bucket::round_half_up, AirQualityReading, CurrentWeather, Forecast, Location, WeatherProvider,
};

use crate::error_mapping::IntoAppError;

/// Span of the air quality trend
const AIR_HISTORY_DAYS: i64 = 5;

/// Everything shown on one refresh of the dashboard.
///
/// Each card carries its own result so a failing service only blanks its card.
#[derive(Debug)]
pub struct Snapshot {
    pub fetched_at: DateTime<Tz>,
    pub current: Result<CurrentWeather, AppError>,
    pub forecast: Result<Forecast, AppError>,
    pub air_quality: Result<AirQualityReading, AppError>,
    pub air_forecast: Result<Vec<AirQualityReading>, AppError>,
    /// `None` when prayer times are disabled
    pub prayer: Option<Result<PrayerTimes, AppError>>,
}

/// Weather and prayer times for one side of a comparison.
#[derive(Debug, Clone)]
pub struct CitySnapshot {
    pub name: String,
    pub weather: CurrentWeather,
    pub prayer: Option<PrayerTimes>,
}

impl CitySnapshot {
    /// Formatted day length, if sunrise and sunset were reported.
    pub fn day_length(&self) -> Option<String> {
        self.weather.sun.map(|sun| sun.format_day_length())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub left: String,
    pub right: String,
}

/// Side-by-side rows for the comparison table.
pub fn comparison_rows(left: &CurrentWeather, right: &CurrentWeather) -> Vec<ComparisonRow> {
    let celsius = |t: f64| format!("{}°C", round_half_up(t));
    let wind = |s: f64| format!("{:.1} m/s", s);

    vec![
        ComparisonRow {
            label: "Temperature",
            left: celsius(left.temperature),
            right: celsius(right.temperature),
        },
        ComparisonRow {
            label: "Feels Like",
            left: celsius(left.feels_like),
            right: celsius(right.feels_like),
        },
        ComparisonRow {
            label: "Humidity",
            left: format!("{}%", left.humidity),
            right: format!("{}%", right.humidity),
        },
        ComparisonRow {
            label: "Wind",
            left: wind(left.wind_speed),
            right: wind(right.wind_speed),
        },
    ]
}

pub struct Dashboard {
    weather: WeatherProvider,
    prayer: Option<AladhanClient>,
    location: Location,
    tz: Tz,
}

impl Dashboard {
    pub fn new(
        weather: WeatherProvider,
        prayer: Option<AladhanClient>,
        location: Location,
        tz: Tz,
    ) -> Self {
        Self {
            weather,
            prayer,
            location,
            tz,
        }
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }

    pub async fn current(&self) -> Result<CurrentWeather, AppError> {
        self.weather
            .current(&self.location)
            .await
            .map_err(|e| card_error("current weather", e))
    }

    pub async fn forecast(&self) -> Result<Forecast, AppError> {
        self.weather
            .forecast(&self.location, &self.tz)
            .await
            .map_err(|e| card_error("forecast", e))
    }

    pub async fn air_quality(&self) -> Result<AirQualityReading, AppError> {
        self.weather
            .air_pollution(&self.location)
            .await
            .map_err(|e| card_error("air quality", e))
    }

    pub async fn air_forecast(&self) -> Result<Vec<AirQualityReading>, AppError> {
        self.weather
            .air_pollution_forecast(&self.location)
            .await
            .map_err(|e| card_error("air quality forecast", e))
    }

    /// Hourly air quality over the last five days.
    pub async fn air_history(&self) -> Result<Vec<AirQualityReading>, AppError> {
        let end = Utc::now();
        let start = end - TimeDelta::days(AIR_HISTORY_DAYS);
        self.weather
            .air_pollution_history(&self.location, start, end)
            .await
            .map_err(|e| card_error("air quality history", e))
    }

    /// Fetch all cards concurrently.
    pub async fn snapshot(&self) -> Snapshot {
        let fetched_at = Utc::now().with_timezone(&self.tz);
        let today = fetched_at.date_naive();

        let (current, forecast, air_quality, air_forecast, prayer) = tokio::join!(
            self.current(),
            self.forecast(),
            self.air_quality(),
            self.air_forecast(),
            self.prayer_times(&self.location, today),
        );

        tracing::info!(
            "Dashboard refreshed for {} at {}",
            self.location.display_name(),
            fetched_at.format("%H:%M")
        );

        Snapshot {
            fetched_at,
            current,
            forecast,
            air_quality,
            air_forecast,
            prayer: prayer.map(|r| r.map_err(|e| card_error("prayer times", e))),
        }
    }

    /// Current weather and prayer times for another place.
    ///
    /// Prayer times are best effort; a failure is logged and left out.
    pub async fn city(&self, location: &Location) -> Result<CitySnapshot, AppError> {
        let today = Utc::now().with_timezone(&self.tz).date_naive();

        let (weather, prayer) = tokio::join!(
            self.weather.current(location),
            self.prayer_times(location, today),
        );

        let weather = weather.map_err(IntoAppError::into_app_error)?;
        let prayer = match prayer {
            Some(Ok(times)) => Some(times),
            Some(Err(e)) => {
                tracing::warn!(
                    "Prayer times for {} unavailable: {}",
                    location.display_name(),
                    e
                );
                None
            }
            None => None,
        };

        Ok(CitySnapshot {
            name: location
                .city_name
                .clone()
                .unwrap_or_else(|| weather.location_name.clone()),
            weather,
            prayer,
        })
    }

    /// The home location next to `other`.
    pub async fn compare(
        &self,
        other: &Location,
    ) -> Result<(CitySnapshot, CitySnapshot), AppError> {
        let (home, away) = tokio::join!(self.city(&self.location), self.city(other));
        Ok((home?, away?))
    }

    async fn prayer_times(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Option<Result<PrayerTimes, skycast_prayer::PrayerError>> {
        let client = self.prayer.as_ref()?;
        Some(
            client
                .timings_for(location.latitude, location.longitude, date)
                .await,
        )
    }
}

fn card_error<E: IntoAppError + std::fmt::Display>(card: &str, error: E) -> AppError {
    tracing::warn!("Failed to load {}: {}", card, error);
    error.into_app_error()
}
