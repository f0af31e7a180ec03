//! Wire models for the OpenWeatherMap 2.5 API.
//!
//! Forecast list entries are kept as raw JSON so a bad entry is reported by
//! the bucketizer with its index instead of failing the whole document.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::air_quality::{AirQualityReading, Pollutants};
use crate::types::{CurrentWeather, SunTimes, WeatherCondition, WeatherError};

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionBody {
    pub id: u16,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainBody {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WindBody {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SysBody {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// `/weather` response
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    pub name: String,
    pub dt: i64,
    pub main: MainBody,
    pub weather: Vec<ConditionBody>,
    pub wind: WindBody,
    pub sys: SysBody,
}

impl CurrentResponse {
    pub fn into_current(self) -> Result<CurrentWeather, WeatherError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("weather conditions list is empty".to_string()))?;

        let sun = match (self.sys.sunrise, self.sys.sunset) {
            (Some(rise), Some(set)) => Some(SunTimes {
                sunrise: timestamp(rise)?,
                sunset: timestamp(set)?,
            }),
            _ => None,
        };

        Ok(CurrentWeather {
            location_name: self.name,
            country: self.sys.country,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            condition: WeatherCondition::from_owm_code(condition.id),
            description: condition.description,
            icon: condition.icon,
            sun,
            observed_at: timestamp(self.dt)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityBody {
    pub name: String,
}

/// `/forecast` response
#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    pub list: Vec<Value>,
    pub city: CityBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AqiBody {
    pub aqi: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirPollutionEntry {
    pub dt: i64,
    pub main: AqiBody,
    pub components: Pollutants,
}

/// `/air_pollution`, `/air_pollution/forecast` and `/air_pollution/history` response
#[derive(Debug, Deserialize)]
pub(crate) struct AirPollutionResponse {
    pub list: Vec<AirPollutionEntry>,
}

impl AirPollutionResponse {
    pub fn into_readings(self) -> Result<Vec<AirQualityReading>, WeatherError> {
        self.list
            .into_iter()
            .map(|entry| {
                Ok(AirQualityReading {
                    timestamp: timestamp(entry.dt)?,
                    index: entry.main.aqi,
                    components: entry.components,
                })
            })
            .collect()
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| WeatherError::Parse(format!("timestamp out of range: {}", secs)))
}
