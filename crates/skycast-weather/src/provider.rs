//! OpenWeatherMap client.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::air_quality::AirQualityReading;
use crate::bucket::bucketize_entries;
use crate::openweather::{AirPollutionResponse, CurrentResponse, ErrorBody, ForecastResponse};
use crate::types::{ApiKey, CurrentWeather, Forecast, Location, WeatherError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_key: ApiKey,
    base_url: String,
}

impl WeatherProvider {
    /// `base_url` is the 2.5 API root, e.g. `https://api.openweathermap.org/data/2.5`.
    pub fn with_base_url(api_key: ApiKey, base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions at a location.
    #[instrument(skip(self), level = "info")]
    pub async fn current(&self, location: &Location) -> Result<CurrentWeather, WeatherError> {
        let body: CurrentResponse = self.get("weather", location, &[("units", "metric")]).await?;
        body.into_current()
    }

    /// Five-day forecast grouped into weekday buckets, labelled in `tz`.
    #[instrument(skip(self, tz), level = "info")]
    pub async fn forecast<Tz>(&self, location: &Location, tz: &Tz) -> Result<Forecast, WeatherError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let body: ForecastResponse = self.get("forecast", location, &[("units", "metric")]).await?;
        let days = bucketize_entries(&body.list, tz)?;

        tracing::info!(
            "Forecast for {}: {} samples in {} days",
            body.city.name,
            body.list.len(),
            days.len()
        );

        Ok(Forecast {
            city_name: body.city.name,
            days,
        })
    }

    /// Latest air quality reading.
    #[instrument(skip(self), level = "info")]
    pub async fn air_pollution(
        &self,
        location: &Location,
    ) -> Result<AirQualityReading, WeatherError> {
        let body: AirPollutionResponse = self.get("air_pollution", location, &[]).await?;
        body.into_readings()?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("air pollution list is empty".to_string()))
    }

    /// Hourly air quality forecast.
    #[instrument(skip(self), level = "info")]
    pub async fn air_pollution_forecast(
        &self,
        location: &Location,
    ) -> Result<Vec<AirQualityReading>, WeatherError> {
        let body: AirPollutionResponse = self.get("air_pollution/forecast", location, &[]).await?;
        body.into_readings()
    }

    /// Hourly air quality history between `start` and `end`.
    #[instrument(skip(self), level = "info")]
    pub async fn air_pollution_history(
        &self,
        location: &Location,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AirQualityReading>, WeatherError> {
        let start = start.timestamp().to_string();
        let end = end.timestamp().to_string();
        let body: AirPollutionResponse = self
            .get(
                "air_pollution/history",
                location,
                &[("start", start.as_str()), ("end", end.as_str())],
            )
            .await?;
        body.into_readings()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        location: &Location,
        extra: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str())])
            .query(extra)
            .query(&[("appid", self.api_key.expose())])
            .send()
            .await?;

        self.handle_response(response, location).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        location: &Location,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            return serde_json::from_str(&text).map_err(|e| WeatherError::Parse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        tracing::warn!("OpenWeatherMap returned {}: {}", status, message);

        match status {
            StatusCode::UNAUTHORIZED => Err(WeatherError::InvalidApiKey),
            StatusCode::NOT_FOUND => Err(WeatherError::LocationNotFound(location.display_name())),
            _ => Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }
}
