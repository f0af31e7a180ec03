//! Aladhan prayer times API client.

use chrono::{Datelike, NaiveDate};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

use crate::error::PrayerError;
use crate::types::{CalculationMethod, CalendarResponse, DayTimings, ErrorResponse, PrayerTimes};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AladhanClient {
    client: reqwest::Client,
    base_url: String,
    method: CalculationMethod,
}

impl AladhanClient {
    /// `base_url` is the v1 API root, e.g. `https://api.aladhan.com/v1`.
    pub fn with_base_url(base_url: &str, method: CalculationMethod) -> Result<Self, PrayerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            method,
        })
    }

    /// Every day of a Gregorian month, in calendar order.
    #[instrument(skip(self), level = "info")]
    pub async fn monthly_calendar(
        &self,
        latitude: f64,
        longitude: f64,
        year: i32,
        month: u32,
    ) -> Result<Vec<DayTimings>, PrayerError> {
        let url = format!("{}/calendar/{}/{}", self.base_url, year, month);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("method", self.method.0.to_string()),
            ])
            .send()
            .await?;

        let calendar: CalendarResponse = self.handle_response(response).await?;
        let days = calendar
            .data
            .into_iter()
            .map(|day| day.into_day())
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Fetched {} days of prayer times for {}-{:02}",
            days.len(),
            year,
            month
        );
        Ok(days)
    }

    /// Timings for a single date, taken from that month's calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn timings_for(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<PrayerTimes, PrayerError> {
        let days = self
            .monthly_calendar(latitude, longitude, date.year(), date.month())
            .await?;

        let day = date.day();
        let available = days.len();
        days.into_iter()
            .nth(day as usize - 1)
            .map(|d| d.times)
            .ok_or(PrayerError::DayOutOfRange { day, available })
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, PrayerError> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            return serde_json::from_str(&text)
                .map_err(|e| PrayerError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message())
            .unwrap_or(body);

        tracing::warn!("Aladhan returned {}: {}", status, message);

        Err(PrayerError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}
