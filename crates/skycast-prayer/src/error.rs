//! Prayer-times error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrayerError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No timings for day {day} (calendar has {available} days)")]
    DayOutOfRange { day: u32, available: usize },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
