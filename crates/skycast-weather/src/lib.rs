//! Weather service for Skycast
//!
//! Fetches current conditions, forecasts and air quality from
//! OpenWeatherMap and shapes them for display. The forecast is grouped into
//! weekday buckets by [`bucket::bucketize`].

pub mod air_quality;
pub mod bucket;
pub mod cities;
mod openweather;
pub mod provider;
pub mod types;

pub use air_quality::{AirQualityReading, AqiCategory, AqiLevel, Pollutants};
pub use bucket::{
    bucketize, bucketize_entries, DayBucket, ForecastSample, HourlyEntry, MalformedSampleError,
};
pub use cities::{City, CityDirectory};
pub use provider::WeatherProvider;
pub use types::*;
