//! Aladhan prayer times integration for Skycast.

pub mod client;
pub mod error;
pub mod types;

pub use client::AladhanClient;
pub use error::PrayerError;
pub use types::{CalculationMethod, DayTimings, PrayerTimes};
