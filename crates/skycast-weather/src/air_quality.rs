//! Air quality readings and their classification.
//!
//! OpenWeatherMap reports a 1-5 index. [`AqiCategory`] is the US EPA 0-500
//! scale, derived here from the PM2.5 concentration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pollutant concentrations in μg/m³
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pollutants {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

/// EPA PM2.5 breakpoints: (C_lo, C_hi, I_lo, I_hi), concentrations in μg/m³
const PM25_BREAKPOINTS: [(f64, f64, u16, u16); 7] = [
    (0.0, 12.0, 0, 50),
    (12.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 150.4, 151, 200),
    (150.5, 250.4, 201, 300),
    (250.5, 350.4, 301, 400),
    (350.5, 500.4, 401, 500),
];

const US_AQI_MAX: u16 = 500;

/// US AQI for a 24h PM2.5 concentration.
///
/// The concentration is truncated to one decimal before interpolation.
/// Readings beyond the table are capped at 500.
pub fn us_aqi_from_pm25(concentration: f64) -> u16 {
    if !concentration.is_finite() || concentration <= 0.0 {
        return 0;
    }
    let c = (concentration * 10.0).floor() / 10.0;

    PM25_BREAKPOINTS
        .iter()
        .find(|(_, c_hi, _, _)| c <= *c_hi)
        .map_or(US_AQI_MAX, |&(c_lo, c_hi, i_lo, i_hi)| {
            let slope = f64::from(i_hi - i_lo) / (c_hi - c_lo);
            let aqi = slope * (c - c_lo).max(0.0) + f64::from(i_lo);
            aqi.round() as u16
        })
}

impl Pollutants {
    /// `(label, value)` pairs in display order
    pub fn labeled(&self) -> [(&'static str, f64); 8] {
        [
            ("CO", self.co),
            ("NO", self.no),
            ("NO₂", self.no2),
            ("O₃", self.o3),
            ("SO₂", self.so2),
            ("PM2.5", self.pm2_5),
            ("PM10", self.pm10),
            ("NH₃", self.nh3),
        ]
    }
}

/// One air quality measurement or prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub timestamp: DateTime<Utc>,
    /// OpenWeatherMap index, 1 (good) to 5 (very poor)
    pub index: u8,
    pub components: Pollutants,
}

impl AirQualityReading {
    pub fn level(&self) -> AqiLevel {
        AqiLevel::from_index(self.index)
    }

    /// US AQI derived from PM2.5
    pub fn us_index(&self) -> u16 {
        us_aqi_from_pm25(self.components.pm2_5)
    }

    pub fn us_category(&self) -> AqiCategory {
        AqiCategory::from_us_index(self.us_index())
    }
}

/// OpenWeatherMap air quality level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Unknown,
}

impl AqiLevel {
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Good,
            2 => Self::Fair,
            3 => Self::Moderate,
            4 => Self::Poor,
            5 => Self::VeryPoor,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
            Self::Unknown => "Unknown",
        }
    }

    pub fn health_recommendation(&self) -> &'static str {
        match self {
            Self::Good => "Air quality is ideal for most outdoor activities.",
            Self::Fair => {
                "Unusually sensitive people should consider reducing prolonged outdoor activities."
            }
            Self::Moderate => "People with respiratory issues should limit outdoor activities.",
            Self::Poor => {
                "Everyone should reduce outdoor activities. Sensitive groups should stay indoors."
            }
            Self::VeryPoor => "Avoid outdoor activities. Keep windows closed.",
            Self::Unknown => "No recommendations available.",
        }
    }
}

/// US EPA AQI category (0-500 scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Values above 500 are still hazardous.
    pub fn from_us_index(aqi: u16) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    pub fn health_recommendation(&self) -> &'static str {
        match self {
            Self::Good => "Air quality is satisfactory. Enjoy your outdoor activities!",
            Self::Moderate => {
                "Air quality is acceptable. However, unusually sensitive people should \
                 consider reducing prolonged outdoor exertion."
            }
            Self::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects. \
                 The general public is less likely to be affected."
            }
            Self::Unhealthy => {
                "Everyone may begin to experience health effects. \
                 Members of sensitive groups may experience more serious health effects."
            }
            Self::VeryUnhealthy => {
                "Health alert: The risk of health effects is increased for everyone. \
                 Avoid outdoor activities."
            }
            Self::Hazardous => {
                "Health warning: everyone may experience serious health effects. \
                 Stay indoors and avoid physical activities."
            }
        }
    }
}

/// Keep every `step`-th reading, starting with the first.
///
/// Hourly history thinned with `step = 6` gives four points per day.
pub fn downsample(readings: &[AirQualityReading], step: usize) -> Vec<AirQualityReading> {
    readings.iter().step_by(step.max(1)).cloned().collect()
}

/// The first `hours` readings of an hourly forecast.
pub fn next_hours(readings: &[AirQualityReading], hours: usize) -> &[AirQualityReading] {
    &readings[..hours.min(readings.len())]
}
