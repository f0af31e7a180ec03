use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `SKYCAST__WEATHER__API_KEY`.
const ENV_PREFIX: &str = "SKYCAST";
const ENV_SEPARATOR: &str = "__";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap settings
    pub weather: WeatherConfig,

    /// Location used when no other city is requested
    pub location: LocationConfig,

    /// Aladhan prayer times settings
    pub prayer: PrayerConfig,

    /// City comparison settings
    pub comparison: ComparisonConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Prefer setting it through `SKYCAST__WEATHER__API_KEY`.
    pub api_key: Option<String>,

    /// Base URL of the OpenWeatherMap 2.5 API
    pub base_url: String,

    /// IANA time zone used for day and hour labels
    pub timezone: String,

    /// Refresh interval in minutes
    pub refresh_minutes: u32,
}

impl WeatherConfig {
    /// The configured API key, ignoring blanks and placeholders.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.starts_with("YOUR_"))
    }

    /// Parse the configured time zone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when the name is not a known IANA zone.
    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown time zone '{}'", self.timezone)))
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timezone", &self.timezone)
            .field("refresh_minutes", &self.refresh_minutes)
            .finish()
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            timezone: "Asia/Dhaka".to_string(),
            refresh_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Display name; the weather API's place name is used when unset
    pub name: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: 22.3569,
            longitude: 91.7832,
            name: Some("Chittagong".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerConfig {
    /// Fetch prayer times alongside the weather
    pub enabled: bool,

    /// Base URL of the Aladhan API
    pub base_url: String,

    /// Aladhan calculation method id (2 = ISNA)
    pub method: u8,
}

impl Default for PrayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.aladhan.com/v1".to_string(),
            method: 2,
        }
    }
}

/// A city offered as a one-click comparison target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetCity {
    pub key: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PresetCity {
    fn new(key: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Quick-compare presets
    pub cities: Vec<PresetCity>,

    /// Optional JSON city directory used for searching by name
    pub city_data_path: Option<PathBuf>,
}

impl ComparisonConfig {
    /// Find a preset by key or name, case-insensitively.
    pub fn preset(&self, name: &str) -> Option<&PresetCity> {
        self.cities
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(name) || c.name.eq_ignore_ascii_case(name))
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            cities: vec![
                PresetCity::new("dhaka", "Dhaka", 23.777176, 90.399452),
                PresetCity::new("newYork", "New York", 40.7128, -74.0060),
                PresetCity::new("london", "London", 51.5074, -0.1278),
            ],
            city_data_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file, with environment overrides applied on top.
    ///
    /// A missing file is treated as empty so environment-only setups work.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR),
            )
            .build()
            .context("Failed to read config file")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.api_key().is_none() {
            result.add_error(
                "weather.api_key",
                "OpenWeatherMap API key is not set (use SKYCAST__WEATHER__API_KEY)",
            );
        }

        if let Err(e) = self.weather.time_zone() {
            result.add_error("weather.timezone", e.to_string());
        }

        if self.weather.refresh_minutes == 0 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh disabled (0 minutes)",
            );
        } else if self.weather.refresh_minutes > 1440 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh interval is more than 24 hours",
            );
        }

        validate_coordinates(
            self.location.latitude,
            self.location.longitude,
            "location",
            &mut result,
        );

        if self.prayer.enabled {
            self.validate_url(&self.prayer.base_url, "prayer.base_url", &mut result);
            if self.prayer.method > 23 && self.prayer.method != 99 {
                result.add_error(
                    "prayer.method",
                    format!("Unknown calculation method: {}", self.prayer.method),
                );
            }
        }

        for (i, city) in self.comparison.cities.iter().enumerate() {
            validate_coordinates(
                city.latitude,
                city.longitude,
                &format!("comparison.cities[{}]", i),
                &mut result,
            );
        }

        if let Some(path) = &self.comparison.city_data_path {
            if !path.is_file() {
                result.add_warning(
                    "comparison.city_data_path",
                    format!("File does not exist: {}", path.display()),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_coordinates(latitude: f64, longitude: f64, field: &str, result: &mut ValidationResult) {
    if !(-90.0..=90.0).contains(&latitude) {
        result.add_error(
            format!("{}.latitude", field),
            format!("Latitude must be between -90 and 90, got {}", latitude),
        );
    }
    if !(-180.0..=180.0).contains(&longitude) {
        result.add_error(
            format!("{}.longitude", field),
            format!("Longitude must be between -180 and 180, got {}", longitude),
        );
    }
}
