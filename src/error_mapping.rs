//! Maps client errors to skycast_core::AppError for consistent user-facing messages.

use skycast_core::{
    AppError, ConfigError, NetworkError, PrayerError, ReqwestErrorExt, WeatherError,
};

/// Conversion from a client crate's error into the application error.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for skycast_weather::WeatherError {
    fn into_app_error(self) -> AppError {
        use skycast_weather::WeatherError as Owm;

        match self {
            Owm::Network(e) => AppError::Network(e.into_network_error()),
            Owm::InvalidApiKey => AppError::Weather(WeatherError::InvalidApiKey),
            Owm::LocationNotFound(place) => {
                AppError::Weather(WeatherError::LocationNotFound(place))
            }
            Owm::Api { status, .. } if status >= 500 => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            Owm::Api { status, message } => {
                AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
            }
            Owm::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            Owm::MalformedSample(e) => {
                AppError::Weather(WeatherError::MalformedForecast(e.to_string()))
            }
            Owm::CityDataUnreadable { path, source } => {
                tracing::warn!("Cannot read city data {}: {}", path.display(), source);
                AppError::Io(source)
            }
            Owm::CityData(s) => AppError::Config(ConfigError::ParseError(s)),
        }
    }
}

impl IntoAppError for skycast_prayer::PrayerError {
    fn into_app_error(self) -> AppError {
        use skycast_prayer::PrayerError as Aladhan;

        match self {
            Aladhan::NetworkError(e) => AppError::Network(e.into_network_error()),
            Aladhan::ApiError { status, .. } if status >= 500 => {
                AppError::Prayer(PrayerError::ServiceUnavailable)
            }
            Aladhan::ApiError { status, message } => {
                AppError::Prayer(PrayerError::ApiError(format!("{}: {}", status, message)))
            }
            Aladhan::InvalidResponse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            Aladhan::DayOutOfRange { day, .. } => {
                AppError::Prayer(PrayerError::DayOutOfRange(day))
            }
        }
    }
}
