use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::error::{WidgetError, WidgetResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

impl WeatherQuery {
    /// Builds a city query from user input.
    pub fn city(name: &str) -> WidgetResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WidgetError::validation("Please enter a city name"));
        }
        Ok(WeatherQuery::City(name.to_string()))
    }
}

/// Why the platform could not produce a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Location access denied. Please enable location permissions.")]
    PermissionDenied,
    #[error("Location information unavailable.")]
    PositionUnavailable,
    #[error("Location request timed out.")]
    Timeout,
    #[error("Geolocation is not supported on this device")]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Invalid API key")]
    Unauthorized,
    #[error("City not found")]
    CityNotFound,
    #[error("Rate limit exceeded")]
    UpstreamRateLimited,
    #[error("Error: {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Unexpected weather data: {0}")]
    Decode(String),
    #[error(transparent)]
    Location(#[from] GeoError),
    #[error(transparent)]
    Rejected(#[from] WidgetError),
}

impl WeatherError {
    /// Maps a non-success HTTP status from the weather endpoint.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => WeatherError::Unauthorized,
            404 => WeatherError::CityNotFound,
            429 => WeatherError::UpstreamRateLimited,
            other => WeatherError::Status(other),
        }
    }
}

/// The weather endpoint. Returns the raw JSON body of a successful response.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, query: &WeatherQuery) -> Result<String, WeatherError>;
}

#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, GeoError>;
}

/// Used when no endpoint is configured; every lookup fails with a transport error.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl WeatherProvider for OfflineProvider {
    async fn fetch(&self, _query: &WeatherQuery) -> Result<String, WeatherError> {
        Err(WeatherError::Transport(
            "no weather provider configured".to_string(),
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedGeolocation;

#[async_trait]
impl GeoLocator for UnsupportedGeolocation {
    async fn locate(&self) -> Result<Coordinates, GeoError> {
        Err(GeoError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_names_are_trimmed() {
        assert_eq!(
            WeatherQuery::city("  Kolkata ").unwrap(),
            WeatherQuery::City("Kolkata".into())
        );
    }

    #[test]
    fn blank_city_is_rejected() {
        assert_eq!(
            WeatherQuery::city("   "),
            Err(WidgetError::validation("Please enter a city name"))
        );
    }

    #[test]
    fn status_codes_map_to_messages() {
        assert_eq!(WeatherError::from_status(401).to_string(), "Invalid API key");
        assert_eq!(WeatherError::from_status(404).to_string(), "City not found");
        assert_eq!(WeatherError::from_status(429).to_string(), "Rate limit exceeded");
        assert_eq!(WeatherError::from_status(503).to_string(), "Error: 503");
    }

    #[test]
    fn rejections_keep_their_message() {
        let err: WeatherError = WidgetError::RateLimited { cooldown_secs: 10 }.into();
        assert_eq!(
            err.to_string(),
            "Please wait 10 seconds before fetching weather again"
        );
        let err: WeatherError = GeoError::Timeout.into();
        assert_eq!(err.to_string(), "Location request timed out.");
    }

    #[tokio::test]
    async fn headless_collaborators_fail() {
        let query = WeatherQuery::city("Durgapur").unwrap();
        assert!(matches!(
            OfflineProvider.fetch(&query).await,
            Err(WeatherError::Transport(_))
        ));
        assert_eq!(
            UnsupportedGeolocation.locate().await,
            Err(GeoError::Unsupported)
        );
    }
}
