//! OpenWeatherMap "current weather" endpoint over a blocking `ureq` agent.

use std::time::Duration;

use async_trait::async_trait;

use super::{WeatherError, WeatherProvider, WeatherQuery};

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenWeatherProvider {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(&format!("tiltclock/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `None` when no (non-blank) key is configured.
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key.trim()))
    }

    fn build_request(&self, query: &WeatherQuery) -> ureq::Request {
        let request = self.agent.get(&self.base_url);
        let request = match query {
            WeatherQuery::City(name) => request.query("q", name),
            WeatherQuery::Coordinates(coords) => request
                .query("lat", &coords.latitude.to_string())
                .query("lon", &coords.longitude.to_string()),
        };
        request
            .query("appid", &self.api_key)
            .query("units", "metric")
            .set("Accept", "application/json")
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, query: &WeatherQuery) -> Result<String, WeatherError> {
        let request = self.build_request(query);

        tokio::task::spawn_blocking(move || match request.call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| WeatherError::Transport(e.to_string())),
            Err(ureq::Error::Status(code, _)) => Err(WeatherError::from_status(code)),
            Err(ureq::Error::Transport(e)) => Err(WeatherError::Transport(e.to_string())),
        })
        .await
        .map_err(|e| WeatherError::Transport(e.to_string()))?
    }
}
