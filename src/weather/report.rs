use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::WeatherError;

const DEFAULT_ICON: &str = "🌤️";

/// Display icon for an OpenWeatherMap condition group.
pub fn condition_icon(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "🌨️",
        "Mist" | "Fog" | "Haze" => "🌫️",
        "Dust" | "Sand" | "Ash" | "Squall" => "💨",
        "Tornado" => "🌪️",
        _ => DEFAULT_ICON,
    }
}

#[derive(Deserialize)]
struct RawPayload {
    name: String,
    #[serde(default)]
    sys: RawSys,
    main: RawMain,
    weather: Vec<RawCondition>,
    wind: RawWind,
    #[serde(default)]
    visibility: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawSys {
    #[serde(default)]
    country: String,
}

#[derive(Deserialize)]
struct RawMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct RawCondition {
    main: String,
    description: String,
}

#[derive(Deserialize)]
struct RawWind {
    speed: f64,
}

/// Halves round toward positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Current conditions, already rounded for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    pub temperature: i32,
    pub feels_like: i32,
    pub condition: String,
    pub description: String,
    pub humidity: u32,
    /// Metres per second, one decimal.
    pub wind_speed: f64,
    /// Hectopascal.
    pub pressure: u32,
    /// Whole kilometres; `None` when the provider reports nothing (or zero).
    pub visibility_km: Option<u32>,
    pub icon: &'static str,
    pub summary: String,
    pub updated_at: String,
}

impl WeatherReport {
    pub fn from_json(body: &str, updated_at: NaiveTime) -> Result<Self, WeatherError> {
        let raw: RawPayload =
            serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
        let condition = raw
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Decode("no weather conditions".to_string()))?;

        let temperature = round_half_up(raw.main.temp) as i32;
        let feels_like = round_half_up(raw.main.feels_like) as i32;
        let humidity = round_half_up(raw.main.humidity).max(0.0) as u32;
        let visibility_km = raw
            .visibility
            .filter(|metres| *metres > 0.0)
            .map(|metres| round_half_up(metres / 1000.0) as u32);

        let summary = format!(
            "{}, {} • Feels like {}°C • Humidity {}%",
            raw.name, raw.sys.country, feels_like, humidity
        );

        Ok(Self {
            icon: condition_icon(&condition.main),
            city: raw.name,
            country: raw.sys.country,
            temperature,
            feels_like,
            condition: condition.main,
            description: condition.description,
            humidity,
            wind_speed: round_half_up(raw.wind.speed * 10.0) / 10.0,
            pressure: round_half_up(raw.main.pressure).max(0.0) as u32,
            visibility_km,
            summary,
            updated_at: updated_at.format("%H:%M:%S").to_string(),
        })
    }

    pub fn headline(&self) -> String {
        format!("{} {}°C {}", self.icon, self.temperature, self.condition)
    }
}
