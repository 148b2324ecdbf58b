pub mod controller;
pub mod gate;
#[cfg(feature = "http")]
pub mod openweather;
pub mod provider;
pub mod report;

pub use controller::WeatherController;
pub use gate::RateGate;
pub use provider::{
    Coordinates, GeoError, GeoLocator, OfflineProvider, UnsupportedGeolocation, WeatherError,
    WeatherProvider, WeatherQuery,
};
pub use report::WeatherReport;
