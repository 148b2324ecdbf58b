#[cfg(feature = "chime")]
mod audio;
pub mod clock;
pub mod commands;
pub mod error;
pub mod format;
pub mod orientation;
pub mod platform;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod stopwatch;
pub mod timer;
pub mod utils;
pub mod weather;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use clock::{ClockController, SystemClock, WallClock};
use commands::{dispatch, Command};
use orientation::{Engines, OrientationRouter, RawOrientation};
use platform::{HeadlessNotifier, Notifier};
use render::{JsonLineSink, RenderEvent, RenderSink};
use settings::{Settings, SettingsStore};
use stopwatch::StopwatchController;
use timer::TimerController;
use utils::logging::default_level_filter;
use weather::{GeoLocator, UnsupportedGeolocation, WeatherController, WeatherProvider};

/// Every engine plus the router that switches between them.
pub struct AppState {
    pub clock: ClockController,
    pub stopwatch: StopwatchController,
    pub timer: TimerController,
    pub weather: WeatherController,
    pub router: OrientationRouter,
}

impl AppState {
    pub fn build(
        settings: &Settings,
        sink: Arc<dyn RenderSink>,
        notifier: Arc<dyn Notifier>,
        wall: Arc<dyn WallClock>,
        provider: Arc<dyn WeatherProvider>,
        locator: Arc<dyn GeoLocator>,
    ) -> Self {
        let clock = ClockController::new(wall, sink.clone(), notifier.clone(), settings);
        let stopwatch = StopwatchController::new(sink.clone());
        let timer = TimerController::new(sink.clone(), notifier);
        let weather = WeatherController::new(provider, locator, sink.clone(), settings);

        let engines = Engines {
            alarm: Arc::new(clock.clone()),
            stopwatch: Arc::new(stopwatch.clone()),
            timer: Arc::new(timer.clone()),
            weather: Arc::new(weather.clone()),
        };
        let router = OrientationRouter::new(engines, sink, settings);

        Self {
            clock,
            stopwatch,
            timer,
            weather,
            router,
        }
    }
}

#[cfg(feature = "http")]
fn weather_provider() -> Arc<dyn WeatherProvider> {
    match weather::openweather::OpenWeatherProvider::from_env() {
        Some(provider) => {
            log::info!("weather lookups go to OpenWeatherMap");
            Arc::new(provider)
        }
        None => {
            log::warn!(
                "{} is not set; weather lookups will fail",
                weather::openweather::API_KEY_VAR
            );
            Arc::new(weather::OfflineProvider)
        }
    }
}

#[cfg(not(feature = "http"))]
fn weather_provider() -> Arc<dyn WeatherProvider> {
    log::info!("built without the http feature; weather lookups will fail");
    Arc::new(weather::OfflineProvider)
}

/// Initial orientation from `TILTCLOCK_ORIENTATION` (a screen-orientation type), if set.
fn initial_orientation() -> RawOrientation {
    RawOrientation::probe(std::env::var("TILTCLOCK_ORIENTATION").ok(), None, None)
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let sink: Arc<dyn RenderSink> = Arc::new(JsonLineSink::new());
    let state = AppState::build(
        &settings,
        sink.clone(),
        Arc::new(HeadlessNotifier::new()),
        Arc::new(SystemClock),
        weather_provider(),
        Arc::new(UnsupportedGeolocation),
    );

    state.clock.start_ticking().await;
    let view = state.router.apply(&initial_orientation()).await;
    log::info!("showing {}", view.label());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                sink.emit(RenderEvent::Status {
                    text: err.status_message(),
                });
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        let text = match dispatch(&state, command).await {
            Ok(text) => text,
            Err(message) => {
                log::warn!("command rejected: {message}");
                message
            }
        };
        sink.emit(RenderEvent::Status { text });
    }

    state.clock.stop_ticking().await;
    state.stopwatch.stop().await;
    state.timer.reset().await;
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(default_level_filter())
        .init();

    log::info!("tiltclock starting up...");

    let store = SettingsStore::new(SettingsStore::default_path())
        .context("Failed to load settings")?;
    log::info!("settings from {}", store.path().display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    runtime.block_on(serve(store.settings()))?;

    log::info!("tiltclock shutting down");
    Ok(())
}
