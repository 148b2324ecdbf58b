use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Local;
use tokio::{sync::Mutex, time::Instant};

use crate::{
    orientation::ToolEngine,
    render::{RenderEvent, RenderSink},
    schedule::DelayedTask,
    settings::Settings,
};

use super::{
    Coordinates, GeoLocator, RateGate, WeatherError, WeatherProvider, WeatherQuery, WeatherReport,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const LOCATION_FAILURE: &str = "Failed to fetch weather for your location";

struct WeatherInner {
    gate: RateGate,
    cached: Option<WeatherReport>,
    fallback: Option<DelayedTask>,
}

/// Weather lookups behind the rate gate, plus the cached last report.
#[derive(Clone)]
pub struct WeatherController {
    inner: Arc<Mutex<WeatherInner>>,
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn GeoLocator>,
    sink: Arc<dyn RenderSink>,
    default_city: String,
    fallback_delay: Duration,
}

impl WeatherController {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        locator: Arc<dyn GeoLocator>,
        sink: Arc<dyn RenderSink>,
        settings: &Settings,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WeatherInner {
                gate: RateGate::new(settings.weather_cooldown()),
                cached: None,
                fallback: None,
            })),
            provider,
            locator,
            sink,
            default_city: settings.weather_default_city.clone(),
            fallback_delay: settings.weather_fallback_delay(),
        }
    }

    pub async fn cached(&self) -> Option<WeatherReport> {
        self.inner.lock().await.cached.clone()
    }

    pub async fn has_pending_fallback(&self) -> bool {
        self.inner.lock().await.fallback.is_some()
    }

    /// Looks up a city typed by the user. Supersedes a pending default-city fallback.
    pub async fn fetch_city(&self, name: &str) -> Result<WeatherReport, WeatherError> {
        let query = match WeatherQuery::city(name) {
            Ok(query) => query,
            Err(err) => {
                self.emit_error(err.status_message());
                return Err(err.into());
            }
        };

        if let Some(fallback) = self.inner.lock().await.fallback.take() {
            fallback.cancel();
        }
        self.lookup(query).await
    }

    pub async fn fetch_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherReport, WeatherError> {
        self.lookup(WeatherQuery::Coordinates(coords)).await
    }

    /// Resolves the device position and looks it up. When the position is unavailable the
    /// error is shown and the default city is looked up after the fallback delay.
    pub async fn auto_locate(&self) -> Result<WeatherReport, WeatherError> {
        self.sink.emit(RenderEvent::WeatherLoading);

        match self.locator.locate().await {
            Ok(coords) => {
                log_info!("location resolved to {coords}");
                self.fetch_coordinates(coords).await
            }
            Err(err) => {
                log_warn!("geolocation failed: {err}");
                self.emit_error(err.to_string());
                self.schedule_fallback().await;
                Err(err.into())
            }
        }
    }

    async fn schedule_fallback(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.fallback.take() {
            previous.cancel();
        }

        let controller = self.clone();
        inner.fallback = Some(DelayedTask::spawn(self.fallback_delay, move |token| {
            async move {
                {
                    let mut inner = controller.inner.lock().await;
                    if token.is_cancelled() {
                        return;
                    }
                    inner.fallback = None;
                }
                log_info!("falling back to default city {}", controller.default_city);
                let query = WeatherQuery::City(controller.default_city.clone());
                let _ = controller.lookup(query).await;
            }
        }));
    }

    async fn lookup(&self, query: WeatherQuery) -> Result<WeatherReport, WeatherError> {
        {
            let mut inner = self.inner.lock().await;
            if let Err(err) = inner.gate.try_acquire(Instant::now()) {
                log_info!("weather lookup rejected: {err}");
                self.emit_error(err.status_message());
                return Err(err.into());
            }
        }

        self.sink.emit(RenderEvent::WeatherLoading);
        let result = match self.provider.fetch(&query).await {
            Ok(body) => WeatherReport::from_json(&body, Local::now().time()),
            Err(err) => Err(err),
        };

        match result {
            Ok(report) => {
                log_info!("weather for {}: {}", report.city, report.headline());
                self.inner.lock().await.cached = Some(report.clone());
                self.sink.emit(RenderEvent::WeatherReport(report.clone()));
                Ok(report)
            }
            Err(err) => {
                log_warn!("weather lookup for {query:?} failed: {err}");
                let message = match query {
                    WeatherQuery::City(_) => err.to_string(),
                    WeatherQuery::Coordinates(_) => LOCATION_FAILURE.to_string(),
                };
                self.emit_error(message);
                Err(err)
            }
        }
    }

    fn emit_error(&self, message: String) {
        self.sink.emit(RenderEvent::WeatherError { message });
    }
}

#[async_trait]
impl ToolEngine for WeatherController {
    /// Shows the cached report, or starts a location lookup in the background when there is
    /// none yet.
    async fn activate(&self) {
        let inner = self.inner.lock().await;
        if let Some(report) = &inner.cached {
            self.sink.emit(RenderEvent::WeatherReport(report.clone()));
            return;
        }
        if inner.fallback.is_some() {
            return;
        }
        drop(inner);

        let controller = self.clone();
        tokio::spawn(async move {
            let _ = controller.auto_locate().await;
        });
    }

    async fn deactivate(&self) {}
}
