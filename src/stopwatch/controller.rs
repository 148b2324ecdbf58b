use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{sync::Mutex, time::Instant};

use crate::{
    error::WidgetResult,
    orientation::ToolEngine,
    render::{RenderEvent, RenderSink},
    schedule::{RepeatingTask, TickFlow},
};

use super::StopwatchState;

const ENABLE_LOGS: bool = true;

use crate::log_info;

const TICK_INTERVAL: Duration = Duration::from_millis(10);

struct StopwatchInner {
    state: StopwatchState,
    ticker: Option<RepeatingTask>,
}

#[derive(Clone)]
pub struct StopwatchController {
    inner: Arc<Mutex<StopwatchInner>>,
    sink: Arc<dyn RenderSink>,
}

impl StopwatchController {
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StopwatchInner {
                state: StopwatchState::new(),
                ticker: None,
            })),
            sink,
        }
    }

    pub async fn snapshot(&self) -> StopwatchState {
        let inner = self.inner.lock().await;
        let mut state = inner.state.clone();
        state.sync(Instant::now());
        state
    }

    pub async fn is_ticking(&self) -> bool {
        self.inner.lock().await.ticker.is_some()
    }

    pub async fn start(&self) -> StopwatchState {
        let mut inner = self.inner.lock().await;
        if !inner.state.start(Instant::now()) {
            return inner.state.clone();
        }

        let controller = self.clone();
        inner.ticker = Some(RepeatingTask::spawn(
            "stopwatch",
            TICK_INTERVAL,
            move |token| {
                let controller = controller.clone();
                async move {
                    let mut inner = controller.inner.lock().await;
                    if token.is_cancelled() {
                        return TickFlow::Stop;
                    }
                    inner.state.sync(Instant::now());
                    controller.emit_time(&inner.state);
                    TickFlow::Continue
                }
            },
        ));

        log_info!("stopwatch started at {}ms", inner.state.elapsed_ms);
        self.emit_status(&inner.state);
        inner.state.clone()
    }

    pub async fn stop(&self) -> StopwatchState {
        let mut inner = self.inner.lock().await;
        Self::stop_locked(&mut inner);
        self.emit_time(&inner.state);
        self.emit_status(&inner.state);
        inner.state.clone()
    }

    pub async fn reset(&self) -> StopwatchState {
        let mut inner = self.inner.lock().await;
        Self::stop_locked(&mut inner);
        inner.state.reset();
        log_info!("stopwatch reset");
        self.emit_time(&inner.state);
        self.emit_laps(&inner.state);
        self.emit_status(&inner.state);
        inner.state.clone()
    }

    pub async fn lap(&self) -> WidgetResult<String> {
        let mut inner = self.inner.lock().await;
        let time = inner.state.lap(Instant::now())?;
        log_info!("lap {} at {time}", inner.state.lap_count);
        self.emit_laps(&inner.state);
        Ok(time)
    }

    pub async fn refresh(&self) {
        let inner = self.inner.lock().await;
        self.emit_time(&inner.state);
        self.emit_laps(&inner.state);
        self.emit_status(&inner.state);
    }

    /// Cancels the ticker before touching state so no queued tick can run afterwards.
    fn stop_locked(inner: &mut StopwatchInner) {
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
        if inner.state.stop(Instant::now()) {
            log_info!("stopwatch stopped at {}ms", inner.state.elapsed_ms);
        }
    }

    fn emit_time(&self, state: &StopwatchState) {
        self.sink.emit(RenderEvent::StopwatchTime {
            text: state.display(),
        });
    }

    fn emit_laps(&self, state: &StopwatchState) {
        self.sink.emit(RenderEvent::StopwatchLaps {
            laps: state.lap_lines(),
        });
    }

    fn emit_status(&self, state: &StopwatchState) {
        self.sink.emit(RenderEvent::StopwatchStatus {
            text: state.status_text().to_string(),
            running: state.running,
        });
    }
}

#[async_trait]
impl ToolEngine for StopwatchController {
    async fn activate(&self) {
        self.refresh().await;
    }

    /// Hidden stopwatches stop; coming back does not resume them.
    async fn deactivate(&self) {
        let mut inner = self.inner.lock().await;
        Self::stop_locked(&mut inner);
    }
}
