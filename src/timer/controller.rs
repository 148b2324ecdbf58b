use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::WidgetResult,
    orientation::ToolEngine,
    platform::{best_effort, Notifier, TIMER_VIBRATION},
    render::{RenderEvent, RenderSink},
    schedule::{RepeatingTask, TickFlow},
};

use super::state::TickOutcome;
use super::{DurationInput, TimerPhase, TimerState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct TimerInner {
    state: TimerState,
    ticker: Option<RepeatingTask>,
}

#[derive(Clone)]
pub struct TimerController {
    inner: Arc<Mutex<TimerInner>>,
    sink: Arc<dyn RenderSink>,
    notifier: Arc<dyn Notifier>,
}

impl TimerController {
    pub fn new(sink: Arc<dyn RenderSink>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimerInner {
                state: TimerState::new(),
                ticker: None,
            })),
            sink,
            notifier,
        }
    }

    pub async fn snapshot(&self) -> TimerState {
        self.inner.lock().await.state.clone()
    }

    pub async fn is_ticking(&self) -> bool {
        self.inner.lock().await.ticker.is_some()
    }

    /// Starts a fresh countdown from `input`, or resumes a paused one (ignoring `input`).
    pub async fn start(&self, input: DurationInput) -> WidgetResult<TimerState> {
        let mut inner = self.inner.lock().await;
        if !inner.state.start(input)? {
            return Ok(inner.state.clone());
        }

        let controller = self.clone();
        inner.ticker = Some(RepeatingTask::spawn("timer", TICK_INTERVAL, move |token| {
            let controller = controller.clone();
            async move {
                let mut inner = controller.inner.lock().await;
                if token.is_cancelled() {
                    return TickFlow::Stop;
                }
                controller.tick_locked(&mut inner)
            }
        }));

        log_info!("timer running with {}ms left", inner.state.remaining_ms);
        self.emit_time(&inner.state);
        self.emit_status(&inner.state);
        Ok(inner.state.clone())
    }

    pub async fn pause(&self) -> WidgetResult<TimerState> {
        let mut inner = self.inner.lock().await;
        Self::pause_locked(&mut inner)?;
        self.emit_status(&inner.state);
        Ok(inner.state.clone())
    }

    pub async fn reset(&self) -> TimerState {
        let mut inner = self.inner.lock().await;
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
        inner.state.reset();
        log_info!("timer reset");
        self.emit_time(&inner.state);
        self.emit_status(&inner.state);
        inner.state.clone()
    }

    pub async fn refresh(&self) {
        let inner = self.inner.lock().await;
        self.emit_time(&inner.state);
        self.emit_status(&inner.state);
    }

    fn pause_locked(inner: &mut TimerInner) -> WidgetResult<()> {
        inner.state.pause()?;
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
        log_info!("timer paused with {}ms left", inner.state.remaining_ms);
        Ok(())
    }

    fn tick_locked(&self, inner: &mut TimerInner) -> TickFlow {
        let outcome = inner.state.tick();
        log_debug!("timer tick {outcome:?}, {}ms left", inner.state.remaining_ms);

        match outcome {
            TickOutcome::Ignored => TickFlow::Stop,
            TickOutcome::Counting => {
                self.emit_time(&inner.state);
                TickFlow::Continue
            }
            TickOutcome::Finished => {
                // Runs inside this ticker, so drop it rather than aborting it.
                inner.ticker = None;
                self.emit_time(&inner.state);
                self.emit_status(&inner.state);
                self.sink.emit(RenderEvent::TimerFinished { flash: true });
                best_effort("timer vibration", self.notifier.vibrate(TIMER_VIBRATION));
                best_effort("timer notification", self.notifier.notify("Timer", "Time's up!"));
                log_info!("timer finished");
                TickFlow::Stop
            }
        }
    }

    fn emit_time(&self, state: &TimerState) {
        self.sink.emit(RenderEvent::TimerTime {
            text: state.display(),
        });
    }

    fn emit_status(&self, state: &TimerState) {
        self.sink.emit(RenderEvent::TimerStatus {
            text: state.status_text().to_string(),
            phase: state.phase,
        });
    }
}

#[async_trait]
impl ToolEngine for TimerController {
    async fn activate(&self) {
        self.refresh().await;
    }

    /// A hidden countdown is paused; the user restarts it explicitly.
    async fn deactivate(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.phase == TimerPhase::Running && Self::pause_locked(&mut inner).is_ok() {
            self.emit_status(&inner.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WidgetError;
    use crate::platform::testing::{Call, RecordingNotifier};
    use crate::render::testing::RecordingSink;
    use tokio::time::sleep;

    fn controller() -> (TimerController, Arc<RecordingSink>, Arc<RecordingNotifier>) {
        let sink = RecordingSink::new();
        let notifier = RecordingNotifier::new();
        (
            TimerController::new(sink.clone(), notifier.clone()),
            sink,
            notifier,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn five_second_countdown_finishes_once() {
        let (timer, sink, notifier) = controller();
        timer.start(DurationInput::new(0, 0, 5)).await.unwrap();

        sleep(Duration::from_millis(4_050)).await;
        assert_eq!(timer.snapshot().await.remaining_ms, 1_000);
        assert_eq!(sink.count("timer-finished"), 0);

        sleep(Duration::from_millis(1_000)).await;
        let state = timer.snapshot().await;
        assert_eq!(state.phase, TimerPhase::Finished);
        assert_eq!(state.remaining_ms, 0);
        assert_eq!(sink.count("timer-finished"), 1);
        assert!(!timer.is_ticking().await);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(sink.count("timer-finished"), 1);
        assert!(notifier
            .calls()
            .contains(&Call::Notify("Timer".into(), "Time's up!".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_is_rejected() {
        let (timer, _, _) = controller();
        assert!(matches!(
            timer.start(DurationInput::default()).await,
            Err(WidgetError::Validation(_))
        ));
        assert!(!timer.is_ticking().await);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_start_resumes_remaining() {
        let (timer, _, _) = controller();
        timer.start(DurationInput::new(0, 0, 10)).await.unwrap();
        sleep(Duration::from_millis(3_050)).await;

        let paused = timer.pause().await.unwrap();
        assert_eq!(paused.phase, TimerPhase::Paused);
        assert_eq!(paused.remaining_ms, 7_000);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.snapshot().await.remaining_ms, 7_000);

        let resumed = timer.start(DurationInput::new(1, 0, 0)).await.unwrap();
        assert_eq!(resumed.remaining_ms, 7_000);
        assert_eq!(resumed.original_duration_ms, 10_000);

        sleep(Duration::from_millis(2_050)).await;
        assert_eq!(timer.snapshot().await.remaining_ms, 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_when_not_running_is_rejected() {
        let (timer, _, _) = controller();
        assert!(matches!(
            timer.pause().await,
            Err(WidgetError::Precondition(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_ticks() {
        let (timer, sink, _) = controller();
        timer.start(DurationInput::new(0, 1, 0)).await.unwrap();
        sleep(Duration::from_millis(1_500)).await;

        let state = timer.reset().await;
        assert_eq!(state, TimerState::new());
        let ticks = sink.count("timer-time");

        sleep(Duration::from_secs(3)).await;
        let after = timer.snapshot().await;
        assert_eq!(after.phase, TimerPhase::Idle);
        assert_eq!(after.remaining_ms, 0);
        assert_eq!(sink.count("timer-time"), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn deactivate_pauses_running_timer() {
        let (timer, _, _) = controller();
        timer.start(DurationInput::new(0, 0, 30)).await.unwrap();
        sleep(Duration::from_millis(2_050)).await;

        timer.deactivate().await;
        sleep(Duration::from_secs(10)).await;

        let state = timer.snapshot().await;
        assert_eq!(state.phase, TimerPhase::Paused);
        assert_eq!(state.remaining_ms, 28_000);

        timer.activate().await;
        assert_eq!(timer.snapshot().await.phase, TimerPhase::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_capabilities_still_finish() {
        let sink = RecordingSink::new();
        let timer = TimerController::new(sink.clone(), RecordingNotifier::unavailable());
        timer.start(DurationInput::new(0, 0, 1)).await.unwrap();
        sleep(Duration::from_millis(1_050)).await;

        assert_eq!(timer.snapshot().await.phase, TimerPhase::Finished);
        assert_eq!(sink.count("timer-finished"), 1);
    }
}
