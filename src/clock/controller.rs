use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::{
    error::{WidgetError, WidgetResult},
    orientation::ToolEngine,
    platform::{best_effort, Notifier, ALARM_VIBRATION},
    render::{RenderEvent, RenderSink},
    schedule::{DelayedTask, RepeatingTask, TickFlow},
    settings::{AlarmRepeat, Settings},
};

use super::{AlarmState, AlarmTime, WallClock};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct ClockInner {
    alarm: AlarmState,
    ticker: Option<RepeatingTask>,
    auto_dismiss: Option<DelayedTask>,
}

/// Wall clock face plus the alarm.
///
/// The 1 Hz tick keeps running whichever view is visible so the alarm can fire in the
/// background.
#[derive(Clone)]
pub struct ClockController {
    inner: Arc<Mutex<ClockInner>>,
    wall: Arc<dyn WallClock>,
    sink: Arc<dyn RenderSink>,
    notifier: Arc<dyn Notifier>,
    auto_dismiss_after: Duration,
    repeat: AlarmRepeat,
}

impl ClockController {
    pub fn new(
        wall: Arc<dyn WallClock>,
        sink: Arc<dyn RenderSink>,
        notifier: Arc<dyn Notifier>,
        settings: &Settings,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                alarm: AlarmState::new(),
                ticker: None,
                auto_dismiss: None,
            })),
            wall,
            sink,
            notifier,
            auto_dismiss_after: settings.alarm_auto_dismiss(),
            repeat: settings.alarm_repeat,
        }
    }

    pub async fn snapshot(&self) -> AlarmState {
        self.inner.lock().await.alarm.clone()
    }

    pub async fn is_ticking(&self) -> bool {
        self.inner.lock().await.ticker.is_some()
    }

    /// Starts the once-per-second tick. Calling it again while ticking does nothing.
    pub async fn start_ticking(&self) {
        let mut inner = self.inner.lock().await;
        if inner.ticker.is_some() {
            return;
        }

        let controller = self.clone();
        inner.ticker = Some(RepeatingTask::spawn("clock", TICK_INTERVAL, move |token| {
            let controller = controller.clone();
            async move {
                let mut inner = controller.inner.lock().await;
                if token.is_cancelled() {
                    return TickFlow::Stop;
                }
                controller.tick_locked(&mut inner);
                TickFlow::Continue
            }
        }));
        log_info!("clock ticking");
    }

    pub async fn stop_ticking(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
    }

    /// Refreshes the time display and checks the alarm. Returns `true` if the alarm started
    /// firing on this tick.
    pub async fn tick(&self) -> bool {
        let mut inner = self.inner.lock().await;
        self.tick_locked(&mut inner)
    }

    /// Pushes the time and alarm status without evaluating the alarm.
    pub async fn refresh(&self) {
        let inner = self.inner.lock().await;
        self.emit_time(&self.wall.now());
        self.emit_status(&inner.alarm);
    }

    /// Arms the alarm. If it is ringing, that episode ends first and the new time stays
    /// enabled.
    pub async fn set_alarm(&self, hour: u32, minute: u32) -> WidgetResult<AlarmState> {
        let time = AlarmTime::new(hour, minute)?;
        let mut inner = self.inner.lock().await;
        let was_firing = inner.alarm.firing;
        inner.alarm.set(time);
        self.interrupted_locked(&mut inner, was_firing);
        log_info!("alarm set for {}", time.label());
        self.emit_status(&inner.alarm);
        Ok(inner.alarm.clone())
    }

    /// Switching off while ringing also silences the alarm.
    pub async fn toggle_alarm(&self) -> WidgetResult<AlarmState> {
        let mut inner = self.inner.lock().await;
        let was_firing = inner.alarm.firing;
        let enabled = inner.alarm.toggle()?;
        self.interrupted_locked(&mut inner, was_firing);
        log_info!("alarm {}", if enabled { "enabled" } else { "disabled" });
        self.emit_status(&inner.alarm);
        Ok(inner.alarm.clone())
    }

    /// Forgets the alarm entirely, silencing it if it is ringing.
    pub async fn clear_alarm(&self) -> AlarmState {
        let mut inner = self.inner.lock().await;
        let was_firing = inner.alarm.firing;
        inner.alarm.clear();
        self.interrupted_locked(&mut inner, was_firing);
        log_info!("alarm cleared");
        self.emit_status(&inner.alarm);
        inner.alarm.clone()
    }

    pub async fn dismiss(&self) -> WidgetResult<AlarmState> {
        let mut inner = self.inner.lock().await;
        if !self.end_episode_locked(&mut inner, false) {
            return Err(WidgetError::precondition("No alarm is ringing"));
        }
        Ok(inner.alarm.clone())
    }

    fn tick_locked(&self, inner: &mut ClockInner) -> bool {
        let now = self.wall.now();
        self.emit_time(&now);

        if !inner.alarm.check(&now) {
            return false;
        }

        let label = inner
            .alarm
            .time_of_day
            .map(|time| time.label())
            .unwrap_or_default();
        log_info!("alarm firing for {label}");

        self.sink.emit(RenderEvent::AlarmTriggered {
            time: label.clone(),
        });
        self.emit_status(&inner.alarm);

        best_effort("alarm chime", self.notifier.play_chime());
        best_effort("alarm vibration", self.notifier.vibrate(ALARM_VIBRATION));
        best_effort(
            "alarm notification",
            self.notifier.notify("Alarm", &format!("It's {label}!")),
        );

        let controller = self.clone();
        inner.auto_dismiss = Some(DelayedTask::spawn(
            self.auto_dismiss_after,
            move |token| async move {
                let mut inner = controller.inner.lock().await;
                if token.is_cancelled() {
                    return;
                }
                log_info!("alarm auto-dismissed");
                controller.end_episode_locked(&mut inner, true);
            },
        ));

        true
    }

    fn end_episode_locked(&self, inner: &mut ClockInner, automatic: bool) -> bool {
        if !inner.alarm.end_episode(self.repeat) {
            return false;
        }
        // Dropping only cancels the token, so this is safe from inside the auto-dismiss task.
        inner.auto_dismiss = None;
        self.silence();
        self.sink.emit(RenderEvent::AlarmDismissed { automatic });
        self.emit_status(&inner.alarm);
        true
    }

    /// Tears down the side effects of an episode that a user action cut short.
    fn interrupted_locked(&self, inner: &mut ClockInner, was_firing: bool) {
        if !was_firing || inner.alarm.firing {
            return;
        }
        if let Some(pending) = inner.auto_dismiss.take() {
            pending.cancel();
        }
        self.silence();
        self.sink
            .emit(RenderEvent::AlarmDismissed { automatic: false });
    }

    fn silence(&self) {
        best_effort("stop chime", self.notifier.stop_chime());
        best_effort("stop vibration", self.notifier.vibrate(&[]));
    }

    fn emit_time(&self, now: &NaiveDateTime) {
        let text = now.format("%H:%M:%S").to_string();
        log_debug!("clock {text}");
        self.sink.emit(RenderEvent::ClockTime { text });
    }

    fn emit_status(&self, alarm: &AlarmState) {
        self.sink.emit(RenderEvent::AlarmStatus {
            text: alarm.status_text(),
            enabled: alarm.enabled,
            armed_time: alarm.time_of_day.map(|time| time.label()),
        });
    }
}

#[async_trait]
impl ToolEngine for ClockController {
    async fn activate(&self) {
        self.refresh().await;
    }

    /// The alarm must keep working behind other views, so the tick is left alone.
    async fn deactivate(&self) {}
}
