//! Render commands pushed to the presentation layer.
//!
//! Engines own their state and derive display text from it; nothing here is ever read back.

use std::io::{self, Write};
use std::sync::Mutex;

use serde::Serialize;

use crate::orientation::{Orientation, ToolView};
use crate::timer::TimerPhase;
use crate::weather::WeatherReport;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LapLine {
    pub number: u32,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderEvent {
    #[serde(rename_all = "camelCase")]
    ClockTime { text: String },
    #[serde(rename_all = "camelCase")]
    AlarmStatus {
        text: String,
        enabled: bool,
        armed_time: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AlarmTriggered { time: String },
    #[serde(rename_all = "camelCase")]
    AlarmDismissed { automatic: bool },
    #[serde(rename_all = "camelCase")]
    StopwatchTime { text: String },
    #[serde(rename_all = "camelCase")]
    StopwatchLaps { laps: Vec<LapLine> },
    #[serde(rename_all = "camelCase")]
    StopwatchStatus { text: String, running: bool },
    #[serde(rename_all = "camelCase")]
    TimerTime { text: String },
    #[serde(rename_all = "camelCase")]
    TimerStatus { text: String, phase: TimerPhase },
    #[serde(rename_all = "camelCase")]
    TimerFinished { flash: bool },
    WeatherLoading,
    WeatherReport(WeatherReport),
    #[serde(rename_all = "camelCase")]
    WeatherError { message: String },
    #[serde(rename_all = "camelCase")]
    ViewChanged {
        view: ToolView,
        orientation: Orientation,
        label: String,
    },
    #[serde(rename_all = "camelCase")]
    Status { text: String },
}

impl RenderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RenderEvent::ClockTime { .. } => "clock-time",
            RenderEvent::AlarmStatus { .. } => "alarm-status",
            RenderEvent::AlarmTriggered { .. } => "alarm-triggered",
            RenderEvent::AlarmDismissed { .. } => "alarm-dismissed",
            RenderEvent::StopwatchTime { .. } => "stopwatch-time",
            RenderEvent::StopwatchLaps { .. } => "stopwatch-laps",
            RenderEvent::StopwatchStatus { .. } => "stopwatch-status",
            RenderEvent::TimerTime { .. } => "timer-time",
            RenderEvent::TimerStatus { .. } => "timer-status",
            RenderEvent::TimerFinished { .. } => "timer-finished",
            RenderEvent::WeatherLoading => "weather-loading",
            RenderEvent::WeatherReport(_) => "weather-report",
            RenderEvent::WeatherError { .. } => "weather-error",
            RenderEvent::ViewChanged { .. } => "view-changed",
            RenderEvent::Status { .. } => "status",
        }
    }
}

/// The single output surface shared by all engines.
pub trait RenderSink: Send + Sync {
    fn emit(&self, event: RenderEvent);
}

#[derive(Serialize)]
struct Envelope<'a> {
    event: &'static str,
    payload: &'a RenderEvent,
}

/// Writes one JSON object per render command to stdout.
pub struct JsonLineSink {
    out: Mutex<io::Stdout>,
}

impl JsonLineSink {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(io::stdout()),
        }
    }
}

impl Default for JsonLineSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for JsonLineSink {
    fn emit(&self, event: RenderEvent) {
        let envelope = Envelope {
            event: event.name(),
            payload: &event,
        };

        let line = match serde_json::to_string(&envelope) {
            Ok(line) => line,
            Err(err) => {
                log::error!("failed to serialise {} event: {err}", event.name());
                return;
            }
        };

        let mut guard = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(guard, "{line}") {
            log::warn!("failed to write render event: {err}");
        }
    }
}
