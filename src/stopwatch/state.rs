use serde::Serialize;
use std::collections::VecDeque;
use tokio::time::Instant;

use crate::error::{WidgetError, WidgetResult};
use crate::format::format_with_subsecond;
use crate::render::LapLine;

pub const MAX_LAPS: usize = 10;

/// Elapsed time is always `baseline_ms` plus the wall time since `running_anchor`, never a sum
/// of ticks, so scheduling jitter does not accumulate.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopwatchState {
    pub running: bool,
    pub elapsed_ms: u64,
    /// Formatted lap times, most recent first.
    pub laps: VecDeque<String>,
    /// Laps recorded since the last reset, including evicted ones.
    pub lap_count: u32,
    #[serde(skip)]
    baseline_ms: u64,
    #[serde(skip)]
    running_anchor: Option<Instant>,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.baseline_ms = self.elapsed_ms;
        self.running_anchor = Some(now);
        true
    }

    pub fn sync(&mut self, now: Instant) {
        if let (true, Some(anchor)) = (self.running, self.running_anchor) {
            let since = now.saturating_duration_since(anchor).as_millis() as u64;
            self.elapsed_ms = self.baseline_ms.saturating_add(since);
        }
    }

    /// Returns `false` if already stopped.
    pub fn stop(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        self.sync(now);
        self.running = false;
        self.running_anchor = None;
        self.baseline_ms = self.elapsed_ms;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn lap(&mut self, now: Instant) -> WidgetResult<String> {
        if !self.running {
            return Err(WidgetError::precondition(
                "Laps can only be recorded while the stopwatch is running",
            ));
        }
        self.sync(now);

        let time = format_with_subsecond(self.elapsed_ms);
        self.lap_count += 1;
        self.laps.push_front(time.clone());
        self.laps.truncate(MAX_LAPS);
        Ok(time)
    }

    pub fn display(&self) -> String {
        format_with_subsecond(self.elapsed_ms)
    }

    pub fn lap_lines(&self) -> Vec<LapLine> {
        self.laps
            .iter()
            .zip((1..=self.lap_count).rev())
            .map(|(time, number)| LapLine {
                number,
                time: time.clone(),
            })
            .collect()
    }

    pub fn status_text(&self) -> &'static str {
        if self.running {
            "Stopwatch running..."
        } else if self.elapsed_ms > 0 {
            "Stopwatch stopped"
        } else {
            "Ready to start"
        }
    }
}
