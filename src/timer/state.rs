use serde::{Deserialize, Serialize};

use crate::error::{WidgetError, WidgetResult};
use crate::format::format_hms;

/// One countdown step per tick.
pub const TICK_STEP_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

/// Hours/minutes/seconds as entered by the user. Fields are not range-checked; 90 minutes is
/// simply 90 minutes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurationInput {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl DurationInput {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn total_ms(&self) -> u64 {
        let seconds = u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds);
        seconds * 1_000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counting,
    Finished,
}

/// The countdown is tick-accumulated: each tick removes a fixed second regardless of how late
/// it ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub phase: TimerPhase,
    pub remaining_ms: u64,
    pub original_duration_ms: u64,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to running. The input is only read when nothing is left to resume.
    /// Returns `false` if the timer was already running.
    pub fn start(&mut self, input: DurationInput) -> WidgetResult<bool> {
        if self.phase == TimerPhase::Running {
            return Ok(false);
        }

        if self.remaining_ms == 0 {
            let duration = input.total_ms();
            if duration == 0 {
                return Err(WidgetError::validation("Please set a time > 0"));
            }
            self.original_duration_ms = duration;
            self.remaining_ms = duration;
        }

        self.phase = TimerPhase::Running;
        Ok(true)
    }

    pub fn pause(&mut self) -> WidgetResult<()> {
        if self.phase != TimerPhase::Running {
            return Err(WidgetError::precondition("Timer is not running"));
        }
        self.phase = TimerPhase::Paused;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != TimerPhase::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(TICK_STEP_MS);
        if self.remaining_ms == 0 {
            self.phase = TimerPhase::Finished;
            TickOutcome::Finished
        } else {
            TickOutcome::Counting
        }
    }

    pub fn display(&self) -> String {
        format_hms(self.remaining_ms)
    }

    pub fn status_text(&self) -> &'static str {
        match self.phase {
            TimerPhase::Idle => "Set countdown duration",
            TimerPhase::Running => "Timer running...",
            TimerPhase::Paused => "Timer paused",
            TimerPhase::Finished => "Time's up!",
        }
    }
}
