use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{WidgetError, WidgetResult};
use crate::settings::AlarmRepeat;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ClockPhase {
    Idle,
    Armed,
    Firing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlarmTime {
    pub hour: u8,
    pub minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u32, minute: u32) -> WidgetResult<Self> {
        if hour > 23 {
            return Err(WidgetError::validation(format!(
                "Alarm hour must be between 0 and 23 (got {hour})"
            )));
        }
        if minute > 59 {
            return Err(WidgetError::validation(format!(
                "Alarm minute must be between 0 and 59 (got {minute})"
            )));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Matches only during second 0 of the alarm minute.
    fn matches(&self, now: &NaiveDateTime) -> bool {
        now.hour() == u32::from(self.hour)
            && now.minute() == u32::from(self.minute)
            && now.second() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlarmState {
    pub time_of_day: Option<AlarmTime>,
    pub enabled: bool,
    pub firing: bool,
    /// Minute in which the last episode started; a second match in that minute is ignored.
    #[serde(skip)]
    last_fired_minute: Option<NaiveDateTime>,
}

impl AlarmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ClockPhase {
        if self.firing {
            ClockPhase::Firing
        } else if self.enabled && self.time_of_day.is_some() {
            ClockPhase::Armed
        } else {
            ClockPhase::Idle
        }
    }

    /// Arms `time`. A ringing episode is cut short without the once-only disable.
    pub fn set(&mut self, time: AlarmTime) {
        self.time_of_day = Some(time);
        self.enabled = true;
        self.firing = false;
    }

    /// Flips `enabled`, returning the new value. Switching off also silences a ringing alarm.
    pub fn toggle(&mut self) -> WidgetResult<bool> {
        if self.time_of_day.is_none() {
            return Err(WidgetError::precondition("Set an alarm time first"));
        }
        self.enabled = !self.enabled;
        if !self.enabled {
            self.firing = false;
        }
        Ok(self.enabled)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Starts a firing episode if `now` matches the armed time. Returns `true` only on the
    /// transition into firing.
    pub fn check(&mut self, now: &NaiveDateTime) -> bool {
        if self.firing || !self.enabled {
            return false;
        }
        let Some(time) = self.time_of_day else {
            return false;
        };
        if !time.matches(now) {
            return false;
        }

        let minute = now.with_second(0).and_then(|t| t.with_nanosecond(0));
        if minute.is_some() && self.last_fired_minute == minute {
            return false;
        }

        self.firing = true;
        self.last_fired_minute = minute;
        true
    }

    /// Ends a firing episode. Returns `false` if nothing was firing.
    pub fn end_episode(&mut self, repeat: AlarmRepeat) -> bool {
        if !self.firing {
            return false;
        }
        self.firing = false;
        if repeat == AlarmRepeat::Once {
            self.enabled = false;
        }
        true
    }

    pub fn status_text(&self) -> String {
        match self.time_of_day {
            None => "No alarm set".to_string(),
            Some(time) if self.firing => format!("Alarm! It's {}", time.label()),
            Some(time) if self.enabled => format!("Alarm set for {}", time.label()),
            Some(time) => format!("Alarm set for {} (off)", time.label()),
        }
    }
}
