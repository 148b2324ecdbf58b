use chrono::{Local, NaiveDateTime};

/// Source of local wall-clock time for the clock face and alarm matching.
pub trait WallClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
