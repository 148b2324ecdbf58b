use std::time::Duration;

use tokio::time::Instant;

use crate::error::{WidgetError, WidgetResult};

/// Client-side cooldown between weather lookups.
///
/// The cooldown is keyed to the last *attempt*: [`RateGate::record_fetch`] runs right before a
/// request goes out, whatever its outcome. A rejected attempt does not move the window.
#[derive(Debug, Clone)]
pub struct RateGate {
    cooldown: Duration,
    last_fetch_at: Option<Instant>,
}

impl RateGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fetch_at: None,
        }
    }

    pub fn can_fetch(&self, now: Instant) -> bool {
        match self.last_fetch_at {
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    pub fn record_fetch(&mut self, now: Instant) {
        self.last_fetch_at = Some(now);
    }

    /// Checks the gate and records the attempt in one step.
    pub fn try_acquire(&mut self, now: Instant) -> WidgetResult<()> {
        if !self.can_fetch(now) {
            return Err(WidgetError::RateLimited {
                cooldown_secs: self.cooldown.as_secs(),
            });
        }
        self.record_fetch(now);
        Ok(())
    }
}
