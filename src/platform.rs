//! Best-effort platform capabilities: sound, vibration, notifications.
//!
//! Failing to use any of these never changes engine state.

use crate::error::{WidgetError, WidgetResult};

#[cfg(feature = "chime")]
use crate::audio::ChimeEngineHandle;

pub const ALARM_VIBRATION: &[u64] = &[500, 200, 500];
pub const TIMER_VIBRATION: &[u64] = &[200, 100, 200, 100, 200];

pub trait Notifier: Send + Sync {
    fn play_chime(&self) -> WidgetResult<()>;
    fn stop_chime(&self) -> WidgetResult<()>;
    /// Alternating on/off durations in milliseconds; an empty pattern cancels vibration.
    fn vibrate(&self, pattern: &[u64]) -> WidgetResult<()>;
    fn notify(&self, title: &str, body: &str) -> WidgetResult<()>;
}

/// Runs a capability call and logs (rather than returns) any failure.
pub fn best_effort(what: &str, result: WidgetResult<()>) {
    match result {
        Ok(()) => {}
        Err(WidgetError::CapabilityUnavailable { capability }) => {
            log::warn!("{what}: {capability} unavailable, skipping");
        }
        Err(err) => log::warn!("{what} failed: {err}"),
    }
}

/// Notifier for a host without a UI shell: notifications are written to the log, vibration is
/// never available, and the chime needs the `chime` feature.
pub struct HeadlessNotifier {
    #[cfg(feature = "chime")]
    chime: ChimeEngineHandle,
}

impl HeadlessNotifier {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "chime")]
            chime: ChimeEngineHandle::new(),
        }
    }
}

impl Default for HeadlessNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for HeadlessNotifier {
    #[cfg(feature = "chime")]
    fn play_chime(&self) -> WidgetResult<()> {
        if self.chime.is_playing() {
            return Ok(());
        }
        self.chime.play().map_err(|err| {
            log::warn!("chime failed to start: {err}");
            WidgetError::CapabilityUnavailable { capability: "audio" }
        })
    }

    #[cfg(not(feature = "chime"))]
    fn play_chime(&self) -> WidgetResult<()> {
        Err(WidgetError::CapabilityUnavailable { capability: "audio" })
    }

    #[cfg(feature = "chime")]
    fn stop_chime(&self) -> WidgetResult<()> {
        self.chime.stop().map_err(|err| {
            log::warn!("chime failed to stop: {err}");
            WidgetError::CapabilityUnavailable { capability: "audio" }
        })
    }

    #[cfg(not(feature = "chime"))]
    fn stop_chime(&self) -> WidgetResult<()> {
        Ok(())
    }

    fn vibrate(&self, _pattern: &[u64]) -> WidgetResult<()> {
        Err(WidgetError::CapabilityUnavailable {
            capability: "vibration",
        })
    }

    fn notify(&self, title: &str, body: &str) -> WidgetResult<()> {
        log::info!("notification: {title}: {body}");
        Ok(())
    }
}
