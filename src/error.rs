use thiserror::Error;

/// Failures an engine can report back to the caller.
///
/// None of these are fatal. Validation and precondition failures are turned into a status
/// line by the command layer, capability failures are logged and dropped, and a rate-limited
/// weather lookup is skipped outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Malformed user input (out-of-range alarm time, zero countdown, blank city).
    #[error("{0}")]
    Validation(String),

    /// The operation does not apply in the engine's current state.
    #[error("{0}")]
    Precondition(String),

    /// A best-effort platform feature (vibration, notifications, audio) is missing.
    #[error("{capability} is not available on this platform")]
    CapabilityUnavailable { capability: &'static str },

    /// The weather cooldown has not elapsed since the last lookup attempt.
    #[error("Please wait {cooldown_secs} seconds before fetching weather again")]
    RateLimited { cooldown_secs: u64 },
}

impl WidgetError {
    pub fn validation(message: impl Into<String>) -> Self {
        WidgetError::Validation(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        WidgetError::Precondition(message.into())
    }

    /// Text shown to the user when an intent is rejected.
    pub fn status_message(&self) -> String {
        self.to_string()
    }
}

pub type WidgetResult<T> = std::result::Result<T, WidgetError>;
