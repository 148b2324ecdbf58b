//! Per-module switchable logging.
//!
//! A module opts in by declaring a flag and then calling the macros exported at the crate root:
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("stopwatch started");
//! log_debug!("tick at {}ms", elapsed_ms);
//! ```
//! Turning the flag off silences the module without touching the global `RUST_LOG` filter,
//! which matters for the 10 ms stopwatch ticker.

/// `log::debug!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::info!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Default filter for the binary: `Debug` when `TILTCLOCK_DEBUG` is `1`/`true`, else `Info`.
pub fn default_level_filter() -> log::LevelFilter {
    let debug_mode = std::env::var("TILTCLOCK_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if debug_mode {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}
