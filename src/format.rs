//! Display strings for durations.
//!
//! Both functions are total over `u64` milliseconds. Hours are never wrapped or capped, so a
//! long-running stopwatch simply grows a wider hour field.

const MS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

struct Parts {
    hours: u64,
    minutes: u64,
    seconds: u64,
}

fn split(ms: u64) -> Parts {
    let total_seconds = ms / MS_PER_SECOND;
    Parts {
        hours: total_seconds / SECONDS_PER_HOUR,
        minutes: (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
        seconds: total_seconds % SECONDS_PER_MINUTE,
    }
}

/// `HH:MM:SS`, floored to whole seconds.
pub fn format_hms(ms: u64) -> String {
    let Parts {
        hours,
        minutes,
        seconds,
    } = split(ms);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// `MM:SS.CC`, or `HH:MM:SS.CC` once at least one hour has passed.
///
/// `CC` is hundredths of a second, `floor(ms / 10) mod 100`.
pub fn format_with_subsecond(ms: u64) -> String {
    let Parts {
        hours,
        minutes,
        seconds,
    } = split(ms);
    let centis = (ms / 10) % 100;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
    } else {
        format!("{minutes:02}:{seconds:02}.{centis:02}")
    }
}
