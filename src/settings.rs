use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

const MIN_DEBOUNCE_MS: u64 = 100;
const MAX_DEBOUNCE_MS: u64 = 300;
pub const WEATHER_COOLDOWN_MS: u64 = 10_000;
const MIN_AUTO_DISMISS_SECS: u64 = 1;
const MAX_AUTO_DISMISS_SECS: u64 = 300;

/// What happens to an alarm once its firing episode ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AlarmRepeat {
    /// Disabled after firing; the time stays so it can be toggled back on.
    #[default]
    Once,
    /// Stays enabled and fires again the next day.
    Daily,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub orientation_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    pub alarm_auto_dismiss_secs: u64,
    pub alarm_repeat: AlarmRepeat,
    pub weather_cooldown_ms: u64,
    pub weather_default_city: String,
    pub weather_fallback_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            orientation_debounce_ms: 100,
            resize_debounce_ms: 200,
            alarm_auto_dismiss_secs: 30,
            alarm_repeat: AlarmRepeat::Once,
            weather_cooldown_ms: WEATHER_COOLDOWN_MS,
            weather_default_city: "Durgapur".into(),
            weather_fallback_delay_ms: 2_000,
        }
    }
}

impl Settings {
    /// Pulls out-of-range values back into their allowed bounds.
    pub fn normalized(mut self) -> Self {
        self.orientation_debounce_ms = self
            .orientation_debounce_ms
            .clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS);
        self.resize_debounce_ms = self
            .resize_debounce_ms
            .clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS);
        self.alarm_auto_dismiss_secs = self
            .alarm_auto_dismiss_secs
            .clamp(MIN_AUTO_DISMISS_SECS, MAX_AUTO_DISMISS_SECS);
        self.weather_cooldown_ms = self.weather_cooldown_ms.max(WEATHER_COOLDOWN_MS);
        if self.weather_default_city.trim().is_empty() {
            self.weather_default_city = Settings::default().weather_default_city;
        }
        self
    }

    pub fn orientation_debounce(&self) -> Duration {
        Duration::from_millis(self.orientation_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn alarm_auto_dismiss(&self) -> Duration {
        Duration::from_secs(self.alarm_auto_dismiss_secs)
    }

    pub fn weather_cooldown(&self) -> Duration {
        Duration::from_millis(self.weather_cooldown_ms)
    }

    pub fn weather_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.weather_fallback_delay_ms)
    }
}

/// Read-only settings file. Nothing is written back; the widget keeps no state across runs.
pub struct SettingsStore {
    path: PathBuf,
    data: Settings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str::<Settings>(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring malformed settings in {}: {err}; using defaults",
                    path.display()
                );
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: data.normalized(),
        })
    }

    /// `TILTCLOCK_SETTINGS`, else `tiltclock.json` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os("TILTCLOCK_SETTINGS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tiltclock.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn settings(&self) -> Settings {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tiltclock-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("tiltclock-definitely-missing.json");
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = scratch_file("partial", r#"{"alarmRepeat":"daily","alarmAutoDismissSecs":10}"#);
        let settings = SettingsStore::new(path.clone()).unwrap().settings();
        fs::remove_file(path).ok();

        assert_eq!(settings.alarm_repeat, AlarmRepeat::Daily);
        assert_eq!(settings.alarm_auto_dismiss(), Duration::from_secs(10));
        assert_eq!(settings.weather_default_city, "Durgapur");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = scratch_file("malformed", "{ not json");
        let settings = SettingsStore::new(path.clone()).unwrap().settings();
        fs::remove_file(path).ok();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn normalization_clamps_debounce_and_cooldown() {
        let settings = Settings {
            orientation_debounce_ms: 5,
            resize_debounce_ms: 5_000,
            weather_cooldown_ms: 1_000,
            weather_default_city: "  ".into(),
            ..Settings::default()
        }
        .normalized();

        assert_eq!(settings.orientation_debounce_ms, 100);
        assert_eq!(settings.resize_debounce_ms, 300);
        assert_eq!(settings.weather_cooldown(), Duration::from_secs(10));
        assert_eq!(settings.weather_default_city, "Durgapur");
    }

    #[test]
    fn auto_dismiss_is_bounded() {
        let never = Settings {
            alarm_auto_dismiss_secs: 0,
            ..Settings::default()
        }
        .normalized();
        assert_eq!(never.alarm_auto_dismiss(), Duration::from_secs(1));

        let forever = Settings {
            alarm_auto_dismiss_secs: u64::MAX,
            ..Settings::default()
        }
        .normalized();
        assert_eq!(forever.alarm_auto_dismiss(), Duration::from_secs(300));
    }
}
