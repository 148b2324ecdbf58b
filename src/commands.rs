//! Text intents from the presentation layer.
//!
//! Every engine error stops here and becomes the status line shown to the user.

use crate::{
    error::{WidgetError, WidgetResult},
    orientation::RawOrientation,
    timer::DurationInput,
    AppState,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetAlarm { hour: u32, minute: u32 },
    ToggleAlarm,
    ClearAlarm,
    DismissAlarm,
    StartStopwatch,
    StopStopwatch,
    ResetStopwatch,
    Lap,
    StartTimer(DurationInput),
    PauseTimer,
    ResetTimer,
    WeatherForCity(String),
    WeatherHere,
    Orient(RawOrientation),
    Quit,
}

fn number<T: std::str::FromStr>(token: Option<&str>, what: &str) -> WidgetResult<T> {
    let token = token.ok_or_else(|| WidgetError::validation(format!("Missing {what}")))?;
    token
        .parse()
        .map_err(|_| WidgetError::validation(format!("Invalid {what}: {token}")))
}

/// Optional trailing number, zero when absent.
fn number_or_zero(token: Option<&str>, what: &str) -> WidgetResult<u32> {
    match token {
        Some(_) => number(token, what),
        None => Ok(0),
    }
}

impl Command {
    pub fn parse(line: &str) -> WidgetResult<Command> {
        let mut words = line.split_whitespace();
        let tool = words
            .next()
            .ok_or_else(|| WidgetError::validation("Empty command"))?
            .to_ascii_lowercase();
        let action = words.next().map(str::to_ascii_lowercase);

        let command = match (tool.as_str(), action.as_deref()) {
            ("alarm", Some("set")) => {
                let hour = number(words.next(), "hour")?;
                let minute = number(words.next(), "minute")?;
                Command::SetAlarm { hour, minute }
            }
            ("alarm", Some("toggle")) => Command::ToggleAlarm,
            ("alarm", Some("clear")) => Command::ClearAlarm,
            ("alarm", Some("dismiss")) => Command::DismissAlarm,
            ("stopwatch", Some("start")) => Command::StartStopwatch,
            ("stopwatch", Some("stop")) => Command::StopStopwatch,
            ("stopwatch", Some("reset")) => Command::ResetStopwatch,
            ("stopwatch", Some("lap")) => Command::Lap,
            ("timer", Some("start")) => {
                let hours = number_or_zero(words.next(), "hours")?;
                let minutes = number_or_zero(words.next(), "minutes")?;
                let seconds = number_or_zero(words.next(), "seconds")?;
                Command::StartTimer(DurationInput::new(hours, minutes, seconds))
            }
            ("timer", Some("pause")) => Command::PauseTimer,
            ("timer", Some("reset")) => Command::ResetTimer,
            ("weather", Some("city")) => {
                Command::WeatherForCity(words.collect::<Vec<_>>().join(" "))
            }
            ("weather", Some("locate")) => Command::WeatherHere,
            ("orient", Some("angle")) => {
                Command::Orient(RawOrientation::Angle(number(words.next(), "angle")?))
            }
            ("orient", Some("size")) => {
                let width = number(words.next(), "width")?;
                let height = number(words.next(), "height")?;
                Command::Orient(RawOrientation::Dimensions { width, height })
            }
            ("orient", Some(kind)) => Command::Orient(RawOrientation::ScreenType(kind.to_string())),
            ("quit" | "exit", None) => Command::Quit,
            _ => {
                return Err(WidgetError::validation(format!(
                    "Unknown command: {}",
                    line.trim()
                )))
            }
        };

        Ok(command)
    }
}

/// Runs one intent and returns the status line to show.
pub async fn dispatch(state: &AppState, command: Command) -> Result<String, String> {
    match command {
        Command::SetAlarm { hour, minute } => state
            .clock
            .set_alarm(hour, minute)
            .await
            .map(|alarm| alarm.status_text())
            .map_err(|e| e.status_message()),
        Command::ToggleAlarm => state
            .clock
            .toggle_alarm()
            .await
            .map(|alarm| alarm.status_text())
            .map_err(|e| e.status_message()),
        Command::ClearAlarm => Ok(state.clock.clear_alarm().await.status_text()),
        Command::DismissAlarm => state
            .clock
            .dismiss()
            .await
            .map(|alarm| alarm.status_text())
            .map_err(|e| e.status_message()),
        Command::StartStopwatch => Ok(state.stopwatch.start().await.status_text().to_string()),
        Command::StopStopwatch => Ok(state.stopwatch.stop().await.status_text().to_string()),
        Command::ResetStopwatch => Ok(state.stopwatch.reset().await.status_text().to_string()),
        Command::Lap => {
            let time = state.stopwatch.lap().await.map_err(|e| e.status_message())?;
            let lap = state.stopwatch.snapshot().await.lap_count;
            Ok(format!("Lap {lap}: {time}"))
        }
        Command::StartTimer(input) => state
            .timer
            .start(input)
            .await
            .map(|timer| timer.status_text().to_string())
            .map_err(|e| e.status_message()),
        Command::PauseTimer => state
            .timer
            .pause()
            .await
            .map(|timer| timer.status_text().to_string())
            .map_err(|e| e.status_message()),
        Command::ResetTimer => Ok(state.timer.reset().await.status_text().to_string()),
        Command::WeatherForCity(city) => state
            .weather
            .fetch_city(&city)
            .await
            .map(|report| report.summary)
            .map_err(|e| e.to_string()),
        Command::WeatherHere => state
            .weather
            .auto_locate()
            .await
            .map(|report| report.summary)
            .map_err(|e| e.to_string()),
        Command::Orient(raw) => {
            state.router.on_orientation_changed(raw).await;
            Ok("Orientation updated".to_string())
        }
        Command::Quit => Ok("Goodbye".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::SystemClock,
        orientation::ToolView,
        platform::testing::RecordingNotifier,
        render::testing::RecordingSink,
        settings::Settings,
        weather::{OfflineProvider, UnsupportedGeolocation},
    };
    use std::{sync::Arc, time::Duration};
    use tokio::time::sleep;

    fn app() -> AppState {
        AppState::build(
            &Settings::default(),
            RecordingSink::new(),
            RecordingNotifier::new(),
            Arc::new(SystemClock),
            Arc::new(OfflineProvider),
            Arc::new(UnsupportedGeolocation),
        )
    }

    #[test]
    fn parses_alarm_intents() {
        assert_eq!(
            Command::parse("alarm set 7 30").unwrap(),
            Command::SetAlarm { hour: 7, minute: 30 }
        );
        assert_eq!(Command::parse("ALARM Toggle").unwrap(), Command::ToggleAlarm);
        assert!(matches!(
            Command::parse("alarm set seven 30"),
            Err(WidgetError::Validation(_))
        ));
        assert!(matches!(
            Command::parse("alarm set 7"),
            Err(WidgetError::Validation(_))
        ));
    }

    #[test]
    fn timer_fields_default_to_zero() {
        assert_eq!(
            Command::parse("timer start 0 5").unwrap(),
            Command::StartTimer(DurationInput::new(0, 5, 0))
        );
        assert_eq!(
            Command::parse("timer start").unwrap(),
            Command::StartTimer(DurationInput::default())
        );
    }

    #[test]
    fn city_names_keep_their_spaces() {
        assert_eq!(
            Command::parse("weather city New  Delhi").unwrap(),
            Command::WeatherForCity("New Delhi".into())
        );
    }

    #[test]
    fn parses_orientation_sources() {
        assert_eq!(
            Command::parse("orient landscape-primary").unwrap(),
            Command::Orient(RawOrientation::ScreenType("landscape-primary".into()))
        );
        assert_eq!(
            Command::parse("orient angle -90").unwrap(),
            Command::Orient(RawOrientation::Angle(-90))
        );
        assert_eq!(
            Command::parse("orient size 800 600").unwrap(),
            Command::Orient(RawOrientation::Dimensions {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn rejects_unknown_intents() {
        assert_eq!(
            Command::parse("make coffee"),
            Err(WidgetError::validation("Unknown command: make coffee"))
        );
        assert!(Command::parse("   ").is_err());
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_become_status_lines() {
        let state = app();
        assert_eq!(
            dispatch(&state, Command::ToggleAlarm).await,
            Err("Set an alarm time first".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::StartTimer(DurationInput::default())).await,
            Err("Please set a time > 0".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::SetAlarm { hour: 24, minute: 0 })
                .await
                .map_err(|e| e.contains("between 0 and 23")),
            Err(true)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn runs_tool_intents() {
        let state = app();
        assert_eq!(
            dispatch(&state, Command::SetAlarm { hour: 6, minute: 45 }).await,
            Ok("Alarm set for 06:45".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::StartStopwatch).await,
            Ok("Stopwatch running...".to_string())
        );
        sleep(Duration::from_millis(1_230)).await;
        assert_eq!(
            dispatch(&state, Command::Lap).await,
            Ok("Lap 1: 00:01.23".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::ResetStopwatch).await,
            Ok("Ready to start".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::StartTimer(DurationInput::new(0, 1, 0))).await,
            Ok("Timer running...".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::PauseTimer).await,
            Ok("Timer paused".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn orientation_intents_are_debounced() {
        let state = app();
        state.router.apply(&RawOrientation::Unknown).await;

        dispatch(
            &state,
            Command::Orient(RawOrientation::ScreenType("portrait-secondary".into())),
        )
        .await
        .unwrap();
        assert_eq!(state.router.active_view().await, Some(ToolView::Alarm));

        sleep(Duration::from_millis(150)).await;
        assert_eq!(state.router.active_view().await, Some(ToolView::Timer));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_weather_reports_the_failure() {
        let state = app();
        let result = dispatch(&state, Command::WeatherForCity("Durgapur".into())).await;
        assert_eq!(
            result,
            Err("Network error: no weather provider configured".to_string())
        );
        assert_eq!(
            dispatch(&state, Command::WeatherForCity(" ".into())).await,
            Err("Please enter a city name".to_string())
        );
    }
}
