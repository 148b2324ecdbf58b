pub mod controller;
pub mod state;

pub use controller::StopwatchController;
pub use state::{StopwatchState, MAX_LAPS};
