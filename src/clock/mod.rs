pub mod controller;
pub mod state;
pub mod wall;

pub use controller::ClockController;
pub use state::{AlarmState, AlarmTime, ClockPhase};
pub use wall::{SystemClock, WallClock};
