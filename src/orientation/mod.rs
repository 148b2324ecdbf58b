pub mod router;
pub mod signal;

pub use router::{Engines, OrientationRouter, ToolEngine};
pub use signal::{resolve_orientation, Orientation, RawOrientation, ToolView};
