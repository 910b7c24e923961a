//! Camera state machine and its motion primitives

pub mod easing;
pub mod orbit;
pub mod path;
pub mod rig;

pub use easing::ease_in_out_cubic;
pub use orbit::OrbitControls;
pub use path::CinematicPath;
pub use rig::{AnimationTask, CameraMode, CameraPose, CameraRig};
