//! The lander and the camera that watches it.

pub mod camera;
pub mod lander;

pub use camera::{CameraView, SectorCamera};
pub use lander::{Lander, LanderState};
