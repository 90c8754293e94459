//! Procedural surface height and spherical geometry for LandingSim planets.

mod noise_field;
mod sphere;

#[cfg(any(test, feature = "eval-counter"))]
pub use noise_field::evaluations;
pub use noise_field::{NOISE_LAYERS, NoiseLayer, height, max_height};
pub use sphere::{SECTOR_CENTER_LIFT, sphere_point, surface_normal};
