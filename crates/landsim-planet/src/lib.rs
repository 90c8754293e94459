//! The planet tile grid: a square window of sectors that slides around a
//! moving center cell, reusing tiles that stay in view.

mod grid;
mod tracking;

pub use grid::{GridError, GridStats, MAX_RENDER_RADIUS, Planet, PlanetParams, RecenterReport};
pub use tracking::{RECENTER_THRESHOLD, cell_position, recenter_offset};
