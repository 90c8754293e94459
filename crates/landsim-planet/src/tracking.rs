//! Deciding when a tracked position has left the grid's center cell.

use landsim_sector::{CellCoord, CellOffset};

/// Distance from the center cell, in cells, beyond which the grid recenters.
///
/// Half a cell puts the trigger exactly on the cell edge; a position has to be
/// strictly past it, so hovering on the edge does not thrash.
pub const RECENTER_THRESHOLD: f64 = 0.5;

/// Position in continuous cell units: `degrees / cell_size_deg` on each axis.
pub fn cell_position(longitude: f64, latitude: f64, cell_size_deg: f64) -> (f64, f64) {
    (
        longitude.to_degrees() / cell_size_deg,
        latitude.to_degrees() / cell_size_deg,
    )
}

/// Offset the grid must shift by to put `(longitude, latitude)` back in its
/// center cell, or `None` while the position stays within the threshold.
pub fn recenter_offset(
    center: CellCoord,
    longitude: f64,
    latitude: f64,
    cell_size_deg: f64,
) -> Option<CellOffset> {
    let (lon_cells, lat_cells) = cell_position(longitude, latitude, cell_size_deg);
    if !(lon_cells.is_finite() && lat_cells.is_finite()) {
        return None;
    }

    let d_lon = lon_cells - center.lon as f64;
    let d_lat = lat_cells - center.lat as f64;
    if d_lon.abs() <= RECENTER_THRESHOLD && d_lat.abs() <= RECENTER_THRESHOLD {
        return None;
    }

    let offset = CellOffset::new(d_lon.round() as i32, d_lat.round() as i32);
    (!offset.is_zero()).then_some(offset)
}
