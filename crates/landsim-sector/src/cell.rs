//! Integer cell identities and the angular bounds they cover.

use std::fmt;
use std::ops::{Add, Sub};

/// Identifies one sector on the planet surface.
///
/// A cell spans `cell_size_deg` degrees in both longitude and latitude and is
/// centered on `(lon * cell_size_deg, lat * cell_size_deg)`. The identity does
/// not depend on what the sector currently has cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Cell index along longitude.
    pub lon: i32,
    /// Cell index along latitude.
    pub lat: i32,
}

/// Signed displacement between two cells, in whole cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellOffset {
    /// Displacement along longitude.
    pub lon: i32,
    /// Displacement along latitude.
    pub lat: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    pub const fn new(lon: i32, lat: i32) -> Self {
        Self { lon, lat }
    }

    /// Returns the cell displaced by `(dlon, dlat)`, saturating at the edges
    /// of the `i32` range.
    pub fn offset(self, dlon: i32, dlat: i32) -> Self {
        Self {
            lon: self.lon.saturating_add(dlon),
            lat: self.lat.saturating_add(dlat),
        }
    }

    /// Center of this cell in radians.
    pub fn center_angles(self, cell_size_deg: f64) -> (f64, f64) {
        (
            (self.lon as f64 * cell_size_deg).to_radians(),
            (self.lat as f64 * cell_size_deg).to_radians(),
        )
    }

    /// Angular bounds of this cell: its center plus or minus half a cell.
    pub fn bounds(self, cell_size_deg: f64) -> AngularBounds {
        let (center_lon, center_lat) = self.center_angles(cell_size_deg);
        let half = (cell_size_deg * 0.5).to_radians();
        AngularBounds {
            min_lon: center_lon - half,
            max_lon: center_lon + half,
            min_lat: center_lat - half,
            max_lat: center_lat + half,
        }
    }
}

impl CellOffset {
    /// Creates a new cell offset.
    pub const fn new(lon: i32, lat: i32) -> Self {
        Self { lon, lat }
    }

    /// True if the offset does not move anything.
    pub fn is_zero(self) -> bool {
        self.lon == 0 && self.lat == 0
    }
}

impl Add<CellOffset> for CellCoord {
    type Output = CellCoord;

    fn add(self, rhs: CellOffset) -> CellCoord {
        self.offset(rhs.lon, rhs.lat)
    }
}

impl Sub for CellCoord {
    type Output = CellOffset;

    fn sub(self, rhs: CellCoord) -> CellOffset {
        CellOffset {
            lon: self.lon.saturating_sub(rhs.lon),
            lat: self.lat.saturating_sub(rhs.lat),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// Longitude/latitude rectangle in radians covered by one sector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularBounds {
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl AngularBounds {
    /// Center of the rectangle as `(longitude, latitude)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) * 0.5,
            (self.min_lat + self.max_lat) * 0.5,
        )
    }

    /// True if `(longitude, latitude)` lies inside, edges included.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&longitude)
            && (self.min_lat..=self.max_lat).contains(&latitude)
    }
}
