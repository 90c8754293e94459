//! Square window of sectors centered on a cell.
//!
//! The window is `side = 2 * render_radius - 1` sectors wide. Rows follow
//! latitude and columns follow longitude, so slot `(row, col)` always holds the
//! sector at `center + (col - (R - 1), row - (R - 1))`. The grid owns its
//! sectors outright; sectors know nothing about the grid.

use glam::DVec3;
use landsim_sector::{
    CellCoord, CellOffset, DrawMode, MAX_DETAIL, RenderBackend, Sector, SectorParams,
    TriangulationCache,
};

use crate::tracking::recenter_offset;

/// Largest supported render radius: a 31×31 window.
pub const MAX_RENDER_RADIUS: u32 = 16;

/// Errors raised when a grid cannot be built with the requested parameters.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The render radius must be in `1..=MAX_RENDER_RADIUS`.
    #[error("render radius {0} outside 1..={max}", max = MAX_RENDER_RADIUS)]
    InvalidRenderRadius(u32),
    /// The detail level must be at least 1.
    #[error("detail must be at least 1")]
    InvalidDetail,
    /// The detail level is above [`MAX_DETAIL`].
    #[error("detail {0} exceeds the maximum of {max}", max = MAX_DETAIL)]
    DetailTooHigh(u32),
    /// The planet radius must be positive and finite.
    #[error("planet radius must be positive, got {0}")]
    InvalidRadius(f64),
    /// The cell size must be positive and finite.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f64),
}

/// Everything needed to build a [`Planet`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetParams {
    /// Window half-size: the grid is `2 * render_radius - 1` sectors wide.
    pub render_radius: u32,
    /// Cell at the middle of the window.
    pub center: CellCoord,
    /// Geometry shared by all sectors.
    pub sector: SectorParams,
}

impl Default for PlanetParams {
    fn default() -> Self {
        Self {
            render_radius: 2,
            center: CellCoord::new(0, 0),
            sector: SectorParams::default(),
        }
    }
}

impl PlanetParams {
    /// Checks that the parameters describe a buildable grid.
    pub fn validate(&self) -> Result<(), GridError> {
        validate_render_radius(self.render_radius)?;
        validate_sector(&self.sector)
    }
}

fn validate_render_radius(render_radius: u32) -> Result<(), GridError> {
    if (1..=MAX_RENDER_RADIUS).contains(&render_radius) {
        Ok(())
    } else {
        Err(GridError::InvalidRenderRadius(render_radius))
    }
}

fn validate_sector(sector: &SectorParams) -> Result<(), GridError> {
    if sector.detail == 0 {
        return Err(GridError::InvalidDetail);
    }
    if sector.detail > MAX_DETAIL {
        return Err(GridError::DetailTooHigh(sector.detail));
    }
    if !(sector.radius.is_finite() && sector.radius > 0.0) {
        return Err(GridError::InvalidRadius(sector.radius));
    }
    if !(sector.cell_size_deg.is_finite() && sector.cell_size_deg > 0.0) {
        return Err(GridError::InvalidCellSize(sector.cell_size_deg));
    }
    Ok(())
}

/// Lifetime counters for sector churn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Sectors whose mesh was built by this grid.
    pub sectors_built: u64,
    /// Sectors carried over by a recenter without rebuilding.
    pub sectors_reused: u64,
    /// Sectors released because they left the window.
    pub sectors_dropped: u64,
    /// Recenter operations performed.
    pub recenters: u64,
}

/// Outcome of one [`Planet::recenter`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecenterReport {
    /// Shift applied to the center.
    pub offset: CellOffset,
    /// Sectors moved to a new slot.
    pub reused: usize,
    /// Sectors built for slots that entered the window.
    pub built: usize,
    /// Sectors that left the window.
    pub dropped: usize,
}

/// The sliding tile grid.
pub struct Planet {
    center: CellCoord,
    render_radius: u32,
    side: usize,
    slots: Vec<Option<Sector>>,
    params: SectorParams,
    triangulations: TriangulationCache,
    stats: GridStats,
}

impl Planet {
    /// Builds every sector of the window around `params.center`.
    pub fn new(params: PlanetParams) -> Result<Self, GridError> {
        params.validate()?;
        let mut planet = Self::empty(params.render_radius, params.center, params.sector);
        planet.slots = planet.fill(planet.center, planet.empty_slots());
        tracing::info!(
            center = %planet.center,
            side = planet.side,
            detail = planet.params.detail,
            "built planet grid"
        );
        Ok(planet)
    }

    /// Builds a grid around a sector restored from storage.
    ///
    /// The loaded sector becomes the center tile as-is, keeping its caches;
    /// only the surrounding tiles are built.
    pub fn from_sector(sector: Sector, render_radius: u32) -> Result<Self, GridError> {
        validate_render_radius(render_radius)?;
        validate_sector(sector.params())?;

        let mut planet = Self::empty(render_radius, sector.cell(), sector.params().clone());
        let detail = planet.params.detail;
        planet
            .triangulations
            .adopt(detail, sector.shared_indices().clone());

        let mut slots = planet.empty_slots();
        let middle = planet.slot_index(planet.middle(), planet.middle());
        slots[middle] = Some(sector);
        planet.slots = planet.fill(planet.center, slots);
        tracing::info!(center = %planet.center, side = planet.side, "built planet grid around loaded sector");
        Ok(planet)
    }

    fn empty(render_radius: u32, center: CellCoord, params: SectorParams) -> Self {
        let side = 2 * render_radius as usize - 1;
        Self {
            center,
            render_radius,
            side,
            slots: Vec::new(),
            params,
            triangulations: TriangulationCache::new(),
            stats: GridStats::default(),
        }
    }

    fn empty_slots(&self) -> Vec<Option<Sector>> {
        (0..self.side * self.side).map(|_| None).collect()
    }

    /// Index of the middle row and column.
    fn middle(&self) -> usize {
        self.render_radius as usize - 1
    }

    fn slot_index(&self, row: usize, col: usize) -> usize {
        row * self.side + col
    }

    /// Identity of the sector that belongs in `(row, col)` around `center`.
    fn slot_cell(&self, center: CellCoord, row: usize, col: usize) -> CellCoord {
        let middle = self.middle() as i32;
        center.offset(col as i32 - middle, row as i32 - middle)
    }

    /// Builds a sector for every empty slot.
    fn fill(&mut self, center: CellCoord, mut slots: Vec<Option<Sector>>) -> Vec<Option<Sector>> {
        for row in 0..self.side {
            for col in 0..self.side {
                let index = self.slot_index(row, col);
                if slots[index].is_some() {
                    continue;
                }
                let cell = self.slot_cell(center, row, col);
                let indices = self.triangulations.get(self.params.detail);
                slots[index] = Some(Sector::with_indices(cell, self.params.clone(), indices));
                self.stats.sectors_built += 1;
            }
        }
        slots
    }

    /// Shifts the window so that its center becomes `center + offset`.
    ///
    /// Sectors that stay inside the window move to their new slot untouched;
    /// sectors that leave are dropped; slots that enter are built. An offset
    /// wider than the window is allowed and simply rebuilds every slot.
    ///
    /// Cell indices saturate at the `i32` range; the report carries the shift
    /// actually applied.
    pub fn recenter(&mut self, offset: CellOffset) -> RecenterReport {
        self.move_center(self.center + offset)
    }

    /// Shifts the window so that `cell` becomes its center.
    pub fn recenter_to(&mut self, cell: CellCoord) -> RecenterReport {
        self.move_center(cell)
    }

    fn move_center(&mut self, new_center: CellCoord) -> RecenterReport {
        let mut report = RecenterReport {
            offset: new_center - self.center,
            ..Default::default()
        };
        if new_center == self.center {
            return report;
        }

        let d_lon = i64::from(new_center.lon) - i64::from(self.center.lon);
        let d_lat = i64::from(new_center.lat) - i64::from(self.center.lat);
        let side = self.side as i64;
        if d_lon.abs() >= side || d_lat.abs() >= side {
            tracing::debug!(d_lon, d_lat, side, "offset exceeds window, rebuilding every sector");
        }

        let old = std::mem::take(&mut self.slots);
        let mut next = self.empty_slots();

        for (index, slot) in old.into_iter().enumerate() {
            let Some(sector) = slot else {
                continue;
            };
            let row = (index / self.side) as i64 - d_lat;
            let col = (index % self.side) as i64 - d_lon;
            if (0..side).contains(&row) && (0..side).contains(&col) {
                next[self.slot_index(row as usize, col as usize)] = Some(sector);
                report.reused += 1;
            } else {
                report.dropped += 1;
            }
        }

        let built_before = self.stats.sectors_built;
        let next = self.fill(new_center, next);
        report.built = (self.stats.sectors_built - built_before) as usize;

        self.slots = next;
        self.center = new_center;

        self.stats.sectors_reused += report.reused as u64;
        self.stats.sectors_dropped += report.dropped as u64;
        self.stats.recenters += 1;

        tracing::debug!(
            center = %self.center,
            reused = report.reused,
            built = report.built,
            dropped = report.dropped,
            "recentered planet grid"
        );
        report
    }

    /// Recenters on `(longitude, latitude)` once it is more than half a cell
    /// away from the current center. Returns what changed, if anything.
    pub fn track(&mut self, longitude: f64, latitude: f64) -> Option<RecenterReport> {
        let offset = recenter_offset(self.center, longitude, latitude, self.params.cell_size_deg)?;
        Some(self.recenter(offset))
    }

    /// Cell at the middle of the window.
    pub fn center(&self) -> CellCoord {
        self.center
    }

    /// Render radius the window was built with.
    pub fn render_radius(&self) -> u32 {
        self.render_radius
    }

    /// Window width and height in sectors.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Geometry shared by all sectors.
    pub fn params(&self) -> &SectorParams {
        &self.params
    }

    /// Base radius of the planet.
    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    /// Sector in slot `(row, col)`, if the slot exists.
    pub fn sector_at(&self, row: usize, col: usize) -> Option<&Sector> {
        if row >= self.side || col >= self.side {
            return None;
        }
        self.slots[self.slot_index(row, col)].as_ref()
    }

    /// The sector at the center cell.
    pub fn center_sector(&self) -> Option<&Sector> {
        self.sector_at(self.middle(), self.middle())
    }

    /// Sector with identity `cell`, if it lies inside the window.
    pub fn sector_for(&self, cell: CellCoord) -> Option<&Sector> {
        let middle = self.middle() as i64;
        let offset = cell - self.center;
        let row = i64::from(offset.lat) + middle;
        let col = i64::from(offset.lon) + middle;
        if row < 0 || col < 0 {
            return None;
        }
        self.sector_at(row as usize, col as usize)
    }

    /// All sectors, row by row.
    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.slots.iter().flatten()
    }

    /// Cartesian center of the center sector, or of the center cell if the
    /// grid is somehow empty.
    pub fn center_point(&self) -> DVec3 {
        match self.center_sector() {
            Some(sector) => sector.center(),
            None => {
                let (lon, lat) = self.center.center_angles(self.params.cell_size_deg);
                landsim_terrain::sphere_point(
                    lon,
                    lat,
                    self.params.radius + landsim_terrain::SECTOR_CENTER_LIFT,
                )
            }
        }
    }

    /// True if every slot holds the sector its position implies.
    pub fn is_consistent(&self) -> bool {
        (0..self.side).all(|row| {
            (0..self.side).all(|col| {
                self.sector_at(row, col)
                    .is_some_and(|s| s.cell() == self.slot_cell(self.center, row, col))
            })
        })
    }

    /// Draws every sector.
    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, mode: DrawMode) {
        for sector in self.sectors() {
            sector.draw(backend, mode);
        }
    }

    /// Lifetime churn counters.
    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// Number of distinct index buffers the grid has triangulated.
    pub fn triangulation_levels(&self) -> usize {
        self.triangulations.len()
    }
}
