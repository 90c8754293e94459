//! A single planet tile and its memoized mesh.

use std::fmt;
use std::sync::{Arc, OnceLock};

use glam::DVec3;
use landsim_terrain::{SECTOR_CENTER_LIFT, sphere_point};

use crate::cell::{AngularBounds, CellCoord};
use crate::mesh::{SurfaceMesh, build_surface, triangulate};
use crate::render::{DrawMode, RenderBackend};

/// Geometry shared by every sector of one planet.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorParams {
    /// Planet name, used to label saved tiles.
    pub name: String,
    /// Base planet radius before displacement.
    pub radius: f64,
    /// Quads per side; each sector holds `(detail + 1)^2` samples.
    pub detail: u32,
    /// Angular span of a cell in degrees, on both axes.
    pub cell_size_deg: f64,
}

impl Default for SectorParams {
    fn default() -> Self {
        Self {
            name: "Null Area".to_string(),
            radius: 5.0,
            detail: 64,
            cell_size_deg: 1.0,
        }
    }
}

/// One tile of the planet surface.
///
/// The vertex/normal cache is filled when the sector is built and stays
/// immutable afterwards. A sector restored from storage with empty caches
/// fills them on first access instead.
pub struct Sector {
    cell: CellCoord,
    params: SectorParams,
    bounds: AngularBounds,
    center: DVec3,
    pub(crate) mesh: OnceLock<SurfaceMesh>,
    pub(crate) indices: OnceLock<Arc<[u32]>>,
}

impl Sector {
    /// Builds the sector at `cell`, triangulating its own index buffer.
    pub fn new(cell: CellCoord, params: SectorParams) -> Self {
        let indices: Arc<[u32]> = triangulate(params.detail).into();
        Self::with_indices(cell, params, indices)
    }

    /// Builds the sector at `cell` using a shared index buffer for its detail
    /// level.
    pub fn with_indices(cell: CellCoord, params: SectorParams, indices: Arc<[u32]>) -> Self {
        let mut sector = Self::unbuilt(cell, params);
        let mesh = build_surface(&sector.bounds, sector.params.radius, sector.params.detail);
        sector.mesh = OnceLock::from(mesh);
        sector.indices = OnceLock::from(indices);
        tracing::trace!(cell = %cell, detail = sector.params.detail, "built sector mesh");
        sector
    }

    /// A sector with no cached buffers.
    pub(crate) fn unbuilt(cell: CellCoord, params: SectorParams) -> Self {
        let bounds = cell.bounds(params.cell_size_deg);
        let (center_lon, center_lat) = bounds.center();
        let center = sphere_point(center_lon, center_lat, params.radius + SECTOR_CENTER_LIFT);
        Self {
            cell,
            params,
            bounds,
            center,
            mesh: OnceLock::new(),
            indices: OnceLock::new(),
        }
    }

    /// Identity of this sector.
    pub fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Geometry parameters.
    pub fn params(&self) -> &SectorParams {
        &self.params
    }

    /// Angular bounds in radians.
    pub fn bounds(&self) -> &AngularBounds {
        &self.bounds
    }

    /// Cartesian center point, slightly above the base radius.
    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// True if vertices and normals are cached.
    pub fn is_mesh_cached(&self) -> bool {
        self.mesh.get().is_some()
    }

    /// True if the index buffer is cached.
    pub fn is_indices_cached(&self) -> bool {
        self.indices.get().is_some()
    }

    /// Vertex and normal buffers, built on first access if absent.
    pub fn mesh(&self) -> &SurfaceMesh {
        self.mesh.get_or_init(|| {
            tracing::debug!(cell = %self.cell, "rebuilding sector mesh after load");
            build_surface(&self.bounds, self.params.radius, self.params.detail)
        })
    }

    /// Index buffer, triangulated on first access if absent.
    pub fn indices(&self) -> &[u32] {
        self.shared_indices()
    }

    /// The index buffer as a shareable handle.
    pub fn shared_indices(&self) -> &Arc<[u32]> {
        self.indices
            .get_or_init(|| triangulate(self.params.detail).into())
    }

    /// Emits the cached geometry to `backend`.
    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, mode: DrawMode) {
        let mesh = self.mesh();
        let indices = self.indices();
        match mode {
            DrawMode::Solid => backend.draw_triangles(&mesh.vertices, &mesh.normals, indices),
            DrawMode::Wireframe => backend.draw_lines(&wireframe_lines(&mesh.vertices, indices)),
        }
    }

    /// Summary of bounds, center and persisted size.
    pub fn info(&self) -> SectorInfo {
        let (center_lon, center_lat) = self.bounds.center();
        SectorInfo {
            cell: self.cell,
            name: self.params.name.clone(),
            lon_range_deg: (self.bounds.min_lon.to_degrees(), self.bounds.max_lon.to_degrees()),
            lat_range_deg: (self.bounds.min_lat.to_degrees(), self.bounds.max_lat.to_degrees()),
            center_lon_deg: center_lon.to_degrees(),
            center_lat_deg: center_lat.to_degrees(),
            center_xyz: self.center,
            byte_size: self.encoded_len(),
        }
    }
}

/// Three edges per triangle, two points per edge.
fn wireframe_lines(vertices: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut points = Vec::with_capacity(indices.len() * 2);
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| vertices[i as usize]);
        points.extend_from_slice(&[a, b, b, c, c, a]);
    }
    points
}

impl fmt::Debug for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sector")
            .field("cell", &self.cell)
            .field("params", &self.params)
            .field("mesh_cached", &self.is_mesh_cached())
            .field("indices_cached", &self.is_indices_cached())
            .finish()
    }
}

/// Human-facing summary of a sector.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorInfo {
    /// Identity.
    pub cell: CellCoord,
    /// Planet name.
    pub name: String,
    /// Western and eastern edges in degrees.
    pub lon_range_deg: (f64, f64),
    /// Southern and northern edges in degrees.
    pub lat_range_deg: (f64, f64),
    /// Center longitude in degrees.
    pub center_lon_deg: f64,
    /// Center latitude in degrees.
    pub center_lat_deg: f64,
    /// Cartesian center point.
    pub center_xyz: DVec3,
    /// Bytes the sector occupies when serialized.
    pub byte_size: usize,
}

impl fmt::Display for SectorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Area: {} {}", self.name, self.cell)?;
        writeln!(
            f,
            "Latitude: {:.1}° - {:.1}°",
            self.lat_range_deg.0, self.lat_range_deg.1
        )?;
        writeln!(
            f,
            "Longitude: {:.1}° - {:.1}°",
            self.lon_range_deg.0, self.lon_range_deg.1
        )?;
        writeln!(
            f,
            "Center: ({:.1}°, {:.1}°)",
            self.center_lat_deg, self.center_lon_deg
        )?;
        write!(f, "Data size: {} bytes", self.byte_size)
    }
}
