//! Planet surface sectors: angular cells, cached terrain meshes, the LSEC
//! persistence format, and the rendering backend interface they draw into.

pub mod cell;
pub mod mesh;
pub mod render;
pub mod sector;
pub mod sector_serial;

pub use cell::{AngularBounds, CellCoord, CellOffset};
pub use mesh::{
    MAX_DETAIL, SurfaceMesh, TriangulationCache, build_surface, triangulate, vertex_count,
};
pub use render::{DrawCall, DrawMode, RecordingBackend, RenderBackend};
pub use sector::{Sector, SectorInfo, SectorParams};
pub use sector_serial::{SectorIoError, SectorSerError};
