//! Binary serialization and deserialization for [`Sector`].
//!
//! The LSEC (LandingSim Sector) format stores a tile's identity, geometry
//! parameters and all three caches so that a loaded tile can be drawn without
//! touching the noise field.
//!
//! ## Binary Layout
//!
//! All integers and floats are little-endian.
//!
//! | Size | Field |
//! |------|-------|
//! | 4 | Magic bytes `"LSEC"` |
//! | 1 | Format version (`u8`, currently 1) |
//! | 4 + 4 | Cell longitude, latitude (`i32`) |
//! | 8 | Base radius (`f64`) |
//! | 4 | Detail (`u32`) |
//! | 8 | Cell size in degrees (`f64`) |
//! | 2 + N | Name length (`u16`) and UTF-8 bytes |
//! | 4 + V×12 | Vertex count (`u32`) and positions (3 × `f32`) |
//! | 4 + V×12 | Normal count (`u32`) and normals (3 × `f32`) |
//! | 4 + I×4 | Index count (`u32`) and indices (`u32`) |
//!
//! Empty caches are valid and are rebuilt lazily on first access.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::cell::CellCoord;
use crate::mesh::{MAX_DETAIL, SurfaceMesh, triangulate, vertex_count};
use crate::sector::{Sector, SectorParams};

/// Magic bytes identifying the LSEC format.
const MAGIC: [u8; 4] = *b"LSEC";

/// Current format version.
const FORMAT_VERSION: u8 = 1;

/// Bytes before the name: magic, version, cell, radius, detail, cell size.
const FIXED_HEADER_LEN: usize = 4 + 1 + 8 + 8 + 4 + 8;

/// Errors that can occur during sector deserialization.
#[derive(Debug, thiserror::Error)]
pub enum SectorSerError {
    /// The data does not start with the expected magic bytes.
    #[error("invalid magic bytes")]
    InvalidMagic,
    /// The format version is not supported by this build.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),
    /// The data is shorter than expected.
    #[error("data truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum expected byte count.
        expected: usize,
        /// Actual byte count received.
        actual: usize,
    },
    /// Bytes remain after the index buffer.
    #[error("{0} trailing bytes after sector record")]
    TrailingBytes(usize),
    /// The planet name is not valid UTF-8.
    #[error("planet name is not valid UTF-8")]
    InvalidName,
    /// Radius, detail or cell size cannot describe a sector.
    #[error("invalid sector parameters: {0}")]
    InvalidParams(&'static str),
    /// A cache does not match the size implied by the detail level.
    #[error("{cache} cache holds {actual} entries, expected {expected}")]
    CacheSize {
        /// Which cache is malformed.
        cache: &'static str,
        /// Entry count implied by the header.
        expected: usize,
        /// Entry count found.
        actual: usize,
    },
    /// The index buffer is not the triangulation of the stored detail level.
    #[error("index cache does not match the triangulation for detail {0}")]
    IndexMismatch(u32),
}

/// Errors from saving or loading sector files.
#[derive(Debug, thiserror::Error)]
pub enum SectorIoError {
    /// The file could not be read or written.
    #[error("sector file I/O failed for {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file contents are not a valid sector record.
    #[error("sector file {path} is malformed: {source}")]
    Format {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: SectorSerError,
    },
}

impl Sector {
    /// Serializes this sector to a byte vector in the LSEC binary format.
    ///
    /// Only caches that are currently populated are written; nothing is built.
    pub fn serialize(&self) -> Vec<u8> {
        let params = self.params();
        let cell = self.cell();
        let mesh = self.mesh.get();
        let indices = self.indices.get();

        let mut buf = Vec::with_capacity(self.encoded_len());

        buf.extend_from_slice(&MAGIC);
        buf.push(FORMAT_VERSION);

        buf.extend_from_slice(&cell.lon.to_le_bytes());
        buf.extend_from_slice(&cell.lat.to_le_bytes());
        buf.extend_from_slice(&params.radius.to_le_bytes());
        buf.extend_from_slice(&params.detail.to_le_bytes());
        buf.extend_from_slice(&params.cell_size_deg.to_le_bytes());

        let name = name_bytes(&params.name);
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(name);

        let empty = SurfaceMesh::default();
        let mesh = mesh.unwrap_or(&empty);
        write_points(&mut buf, &mesh.vertices);
        write_points(&mut buf, &mesh.normals);

        let indices: &[u32] = indices.map(|i| &i[..]).unwrap_or_default();
        buf.extend_from_slice(&(indices.len() as u32).to_le_bytes());
        for index in indices {
            buf.extend_from_slice(&index.to_le_bytes());
        }

        buf
    }

    /// Exact length of [`serialize`](Self::serialize) output.
    pub fn encoded_len(&self) -> usize {
        let points = self.mesh.get().map_or(0, SurfaceMesh::len);
        let indices = self.indices.get().map_or(0, |i| i.len());
        FIXED_HEADER_LEN
            + 2
            + name_bytes(&self.params().name).len()
            + 2 * (4 + points * 12)
            + 4
            + indices * 4
    }

    /// Deserializes a sector from a byte slice in the LSEC binary format.
    ///
    /// Returns an error if the data is corrupted, has an unrecognized version,
    /// is truncated, or its caches disagree with its detail level.
    pub fn deserialize(data: &[u8]) -> Result<Self, SectorSerError> {
        if data.len() < 4 || data[0..4] != MAGIC {
            return Err(SectorSerError::InvalidMagic);
        }

        let mut reader = Reader::new(data, 4);
        let version = reader.u8()?;
        if version != FORMAT_VERSION {
            return Err(SectorSerError::UnsupportedVersion(version));
        }

        let cell = CellCoord::new(reader.i32()?, reader.i32()?);
        let radius = reader.f64()?;
        let detail = reader.u32()?;
        let cell_size_deg = reader.f64()?;

        if !(radius.is_finite() && radius > 0.0) {
            return Err(SectorSerError::InvalidParams("radius must be positive"));
        }
        if detail == 0 {
            return Err(SectorSerError::InvalidParams("detail must be at least 1"));
        }
        if detail > MAX_DETAIL {
            return Err(SectorSerError::InvalidParams("detail exceeds the supported maximum"));
        }
        if !(cell_size_deg.is_finite() && cell_size_deg > 0.0) {
            return Err(SectorSerError::InvalidParams("cell size must be positive"));
        }

        let name_len = reader.u16()? as usize;
        let name = std::str::from_utf8(reader.take(name_len)?)
            .map_err(|_| SectorSerError::InvalidName)?
            .to_string();

        let vertices = reader.points()?;
        let normals = reader.points()?;
        let index_count = reader.u32()? as usize;
        let indices = (0..index_count)
            .map(|_| reader.u32())
            .collect::<Result<Vec<_>, _>>()?;

        if reader.remaining() > 0 {
            return Err(SectorSerError::TrailingBytes(reader.remaining()));
        }

        if vertices.len() != normals.len() {
            return Err(SectorSerError::CacheSize {
                cache: "normal",
                expected: vertices.len(),
                actual: normals.len(),
            });
        }
        let expected_points = vertex_count(detail);
        if !vertices.is_empty() && vertices.len() != expected_points {
            return Err(SectorSerError::CacheSize {
                cache: "vertex",
                expected: expected_points,
                actual: vertices.len(),
            });
        }
        if !indices.is_empty() && indices != triangulate(detail) {
            return Err(SectorSerError::IndexMismatch(detail));
        }

        let params = SectorParams {
            name,
            radius,
            detail,
            cell_size_deg,
        };
        let mut sector = Sector::unbuilt(cell, params);
        if !vertices.is_empty() {
            sector.mesh = OnceLock::from(SurfaceMesh { vertices, normals });
        }
        if !indices.is_empty() {
            sector.indices = OnceLock::from(Arc::<[u32]>::from(indices));
        }
        Ok(sector)
    }

    /// Default file name for this sector: `<name>_<lon>_<lat>.bin`.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .params()
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("{}_{}_{}.bin", stem, self.cell().lon, self.cell().lat)
    }

    /// Writes this sector into `dir` under [`file_name`](Self::file_name).
    ///
    /// Returns the path written.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, SectorIoError> {
        let path = dir.join(self.file_name());
        self.save_to_file(&path)?;
        Ok(path)
    }

    /// Writes this sector to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SectorIoError> {
        std::fs::write(path, self.serialize()).map_err(|source| SectorIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), cell = %self.cell(), "saved sector");
        Ok(())
    }

    /// Reads a sector from `path`.
    pub fn load_from_file(path: &Path) -> Result<Self, SectorIoError> {
        let data = std::fs::read(path).map_err(|source| SectorIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let sector = Self::deserialize(&data).map_err(|source| SectorIoError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), cell = %sector.cell(), "loaded sector");
        Ok(sector)
    }
}

/// Name bytes as stored: truncated to the `u16` length prefix on a char
/// boundary.
fn name_bytes(name: &str) -> &[u8] {
    let mut end = name.len().min(u16::MAX as usize);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name.as_bytes()[..end]
}

fn write_points(buf: &mut Vec<u8>, points: &[[f32; 3]]) {
    buf.extend_from_slice(&(points.len() as u32).to_le_bytes());
    for point in points {
        for component in point {
            buf.extend_from_slice(&component.to_le_bytes());
        }
    }
}

/// Bounds-checked little-endian cursor.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SectorSerError> {
        let end = self.pos.saturating_add(len);
        if end > self.data.len() {
            return Err(SectorSerError::Truncated {
                expected: end,
                actual: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SectorSerError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, SectorSerError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, SectorSerError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, SectorSerError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32, SectorSerError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32, SectorSerError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn f64(&mut self) -> Result<f64, SectorSerError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn points(&mut self) -> Result<Vec<[f32; 3]>, SectorSerError> {
        let count = self.u32()? as usize;
        // Check the whole run up front so a corrupt count cannot over-allocate.
        let needed = count.saturating_mul(12);
        if needed > self.remaining() {
            return Err(SectorSerError::Truncated {
                expected: self.pos.saturating_add(needed),
                actual: self.data.len(),
            });
        }
        (0..count)
            .map(|_| -> Result<[f32; 3], SectorSerError> {
                Ok([self.f32()?, self.f32()?, self.f32()?])
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
