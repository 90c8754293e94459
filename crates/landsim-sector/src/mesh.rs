//! Sector mesh construction: a regular (N+1)×(N+1) sample grid displaced by
//! the noise field, and the triangulation shared by every sector of detail N.
//!
//! Samples are stored latitude-major: sample `(lat, lon)` lives at index
//! `lat * (N + 1) + lon`.

use std::sync::Arc;

use landsim_terrain::{height, sphere_point, surface_normal};
use rustc_hash::FxHashMap;

use crate::cell::AngularBounds;

/// Vertex and normal buffers of one sector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Displaced surface positions.
    pub vertices: Vec<[f32; 3]>,
    /// Unit normals of the unperturbed sphere, parallel to `vertices`.
    pub normals: Vec<[f32; 3]>,
}

impl SurfaceMesh {
    /// Number of vertices in the mesh.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if neither buffer holds data.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Highest detail level a sector may use.
///
/// `(MAX_DETAIL + 1)²` sample indices fit comfortably in a `u32`.
pub const MAX_DETAIL: u32 = 1024;

/// Number of samples in a sector of the given detail.
///
/// Like every function here, `detail` is clamped to `1..=MAX_DETAIL`.
pub fn vertex_count(detail: u32) -> usize {
    let side = detail.clamp(1, MAX_DETAIL) as usize + 1;
    side * side
}

/// `detail + 1` evenly spaced angles from `min` to `max`, both inclusive.
fn sample_angles(min: f64, max: f64, detail: u32) -> impl Iterator<Item = f64> {
    (0..=detail).map(move |i| min + (i as f64 / detail as f64) * (max - min))
}

/// Builds the displaced vertex grid and its normals for `bounds`.
///
/// Evaluates the noise field exactly once per sample. Normals ignore the
/// displacement and point along the unperturbed sphere radius.
pub fn build_surface(bounds: &AngularBounds, radius: f64, detail: u32) -> SurfaceMesh {
    let detail = detail.clamp(1, MAX_DETAIL);
    let count = vertex_count(detail);
    let mut vertices = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);

    for latitude in sample_angles(bounds.min_lat, bounds.max_lat, detail) {
        for longitude in sample_angles(bounds.min_lon, bounds.max_lon, detail) {
            let effective_radius = radius + height(longitude, latitude);
            vertices.push(
                sphere_point(longitude, latitude, effective_radius)
                    .as_vec3()
                    .to_array(),
            );
            normals.push(surface_normal(longitude, latitude).as_vec3().to_array());
        }
    }

    SurfaceMesh { vertices, normals }
}

/// Triangle indices for a sample grid of the given detail.
///
/// Each quad emits `(first, second, first + 1)` and
/// `(second, second + 1, first + 1)`, where `second` is `first` one row up.
pub fn triangulate(detail: u32) -> Vec<u32> {
    let detail = detail.clamp(1, MAX_DETAIL);
    let row = detail + 1;
    let quads = detail as usize * detail as usize;
    let mut indices = Vec::with_capacity(quads * 6);

    for lat in 0..detail {
        let row_offset = lat * row;
        let next_row_offset = (lat + 1) * row;
        for lon in 0..detail {
            let first = row_offset + lon;
            let second = next_row_offset + lon;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    indices
}

/// Index buffers keyed by detail level, each computed once and shared.
#[derive(Debug, Default)]
pub struct TriangulationCache {
    levels: FxHashMap<u32, Arc<[u32]>>,
}

impl TriangulationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared index buffer for `detail`, triangulating on first request.
    pub fn get(&mut self, detail: u32) -> Arc<[u32]> {
        let detail = detail.clamp(1, MAX_DETAIL);
        Arc::clone(
            self.levels
                .entry(detail)
                .or_insert_with(|| triangulate(detail).into()),
        )
    }

    /// Adopts an existing buffer for `detail` unless one is already cached.
    ///
    /// Returns the buffer the cache holds afterwards.
    pub fn adopt(&mut self, detail: u32, indices: Arc<[u32]>) -> Arc<[u32]> {
        Arc::clone(
            self.levels
                .entry(detail.clamp(1, MAX_DETAIL))
                .or_insert(indices),
        )
    }

    /// Number of detail levels triangulated so far.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if nothing has been triangulated yet.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellCoord;
    use glam::Vec3;

    #[test]
    fn test_counts_follow_detail() {
        let mesh = build_surface(&CellCoord::new(0, 0).bounds(1.0), 7.0, 4);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.normals.len(), 25);
        assert_eq!(triangulate(4).len(), 96);
    }

    #[test]
    fn test_indices_independent_of_bounds() {
        let a = build_surface(&CellCoord::new(0, 0).bounds(1.0), 7.0, 6);
        let b = build_surface(&CellCoord::new(-40, 12).bounds(3.0), 2.0, 6);
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), vertex_count(6));
        assert_ne!(a.vertices, b.vertices);
        assert_eq!(triangulate(6), triangulate(6));
    }

    #[test]
    fn test_first_quad_winding() {
        let indices = triangulate(2);
        assert_eq!(&indices[..6], &[0, 3, 1, 3, 4, 1]);
        assert_eq!(&indices[6..12], &[1, 4, 2, 4, 5, 2]);
    }

    #[test]
    fn test_indices_stay_in_range() {
        for detail in [1, 3, 8, 17] {
            let max = vertex_count(detail) as u32;
            assert!(triangulate(detail).iter().all(|&i| i < max));
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let mesh = build_surface(&CellCoord::new(10, 30).bounds(5.0), 5.0, 8);
        for (i, n) in mesh.normals.iter().enumerate() {
            let len = Vec3::from_array(*n).length();
            assert!((len - 1.0).abs() < 1e-5, "normal {i} has length {len}");
        }
    }

    #[test]
    fn test_vertices_displaced_within_noise_amplitude() {
        let radius = 7.0;
        let mesh = build_surface(&CellCoord::new(2, 2).bounds(1.0), radius, 5);
        let bound = landsim_terrain::max_height() as f32 + 1e-4;
        for v in &mesh.vertices {
            let r = Vec3::from_array(*v).length();
            assert!((r - radius as f32).abs() <= bound, "radius {r} outside displacement band");
        }
    }

    #[test]
    fn test_corners_hit_bounds() {
        let bounds = CellCoord::new(1, 1).bounds(2.0);
        let mesh = build_surface(&bounds, 1.0, 3);
        let expected = surface_normal(bounds.min_lon, bounds.min_lat).as_vec3();
        assert!((Vec3::from_array(mesh.normals[0]) - expected).length() < 1e-6);
        let expected = surface_normal(bounds.max_lon, bounds.max_lat).as_vec3();
        assert!((Vec3::from_array(mesh.normals[15]) - expected).length() < 1e-6);
    }

    #[test]
    fn test_one_noise_evaluation_per_sample() {
        let before = landsim_terrain::evaluations();
        build_surface(&CellCoord::new(0, 0).bounds(1.0), 7.0, 4);
        assert_eq!(landsim_terrain::evaluations() - before, 25);
    }

    #[test]
    fn test_max_detail_indices_fit() {
        let indices = triangulate(MAX_DETAIL);
        assert_eq!(indices.len(), MAX_DETAIL as usize * MAX_DETAIL as usize * 6);
        let max = vertex_count(MAX_DETAIL) as u32;
        assert_eq!(indices.iter().copied().max(), Some(max - 1));
    }

    #[test]
    fn test_detail_beyond_max_is_clamped() {
        assert_eq!(triangulate(30_000).len(), triangulate(MAX_DETAIL).len());
        assert_eq!(vertex_count(u32::MAX), vertex_count(MAX_DETAIL));
    }

    #[test]
    fn test_cache_shares_buffers_per_detail() {
        let mut cache = TriangulationCache::new();
        let a = cache.get(4);
        let b = cache.get(4);
        let c = cache.get(5);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_adopt_keeps_existing_buffer() {
        let mut cache = TriangulationCache::new();
        let first = cache.get(3);
        let foreign: Arc<[u32]> = triangulate(3).into();
        let kept = cache.adopt(3, foreign);
        assert!(Arc::ptr_eq(&first, &kept));
    }
}
