//! Sphere-point mapping between angular and Cartesian coordinates.
//!
//! Y is up; longitude zero lies on +X and increases toward +Z.

use glam::DVec3;

/// Height above the base radius used for a sector's Cartesian center point.
pub const SECTOR_CENTER_LIFT: f64 = 0.05;

/// Cartesian point at `(longitude, latitude)` on a sphere of `radius`.
pub fn sphere_point(longitude: f64, latitude: f64, radius: f64) -> DVec3 {
    let cos_lat = latitude.cos();
    DVec3::new(
        radius * cos_lat * longitude.cos(),
        radius * latitude.sin(),
        radius * cos_lat * longitude.sin(),
    )
}

/// Outward unit normal of the unperturbed sphere at `(longitude, latitude)`.
///
/// Falls back to the raw direction when its length is degenerate.
pub fn surface_normal(longitude: f64, latitude: f64) -> DVec3 {
    let raw = sphere_point(longitude, latitude, 1.0);
    let length = raw.length();
    if length > f64::EPSILON { raw / length } else { raw }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_origin_angles_map_to_pos_x() {
        let p = sphere_point(0.0, 0.0, 7.0);
        assert!((p - DVec3::new(7.0, 0.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_north_pole_maps_to_pos_y() {
        let p = sphere_point(1.234, FRAC_PI_2, 5.0);
        assert!((p - DVec3::new(0.0, 5.0, 0.0)).length() < 1e-9, "got {p}");
    }

    #[test]
    fn test_quarter_longitude_maps_to_pos_z() {
        let p = sphere_point(FRAC_PI_2, 0.0, 2.0);
        assert!((p - DVec3::new(0.0, 0.0, 2.0)).length() < 1e-9, "got {p}");
    }

    #[test]
    fn test_point_length_equals_radius() {
        let p = sphere_point(0.7, -FRAC_PI_4, 3.5);
        assert!((p.length() - 3.5).abs() < EPSILON);
    }

    #[test]
    fn test_surface_normal_is_unit_and_radial() {
        let n = surface_normal(0.3, 0.4);
        assert!((n.length() - 1.0).abs() < EPSILON);
        let p = sphere_point(0.3, 0.4, 9.0);
        assert!((p.normalize() - n).length() < EPSILON);
    }
}
