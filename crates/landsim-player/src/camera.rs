//! Orbit camera around the center tile, with an optional lander follow mode.

use glam::{DMat4, DQuat, DVec3};
use landsim_terrain::surface_normal;

use crate::lander::Lander;

/// Default orbit distance.
pub const DEFAULT_DISTANCE: f64 = 8.0;
/// Closest orbit distance.
pub const MIN_DISTANCE: f64 = 0.2;
/// Farthest orbit distance.
pub const MAX_DISTANCE: f64 = 30.0;
/// How far the follow camera sits from the lander along the surface normal.
pub const FOLLOW_DISTANCE: f64 = 3.0;
/// Extra world-space lift of the follow camera.
pub const FOLLOW_HEIGHT: f64 = 1.0;

/// Eye, target and up vector for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    /// Camera position.
    pub eye: DVec3,
    /// Point the camera looks at.
    pub target: DVec3,
    /// Up direction.
    pub up: DVec3,
}

impl CameraView {
    /// Right-handed view matrix.
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Camera that orbits the grid center and can lock onto the lander.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorCamera {
    /// Orbit distance, clamped to `[MIN_DISTANCE, MAX_DISTANCE]`.
    pub distance: f64,
    /// Pitch in degrees, clamped to `[-90, 90]`.
    pub rotation_x: f64,
    /// Yaw in degrees.
    pub rotation_y: f64,
    /// Follow the lander instead of orbiting.
    pub follow_lander: bool,
}

impl Default for SectorCamera {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            rotation_x: 0.0,
            rotation_y: 0.0,
            follow_lander: false,
        }
    }
}

impl SectorCamera {
    /// Moves the orbit in or out by `delta / 5`.
    pub fn zoom(&mut self, delta: f64) {
        if self.follow_lander {
            return;
        }
        self.distance = (self.distance + delta / 5.0).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Rotates the orbit by half a degree per unit of drag.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        if self.follow_lander {
            return;
        }
        self.rotation_y += dx * 0.5;
        self.rotation_x = (self.rotation_x + dy * 0.5).clamp(-90.0, 90.0);
    }

    /// Restores the default orbit. Follow mode is left as it is.
    pub fn reset(&mut self) {
        self.distance = DEFAULT_DISTANCE;
        self.rotation_x = 0.0;
        self.rotation_y = 0.0;
    }

    /// Flips follow mode and returns the new setting.
    pub fn toggle_follow(&mut self) -> bool {
        self.follow_lander = !self.follow_lander;
        tracing::info!(follow = self.follow_lander, "camera follow toggled");
        self.follow_lander
    }

    /// True if this frame's view tracks the lander.
    pub fn is_following(&self, lander: Option<&Lander>) -> bool {
        self.follow_lander && lander.is_some_and(Lander::is_active)
    }

    /// Computes the view for this frame.
    ///
    /// Orbit mode circles `center`; follow mode looks at the lander from
    /// behind and above. Follow mode without a live lander falls back to the
    /// orbit.
    pub fn view(&self, center: DVec3, lander: Option<&Lander>, planet_radius: f64) -> CameraView {
        match lander.filter(|l| self.follow_lander && l.is_active()) {
            Some(lander) => {
                let target = lander.cartesian_position(planet_radius);
                let normal = surface_normal(lander.longitude(), lander.latitude());
                CameraView {
                    eye: target - normal * FOLLOW_DISTANCE + DVec3::new(0.0, FOLLOW_HEIGHT, 0.0),
                    target,
                    up: DVec3::Y,
                }
            }
            None => self.orbit_view(center),
        }
    }

    fn orbit_view(&self, center: DVec3) -> CameraView {
        let rotation = DQuat::from_rotation_y(-self.rotation_y.to_radians())
            * DQuat::from_rotation_x(-self.rotation_x.to_radians());
        CameraView {
            eye: center + rotation * DVec3::new(0.0, 0.0, self.distance),
            target: center,
            up: rotation * DVec3::Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lander::LanderState;

    fn approx(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_zoom_clamps_to_range() {
        let mut cam = SectorCamera::default();
        cam.zoom(5.0);
        assert!((cam.distance - 9.0).abs() < 1e-12);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, MIN_DISTANCE);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_rotate_clamps_pitch() {
        let mut cam = SectorCamera::default();
        cam.rotate(20.0, 400.0);
        assert_eq!(cam.rotation_y, 10.0);
        assert_eq!(cam.rotation_x, 90.0);
        cam.rotate(0.0, -1000.0);
        assert_eq!(cam.rotation_x, -90.0);
    }

    #[test]
    fn test_zoom_and_rotate_ignored_while_following() {
        let mut cam = SectorCamera::default();
        cam.toggle_follow();
        cam.zoom(10.0);
        cam.rotate(10.0, 10.0);
        assert_eq!(cam.distance, DEFAULT_DISTANCE);
        assert_eq!(cam.rotation_x, 0.0);
        assert_eq!(cam.rotation_y, 0.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut cam = SectorCamera::default();
        cam.zoom(10.0);
        cam.rotate(30.0, 30.0);
        cam.reset();
        assert_eq!(cam, SectorCamera::default());
    }

    #[test]
    fn test_orbit_view_looks_at_center() {
        let cam = SectorCamera::default();
        let center = DVec3::new(7.05, 0.0, 0.0);
        let view = cam.view(center, None, 7.0);
        assert_eq!(view.target, center);
        assert!(approx(view.eye, center + DVec3::new(0.0, 0.0, DEFAULT_DISTANCE)));
        assert!(approx(view.up, DVec3::Y));
    }

    #[test]
    fn test_orbit_keeps_distance_when_rotated() {
        let mut cam = SectorCamera::default();
        cam.rotate(70.0, -40.0);
        let center = DVec3::new(1.0, 2.0, 3.0);
        let view = cam.view(center, None, 7.0);
        assert!(((view.eye - center).length() - DEFAULT_DISTANCE).abs() < 1e-9);
    }

    #[test]
    fn test_follow_view_tracks_lander() {
        let mut cam = SectorCamera::default();
        cam.toggle_follow();
        let lander = Lander::new(LanderState {
            height: 1.0,
            ..Default::default()
        });
        let view = cam.view(DVec3::ZERO, Some(&lander), 5.0);
        assert!(approx(view.target, DVec3::new(6.0, 0.0, 0.0)));
        assert!(approx(view.eye, DVec3::new(3.0, 1.0, 0.0)));
        assert_eq!(view.up, DVec3::Y);
        assert!(cam.is_following(Some(&lander)));
    }

    #[test]
    fn test_follow_without_live_lander_falls_back_to_orbit() {
        let mut cam = SectorCamera::default();
        cam.toggle_follow();
        let mut lander = Lander::new(LanderState::default());
        lander.deactivate();
        let center = DVec3::new(5.0, 0.0, 0.0);
        assert_eq!(cam.view(center, Some(&lander), 5.0), cam.view(center, None, 5.0));
        assert!(!cam.is_following(Some(&lander)));
    }

    #[test]
    fn test_view_matrix_maps_target_onto_forward_axis() {
        let cam = SectorCamera::default();
        let center = DVec3::new(5.0, 0.0, 0.0);
        let view = cam.view(center, None, 5.0);
        let in_view = view.view_matrix().transform_point3(center);
        assert!(approx(in_view, DVec3::new(0.0, 0.0, -DEFAULT_DISTANCE)));
    }
}
