//! Point-mass lander moving over the planet surface.
//!
//! Position is angular (longitude and latitude in radians) plus a height above
//! the base radius. Velocities are per second and persist until the lander
//! touches the ground, where vertical velocity is zeroed.

use glam::DVec3;
use landsim_sector::RenderBackend;
use landsim_terrain::sphere_point;

/// Kinematic state supplied when a lander is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanderState {
    /// Longitude in radians.
    pub longitude: f64,
    /// Latitude in radians.
    pub latitude: f64,
    /// Height above the base radius.
    pub height: f64,
    /// Longitude rate in radians per second.
    pub v_longitude: f64,
    /// Latitude rate in radians per second.
    pub v_latitude: f64,
    /// Vertical rate in units per second.
    pub v_height: f64,
    /// Half-extent of the drawn marker.
    pub size: f64,
}

impl Default for LanderState {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            height: 0.0,
            v_longitude: 0.0,
            v_latitude: 0.0,
            v_height: 0.0,
            size: 0.1,
        }
    }
}

impl LanderState {
    /// Builds a state from a position given in degrees.
    pub fn from_degrees(
        longitude_deg: f64,
        latitude_deg: f64,
        height: f64,
        velocity: [f64; 3],
        size: f64,
    ) -> Self {
        Self {
            longitude: longitude_deg.to_radians(),
            latitude: latitude_deg.to_radians(),
            height,
            v_longitude: velocity[0],
            v_latitude: velocity[1],
            v_height: velocity[2],
            size,
        }
    }
}

/// A lander. Once removed it stays removed; spawning another means building a
/// new instance.
#[derive(Clone, Debug)]
pub struct Lander {
    state: LanderState,
    ground_clearance: f64,
    active: bool,
}

/// Tetrahedron faces, wound outward.
const FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]];

impl Lander {
    /// Creates an active lander resting on a zero-height floor.
    pub fn new(state: LanderState) -> Self {
        tracing::info!(
            lon_deg = state.longitude.to_degrees(),
            lat_deg = state.latitude.to_degrees(),
            height = state.height,
            "lander spawned"
        );
        Self {
            state,
            ground_clearance: 0.0,
            active: true,
        }
    }

    /// Current kinematic state.
    pub fn state(&self) -> &LanderState {
        &self.state
    }

    /// Longitude in radians.
    pub fn longitude(&self) -> f64 {
        self.state.longitude
    }

    /// Latitude in radians.
    pub fn latitude(&self) -> f64 {
        self.state.latitude
    }

    /// Height above the base radius.
    pub fn height(&self) -> f64 {
        self.state.height
    }

    /// Lowest height the lander may reach.
    pub fn ground_clearance(&self) -> f64 {
        self.ground_clearance
    }

    /// Sets the floor under the lander, usually the terrain height below it.
    pub fn set_ground_clearance(&mut self, clearance: f64) {
        self.ground_clearance = clearance;
    }

    /// False once [`Lander::deactivate`] has been called.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Removes the lander. It no longer moves or draws.
    pub fn deactivate(&mut self) {
        if self.active {
            tracing::info!("lander removed");
        }
        self.active = false;
    }

    /// Advances the lander by `dt` seconds with explicit Euler integration,
    /// keeping it above the current [`ground_clearance`](Self::ground_clearance).
    pub fn step(&mut self, dt: f64) {
        let clearance = self.ground_clearance;
        self.step_over(dt, |_, _| clearance);
    }

    /// Like [`step`](Self::step), but samples `ground(longitude, latitude)`
    /// at the position reached after the horizontal move and clamps the
    /// height against that.
    pub fn step_over(&mut self, dt: f64, ground: impl FnOnce(f64, f64) -> f64) {
        if !self.active {
            return;
        }
        let s = &mut self.state;
        s.longitude += s.v_longitude * dt;
        s.latitude += s.v_latitude * dt;
        self.ground_clearance = ground(s.longitude, s.latitude);
        s.height += s.v_height * dt;

        if s.height < self.ground_clearance {
            if s.v_height != 0.0 {
                tracing::debug!(height = self.ground_clearance, "lander touched down");
            }
            s.height = self.ground_clearance;
            s.v_height = 0.0;
        }
    }

    /// Cartesian position at `planet_radius + height`.
    pub fn cartesian_position(&self, planet_radius: f64) -> DVec3 {
        sphere_point(
            self.state.longitude,
            self.state.latitude,
            planet_radius + self.state.height,
        )
    }

    /// Draws the lander as a tetrahedron around its position.
    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, planet_radius: f64) {
        if !self.active {
            return;
        }
        let p = self.cartesian_position(planet_radius);
        let s = self.state.size;
        let corners = [
            p + DVec3::new(0.0, s, 0.0),
            p + DVec3::new(-s, -s, -s),
            p + DVec3::new(s, -s, -s),
            p + DVec3::new(0.0, -s, s),
        ];

        let mut vertices = Vec::with_capacity(12);
        let mut normals = Vec::with_capacity(12);
        for [a, b, c] in FACES {
            let normal = (corners[b] - corners[a])
                .cross(corners[c] - corners[a])
                .normalize_or_zero()
                .as_vec3()
                .to_array();
            for i in [a, b, c] {
                vertices.push(corners[i].as_vec3().to_array());
                normals.push(normal);
            }
        }
        let indices: Vec<u32> = (0..vertices.len() as u32).collect();
        backend.draw_triangles(&vertices, &normals, &indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landsim_sector::{DrawCall, RecordingBackend};

    fn moving(v_height: f64) -> Lander {
        Lander::new(LanderState {
            height: 1.0,
            v_longitude: 0.1,
            v_latitude: -0.05,
            v_height,
            ..Default::default()
        })
    }

    #[test]
    fn test_step_integrates_velocity() {
        let mut lander = moving(0.5);
        lander.step(2.0);
        assert!((lander.longitude() - 0.2).abs() < 1e-12);
        assert!((lander.latitude() + 0.1).abs() < 1e-12);
        assert!((lander.height() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_height_clamped_to_ground_clearance() {
        let mut lander = moving(-3.0);
        lander.set_ground_clearance(0.02);
        lander.step(1.0);
        assert_eq!(lander.height(), 0.02);
        assert_eq!(lander.state().v_height, 0.0);

        // Horizontal motion continues on the ground.
        lander.step(1.0);
        assert_eq!(lander.height(), 0.02);
        assert!((lander.longitude() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_step_over_samples_ground_after_moving() {
        let mut lander = moving(-3.0);
        let mut sampled = None;
        lander.step_over(1.0, |lon, lat| {
            sampled = Some((lon, lat));
            lon
        });
        let (lon, lat) = sampled.unwrap();
        assert!((lon - 0.1).abs() < 1e-12);
        assert!((lat + 0.05).abs() < 1e-12);
        assert_eq!(lander.ground_clearance(), lon);
        assert_eq!(lander.height(), lon);
    }

    #[test]
    fn test_removed_lander_is_frozen() {
        let mut lander = moving(1.0);
        lander.deactivate();
        let before = *lander.state();
        lander.step(10.0);
        assert_eq!(*lander.state(), before);
        assert!(!lander.is_active());
    }

    #[test]
    fn test_cartesian_position_adds_height() {
        let lander = Lander::new(LanderState {
            height: 0.5,
            ..Default::default()
        });
        let p = lander.cartesian_position(5.0);
        assert!((p - DVec3::new(5.5, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_from_degrees_converts_position_only() {
        let state = LanderState::from_degrees(90.0, -45.0, 0.3, [0.01, 0.02, -0.1], 0.2);
        assert!((state.longitude - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((state.latitude + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert_eq!(state.v_latitude, 0.02);
        assert_eq!(state.size, 0.2);
    }

    #[test]
    fn test_draw_emits_four_faces() {
        let lander = Lander::new(LanderState::default());
        let mut backend = RecordingBackend::new();
        lander.draw(&mut backend, 5.0);
        assert_eq!(
            backend.calls,
            vec![DrawCall::Triangles {
                vertex_count: 12,
                index_count: 12,
            }]
        );
    }

    #[test]
    fn test_removed_lander_draws_nothing() {
        let mut lander = Lander::new(LanderState::default());
        lander.deactivate();
        let mut backend = RecordingBackend::new();
        lander.draw(&mut backend, 5.0);
        assert!(backend.calls.is_empty());
    }
}
