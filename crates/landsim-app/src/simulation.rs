//! One simulated world: grid, lander, camera, and the commands that steer them.
//!
//! Every frame runs in a fixed order: queued commands, then fixed lander
//! steps (each followed by the grid's recenter check), then drawing.

use std::path::PathBuf;

use crossbeam_channel::Receiver;
use glam::DVec3;
use landsim_config::{Config, ConfigError, LanderConfig, PlanetConfig};
use landsim_planet::{GridError, Planet, PlanetParams};
use landsim_player::{CameraView, Lander, LanderState, SectorCamera};
use landsim_sector::{CellCoord, DrawMode, RenderBackend, SectorParams};

use crate::console::{Command, LoadTarget};
use crate::game_loop::{FIXED_DT, Frame};
use crate::storage::{StoreError, TileStore};

/// Errors that stop a simulation from starting.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The grid could not be built.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The tile directory is unusable.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Grid parameters described by a planet config section.
pub fn planet_params(planet: &PlanetConfig) -> PlanetParams {
    PlanetParams {
        render_radius: planet.render_radius,
        center: CellCoord::new(planet.center_lon, planet.center_lat),
        sector: SectorParams {
            name: planet.name.clone(),
            radius: planet.radius,
            detail: planet.detail,
            cell_size_deg: planet.cell_size_deg,
        },
    }
}

fn lander_state(lander: &LanderConfig) -> LanderState {
    LanderState::from_degrees(
        lander.longitude_deg,
        lander.latitude_deg,
        lander.height,
        [lander.v_longitude, lander.v_latitude, lander.v_height],
        lander.size,
    )
}

/// The running world.
pub struct Simulation {
    config: Config,
    config_dir: Option<PathBuf>,
    planet: Planet,
    lander: Option<Lander>,
    camera: SectorCamera,
    mode: DrawMode,
    show_axes: bool,
    store: TileStore,
    commands: Receiver<Command>,
    running: bool,
}

impl Simulation {
    /// Builds the grid and optional lander described by `config`.
    ///
    /// `config_dir` is where `reload` looks for `config.ron`; `commands` is
    /// the console queue drained at the start of every frame.
    pub fn new(
        config: Config,
        config_dir: Option<PathBuf>,
        store: TileStore,
        commands: Receiver<Command>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let planet = Planet::new(planet_params(&config.planet))?;
        let lander = config
            .lander
            .spawn
            .then(|| Lander::new(lander_state(&config.lander)));
        let mode = if config.debug.wireframe_mode {
            DrawMode::Wireframe
        } else {
            DrawMode::Solid
        };
        let show_axes = config.debug.show_axes;

        let sim = Self {
            config,
            config_dir,
            planet,
            lander,
            camera: SectorCamera::default(),
            mode,
            show_axes,
            store,
            commands,
            running: true,
        };
        tracing::info!("{}", sim.caption());
        Ok(sim)
    }

    /// False once `quit` has been processed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current configuration, including changes made from the console.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The tile grid.
    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    /// The lander, if one has been spawned. Removed landers stay until
    /// replaced.
    pub fn lander(&self) -> Option<&Lander> {
        self.lander.as_ref()
    }

    /// The camera.
    pub fn camera(&self) -> &SectorCamera {
        &self.camera
    }

    /// Current draw mode.
    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Whether the axes are drawn.
    pub fn show_axes(&self) -> bool {
        self.show_axes
    }

    /// Status line: draw mode, lander and follow state, planet name.
    pub fn caption(&self) -> String {
        let lander = if self.lander.as_ref().is_some_and(Lander::is_active) {
            " + LANDER"
        } else {
            ""
        };
        let follow = if self.camera.follow_lander {
            " [FOLLOW]"
        } else {
            ""
        };
        format!(
            "LandingSim - {}{lander}{follow} - {}",
            self.mode.label(),
            self.planet.params().name
        )
    }

    /// Runs one frame: commands, `frame.steps` fixed updates, then drawing.
    pub fn run_frame<B: RenderBackend + ?Sized>(
        &mut self,
        frame: Frame,
        backend: &mut B,
    ) -> CameraView {
        self.drain_commands();
        if self.running {
            for _ in 0..frame.steps {
                self.update(FIXED_DT);
            }
        }
        self.render(backend)
    }

    /// Applies every queued command in arrival order.
    pub fn drain_commands(&mut self) {
        let caption = self.caption();
        while self.running
            && let Ok(command) = self.commands.try_recv()
        {
            self.apply(command);
        }
        let updated = self.caption();
        if updated != caption {
            tracing::info!("{updated}");
        }
    }

    /// Applies one command. Failures are logged and leave the world as it was.
    pub fn apply(&mut self, command: Command) {
        tracing::debug!(?command, "applying console command");
        match command {
            Command::Grid {
                render_radius,
                center_lon,
                center_lat,
                radius,
                detail,
                name,
            } => {
                let mut planet = self.config.planet.clone();
                planet.render_radius = render_radius;
                planet.center_lon = center_lon;
                planet.center_lat = center_lat;
                planet.radius = radius;
                planet.detail = detail;
                if let Some(name) = name {
                    planet.name = name;
                }
                self.replace_planet(planet);
            }
            Command::Lander {
                longitude_deg,
                latitude_deg,
                height,
                velocity,
                size,
            } => {
                let state =
                    LanderState::from_degrees(longitude_deg, latitude_deg, height, velocity, size);
                self.lander = Some(Lander::new(state));
            }
            Command::RemoveLander => match self.lander.as_mut() {
                Some(lander) if lander.is_active() => lander.deactivate(),
                _ => tracing::warn!("no lander to remove"),
            },
            Command::ToggleWireframe => self.mode = self.mode.toggled(),
            Command::ToggleFollow => {
                self.camera.toggle_follow();
            }
            Command::ToggleAxes => self.show_axes = !self.show_axes,
            Command::Info => self.log_info(),
            Command::Save => self.save_center(),
            Command::List => self.log_listing(),
            Command::Load(target) => self.load(&target),
            Command::Zoom(delta) => self.camera.zoom(delta),
            Command::Rotate(dx, dy) => self.camera.rotate(dx, dy),
            Command::ResetCamera => self.camera.reset(),
            Command::Reload => self.reload_config(),
            Command::Quit => {
                tracing::info!("quit requested");
                self.running = false;
            }
        }
    }

    /// Advances the lander by `dt` and recenters the grid under it.
    pub fn update(&mut self, dt: f64) {
        let Some(lander) = self.lander.as_mut().filter(|l| l.is_active()) else {
            return;
        };
        lander.step_over(dt, landsim_terrain::height);

        if let Some(report) = self.planet.track(lander.longitude(), lander.latitude()) {
            tracing::debug!(
                center = %self.planet.center(),
                built = report.built,
                "grid followed lander"
            );
        }
    }

    /// Draws the grid, lander and axes, returning the camera used.
    pub fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B) -> CameraView {
        let radius = self.planet.radius();
        let view = self
            .camera
            .view(self.planet.center_point(), self.lander.as_ref(), radius);

        backend.begin_mode(self.mode);
        self.planet.draw(backend, self.mode);
        if let Some(lander) = &self.lander {
            lander.draw(backend, radius);
        }
        if self.show_axes {
            backend.draw_lines(&axis_lines(radius * 1.5));
        }
        view
    }

    fn replace_planet(&mut self, planet: PlanetConfig) {
        let mut candidate = self.config.clone();
        candidate.planet = planet;
        if let Err(e) = candidate.validate() {
            tracing::warn!("grid not changed: {e}");
            return;
        }
        match Planet::new(planet_params(&candidate.planet)) {
            Ok(grid) => {
                self.planet = grid;
                self.config = candidate;
            }
            Err(e) => tracing::warn!("grid not changed: {e}"),
        }
    }

    fn log_info(&self) {
        match self.planet.center_sector() {
            Some(sector) => tracing::info!("\n{}", sector.info()),
            None => tracing::warn!("grid has no center sector"),
        }
        let stats = self.planet.stats();
        tracing::info!(
            center = %self.planet.center(),
            side = self.planet.side(),
            built = stats.sectors_built,
            reused = stats.sectors_reused,
            dropped = stats.sectors_dropped,
            recenters = stats.recenters,
            "grid"
        );
        if let Some(lander) = self.lander.as_ref().filter(|l| l.is_active()) {
            tracing::info!(
                lon_deg = lander.longitude().to_degrees(),
                lat_deg = lander.latitude().to_degrees(),
                height = lander.height(),
                ground = lander.ground_clearance(),
                "lander"
            );
        }
    }

    fn save_center(&self) {
        let Some(sector) = self.planet.center_sector() else {
            tracing::warn!("grid has no center sector to save");
            return;
        };
        match self.store.save(sector) {
            Ok(path) => tracing::info!("saved {}", path.display()),
            Err(e) => tracing::error!("save failed: {e}"),
        }
    }

    fn log_listing(&self) {
        match self.store.list() {
            Ok(names) if names.is_empty() => {
                tracing::info!("no saved tiles in {}", self.store.root().display())
            }
            Ok(names) => {
                for (i, name) in names.iter().enumerate() {
                    tracing::info!("{}. {name}", i + 1);
                }
            }
            Err(e) => tracing::error!("listing failed: {e}"),
        }
    }

    fn load(&mut self, target: &LoadTarget) {
        let sector = match self.store.load(target) {
            Ok(sector) => sector,
            Err(e) => {
                tracing::error!("load failed: {e}");
                return;
            }
        };
        let params = sector.params().clone();
        let cell = sector.cell();
        match Planet::from_sector(sector, self.config.planet.render_radius) {
            Ok(grid) => {
                let planet = &mut self.config.planet;
                planet.name = params.name;
                planet.radius = params.radius;
                planet.detail = params.detail;
                planet.cell_size_deg = params.cell_size_deg;
                planet.center_lon = cell.lon;
                planet.center_lat = cell.lat;
                self.planet = grid;
            }
            Err(e) => tracing::error!("loaded tile unusable: {e}"),
        }
    }

    fn reload_config(&mut self) {
        let Some(dir) = self.config_dir.as_deref() else {
            tracing::warn!("no config directory to reload from");
            return;
        };
        let fresh = match self.config.reload(dir) {
            Ok(Some(fresh)) => fresh,
            Ok(None) => {
                tracing::info!("config unchanged");
                return;
            }
            Err(e) => {
                tracing::warn!("config not reloaded: {e}");
                return;
            }
        };

        if fresh.planet != self.config.planet {
            match Planet::new(planet_params(&fresh.planet)) {
                Ok(grid) => self.planet = grid,
                Err(e) => {
                    tracing::warn!("config not reloaded: {e}");
                    return;
                }
            }
        }
        if fresh.debug.wireframe_mode != self.config.debug.wireframe_mode {
            self.mode = if fresh.debug.wireframe_mode {
                DrawMode::Wireframe
            } else {
                DrawMode::Solid
            };
        }
        if fresh.debug.show_axes != self.config.debug.show_axes {
            self.show_axes = fresh.debug.show_axes;
        }
        self.config = fresh;
    }
}

/// Three axis segments from the origin.
fn axis_lines(length: f64) -> Vec<[f32; 3]> {
    let origin = DVec3::ZERO.as_vec3().to_array();
    [DVec3::X, DVec3::Y, DVec3::Z]
        .iter()
        .flat_map(|axis| [origin, (*axis * length).as_vec3().to_array()])
        .collect()
}
