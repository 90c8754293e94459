//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "landsim";
const CONFIG_FILE: &str = "config.ron";

/// Highest accepted `planet.detail`, the largest mesh a sector can build.
pub const MAX_DETAIL: u32 = 1024;

/// Highest accepted `planet.render_radius`.
pub const MAX_RENDER_RADIUS: u32 = 16;

/// Platform configuration directory for LandingSim, if the OS exposes one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_NAME))
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Planet and grid settings.
    pub planet: PlanetConfig,
    /// Lander spawned at startup.
    pub lander: LanderConfig,
    /// Simulation loop settings.
    pub sim: SimConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Planet and tile grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Planet name, used to label saved tiles.
    pub name: String,
    /// Base radius before terrain displacement.
    pub radius: f64,
    /// Quads per sector side.
    pub detail: u32,
    /// Grid half-size; the window is `2 * render_radius - 1` sectors wide.
    pub render_radius: u32,
    /// Angular span of one cell in degrees.
    pub cell_size_deg: f64,
    /// Initial center cell, longitude index.
    pub center_lon: i32,
    /// Initial center cell, latitude index.
    pub center_lat: i32,
}

/// Lander spawned when the simulation starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanderConfig {
    /// Spawn a lander on startup.
    pub spawn: bool,
    /// Longitude in degrees.
    pub longitude_deg: f64,
    /// Latitude in degrees.
    pub latitude_deg: f64,
    /// Height above the base radius.
    pub height: f64,
    /// Longitude rate in radians per second.
    pub v_longitude: f64,
    /// Latitude rate in radians per second.
    pub v_latitude: f64,
    /// Vertical rate in units per second.
    pub v_height: f64,
    /// Marker size.
    pub size: f64,
}

/// Simulation loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Stop after this many frames (0 = run until `quit`).
    pub max_frames: u64,
    /// Sleep between frames to run at wall-clock speed.
    pub realtime: bool,
    /// Directory holding saved tiles. Empty uses the platform data directory.
    pub tiles_dir: Option<PathBuf>,
    /// Read console commands from stdin.
    pub console: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw tiles as wireframe instead of solid.
    pub wireframe_mode: bool,
    /// Draw the coordinate axes.
    pub show_axes: bool,
    /// Log level filter (error, warn, info, debug, trace).
    pub log_level: String,
}

// --- Defaults ---

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            name: "Null Area".to_string(),
            radius: 5.0,
            detail: 64,
            render_radius: 2,
            cell_size_deg: 1.0,
            center_lon: 0,
            center_lat: 0,
        }
    }
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self {
            spawn: false,
            longitude_deg: 0.0,
            latitude_deg: 0.0,
            height: 0.5,
            v_longitude: 0.0,
            v_latitude: 0.0,
            v_height: -0.1,
            size: 0.1,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_frames: 0,
            realtime: true,
            tiles_dir: None,
            console: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            wireframe_mode: true,
            show_axes: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planet = &self.planet;
        if !(1..=MAX_RENDER_RADIUS).contains(&planet.render_radius) {
            return Err(invalid(
                "planet.render_radius",
                format!("must be between 1 and {MAX_RENDER_RADIUS}"),
            ));
        }
        if !(1..=MAX_DETAIL).contains(&planet.detail) {
            return Err(invalid(
                "planet.detail",
                format!("must be between 1 and {MAX_DETAIL}"),
            ));
        }
        if !(planet.radius.is_finite() && planet.radius > 0.0) {
            return Err(invalid("planet.radius", format!("{} is not positive", planet.radius)));
        }
        if !(planet.cell_size_deg.is_finite() && planet.cell_size_deg > 0.0) {
            return Err(invalid(
                "planet.cell_size_deg",
                format!("{} is not positive", planet.cell_size_deg),
            ));
        }
        if planet.name.len() > usize::from(u16::MAX) {
            return Err(invalid("planet.name", "longer than 65535 bytes"));
        }

        let lander = &self.lander;
        let lander_values = [
            lander.longitude_deg,
            lander.latitude_deg,
            lander.height,
            lander.v_longitude,
            lander.v_latitude,
            lander.v_height,
        ];
        if lander_values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("lander", "position and velocity must be finite"));
        }
        if !(lander.size.is_finite() && lander.size > 0.0) {
            return Err(invalid("lander.size", format!("{} is not positive", lander.size)));
        }

        let level = self.debug.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(invalid(
                "debug.log_level",
                format!("unknown level {:?}", self.debug.log_level),
            ));
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    ///
    /// A file that fails validation is an error and leaves `self` in charge.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("detail: 64"));
        assert!(ron_str.contains("name: \"Null Area\""));
    }

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.sim.tiles_dir = Some(PathBuf::from("/tmp/tiles"));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(planet: (detail: 8))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.planet.detail, 8);
        assert_eq!(config.planet.radius, 5.0);
        assert_eq!(config.lander, LanderConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.planet.render_radius = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "planet.render_radius",
                ..
            })
        ));

        let mut config = Config::default();
        config.planet.detail = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.planet.radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lander.v_height = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.debug.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_upper_bounds() {
        let mut config = Config::default();
        config.planet.detail = MAX_DETAIL;
        config.planet.render_radius = MAX_RENDER_RADIUS;
        config.validate().unwrap();

        config.planet.detail = MAX_DETAIL + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "planet.detail",
                ..
            })
        ));

        let mut config = Config::default();
        config.planet.render_radius = MAX_RENDER_RADIUS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "planet.render_radius",
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_detail_on_disk_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(planet: (detail: 30000))").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.planet.name = "Mars".to_string();
        config.planet.render_radius = 4;
        config.lander.spawn = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("nested");
        let config = Config::load_or_create(&sub).unwrap();
        assert_eq!(config, Config::default());
        assert!(sub.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "(planet: (detail: 0))").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(dir.path().join(CONFIG_FILE), "(planet: (").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.planet.detail = 16;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().planet.detail, 16);
    }
}
