//! Configuration for LandingSim.
//!
//! Settings persist to disk as `config.ron`. Command-line arguments override
//! the loaded values, and every change goes through [`Config::validate`] before
//! it reaches the simulation.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, LanderConfig, MAX_DETAIL, MAX_RENDER_RADIUS, PlanetConfig, SimConfig,
    default_config_dir,
};
pub use error::ConfigError;
