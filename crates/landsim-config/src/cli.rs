//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// LandingSim command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "landsim", about = "Streams procedural terrain tiles around a lander")]
pub struct CliArgs {
    /// Planet name.
    #[arg(long)]
    pub name: Option<String>,

    /// Base planet radius.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Quads per sector side.
    #[arg(long)]
    pub detail: Option<u32>,

    /// Grid half-size in sectors.
    #[arg(long)]
    pub render_radius: Option<u32>,

    /// Initial center cell longitude index.
    #[arg(long, allow_hyphen_values = true)]
    pub center_lon: Option<i32>,

    /// Initial center cell latitude index.
    #[arg(long, allow_hyphen_values = true)]
    pub center_lat: Option<i32>,

    /// Spawn the configured lander on startup.
    #[arg(long)]
    pub lander: bool,

    /// Stop after this many frames.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Run as fast as possible instead of at wall-clock speed.
    #[arg(long)]
    pub fast: bool,

    /// Do not read console commands from stdin.
    #[arg(long)]
    pub no_console: bool,

    /// Directory holding saved tiles.
    #[arg(long)]
    pub tiles_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref name) = args.name {
            self.planet.name = name.clone();
        }
        if let Some(radius) = args.radius {
            self.planet.radius = radius;
        }
        if let Some(detail) = args.detail {
            self.planet.detail = detail;
        }
        if let Some(rr) = args.render_radius {
            self.planet.render_radius = rr;
        }
        if let Some(lon) = args.center_lon {
            self.planet.center_lon = lon;
        }
        if let Some(lat) = args.center_lat {
            self.planet.center_lat = lat;
        }
        if args.lander {
            self.lander.spawn = true;
        }
        if let Some(frames) = args.frames {
            self.sim.max_frames = frames;
        }
        if args.fast {
            self.sim.realtime = false;
        }
        if args.no_console {
            self.sim.console = false;
        }
        if let Some(ref dir) = args.tiles_dir {
            self.sim.tiles_dir = Some(dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
