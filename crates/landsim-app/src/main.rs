//! Headless LandingSim: streams terrain tiles around a lander and reads
//! commands from stdin.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use landsim_app::{
    FIXED_DT, GameLoop, HELP, Simulation, StatsBackend, TileStore, default_tiles_dir,
    spawn_console,
};
use landsim_config::{CliArgs, Config, default_config_dir};

const STATS_INTERVAL: u64 = 300;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(default_config_dir);
    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    landsim_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    let tiles_dir = match config.sim.tiles_dir.clone() {
        Some(dir) => dir,
        None => match default_tiles_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };
    let store = match TileStore::open(tiles_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let commands = if config.sim.console {
        match spawn_console() {
            Ok((receiver, _reader)) => {
                tracing::info!("{HELP}");
                receiver
            }
            Err(e) => {
                tracing::error!("failed to start console: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        crossbeam_channel::never()
    };

    let realtime = config.sim.realtime;
    let max_frames = config.sim.max_frames;
    let mut sim = match Simulation::new(config, config_dir, store, commands) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::error!("failed to start simulation: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut clock = GameLoop::new();
    let mut backend = StatsBackend::new();
    while sim.is_running() && (max_frames == 0 || clock.frame_count() < max_frames) {
        let started = Instant::now();
        let frame = if realtime {
            clock.tick()
        } else {
            clock.advance(FIXED_DT)
        };
        sim.run_frame(frame, &mut backend);
        let stats = backend.finish_frame();

        if clock.frame_count() % STATS_INTERVAL == 0 {
            tracing::debug!(
                frame = clock.frame_count(),
                sim_time = clock.total_sim_time(),
                draw_calls = stats.draw_calls,
                triangles = stats.triangles,
                segments = stats.segments,
                "frame stats"
            );
        }

        if realtime
            && let Some(rest) = Duration::from_secs_f64(FIXED_DT).checked_sub(started.elapsed())
        {
            std::thread::sleep(rest);
        }
    }

    let grid = sim.planet().stats();
    tracing::info!(
        frames = clock.frame_count(),
        built = grid.sectors_built,
        reused = grid.sectors_reused,
        dropped = grid.sectors_dropped,
        "simulation finished"
    );
    ExitCode::SUCCESS
}
