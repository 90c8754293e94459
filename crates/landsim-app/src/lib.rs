//! LandingSim application: frame clock, console queue, tile storage, and the
//! simulation that ties the grid, lander and camera together.

pub mod console;
pub mod game_loop;
pub mod render_stats;
pub mod simulation;
pub mod storage;

pub use console::{Command, ConsoleError, HELP, LoadTarget, parse_command, spawn_console};
pub use game_loop::{FIXED_DT, Frame, GameLoop, MAX_FRAME_TIME};
pub use render_stats::{FrameStats, StatsBackend};
pub use simulation::{SimError, Simulation, planet_params};
pub use storage::{StoreError, TileStore, default_tiles_dir};
