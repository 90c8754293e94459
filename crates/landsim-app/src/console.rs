//! Operator console: one command per line, parsed off the main thread.
//!
//! A reader thread turns lines into validated [`Command`]s and queues them on
//! a channel. The simulation drains the queue at the start of each tick, so
//! nothing typed at the prompt touches the grid mid-frame.

use std::io::BufRead;
use std::str::FromStr;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use landsim_planet::MAX_RENDER_RADIUS;
use landsim_sector::MAX_DETAIL;

/// Which saved tile to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadTarget {
    /// 1-based position in the sorted tile listing.
    Index(usize),
    /// File name inside the tile directory.
    File(String),
}

/// A validated console command.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replace the grid.
    Grid {
        /// Grid half-size in sectors.
        render_radius: u32,
        /// Center cell longitude index.
        center_lon: i32,
        /// Center cell latitude index.
        center_lat: i32,
        /// Base planet radius.
        radius: f64,
        /// Quads per sector side.
        detail: u32,
        /// Planet name; keeps the current one when absent.
        name: Option<String>,
    },
    /// Spawn a lander, replacing any existing one.
    Lander {
        /// Longitude in degrees.
        longitude_deg: f64,
        /// Latitude in degrees.
        latitude_deg: f64,
        /// Height above the base radius.
        height: f64,
        /// Longitude, latitude and vertical rates.
        velocity: [f64; 3],
        /// Marker size.
        size: f64,
    },
    /// Remove the current lander.
    RemoveLander,
    /// Switch between wireframe and solid drawing.
    ToggleWireframe,
    /// Switch camera follow mode.
    ToggleFollow,
    /// Show or hide the coordinate axes.
    ToggleAxes,
    /// Print the center sector summary.
    Info,
    /// Save the center sector.
    Save,
    /// List saved tiles.
    List,
    /// Load a saved tile and rebuild the grid around it.
    Load(LoadTarget),
    /// Zoom the orbit camera.
    Zoom(f64),
    /// Rotate the orbit camera.
    Rotate(f64, f64),
    /// Restore the default orbit.
    ResetCamera,
    /// Re-read `config.ron`.
    Reload,
    /// Stop the simulation.
    Quit,
}

/// Why a console line was rejected.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    /// Nothing but whitespace.
    #[error("empty command")]
    Empty,
    /// First word is not a known command.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// Wrong number of arguments.
    #[error("`{command}` takes {expected} argument(s), got {got}")]
    Arity {
        /// Command name.
        command: &'static str,
        /// Accepted argument count.
        expected: &'static str,
        /// Arguments supplied.
        got: usize,
    },
    /// An argument is not a number of the expected kind.
    #[error("`{command}`: `{value}` is not a valid {kind}")]
    NotANumber {
        /// Command name.
        command: &'static str,
        /// Offending token.
        value: String,
        /// Expected kind of number.
        kind: &'static str,
    },
    /// An argument parsed but is outside its allowed range.
    #[error("`{command}`: {reason}")]
    OutOfRange {
        /// Command name.
        command: &'static str,
        /// What is wrong.
        reason: &'static str,
    },
}

/// One-line usage summary printed by the binary.
pub const HELP: &str = "commands: grid <R> <lon> <lat> <radius> <detail> [name] | \
lander <lon_deg> <lat_deg> <h> <v_lon> <v_lat> <v_h> <size> | remove-lander | wireframe | \
follow | axes | info | save | list | load <n|file> | zoom <d> | rotate <dx> <dy> | \
reset-camera | reload | quit";

fn arity(command: &'static str, expected: &'static str, got: usize) -> ConsoleError {
    ConsoleError::Arity {
        command,
        expected,
        got,
    }
}

fn number<T: FromStr>(
    command: &'static str,
    value: &str,
    kind: &'static str,
) -> Result<T, ConsoleError> {
    value.parse().map_err(|_| ConsoleError::NotANumber {
        command,
        value: value.to_string(),
        kind,
    })
}

fn real(command: &'static str, value: &str) -> Result<f64, ConsoleError> {
    let v: f64 = number(command, value, "number")?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ConsoleError::OutOfRange {
            command,
            reason: "values must be finite",
        })
    }
}

fn no_args(command: &'static str, args: &[&str], cmd: Command) -> Result<Command, ConsoleError> {
    if args.is_empty() {
        Ok(cmd)
    } else {
        Err(arity(command, "0", args.len()))
    }
}

/// Parses one console line.
pub fn parse_command(line: &str) -> Result<Command, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ConsoleError::Empty);
    };
    let args: Vec<&str> = words.collect();

    match head.to_ascii_lowercase().as_str() {
        "grid" => parse_grid(&args),
        "lander" => parse_lander(&args),
        "remove-lander" => no_args("remove-lander", &args, Command::RemoveLander),
        "wireframe" => no_args("wireframe", &args, Command::ToggleWireframe),
        "follow" => no_args("follow", &args, Command::ToggleFollow),
        "axes" => no_args("axes", &args, Command::ToggleAxes),
        "info" => no_args("info", &args, Command::Info),
        "save" => no_args("save", &args, Command::Save),
        "list" => no_args("list", &args, Command::List),
        "reset-camera" => no_args("reset-camera", &args, Command::ResetCamera),
        "reload" => no_args("reload", &args, Command::Reload),
        "quit" | "exit" => no_args("quit", &args, Command::Quit),
        "load" => match args.as_slice() {
            [target] => Ok(Command::Load(parse_load_target(target)?)),
            _ => Err(arity("load", "1", args.len())),
        },
        "zoom" => match args.as_slice() {
            [delta] => Ok(Command::Zoom(real("zoom", delta)?)),
            _ => Err(arity("zoom", "1", args.len())),
        },
        "rotate" => match args.as_slice() {
            [dx, dy] => Ok(Command::Rotate(real("rotate", dx)?, real("rotate", dy)?)),
            _ => Err(arity("rotate", "2", args.len())),
        },
        _ => Err(ConsoleError::UnknownCommand(head.to_string())),
    }
}

fn parse_grid(args: &[&str]) -> Result<Command, ConsoleError> {
    const CMD: &str = "grid";
    if !(5..=6).contains(&args.len()) {
        return Err(arity(CMD, "5 or 6", args.len()));
    }
    let render_radius: u32 = number(CMD, args[0], "render radius")?;
    let center_lon: i32 = number(CMD, args[1], "cell index")?;
    let center_lat: i32 = number(CMD, args[2], "cell index")?;
    let radius = real(CMD, args[3])?;
    let detail: u32 = number(CMD, args[4], "detail level")?;

    if render_radius == 0 {
        return Err(ConsoleError::OutOfRange {
            command: CMD,
            reason: "render radius must be at least 1",
        });
    }
    if render_radius > MAX_RENDER_RADIUS {
        return Err(ConsoleError::OutOfRange {
            command: CMD,
            reason: "render radius exceeds the supported maximum",
        });
    }
    if detail == 0 {
        return Err(ConsoleError::OutOfRange {
            command: CMD,
            reason: "detail must be at least 1",
        });
    }
    if detail > MAX_DETAIL {
        return Err(ConsoleError::OutOfRange {
            command: CMD,
            reason: "detail exceeds the supported maximum",
        });
    }
    if radius <= 0.0 {
        return Err(ConsoleError::OutOfRange {
            command: CMD,
            reason: "planet radius must be positive",
        });
    }

    Ok(Command::Grid {
        render_radius,
        center_lon,
        center_lat,
        radius,
        detail,
        name: args.get(5).map(|s| s.to_string()),
    })
}

fn parse_lander(args: &[&str]) -> Result<Command, ConsoleError> {
    const CMD: &str = "lander";
    let [lon, lat, h, v_lon, v_lat, v_h, size] = args else {
        return Err(arity(CMD, "7", args.len()));
    };
    let size = real(CMD, size)?;
    if size <= 0.0 {
        return Err(ConsoleError::OutOfRange {
            command: CMD,
            reason: "size must be positive",
        });
    }
    Ok(Command::Lander {
        longitude_deg: real(CMD, lon)?,
        latitude_deg: real(CMD, lat)?,
        height: real(CMD, h)?,
        velocity: [real(CMD, v_lon)?, real(CMD, v_lat)?, real(CMD, v_h)?],
        size,
    })
}

fn parse_load_target(target: &str) -> Result<LoadTarget, ConsoleError> {
    match target.parse::<usize>() {
        Ok(0) => Err(ConsoleError::OutOfRange {
            command: "load",
            reason: "tiles are numbered from 1",
        }),
        Ok(n) => Ok(LoadTarget::Index(n)),
        Err(_) => Ok(LoadTarget::File(target.to_string())),
    }
}

/// Reads lines from `reader` until EOF, `quit`, or the receiver goes away.
///
/// Rejected lines are reported with `tracing::warn!` and never queued.
pub fn read_commands<R: BufRead>(reader: R, sender: &Sender<Command>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("console read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                let quit = command == Command::Quit;
                if sender.send(command).is_err() || quit {
                    break;
                }
            }
            Err(e) => tracing::warn!("{e}"),
        }
    }
    tracing::debug!("console reader finished");
}

/// Spawns the stdin reader thread and returns the command queue.
pub fn spawn_console() -> std::io::Result<(Receiver<Command>, JoinHandle<()>)> {
    let (sender, receiver) = unbounded();
    let handle = std::thread::Builder::new()
        .name("console".into())
        .spawn(move || read_commands(std::io::stdin().lock(), &sender))?;
    Ok((receiver, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid_with_and_without_name() {
        assert_eq!(
            parse_command("grid 3 -2 5 7.5 16 Mars").unwrap(),
            Command::Grid {
                render_radius: 3,
                center_lon: -2,
                center_lat: 5,
                radius: 7.5,
                detail: 16,
                name: Some("Mars".to_string()),
            }
        );
        assert!(matches!(
            parse_command("grid 1 0 0 5 4").unwrap(),
            Command::Grid { name: None, .. }
        ));
    }

    #[test]
    fn test_parse_grid_rejects_bad_values() {
        assert_eq!(
            parse_command("grid 0 0 0 5 4"),
            Err(ConsoleError::OutOfRange {
                command: "grid",
                reason: "render radius must be at least 1",
            })
        );
        assert!(matches!(
            parse_command("grid 1 0 0 5 0"),
            Err(ConsoleError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_command("grid 1 0 0 -5 4"),
            Err(ConsoleError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_command("grid 1 x 0 5 4"),
            Err(ConsoleError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_command("grid 1 0 0"),
            Err(ConsoleError::Arity { got: 3, .. })
        ));
    }

    #[test]
    fn test_parse_grid_upper_bounds() {
        let line = format!("grid {MAX_RENDER_RADIUS} 0 0 7 {MAX_DETAIL}");
        assert!(matches!(
            parse_command(&line).unwrap(),
            Command::Grid { detail: MAX_DETAIL, .. }
        ));

        let line = format!("grid 1 0 0 7 {}", MAX_DETAIL + 1);
        assert_eq!(
            parse_command(&line),
            Err(ConsoleError::OutOfRange {
                command: "grid",
                reason: "detail exceeds the supported maximum",
            })
        );
        assert!(matches!(
            parse_command("grid 1 0 0 7 30000"),
            Err(ConsoleError::OutOfRange { .. })
        ));

        let line = format!("grid {} 0 0 7 4", MAX_RENDER_RADIUS + 1);
        assert_eq!(
            parse_command(&line),
            Err(ConsoleError::OutOfRange {
                command: "grid",
                reason: "render radius exceeds the supported maximum",
            })
        );
    }

    #[test]
    fn test_limits_agree_with_config() {
        assert_eq!(MAX_DETAIL, landsim_config::MAX_DETAIL);
        assert_eq!(MAX_RENDER_RADIUS, landsim_config::MAX_RENDER_RADIUS);
    }

    #[test]
    fn test_parse_lander() {
        assert_eq!(
            parse_command("lander 1 2 0.5 0.01 0 -0.1 0.2").unwrap(),
            Command::Lander {
                longitude_deg: 1.0,
                latitude_deg: 2.0,
                height: 0.5,
                velocity: [0.01, 0.0, -0.1],
                size: 0.2,
            }
        );
        assert!(matches!(
            parse_command("lander 1 2 0.5 0 0 0 0"),
            Err(ConsoleError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_command("lander 1 2 nan 0 0 0 1"),
            Err(ConsoleError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("  wireframe ").unwrap(), Command::ToggleWireframe);
        assert_eq!(parse_command("FOLLOW").unwrap(), Command::ToggleFollow);
        assert_eq!(parse_command("zoom -2.5").unwrap(), Command::Zoom(-2.5));
        assert_eq!(parse_command("rotate 10 -4").unwrap(), Command::Rotate(10.0, -4.0));
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
        assert!(matches!(
            parse_command("info now"),
            Err(ConsoleError::Arity { command: "info", .. })
        ));
    }

    #[test]
    fn test_parse_load_target() {
        assert_eq!(
            parse_command("load 2").unwrap(),
            Command::Load(LoadTarget::Index(2))
        );
        assert_eq!(
            parse_command("load Mars_0_0.bin").unwrap(),
            Command::Load(LoadTarget::File("Mars_0_0.bin".to_string()))
        );
        assert!(matches!(
            parse_command("load 0"),
            Err(ConsoleError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse_command("   "), Err(ConsoleError::Empty));
        assert_eq!(
            parse_command("fly 1"),
            Err(ConsoleError::UnknownCommand("fly".to_string()))
        );
    }

    #[test]
    fn test_reader_queues_valid_commands_only() {
        let input = "zoom 1\nbogus\n\ninfo\nquit\nsave\n";
        let (sender, receiver) = unbounded();
        read_commands(input.as_bytes(), &sender);
        let queued: Vec<Command> = receiver.try_iter().collect();
        assert_eq!(queued, vec![Command::Zoom(1.0), Command::Info, Command::Quit]);
    }

    #[test]
    fn test_reader_stops_when_receiver_dropped() {
        let (sender, receiver) = unbounded();
        drop(receiver);
        read_commands("info\ninfo\n".as_bytes(), &sender);
    }
}
