#![deny(unsafe_code)]
//! CLI binary for the procedural aquarium.
//!
//! Subcommands:
//! - `simulate` - tick the tank for N frames, print the frame state as JSON
//! - `snapshot` - tick the tank for N frames, write a side-view PNG
//! - `inspect <system>` - build one particle system, print its attributes and params
//! - `list` - print available particle systems and fish species

mod error;

use aquarium_core::{AquariumConfig, ParticleSystem};
use aquarium_particles::ParticleKind;
use aquarium_scene::raster::SideView;
use aquarium_scene::{Aquarium, ClipCatalog, FrameState};
use aquarium_school::Species;
use clap::{Args, Parser, Subcommand};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "aquarium", about = "Procedural aquarium motion CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand that builds a tank.
#[derive(Args)]
struct TankArgs {
    /// Aquarium config as a JSON file; missing keys take defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clip catalog as a JSON file (`{"koi": [{"name", "duration"}], ...}`).
    #[arg(long)]
    clips: Option<PathBuf>,

    /// Swim clip length in seconds when no catalog is given.
    #[arg(long, default_value_t = 1.0)]
    clip_duration: f64,

    /// PRNG seed, overriding the config's.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to tick.
    #[arg(short, long, default_value_t = 60)]
    frames: u64,

    /// Host frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Tick the tank and print the resulting frame state.
    Simulate {
        #[command(flatten)]
        tank: TankArgs,

        /// Emit every frame instead of only the last.
        #[arg(long)]
        all: bool,

        /// Write the JSON to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Tick the tank and write a side-view PNG.
    Snapshot {
        #[command(flatten)]
        tank: TankArgs,

        /// Image width in pixels; height follows the bounds' aspect.
        #[arg(short = 'W', long, default_value_t = 900)]
        width: usize,

        /// Output file path.
        #[arg(short, long, default_value = "aquarium.png")]
        output: PathBuf,
    },
    /// Build one particle system and describe its instance data.
    Inspect {
        /// System name ("bubbles" or "seaweed").
        system: String,

        /// PRNG seed for the instance draws.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// System parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// List available particle systems and fish species.
    List,
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))?;
    serde_json::from_str(&text).map_err(|e| CliError::json(path, e))
}

fn load_tank(args: &TankArgs) -> Result<Aquarium, CliError> {
    let mut config = match &args.config {
        Some(path) => AquariumConfig::from_json(&read_json(path)?)?,
        None => AquariumConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let clips = match &args.clips {
        Some(path) => ClipCatalog::from_json(&read_json(path)?)?,
        None => ClipCatalog::swim_clips(args.clip_duration),
    };
    Ok(Aquarium::new(&config, &clips)?)
}

fn frame_step(fps: f64) -> Result<f64, CliError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps.recip())
    } else {
        Err(CliError::Flag {
            flag: "fps",
            message: format!("must be positive, got {fps}"),
        })
    }
}

/// Ticks `frames` times at a fixed step, calling `each` after every tick.
fn run_frames(
    aquarium: &mut Aquarium,
    frames: u64,
    dt: f64,
    mut each: impl FnMut(&Aquarium),
) {
    for frame in 1..=frames {
        aquarium.tick(dt, frame as f64 * dt);
        each(aquarium);
    }
}

fn write_output(text: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, text).map_err(|e| CliError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let systems = ParticleKind::list_systems();
            let species: Vec<&str> = Species::ALL.iter().map(|s| s.name()).collect();
            if cli.json {
                let info = serde_json::json!({
                    "systems": systems,
                    "species": species,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Particle systems:");
                for name in systems {
                    println!("  {name}");
                }
                println!("Species:");
                for s in Species::ALL {
                    println!("  {:<14} {}  [{}]", s.name(), s.model_path(), s.clip_name());
                }
            }
        }
        Command::Inspect {
            system,
            seed,
            params,
        } => {
            let params: serde_json::Value =
                serde_json::from_str(&params).map_err(|e| CliError::Flag {
                    flag: "params",
                    message: e.to_string(),
                })?;
            let kind = ParticleKind::from_name(&system, seed, &params)?;
            let instances = kind.instances();
            let attributes: Vec<serde_json::Value> = instances
                .attributes()
                .map(|(name, attr)| serde_json::json!({"name": name, "components": attr.components()}))
                .collect();
            if cli.json {
                let info = serde_json::json!({
                    "system": kind.name(),
                    "instances": instances.count(),
                    "bytes": instances.byte_len(),
                    "attributes": attributes,
                    "base_mesh_vertices": kind.base_mesh().map(|m| m.vertex_count()),
                    "params": kind.params(),
                    "schema": kind.param_schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "{}: {} instances, {} bytes",
                    kind.name(),
                    instances.count(),
                    instances.byte_len()
                );
                for (name, attr) in instances.attributes() {
                    println!("  {name} x{}", attr.components());
                }
                println!("{}", serde_json::to_string_pretty(&kind.params())?);
            }
        }
        Command::Simulate { tank, all, output } => {
            let dt = frame_step(tank.fps)?;
            let mut aquarium = load_tank(&tank)?;
            let text = if all {
                let mut states: Vec<FrameState> = Vec::new();
                run_frames(&mut aquarium, tank.frames, dt, |a| states.push(a.frame_state()));
                serde_json::to_string_pretty(&states)?
            } else {
                run_frames(&mut aquarium, tank.frames, dt, |_| {});
                serde_json::to_string_pretty(&aquarium.frame_state())?
            };
            write_output(&text, output.as_deref())?;
            if !cli.json {
                eprintln!(
                    "simulated {} frames at {} fps (seed {}, {} fish)",
                    tank.frames,
                    tank.fps,
                    aquarium.config().seed,
                    aquarium.frame_state().agent_count()
                );
            }
        }
        Command::Snapshot {
            tank,
            width,
            output,
        } => {
            let dt = frame_step(tank.fps)?;
            let mut aquarium = load_tank(&tank)?;
            run_frames(&mut aquarium, tank.frames, dt, |_| {});
            let view = SideView::for_bounds(aquarium.config().bounds, width)?;
            aquarium_scene::snapshot::write_side_view(&aquarium, &view, &output)
                .map_err(|e| CliError::writing(&output, e))?;

            if cli.json {
                let info = serde_json::json!({
                    "frames": tank.frames,
                    "elapsed": aquarium.elapsed(),
                    "seed": aquarium.config().seed,
                    "width": view.width,
                    "height": view.height,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} frames ({}x{}, seed {}) -> {}",
                    tank.frames,
                    view.width,
                    view.height,
                    aquarium.config().seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
