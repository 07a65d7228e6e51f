use std::path::PathBuf;

use clap::Parser;
use sympathy_engine::{LevelDef, PhysicsConfig, SimEvent};
use sympathy_run::{Command, GameRunner, TUTORIAL_LEVEL};

/// Headless runner for the sympathy platformer core.
#[derive(Parser)]
#[command(version, about = "Runs levels headlessly and logs simulation events")]
struct Cli {
    /// Level file to play, in order. Repeat for a sequence.
    /// Defaults to the bundled tutorial.
    #[arg(long = "level", value_name = "PATH")]
    levels: Vec<PathBuf>,

    /// JSON physics config; missing keys keep their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Horizontal direction to hold for the whole run (-1, 0 or 1).
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    walk: f32,

    /// Link the first two candidates after the first frame.
    #[arg(long)]
    link: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PhysicsConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PhysicsConfig::default(),
    };
    let levels = if cli.levels.is_empty() {
        vec![LevelDef::from_json(TUTORIAL_LEVEL)?]
    } else {
        cli.levels
            .iter()
            .map(|path| LevelDef::load(path))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut runner = GameRunner::new(levels, config)?;
    runner.push_command(Command::Move(cli.walk));

    for frame in 0..cli.frames {
        if cli.link && frame == 1 {
            runner.push_command(Command::BeginLink);
            runner.push_command(Command::Confirm);
            runner.push_command(Command::SelectNext);
            runner.push_command(Command::Confirm);
        }
        runner.frame(cli.dt);
        for event in runner.frame_events() {
            match event {
                SimEvent::ObjectBroken(_) | SimEvent::ObjectRemoved(_) => {
                    log::debug!("frame {frame}: {event:?}")
                }
                _ => log::info!("frame {frame}: {event:?}"),
            }
        }
        if runner.is_finished() {
            break;
        }
    }

    let world = runner.world();
    println!(
        "level '{}': {} ticks, score {}, concentration {:.1}/{:.1}, {} objects left{}",
        runner.level_id(),
        world.tick_count(),
        world.player.score,
        world.player.concentration.current(),
        world.player.concentration.max(),
        world.scene.len(),
        if runner.is_finished() { ", all levels complete" } else { "" }
    );
    Ok(())
}
