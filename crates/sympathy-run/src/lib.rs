pub mod command;
pub mod runner;

pub use command::{Command, CommandQueue};
pub use runner::{GameRunner, RunnerError, SimulationMode};

/// Level bundled with the runner, used when no `--level` is given.
pub const TUTORIAL_LEVEL: &str = include_str!("../levels/tutorial.json");
