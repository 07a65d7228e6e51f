use sympathy_engine::{
    FixedTimestep, LevelDef, LevelError, PhysicsConfig, PlayerIntent, SelectionStep, SimEvent,
    SnapshotBuffer, World,
};
use thiserror::Error;

use crate::command::{Command, CommandQueue};

/// What the shell is doing with the world this frame. The world is only
/// ticked while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMode {
    Running,
    /// World frozen while the player browses link candidates.
    LinkSelection,
    Paused,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no levels to run")]
    NoLevels,
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Drives a [`World`] from frame deltas and queued commands, and walks
/// through a list of levels as goals are reached.
pub struct GameRunner {
    world: World,
    levels: Vec<LevelDef>,
    current_level: usize,
    commands: CommandQueue,
    timestep: FixedTimestep,
    mode: SimulationMode,
    intent: PlayerIntent,
    snapshot: SnapshotBuffer,
    /// Events raised during the last frame, across every tick it ran.
    frame_events: Vec<SimEvent>,
    finished: bool,
}

impl GameRunner {
    pub fn new(levels: Vec<LevelDef>, config: PhysicsConfig) -> Result<Self, RunnerError> {
        let first = levels.first().ok_or(RunnerError::NoLevels)?;
        let timestep = FixedTimestep::new(config.fixed_dt).with_max_frame_dt(config.max_frame_dt);
        let world = World::from_level(first, config)?;
        Ok(Self {
            world,
            levels,
            current_level: 0,
            commands: CommandQueue::new(),
            timestep,
            mode: SimulationMode::Running,
            intent: PlayerIntent::default(),
            snapshot: SnapshotBuffer::new(),
            frame_events: Vec::with_capacity(16),
            finished: false,
        })
    }

    /// Queue a command for the next frame.
    pub fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Run one frame: apply queued commands, then as many fixed ticks as the
    /// elapsed time allows if the mode is `Running`, then refresh the
    /// snapshot. While selecting a link only concentration keeps updating.
    pub fn frame(&mut self, dt: f32) {
        self.frame_events.clear();
        if self.finished {
            return;
        }

        for command in self.commands.drain() {
            self.handle_command(command);
        }

        match self.mode {
            SimulationMode::Running => self.run_ticks(dt),
            SimulationMode::LinkSelection => {
                self.capture(|world| world.update_sympathy(dt));
            }
            SimulationMode::Paused => {}
        }

        self.world.snapshot(&mut self.snapshot);
    }

    fn run_ticks(&mut self, dt: f32) {
        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.world.set_intent(self.intent);
            self.intent.jump = false;
            self.world.tick(self.timestep.dt());
            self.frame_events.extend_from_slice(self.world.events());
            if self.react_to_events() {
                break;
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        match (self.mode, command) {
            (_, Command::Move(horizontal)) => self.intent.horizontal = horizontal,
            (SimulationMode::Running, Command::Jump) => self.intent.jump = true,
            (SimulationMode::Running, Command::BeginLink) => {
                if self.world.begin_link_selection() {
                    log::debug!("entering link selection");
                    self.mode = SimulationMode::LinkSelection;
                }
            }
            (SimulationMode::Running, Command::Cancel) => {
                self.capture(|world| world.break_link());
            }
            (SimulationMode::Running, Command::TogglePause) => self.mode = SimulationMode::Paused,
            (SimulationMode::Paused, Command::TogglePause) => self.resume(),
            (SimulationMode::LinkSelection, Command::SelectNext) => {
                self.world.sympathy.select_next();
            }
            (SimulationMode::LinkSelection, Command::SelectPrevious) => {
                self.world.sympathy.select_previous();
            }
            (SimulationMode::LinkSelection, Command::Confirm) => {
                let step = self.capture(|world| world.confirm_link_selection());
                if matches!(step, SelectionStep::Linked { .. } | SelectionStep::Rejected) {
                    self.resume();
                }
            }
            (SimulationMode::LinkSelection, Command::Cancel) => {
                self.world.sympathy.exit_selection();
                self.resume();
            }
            (mode, command) => log::debug!("ignoring {:?} while {:?}", command, mode),
        }
    }

    fn resume(&mut self) {
        self.mode = SimulationMode::Running;
        // Drop time accumulated before the freeze.
        self.timestep.reset();
    }

    /// Run a world operation outside the tick and keep the events it raises.
    fn capture<R>(&mut self, op: impl FnOnce(&mut World) -> R) -> R {
        let before = self.world.events().len();
        let result = op(&mut self.world);
        self.frame_events
            .extend_from_slice(&self.world.events()[before..]);
        result
    }

    /// Handle fall-out and goal events from the tick that just ran. Returns
    /// `true` if the level changed and the frame should stop ticking.
    fn react_to_events(&mut self) -> bool {
        let fell_out = self.world.events().contains(&SimEvent::PlayerFellOut);
        let goal = self.world.events().contains(&SimEvent::GoalReached);
        if fell_out {
            self.capture(|world| world.respawn_player());
        }
        if goal {
            self.advance_level();
            return true;
        }
        false
    }

    fn advance_level(&mut self) {
        let next = self.current_level + 1;
        let Some(def) = self.levels.get(next) else {
            log::info!("final level complete, score {}", self.world.player.score);
            self.finished = true;
            return;
        };
        match self.world.load_level(def) {
            Ok(()) => {
                self.current_level = next;
                self.timestep.reset();
            }
            Err(e) => {
                log::error!("failed to load level '{}': {}", def.id, e);
                self.finished = true;
            }
        }
    }

    // -- Accessors --

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn level_id(&self) -> &str {
        self.levels
            .get(self.current_level)
            .map(|l| l.id.as_str())
            .unwrap_or("")
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frame_events(&self) -> &[SimEvent] {
        &self.frame_events
    }

    pub fn snapshot(&self) -> &SnapshotBuffer {
        &self.snapshot
    }

    /// Fraction of a tick left over, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.timestep.alpha()
    }
}
