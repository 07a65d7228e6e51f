/// Player commands the runner understands. Produced by whatever input layer
/// sits in front of the runner (keyboard, replay file, test).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Hold a horizontal direction: -1.0 = left, 1.0 = right, 0.0 = release.
    Move(f32),
    /// Jump on the next tick, if grounded.
    Jump,
    /// Freeze the world and start browsing link candidates.
    BeginLink,
    SelectNext,
    SelectPrevious,
    /// Pick the highlighted candidate (first press) or link it (second press).
    Confirm,
    /// Leave link selection, or drop the active link while running.
    Cancel,
    TogglePause,
}

/// Commands waiting for the next frame.
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Take every pending command, oldest first, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order() {
        let mut q = CommandQueue::new();
        q.push(Command::BeginLink);
        q.push(Command::SelectNext);
        q.push(Command::Confirm);
        assert_eq!(q.len(), 3);
        assert_eq!(
            q.drain(),
            vec![Command::BeginLink, Command::SelectNext, Command::Confirm]
        );
        assert!(q.is_empty());
    }
}
