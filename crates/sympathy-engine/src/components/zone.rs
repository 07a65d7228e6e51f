use glam::Vec2;

use crate::core::body::Hitbox;

/// A static region that heats or cools anything inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureZone {
    pub rect: Hitbox,
    /// Degrees per second; negative values cool.
    pub delta_per_second: f32,
}

impl TemperatureZone {
    pub fn new(position: Vec2, size: Vec2, delta_per_second: f32) -> Self {
        Self {
            rect: Hitbox::new(position.x, position.y, size.x, size.y),
            delta_per_second,
        }
    }

    /// Whether a hitbox is fully or partially inside the zone.
    pub fn affects(&self, hitbox: &Hitbox) -> bool {
        self.rect.overlaps(hitbox)
    }
}

/// What a trigger does when the player enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Level exit.
    Goal,
}

/// A static region reacting to the player's hitbox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub rect: Hitbox,
}

impl Trigger {
    pub fn goal(position: Vec2, size: Vec2) -> Self {
        Self {
            kind: TriggerKind::Goal,
            rect: Hitbox::new(position.x, position.y, size.x, size.y),
        }
    }
}
