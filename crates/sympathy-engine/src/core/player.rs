//! The player body, its movement step, and its concentration pool.

use glam::Vec2;

use crate::api::config::PhysicsConfig;
use crate::components::tilemap::SolidTiles;
use crate::core::body::Body;
use crate::systems::tile_collision::{resolve_horizontal, resolve_vertical};

/// Player sprite frame size in world units.
pub const PLAYER_SIZE: Vec2 = Vec2::new(64.0, 64.0);
/// Collision rectangle inside the sprite frame.
pub const PLAYER_HITBOX_OFFSET: Vec2 = Vec2::new(27.0, 30.0);
pub const PLAYER_HITBOX_SIZE: Vec2 = Vec2::new(10.0, 35.0);

/// The resource that gates and is drained by a sympathy link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Concentration {
    current: f32,
    max: f32,
}

impl Concentration {
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        Self { current: max, max }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Current level as a fraction of the maximum, for UI bars.
    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    /// Whether any concentration is left to spend.
    pub fn can_use(&self) -> bool {
        self.current > 0.0
    }

    /// Spend `amount`, never going below zero. No-op when already exhausted.
    pub fn consume(&mut self, amount: f32) {
        if !self.can_use() || !amount.is_finite() {
            return;
        }
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    /// Regain `amount`, never exceeding the maximum.
    pub fn restore(&mut self, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

/// What the player wants to do this tick, translated from input by the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// -1.0 = left, 1.0 = right, 0.0 = no direction held.
    pub horizontal: f32,
    /// Jump pressed this tick. Consumed by the tick that sees it.
    pub jump: bool,
}

/// Presentation label derived from the player's motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMotion {
    Idling,
    Walking,
    Jumping,
    Falling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: Body,
    pub mass: f32,
    pub concentration: Concentration,
    /// Sum of collected values.
    pub score: u32,
    pub facing_right: bool,
    spawn: Vec2,
}

impl Player {
    pub fn new(spawn: Vec2, cfg: &PhysicsConfig) -> Self {
        Self {
            body: Body::new(spawn, PLAYER_SIZE)
                .with_hitbox(PLAYER_HITBOX_OFFSET, PLAYER_HITBOX_SIZE),
            mass: cfg.player_mass.max(cfg.min_mass),
            concentration: Concentration::new(cfg.max_concentration),
            score: 0,
            facing_right: true,
            spawn,
        }
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    /// Move the spawn point (level change) without resetting anything else.
    pub fn set_spawn_point(&mut self, spawn: Vec2) {
        self.spawn = spawn;
    }

    /// Put the player back at the spawn point at rest with a full pool.
    pub fn reset(&mut self) {
        self.body.position = self.spawn;
        self.body.velocity = Vec2::ZERO;
        self.body.is_on_ground = false;
        self.concentration.reset();
        self.facing_right = true;
    }

    /// Turn an intent into horizontal velocity and, when grounded, a jump.
    pub fn apply_intent(&mut self, intent: PlayerIntent, dt: f32, cfg: &PhysicsConfig) {
        let dir = if intent.horizontal.is_finite() {
            intent.horizontal.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let v = &mut self.body.velocity;
        if dir != 0.0 {
            v.x = (v.x + dir * cfg.player_acceleration * dt)
                .clamp(-cfg.player_max_speed, cfg.player_max_speed);
            self.facing_right = dir > 0.0;
        } else if v.x > 0.0 {
            v.x = (v.x - cfg.player_deceleration * dt).max(0.0);
        } else {
            v.x = (v.x + cfg.player_deceleration * dt).min(0.0);
        }
        if v.x.abs() < 0.01 {
            v.x = 0.0;
        }

        if intent.jump && self.body.is_on_ground {
            self.body.velocity.y = -cfg.player_jump_speed;
            self.body.is_on_ground = false;
        }
    }

    /// Gravity, then move and resolve one axis at a time against the tiles,
    /// then keep the hitbox inside the map's horizontal extent.
    pub fn step<T: SolidTiles + ?Sized>(
        &mut self,
        dt: f32,
        tiles: &T,
        map_width: f32,
        cfg: &PhysicsConfig,
    ) {
        let body = &mut self.body;
        body.velocity.y = (body.velocity.y + cfg.gravity * dt).min(cfg.player_max_fall_speed);
        body.is_on_ground = false;

        body.position.x += body.velocity.x * dt;
        resolve_horizontal(body, tiles);

        body.position.y += body.velocity.y * dt;
        resolve_vertical(body, tiles);

        if map_width > 0.0 {
            let min_x = -body.hitbox_offset.x;
            let max_x = map_width - (body.hitbox_offset.x + body.hitbox_size.x);
            body.position.x = body.position.x.clamp(min_x, max_x.max(min_x));
        }
    }

    pub fn motion(&self) -> PlayerMotion {
        let v = self.body.velocity;
        if !self.body.is_on_ground {
            if v.y < 0.0 { PlayerMotion::Jumping } else { PlayerMotion::Falling }
        } else if v.x != 0.0 {
            PlayerMotion::Walking
        } else {
            PlayerMotion::Idling
        }
    }
}
