//! Physics objects: bodies with mass, accumulated forces and thermal stress.
//!
//! Object kinds are a closed set resolved once at load time from the level's
//! type string. Each kind decides whether the object can take part in a
//! sympathy link and what happens when the player touches it.

use glam::Vec2;

use crate::api::config::PhysicsConfig;
use crate::api::types::{BodyId, LinkId};
use crate::core::body::{sanitize_vec2, Body};

/// The closed set of object kinds a level can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A pushable, stackable, sympathy-capable box.
    Crate,
    /// A pickup. Collected on player contact, never linked.
    Collectable { value: u32 },
}

impl ObjectKind {
    /// Resolve a level-definition type name. Unknown names return `None`.
    pub fn from_type_name(name: &str, value: Option<u32>) -> Option<Self> {
        match name {
            "Crate" | "Block" | "Box" => Some(ObjectKind::Crate),
            "Collectable" | "Coin" => Some(ObjectKind::Collectable {
                value: value.unwrap_or(1),
            }),
            _ => None,
        }
    }

    pub fn is_sympathy_capable(&self) -> bool {
        matches!(self, ObjectKind::Crate)
    }

    pub fn is_collectable(&self) -> bool {
        matches!(self, ObjectKind::Collectable { .. })
    }
}

/// Derived presentation label. Carries no transition logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressLabel {
    Normal,
    Stressed,
    Broken,
}

/// Typed description of an object before it enters the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDesc {
    pub kind: ObjectKind,
    /// Top-left corner in world space.
    pub position: Vec2,
    pub size: Vec2,
    pub mass: f32,
    pub temp: f32,
    pub is_static: bool,
}

impl ObjectDesc {
    /// A crate of mass 1 at ambient temperature.
    pub fn crate_at(position: Vec2, size: Vec2) -> Self {
        Self {
            kind: ObjectKind::Crate,
            position,
            size,
            mass: 1.0,
            temp: PhysicsConfig::default().ambient_temp,
            is_static: false,
        }
    }

    pub fn collectable_at(position: Vec2, size: Vec2, value: u32) -> Self {
        Self {
            kind: ObjectKind::Collectable { value },
            ..Self::crate_at(position, size)
        }
    }

    // -- Builder pattern --

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_temp(mut self, temp: f32) -> Self {
        self.temp = temp;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }
}

/// A simulated object: a [`Body`] plus mass, forces and thermal state.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    pub kind: ObjectKind,
    pub body: Body,
    /// Always >= the configured minimum mass.
    pub mass: f32,
    /// Forces accumulated this tick; cleared by [`GameObject::integrate`].
    pub forces: Vec2,
    /// Static objects never integrate and never receive displacement.
    pub is_static: bool,
    pub is_collidable: bool,
    pub temp: f32,
    /// Thermal stress in [0, 1].
    pub stress: f32,
    /// Terminal. A broken object is static, non-collidable and removable.
    pub is_broken: bool,
    /// Partner on the far end of the active sympathy link. Non-owning.
    pub sympathy_linked_item: Option<BodyId>,
    /// The link this object takes part in. Non-owning.
    pub link: Option<LinkId>,
    /// Set once a collectable has been picked up.
    pub collected: bool,
}

impl GameObject {
    pub fn new(desc: &ObjectDesc, cfg: &PhysicsConfig) -> Self {
        let mass = if desc.mass.is_finite() && desc.mass >= cfg.min_mass {
            desc.mass
        } else {
            log::warn!("clamping invalid mass {} to {}", desc.mass, cfg.min_mass);
            cfg.min_mass
        };
        let temp = if desc.temp.is_finite() { desc.temp } else { cfg.ambient_temp };
        let mut body = Body::new(Vec2::ZERO, desc.size);
        body.set_position(desc.position);
        Self {
            kind: desc.kind,
            body,
            mass,
            forces: Vec2::ZERO,
            is_static: desc.is_static,
            is_collidable: true,
            temp,
            stress: 0.0,
            is_broken: false,
            sympathy_linked_item: None,
            link: None,
            collected: false,
        }
    }

    /// Footprint area of the hitbox, used by the similarity score.
    pub fn area(&self) -> f32 {
        self.body.hitbox_size.x * self.body.hitbox_size.y
    }

    pub fn is_sympathy_capable(&self) -> bool {
        self.kind.is_sympathy_capable() && !self.is_broken
    }

    pub fn is_linked(&self) -> bool {
        self.sympathy_linked_item.is_some()
    }

    /// Whether the object takes part in integration and displacement.
    pub fn is_dynamic(&self) -> bool {
        !self.is_static && !self.is_broken
    }

    /// Add a force to this tick's accumulator. Does not consult any link;
    /// routing through a link is the world's job.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_broken {
            return;
        }
        let mut f = force;
        if sanitize_vec2(&mut f, Vec2::ZERO) {
            log::warn!("dropping non-finite force {:?}", force);
        }
        self.forces += f;
    }

    /// Force arriving from a sympathy partner. Accumulates exactly like
    /// [`GameObject::apply_force`] and never travels back through the link.
    pub fn receive_sympathy_force(&mut self, force: Vec2) {
        self.apply_force(force);
    }

    /// Change velocity directly by `impulse / mass`, keeping the resulting
    /// horizontal speed within `max_speed`.
    pub fn apply_impulse(&mut self, impulse: Vec2, max_speed: f32) {
        if !self.is_dynamic() {
            return;
        }
        let mut v = self.body.velocity + impulse / self.mass;
        v.x = v.x.clamp(-max_speed, max_speed);
        self.body.set_velocity(v);
    }

    /// Shift temperature by `delta` degrees.
    pub fn add_heat(&mut self, delta: f32) {
        if delta.is_finite() && !self.is_broken {
            self.temp += delta;
        }
    }

    /// Advance one tick: forces into velocity, velocity into position, ground
    /// friction, then thermal stress. Returns `true` if the object broke
    /// during this tick.
    pub fn integrate(&mut self, dt: f32, cfg: &PhysicsConfig) -> bool {
        if !self.is_dynamic() {
            self.forces = Vec2::ZERO;
            return false;
        }

        let previous = self.body.position;
        let acceleration = self.forces / self.mass;
        self.body.velocity += acceleration * dt;
        self.body.position += self.body.velocity * dt;
        self.forces = Vec2::ZERO;

        if sanitize_vec2(&mut self.body.position, previous)
            | sanitize_vec2(&mut self.body.velocity, Vec2::ZERO)
        {
            log::warn!("non-finite state after integration, reverting to {:?}", previous);
        }

        if self.body.is_on_ground {
            self.body.velocity.x *= cfg.ground_friction;
            if self.body.velocity.x.abs() < cfg.friction_epsilon {
                self.body.velocity.x = 0.0;
            }
        }

        self.update_stress(dt, cfg)
    }

    /// Accrue or shed stress depending on the safe band. Returns `true` if
    /// this call broke the object.
    pub fn update_stress(&mut self, dt: f32, cfg: &PhysicsConfig) -> bool {
        if self.is_broken {
            return false;
        }
        if cfg.is_safe_temp(self.temp) {
            self.stress -= cfg.stress_recovery_rate * dt;
        } else {
            self.stress += cfg.stress_build_rate * dt;
        }
        self.stress = self.stress.clamp(0.0, 1.0);

        if self.stress >= 1.0 {
            return self.break_object();
        }
        false
    }

    /// Enter the terminal broken state. Returns `true` only on the first call.
    pub fn break_object(&mut self) -> bool {
        if self.is_broken {
            return false;
        }
        self.is_broken = true;
        self.is_static = true;
        self.is_collidable = false;
        self.body.velocity = Vec2::ZERO;
        self.forces = Vec2::ZERO;
        self.sympathy_linked_item = None;
        self.link = None;
        true
    }

    pub fn stress_label(&self, cfg: &PhysicsConfig) -> StressLabel {
        if self.is_broken {
            StressLabel::Broken
        } else if self.stress > cfg.stressed_threshold {
            StressLabel::Stressed
        } else {
            StressLabel::Normal
        }
    }
}
