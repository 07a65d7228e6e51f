use bytemuck::{Pod, Zeroable};

use crate::api::config::PhysicsConfig;
use crate::api::types::BodyId;
use crate::core::object::{GameObject, StressLabel};
use crate::core::player::Player;
use crate::core::scene::Scene;
use crate::sympathy::SympathyManager;

/// Largest jitter, in world units, drawn on an object about to break.
pub const MAX_SHAKE: f32 = 2.0;

pub const FLAG_LINKED: u32 = 1 << 0;
pub const FLAG_GROUNDED: u32 = 1 << 1;
pub const FLAG_BROKEN: u32 = 1 << 2;
pub const FLAG_HIGHLIGHTED: u32 = 1 << 3;
pub const FLAG_FIRST_PICK: u32 = 1 << 4;
pub const FLAG_PLAYER: u32 = 1 << 5;

/// Per-body presentation data. 8 floats = 32 bytes stride.
///
/// Flags are stored as an `f32` holding a small integer so the whole buffer
/// can be handed to a renderer as a flat float slice.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    /// Hitbox left edge.
    pub x: f32,
    /// Hitbox top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub temp: f32,
    pub stress: f32,
    /// Jitter amplitude for stressed objects; 0 otherwise.
    pub shake: f32,
    pub flags: f32,
}

impl BodyInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn has_flag(&self, flag: u32) -> bool {
        (self.flags as u32) & flag != 0
    }

    fn from_object(obj: &GameObject, flags: u32, cfg: &PhysicsConfig) -> Self {
        let hb = obj.body.hitbox();
        let shake = match obj.stress_label(cfg) {
            StressLabel::Stressed => obj.stress * MAX_SHAKE,
            StressLabel::Normal | StressLabel::Broken => 0.0,
        };
        Self {
            x: hb.x,
            y: hb.y,
            width: hb.width,
            height: hb.height,
            temp: obj.temp,
            stress: obj.stress,
            shake,
            flags: flags as f32,
        }
    }
}

/// Snapshot of everything a renderer or debug overlay needs for one frame.
/// Slot 0 is always the player; objects follow in scene order.
pub struct SnapshotBuffer {
    pub instances: Vec<BodyInstance>,
    /// Scene ID for each object slot (`ids[i]` describes `instances[i + 1]`).
    pub ids: Vec<BodyId>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(64),
            ids: Vec::with_capacity(63),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.ids.clear();
    }

    /// Rebuild the snapshot from the current simulation state.
    pub fn fill(
        &mut self,
        player: &Player,
        scene: &Scene,
        sympathy: &SympathyManager,
        cfg: &PhysicsConfig,
    ) {
        self.clear();

        let hb = player.body.hitbox();
        let mut player_flags = FLAG_PLAYER;
        if player.body.is_on_ground {
            player_flags |= FLAG_GROUNDED;
        }
        self.instances.push(BodyInstance {
            x: hb.x,
            y: hb.y,
            width: hb.width,
            height: hb.height,
            flags: player_flags as f32,
            ..BodyInstance::default()
        });

        let highlighted = sympathy.highlighted();
        let first = sympathy.first_selection();
        for (id, obj) in scene.iter() {
            let mut flags = 0;
            if obj.is_linked() {
                flags |= FLAG_LINKED;
            }
            if obj.body.is_on_ground {
                flags |= FLAG_GROUNDED;
            }
            if obj.is_broken {
                flags |= FLAG_BROKEN;
            }
            if highlighted == Some(id) {
                flags |= FLAG_HIGHLIGHTED;
            }
            if first == Some(id) {
                flags |= FLAG_FIRST_PICK;
            }
            self.instances.push(BodyInstance::from_object(obj, flags, cfg));
            self.ids.push(id);
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The snapshot as a flat float slice, `BodyInstance::FLOATS` per body.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new()
    }
}
