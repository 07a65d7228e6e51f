//! A single coupling between two objects.
//!
//! The link holds two [`BodyId`]s and never owns the objects. Each end keeps
//! a non-owning `sympathy_linked_item` pointing at its partner and a `link`
//! handle naming this link; both are cleared on teardown.

use glam::Vec2;

use crate::api::config::PhysicsConfig;
use crate::api::types::{BodyId, LinkId};
use crate::core::object::GameObject;
use crate::core::player::Concentration;
use crate::core::scene::Scene;

#[derive(Debug, Clone, PartialEq)]
pub struct SympathyLink {
    id: LinkId,
    object_a: BodyId,
    object_b: BodyId,
    similarity: f32,
    active: bool,
}

/// Ratio of the smaller to the larger of two positive quantities, in [0, 1].
fn ratio(a: f32, b: f32) -> f32 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    if hi <= 0.0 || !hi.is_finite() {
        return 0.0;
    }
    (lo / hi).clamp(0.0, 1.0)
}

impl SympathyLink {
    /// Score how alike two objects are, from mass, temperature and footprint.
    /// Always lands in `[min_similarity, max_similarity]`.
    pub fn similarity_between(a: &GameObject, b: &GameObject, cfg: &PhysicsConfig) -> f32 {
        let mass = ratio(a.mass, b.mass);
        let temp = if cfg.max_temp_diff > 0.0 {
            (1.0 - (a.temp - b.temp).abs() / cfg.max_temp_diff).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let size = ratio(a.area(), b.area());

        let score = mass * cfg.mass_weight + temp * cfg.temp_weight + size * cfg.size_weight;
        if score.is_finite() {
            score.clamp(cfg.min_similarity, cfg.max_similarity)
        } else {
            cfg.min_similarity
        }
    }

    /// Build an active link and compute its similarity once. Back-references
    /// on the objects are the manager's job.
    pub fn new(
        id_a: BodyId,
        a: &GameObject,
        id_b: BodyId,
        b: &GameObject,
        cfg: &PhysicsConfig,
    ) -> Self {
        Self {
            id: LinkId::default(),
            object_a: id_a,
            object_b: id_b,
            similarity: Self::similarity_between(a, b, cfg),
            active: true,
        }
    }

    pub fn with_id(mut self, id: LinkId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn object_a(&self) -> BodyId {
        self.object_a
    }

    pub fn object_b(&self) -> BodyId {
        self.object_b
    }

    pub fn similarity(&self) -> f32 {
        self.similarity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn involves(&self, id: BodyId) -> bool {
        self.object_a == id || self.object_b == id
    }

    /// The far end of the link as seen from `id`.
    pub fn partner_of(&self, id: BodyId) -> Option<BodyId> {
        if id == self.object_a {
            Some(self.object_b)
        } else if id == self.object_b {
            Some(self.object_a)
        } else {
            None
        }
    }

    /// Concentration spent per second. Poor matches cost more.
    pub fn drain_rate(&self, cfg: &PhysicsConfig) -> f32 {
        cfg.base_drain / self.similarity
    }

    /// Hand `force * similarity` to the partner of `from`. The partner takes
    /// it through [`GameObject::receive_sympathy_force`], which never routes
    /// back through a link. Returns the force actually applied.
    pub fn transfer_force(&self, scene: &mut Scene, from: BodyId, force: Vec2) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        let partner = scene.get_mut(self.partner_of(from)?)?;
        let scaled = force * self.similarity;
        partner.receive_sympathy_force(scaled);
        Some(scaled)
    }

    /// Impulse counterpart of [`SympathyLink::transfer_force`].
    pub fn transfer_impulse(
        &self,
        scene: &mut Scene,
        from: BodyId,
        impulse: Vec2,
        max_speed: f32,
    ) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        let partner = scene.get_mut(self.partner_of(from)?)?;
        let scaled = impulse * self.similarity;
        partner.apply_impulse(scaled, max_speed);
        Some(scaled)
    }

    /// Pass `delta_temp * similarity` degrees on to the partner of `from`.
    pub fn transfer_heat(&self, scene: &mut Scene, from: BodyId, delta_temp: f32) -> Option<f32> {
        if !self.active {
            return None;
        }
        let partner = scene.get_mut(self.partner_of(from)?)?;
        let scaled = delta_temp * self.similarity;
        partner.add_heat(scaled);
        Some(scaled)
    }

    /// Drain the player's concentration for `dt` seconds. The link goes
    /// inactive on the tick the pool reaches zero. Returns whether it is
    /// still active.
    pub fn update(&mut self, concentration: &mut Concentration, dt: f32, cfg: &PhysicsConfig) -> bool {
        if !self.active {
            return false;
        }
        concentration.consume(self.drain_rate(cfg) * dt);
        if !concentration.can_use() {
            log::debug!("concentration exhausted, link {:?} <-> {:?} fading", self.object_a, self.object_b);
            self.active = false;
        }
        self.active
    }

    /// Deactivate and clear the back-references on both ends. Objects that
    /// no longer exist are skipped. Returns `true` only on the first call.
    pub fn break_link(&mut self, scene: &mut Scene) -> bool {
        let was_active = self.active;
        self.active = false;
        for (id, partner) in [(self.object_a, self.object_b), (self.object_b, self.object_a)] {
            if let Some(obj) = scene.get_mut(id) {
                if obj.sympathy_linked_item == Some(partner) {
                    obj.sympathy_linked_item = None;
                }
                if obj.link == Some(self.id) {
                    obj.link = None;
                }
            }
        }
        was_active
    }
}
