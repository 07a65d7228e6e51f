//! Owns at most one active [`SympathyLink`] and the candidate-selection
//! cursor the shell drives while the player is picking a pair.

use crate::api::config::PhysicsConfig;
use crate::api::types::{BodyId, LinkId};
use crate::core::player::Concentration;
use crate::core::scene::Scene;
use crate::sympathy::link::SympathyLink;

/// Result of confirming the highlighted candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionStep {
    /// Nothing happened (not selecting, or the same object picked twice).
    Ignored,
    /// First object chosen; waiting for the second.
    Picked(BodyId),
    /// Second object chosen and the link was created. Selection has ended.
    Linked { a: BodyId, b: BodyId, similarity: f32 },
    /// Second object chosen but the link was refused. Selection has ended.
    Rejected,
}

#[derive(Debug, Clone, Default)]
struct Selection {
    candidates: Vec<BodyId>,
    cursor: usize,
    first: Option<BodyId>,
}

#[derive(Debug, Default)]
pub struct SympathyManager {
    link: Option<SympathyLink>,
    selection: Option<Selection>,
    /// Last issued link handle.
    last_link_id: u32,
}

impl SympathyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_active_link(&self) -> bool {
        self.link.as_ref().is_some_and(|l| l.is_active())
    }

    pub fn active_link(&self) -> Option<&SympathyLink> {
        self.link.as_ref().filter(|l| l.is_active())
    }

    /// Link `a` and `b`. Refused (returns `false`, nothing changes) when a
    /// link already exists, the pool is empty, or either object is missing,
    /// already linked, broken, or not sympathy-capable.
    pub fn create_link(
        &mut self,
        scene: &mut Scene,
        a: BodyId,
        b: BodyId,
        concentration: &Concentration,
        cfg: &PhysicsConfig,
    ) -> bool {
        if self.has_active_link() {
            log::debug!("link refused: a link is already active");
            return false;
        }
        if !concentration.can_use() {
            log::debug!("link refused: concentration exhausted");
            return false;
        }
        let Some((oa, ob)) = scene.pair_mut(a, b) else {
            return false;
        };
        if !oa.is_sympathy_capable() || !ob.is_sympathy_capable() {
            return false;
        }
        if oa.is_linked() || ob.is_linked() {
            return false;
        }

        self.last_link_id = self.last_link_id.wrapping_add(1);
        let id = LinkId(self.last_link_id);
        let link = SympathyLink::new(a, oa, b, ob, cfg).with_id(id);
        oa.sympathy_linked_item = Some(b);
        ob.sympathy_linked_item = Some(a);
        oa.link = Some(id);
        ob.link = Some(id);
        log::info!("sympathy link {:?} <-> {:?}, similarity {:.2}", a, b, link.similarity());
        self.link = Some(link);
        true
    }

    /// Tear down the current link. Idempotent; returns the pair that was
    /// linked if this call did the teardown.
    pub fn break_link(&mut self, scene: &mut Scene) -> Option<(BodyId, BodyId)> {
        let mut link = self.link.take()?;
        let pair = (link.object_a(), link.object_b());
        link.break_link(scene);
        log::info!("sympathy link {:?} <-> {:?} broken", pair.0, pair.1);
        Some(pair)
    }

    /// Tear down the link only if it touches `id`.
    pub fn break_link_involving(&mut self, scene: &mut Scene, id: BodyId) -> Option<(BodyId, BodyId)> {
        if self.link.as_ref().is_some_and(|l| l.involves(id)) {
            self.break_link(scene)
        } else {
            None
        }
    }

    /// Drain concentration while linked, regenerate it otherwise. Returns the
    /// pair if the link ran dry and was torn down this tick.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        concentration: &mut Concentration,
        dt: f32,
        cfg: &PhysicsConfig,
    ) -> Option<(BodyId, BodyId)> {
        match self.link.as_mut() {
            Some(link) => {
                if link.update(concentration, dt, cfg) {
                    None
                } else {
                    self.break_link(scene)
                }
            }
            None => {
                concentration.restore(cfg.regen_rate * dt);
                None
            }
        }
    }

    /// Drop the link and any selection without touching objects. Used when
    /// the whole scene is being discarded.
    pub fn reset(&mut self) {
        self.link = None;
        self.selection = None;
    }

    // -- Candidate selection --

    /// Start browsing `candidates`. Refused while a link is active or when
    /// there are fewer than two candidates to pick from.
    pub fn enter_selection(&mut self, candidates: Vec<BodyId>) -> bool {
        if self.has_active_link() || candidates.len() < 2 {
            return false;
        }
        self.selection = Some(Selection {
            candidates,
            ..Selection::default()
        });
        true
    }

    pub fn exit_selection(&mut self) {
        self.selection = None;
    }

    pub fn is_selecting(&self) -> bool {
        self.selection.is_some()
    }

    pub fn candidates(&self) -> &[BodyId] {
        self.selection
            .as_ref()
            .map(|s| s.candidates.as_slice())
            .unwrap_or(&[])
    }

    pub fn highlighted(&self) -> Option<BodyId> {
        let s = self.selection.as_ref()?;
        s.candidates.get(s.cursor).copied()
    }

    pub fn first_selection(&self) -> Option<BodyId> {
        self.selection.as_ref()?.first
    }

    pub fn select_next(&mut self) {
        if let Some(s) = self.selection.as_mut() {
            s.cursor = (s.cursor + 1) % s.candidates.len();
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(s) = self.selection.as_mut() {
            let n = s.candidates.len();
            s.cursor = (s.cursor + n - 1) % n;
        }
    }

    /// Confirm the highlighted candidate. The first confirm remembers it;
    /// the second tries to link the two and always ends the selection.
    pub fn confirm_selection(
        &mut self,
        scene: &mut Scene,
        concentration: &Concentration,
        cfg: &PhysicsConfig,
    ) -> SelectionStep {
        let Some(current) = self.highlighted() else {
            return SelectionStep::Ignored;
        };
        let Some(first) = self.first_selection() else {
            if let Some(s) = self.selection.as_mut() {
                s.first = Some(current);
            }
            return SelectionStep::Picked(current);
        };
        if first == current {
            return SelectionStep::Ignored;
        }

        self.exit_selection();
        if self.create_link(scene, first, current, concentration, cfg) {
            let similarity = self.active_link().map_or(0.0, |l| l.similarity());
            SelectionStep::Linked {
                a: first,
                b: current,
                similarity,
            }
        } else {
            SelectionStep::Rejected
        }
    }
}
