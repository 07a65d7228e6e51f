//! The per-tick orchestrator.
//!
//! [`World`] owns every piece of simulation state for one loaded level and
//! runs the fixed pipeline in [`World::tick`]. The shell decides when to
//! tick; while it is browsing link candidates or paused it simply doesn't.

use glam::Vec2;

use crate::api::config::PhysicsConfig;
use crate::api::types::{BodyId, SimEvent};
use crate::components::tilemap::TileGrid;
use crate::components::zone::{TemperatureZone, Trigger, TriggerKind};
use crate::core::object::{GameObject, ObjectDesc};
use crate::core::player::{Player, PlayerIntent};
use crate::core::scene::Scene;
use crate::sympathy::{SelectionStep, SympathyManager};
use crate::systems::extract::SnapshotBuffer;
use crate::systems::object_collision::{resolve_pushing, resolve_stacking};
use crate::systems::player_collision::{resolve_player_objects, PlayerContact};
use crate::systems::tile_collision::resolve_tiles;

pub struct World {
    pub config: PhysicsConfig,
    pub scene: Scene,
    pub tiles: TileGrid,
    pub player: Player,
    pub sympathy: SympathyManager,
    zones: Vec<TemperatureZone>,
    triggers: Vec<Trigger>,
    intent: PlayerIntent,
    events: Vec<SimEvent>,
    /// Player was inside a goal trigger at the end of the last tick.
    in_goal: bool,
    /// Fall-out already reported since the last respawn.
    fell_out: bool,
    /// Scratch: y position of each object before integration.
    previous_y: Vec<(BodyId, f32)>,
    tick_count: u64,
}

impl World {
    pub fn new(tiles: TileGrid, spawn: Vec2, config: PhysicsConfig) -> Self {
        let player = Player::new(spawn, &config);
        Self {
            config,
            scene: Scene::new(),
            tiles,
            player,
            sympathy: SympathyManager::new(),
            zones: Vec::new(),
            triggers: Vec::new(),
            intent: PlayerIntent::default(),
            events: Vec::with_capacity(16),
            in_goal: false,
            fell_out: false,
            previous_y: Vec::with_capacity(32),
            tick_count: 0,
        }
    }

    // -- Population --

    pub fn spawn_object(&mut self, desc: &ObjectDesc) -> BodyId {
        let id = self.scene.spawn(GameObject::new(desc, &self.config));
        log::debug!("spawned {:?} as {:?}", desc.kind, id);
        id
    }

    pub fn add_zone(&mut self, zone: TemperatureZone) {
        self.zones.push(zone);
    }

    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn zones(&self) -> &[TemperatureZone] {
        &self.zones
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Tear down every object, zone, trigger and link of the current level.
    /// The player keeps their score; the tile grid becomes empty.
    pub fn destroy(&mut self) {
        log::info!("destroying level ({} objects)", self.scene.len());
        self.sympathy.reset();
        self.scene.clear();
        self.zones.clear();
        self.triggers.clear();
        self.tiles = TileGrid::empty(self.tiles.tile_size);
        self.events.clear();
        self.intent = PlayerIntent::default();
        self.in_goal = false;
        self.fell_out = false;
    }

    // -- Queries --

    /// Size of the tile map in world units.
    pub fn map_size(&self) -> Vec2 {
        self.tiles.pixel_size()
    }

    /// Events raised by the most recent tick or link operation.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Objects that could currently take part in a link.
    pub fn link_candidates(&self) -> Vec<BodyId> {
        self.scene
            .iter()
            .filter(|(_, obj)| obj.is_sympathy_capable() && !obj.is_linked())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn snapshot(&self, buffer: &mut SnapshotBuffer) {
        buffer.fill(&self.player, &self.scene, &self.sympathy, &self.config);
    }

    // -- Player --

    /// Input for the next tick. A pending jump is consumed by that tick.
    pub fn set_intent(&mut self, intent: PlayerIntent) {
        self.intent = intent;
    }

    /// Put the player back at the spawn point with a full concentration pool
    /// and no active link.
    pub fn respawn_player(&mut self) {
        if let Some((a, b)) = self.sympathy.break_link(&mut self.scene) {
            self.events.push(SimEvent::LinkBroken { a, b });
        }
        self.sympathy.exit_selection();
        self.player.reset();
        self.intent = PlayerIntent::default();
        self.fell_out = false;
        self.in_goal = false;
        log::info!("player respawned at {:?}", self.player.spawn_point());
    }

    // -- Routed interactions --

    /// Add a force to `id` and hand the attenuated share to its link partner.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) -> bool {
        let Some(obj) = self.scene.get_mut(id) else {
            return false;
        };
        obj.apply_force(force);
        if let Some(link) = self.sympathy.active_link().filter(|l| l.involves(id)) {
            link.transfer_force(&mut self.scene, id, force);
        }
        true
    }

    /// Change `id`'s velocity by an impulse and pass the attenuated share on.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) -> bool {
        let max_speed = self.config.max_push_speed;
        let Some(obj) = self.scene.get_mut(id) else {
            return false;
        };
        obj.apply_impulse(impulse, max_speed);
        if let Some(link) = self.sympathy.active_link().filter(|l| l.involves(id)) {
            link.transfer_impulse(&mut self.scene, id, impulse, max_speed);
        }
        true
    }

    /// Shift `id`'s temperature and pass the attenuated share on.
    pub fn apply_heat(&mut self, id: BodyId, delta_temp: f32) -> bool {
        let Some(obj) = self.scene.get_mut(id) else {
            return false;
        };
        obj.add_heat(delta_temp);
        if let Some(link) = self.sympathy.active_link().filter(|l| l.involves(id)) {
            link.transfer_heat(&mut self.scene, id, delta_temp);
        }
        true
    }

    // -- Sympathy --

    pub fn create_link(&mut self, a: BodyId, b: BodyId) -> bool {
        let created = self.sympathy.create_link(
            &mut self.scene,
            a,
            b,
            &self.player.concentration,
            &self.config,
        );
        if let Some(link) = self.sympathy.active_link().filter(|_| created) {
            self.events.push(SimEvent::LinkCreated {
                a,
                b,
                similarity: link.similarity(),
            });
        }
        created
    }

    pub fn break_link(&mut self) -> bool {
        match self.sympathy.break_link(&mut self.scene) {
            Some((a, b)) => {
                self.events.push(SimEvent::LinkBroken { a, b });
                true
            }
            None => false,
        }
    }

    /// Start browsing link candidates. Refused while a link is active or
    /// when fewer than two candidates exist.
    pub fn begin_link_selection(&mut self) -> bool {
        let candidates = self.link_candidates();
        self.sympathy.enter_selection(candidates)
    }

    pub fn confirm_link_selection(&mut self) -> SelectionStep {
        let step = self.sympathy.confirm_selection(
            &mut self.scene,
            &self.player.concentration,
            &self.config,
        );
        if let SelectionStep::Linked { a, b, similarity } = step {
            self.events.push(SimEvent::LinkCreated { a, b, similarity });
        }
        step
    }

    // -- Tick --

    /// Advance the simulation by `dt` seconds.
    ///
    /// Order: gravity, integration, tiles, stacking, pushing, player,
    /// player/object contacts, link upkeep, zones, triggers, cleanup.
    /// Non-finite or non-positive `dt` is ignored; larger values are
    /// clamped to `max_frame_dt`.
    pub fn tick(&mut self, dt: f32) {
        self.events.clear();
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.config.max_frame_dt);
        self.tick_count += 1;

        self.apply_gravity();
        self.integrate_objects(dt);
        self.resolve_object_tiles();
        resolve_stacking(&mut self.scene);
        resolve_pushing(&mut self.scene, &self.config);
        self.step_player(dt);
        self.resolve_player_contacts();

        self.step_sympathy(dt);
        self.apply_zones(dt);
        self.check_triggers();
        self.check_fall_out();
        self.cleanup();
    }

    fn apply_gravity(&mut self) {
        let g = self.config.gravity;
        for (_, obj) in self.scene.iter_mut() {
            if obj.is_dynamic() {
                obj.apply_force(Vec2::new(0.0, g * obj.mass));
            }
        }
    }

    /// Drain or regenerate concentration without advancing any physics.
    /// The shell calls this while the world is frozen for link selection.
    pub fn update_sympathy(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.step_sympathy(dt.min(self.config.max_frame_dt));
    }

    fn step_sympathy(&mut self, dt: f32) {
        if let Some((a, b)) = self.sympathy.update(
            &mut self.scene,
            &mut self.player.concentration,
            dt,
            &self.config,
        ) {
            self.events.push(SimEvent::LinkBroken { a, b });
        }
    }

    fn integrate_objects(&mut self, dt: f32) {
        self.previous_y.clear();
        let mut broken = Vec::new();
        for (id, obj) in self.scene.iter_mut() {
            self.previous_y.push((id, obj.body.position.y));
            if obj.integrate(dt, &self.config) {
                broken.push(id);
            }
        }
        for id in broken {
            log::info!("object {:?} broke under thermal stress", id);
            self.events.push(SimEvent::ObjectBroken(id));
            if let Some((a, b)) = self.sympathy.break_link_involving(&mut self.scene, id) {
                self.events.push(SimEvent::LinkBroken { a, b });
            }
        }
    }

    fn resolve_object_tiles(&mut self) {
        for &(id, previous_y) in &self.previous_y {
            let Some(obj) = self.scene.get_mut(id) else {
                continue;
            };
            if !obj.is_dynamic() {
                continue;
            }
            obj.body.is_on_ground = false;
            resolve_tiles(&mut obj.body, previous_y, &self.tiles);
        }
    }

    fn step_player(&mut self, dt: f32) {
        let map_width = self.tiles.pixel_size().x;
        self.player.apply_intent(self.intent, dt, &self.config);
        self.player.step(dt, &self.tiles, map_width, &self.config);
        self.intent.jump = false;
    }

    fn resolve_player_contacts(&mut self) {
        let contacts = resolve_player_objects(&mut self.player, &mut self.scene, &self.config);
        for contact in contacts {
            match contact {
                PlayerContact::Landed { id, force } => {
                    self.apply_force(id, force);
                }
                PlayerContact::Pushed { id, impulse } => {
                    self.apply_impulse(id, impulse);
                }
                PlayerContact::Collected { id, value } => {
                    self.player.score += value;
                    log::info!("collected {:?} worth {} (score {})", id, value, self.player.score);
                    self.events.push(SimEvent::Collected { id, value });
                }
            }
        }
    }

    fn apply_zones(&mut self, dt: f32) {
        if self.zones.is_empty() {
            return;
        }
        for id in self.scene.ids() {
            let Some(obj) = self.scene.get(id) else {
                continue;
            };
            if obj.is_broken {
                continue;
            }
            let hitbox = obj.body.hitbox();
            let delta: f32 = self
                .zones
                .iter()
                .filter(|zone| zone.affects(&hitbox))
                .map(|zone| zone.delta_per_second * dt)
                .sum();
            if delta != 0.0 {
                self.apply_heat(id, delta);
            }
        }
    }

    fn check_triggers(&mut self) {
        let hitbox = self.player.body.hitbox();
        let in_goal = self
            .triggers
            .iter()
            .any(|t| t.kind == TriggerKind::Goal && t.rect.overlaps(&hitbox));
        if in_goal && !self.in_goal {
            log::info!("goal reached");
            self.events.push(SimEvent::GoalReached);
        }
        self.in_goal = in_goal;
    }

    fn check_fall_out(&mut self) {
        let limit = self.map_size().y + self.config.fall_out_padding;
        if !self.fell_out && self.player.body.hitbox().top() > limit {
            log::info!("player fell out of the map");
            self.fell_out = true;
            self.events.push(SimEvent::PlayerFellOut);
        }
    }

    fn cleanup(&mut self) {
        for id in self.scene.removable_ids() {
            if let Some((a, b)) = self.sympathy.break_link_involving(&mut self.scene, id) {
                self.events.push(SimEvent::LinkBroken { a, b });
            }
            self.scene.despawn(id);
            self.events.push(SimEvent::ObjectRemoved(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// 40x20 tiles of 16 units with a floor on row 15.
    fn floor_world() -> World {
        let mut tiles = TileGrid::new(40, 20, 16.0);
        tiles.fill_rect(0, 15, 40, 1, true);
        World::new(tiles, Vec2::new(0.0, 100.0), PhysicsConfig::default())
    }

    fn crate_at(x: f32, y: f32) -> ObjectDesc {
        ObjectDesc::crate_at(Vec2::new(x, y), Vec2::splat(16.0))
    }

    #[test]
    fn resting_crate_does_not_drift() {
        let mut world = floor_world();
        let id = world.spawn_object(&crate_at(320.0, 224.0));
        for _ in 0..5 {
            world.tick(DT);
        }
        let settled = world.scene.get(id).unwrap().body.position;
        assert_eq!(world.scene.get(id).unwrap().body.hitbox().bottom(), 240.0);
        for i in 0..600 {
            world.tick(DT);
            let obj = world.scene.get(id).unwrap();
            assert_eq!(obj.body.position, settled, "drifted at tick {i}");
            assert!(obj.body.is_on_ground);
        }
    }

    #[test]
    fn falling_crate_lands_on_floor() {
        let mut world = floor_world();
        let id = world.spawn_object(&crate_at(320.0, 50.0));
        for _ in 0..120 {
            world.tick(DT);
        }
        let obj = world.scene.get(id).unwrap();
        assert_eq!(obj.body.hitbox().bottom(), 240.0);
        assert_eq!(obj.body.velocity.y, 0.0);
    }

    #[test]
    fn crates_stack() {
        let mut world = floor_world();
        let lower = world.spawn_object(&crate_at(320.0, 224.0));
        let upper = world.spawn_object(&crate_at(322.0, 150.0));
        for _ in 0..120 {
            world.tick(DT);
        }
        let lower_top = world.scene.get(lower).unwrap().body.hitbox().top();
        let upper_obj = world.scene.get(upper).unwrap();
        assert_eq!(lower_top, 224.0);
        assert_eq!(upper_obj.body.hitbox().bottom(), lower_top);
        assert!(upper_obj.body.is_on_ground);
    }

    #[test]
    fn routed_force_reaches_partner() {
        let mut world = floor_world();
        let a = world.spawn_object(&crate_at(100.0, 224.0));
        let b = world.spawn_object(&crate_at(300.0, 224.0));
        assert!(world.create_link(a, b));
        assert!(matches!(world.events(), [SimEvent::LinkCreated { .. }]));

        world.apply_force(a, Vec2::new(100.0, 0.0));
        assert_eq!(world.scene.get(a).unwrap().forces, Vec2::new(100.0, 0.0));
        assert_eq!(world.scene.get(b).unwrap().forces, Vec2::new(95.0, 0.0));
    }

    #[test]
    fn overheated_crate_breaks_and_takes_link_with_it() {
        let mut world = floor_world();
        let a = world.spawn_object(&crate_at(100.0, 224.0).with_temp(500.0));
        let b = world.spawn_object(&crate_at(300.0, 224.0));
        assert!(world.create_link(a, b));

        let mut broke = 0;
        let mut removed = false;
        for _ in 0..2000 {
            world.tick(DT);
            for event in world.events() {
                match event {
                    SimEvent::ObjectBroken(id) if *id == a => broke += 1,
                    SimEvent::ObjectRemoved(id) if *id == a => removed = true,
                    _ => {}
                }
            }
            if removed {
                break;
            }
        }
        assert_eq!(broke, 1);
        assert!(removed);
        assert!(!world.scene.contains(a));
        assert!(!world.sympathy.has_active_link());
        assert!(!world.scene.get(b).unwrap().is_linked());
    }

    #[test]
    fn zone_heat_spreads_to_partner() {
        let mut world = floor_world();
        let a = world.spawn_object(&crate_at(100.0, 224.0));
        let b = world.spawn_object(&crate_at(300.0, 224.0));
        world.add_zone(TemperatureZone::new(Vec2::new(80.0, 200.0), Vec2::new(64.0, 40.0), 60.0));
        assert!(world.create_link(a, b));

        world.tick(1.0);

        let cap = world.config.max_frame_dt;
        let ta = world.scene.get(a).unwrap().temp;
        let tb = world.scene.get(b).unwrap().temp;
        assert!((ta - (20.0 + 60.0 * cap)).abs() < 1e-3, "zone heat on a: {ta}");
        assert!((tb - (20.0 + 60.0 * cap * 0.95)).abs() < 1e-3, "linked heat on b: {tb}");
    }

    #[test]
    fn player_collects_and_scores() {
        let mut world = floor_world();
        // Resting on the floor, ahead of the player's walking path.
        let coin = world.spawn_object(&ObjectDesc::collectable_at(
            Vec2::new(150.0, 224.0),
            Vec2::splat(16.0),
            5,
        ));
        let mut collected = false;
        for _ in 0..120 {
            world.set_intent(PlayerIntent {
                horizontal: 1.0,
                jump: false,
            });
            world.tick(DT);
            collected |= world.events().contains(&SimEvent::Collected { id: coin, value: 5 });
        }
        assert!(collected);
        assert_eq!(world.player.score, 5);
        assert!(!world.scene.contains(coin));
    }

    #[test]
    fn goal_fires_once_per_entry() {
        let mut world = floor_world();
        world.add_trigger(Trigger::goal(Vec2::new(0.0, 0.0), Vec2::new(200.0, 240.0)));
        let mut goals = 0;
        for _ in 0..120 {
            world.tick(DT);
            goals += world.events().iter().filter(|e| **e == SimEvent::GoalReached).count();
        }
        assert_eq!(goals, 1);
    }

    #[test]
    fn fall_out_is_reported_then_reset_by_respawn() {
        let tiles = TileGrid::new(10, 10, 16.0);
        let mut world = World::new(tiles, Vec2::new(20.0, 0.0), PhysicsConfig::default());
        let mut reports = 0;
        for _ in 0..240 {
            world.tick(DT);
            reports += world.events().iter().filter(|e| **e == SimEvent::PlayerFellOut).count();
        }
        assert_eq!(reports, 1);

        world.respawn_player();
        assert_eq!(world.player.body.position, Vec2::new(20.0, 0.0));
        assert_eq!(world.player.concentration.current(), world.config.max_concentration);
    }

    #[test]
    fn selection_flow_creates_link() {
        let mut world = floor_world();
        world.spawn_object(&crate_at(100.0, 224.0));
        world.spawn_object(&crate_at(300.0, 224.0));
        assert!(world.begin_link_selection());
        assert!(matches!(world.confirm_link_selection(), SelectionStep::Picked(_)));
        world.sympathy.select_next();
        assert!(matches!(world.confirm_link_selection(), SelectionStep::Linked { .. }));
        assert!(world.sympathy.has_active_link());
        assert!(!world.begin_link_selection(), "only one link at a time");
    }

    #[test]
    fn destroy_clears_level_state() {
        let mut world = floor_world();
        let a = world.spawn_object(&crate_at(100.0, 224.0));
        let b = world.spawn_object(&crate_at(300.0, 224.0));
        world.add_zone(TemperatureZone::new(Vec2::ZERO, Vec2::ONE, 1.0));
        world.create_link(a, b);
        world.player.score = 3;

        world.destroy();

        assert!(world.scene.is_empty());
        assert!(world.zones().is_empty());
        assert!(!world.sympathy.has_active_link());
        assert_eq!(world.map_size(), Vec2::ZERO);
        assert_eq!(world.player.score, 3);
    }

    #[test]
    fn bad_dt_is_ignored() {
        let mut world = floor_world();
        let id = world.spawn_object(&crate_at(320.0, 50.0));
        world.tick(f32::NAN);
        world.tick(-1.0);
        assert_eq!(world.tick_count(), 0);
        assert_eq!(world.scene.get(id).unwrap().body.position, Vec2::new(320.0, 50.0));
    }

    #[test]
    fn sympathy_update_regenerates_without_physics() {
        let mut world = floor_world();
        let id = world.spawn_object(&crate_at(320.0, 50.0));
        world.player.concentration.consume(50.0);

        // Long deltas are clamped like a tick's.
        world.update_sympathy(0.5);
        let expected = 50.0 + world.config.regen_rate * world.config.max_frame_dt;
        let current = world.player.concentration.current();
        assert!((current - expected).abs() < 1e-4, "{current} != {expected}");
        assert_eq!(world.tick_count(), 0);
        assert_eq!(world.scene.get(id).unwrap().body.position, Vec2::new(320.0, 50.0));

        world.update_sympathy(f32::NAN);
        assert_eq!(world.player.concentration.current(), current);
    }
}
