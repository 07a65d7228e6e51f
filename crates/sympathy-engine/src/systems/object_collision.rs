//! Object-versus-object resolution: vertical stacking, then horizontal pushing.
//!
//! Both passes are single sweeps over pairs with no fixed-point iteration.
//! Stacks deeper than two may take a few ticks to settle.

use crate::api::config::PhysicsConfig;
use crate::api::types::BodyId;
use crate::core::body::Contact;
use crate::core::object::GameObject;
use crate::core::scene::Scene;

/// Collectables are pickups; they never block other objects.
fn blocks(obj: &GameObject) -> bool {
    obj.is_collidable && !obj.kind.is_collectable()
}

/// For every ordered pair `(a, b)` where `a` is falling onto `b` from above,
/// rest `a` on `b`'s top edge.
pub fn resolve_stacking(scene: &mut Scene) {
    let ids = scene.ids();
    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let Some((upper, lower)) = scene.pair_mut(a, b) else {
                continue;
            };
            if !upper.is_dynamic() || !upper.is_collidable || !blocks(lower) {
                continue;
            }
            if upper.body.velocity.y <= 0.0 {
                continue;
            }
            let lower_box = lower.body.hitbox();
            if upper.body.hitbox().contact_with(&lower_box) != Some(Contact::Above) {
                continue;
            }
            upper.body.set_hitbox_bottom(lower_box.top());
            upper.body.velocity.y = 0.0;
            upper.body.is_on_ground = true;
        }
    }
}

/// Pick which of two overlapping objects is doing the moving.
/// `None` if neither can be displaced.
fn pick_mover(a: &GameObject, b: &GameObject) -> Option<bool> {
    match (a.is_dynamic(), b.is_dynamic()) {
        (false, false) => None,
        (true, false) => Some(true),
        (false, true) => Some(false),
        (true, true) => Some(a.body.velocity.x.abs() >= b.body.velocity.x.abs()),
    }
}

/// Separate overlapping pairs along the axis of least penetration.
///
/// Along x, a static target stops the mover dead; a dynamic target takes
/// `momentum_transfer` of the mover's horizontal velocity while the mover
/// keeps `mover_damping` of it. Along y, the mover is set on top of (or
/// pushed under) the target.
pub fn resolve_pushing(scene: &mut Scene, cfg: &PhysicsConfig) {
    let ids = scene.ids();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            resolve_pair(scene, a, b, cfg);
        }
    }
}

fn resolve_pair(scene: &mut Scene, a: BodyId, b: BodyId, cfg: &PhysicsConfig) {
    let Some((oa, ob)) = scene.pair_mut(a, b) else {
        return;
    };
    if !blocks(oa) || !blocks(ob) {
        return;
    }
    let (ha, hb) = (oa.body.hitbox(), ob.body.hitbox());
    if !ha.overlaps_vertically(&hb) {
        return;
    }
    let Some(depth) = ha.penetration(&hb) else {
        return;
    };
    let Some(a_moves) = pick_mover(oa, ob) else {
        return;
    };
    let (mover, target) = if a_moves { (oa, ob) } else { (ob, oa) };
    let mover_box = mover.body.hitbox();
    let target_box = target.body.hitbox();

    if depth.x <= depth.y {
        let shift = if mover_box.center().x < target_box.center().x {
            -depth.x
        } else {
            depth.x
        };
        mover.body.position.x += shift;

        let vx = mover.body.velocity.x;
        if target.is_dynamic() {
            target.body.velocity.x = vx * cfg.momentum_transfer;
            mover.body.velocity.x = vx * cfg.mover_damping;
        } else {
            mover.body.velocity.x = 0.0;
        }
    } else if mover_box.center().y < target_box.center().y {
        mover.body.set_hitbox_bottom(target_box.top());
        if mover.body.velocity.y > 0.0 {
            mover.body.velocity.y = 0.0;
        }
        mover.body.is_on_ground = true;
    } else {
        mover.body.set_hitbox_top(target_box.bottom());
        if mover.body.velocity.y < 0.0 {
            mover.body.velocity.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::ObjectDesc;
    use glam::Vec2;

    fn spawn(scene: &mut Scene, x: f32, y: f32) -> BodyId {
        let cfg = PhysicsConfig::default();
        scene.spawn(GameObject::new(
            &ObjectDesc::crate_at(Vec2::new(x, y), Vec2::new(16.0, 16.0)),
            &cfg,
        ))
    }

    #[test]
    fn falling_crate_rests_on_crate_below() {
        let mut scene = Scene::new();
        let lower = spawn(&mut scene, 0.0, 100.0);
        let upper = spawn(&mut scene, 2.0, 86.0);
        scene.get_mut(upper).unwrap().body.velocity.y = 50.0;

        resolve_stacking(&mut scene);

        let u = scene.get(upper).unwrap();
        assert_eq!(u.body.hitbox().bottom(), 100.0);
        assert_eq!(u.body.velocity.y, 0.0);
        assert!(u.body.is_on_ground);
        assert_eq!(scene.get(lower).unwrap().body.position, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn rising_crate_is_not_stacked() {
        let mut scene = Scene::new();
        let _lower = spawn(&mut scene, 0.0, 100.0);
        let upper = spawn(&mut scene, 2.0, 86.0);
        scene.get_mut(upper).unwrap().body.velocity.y = -50.0;
        resolve_stacking(&mut scene);
        assert_eq!(scene.get(upper).unwrap().body.position.y, 86.0);
    }

    #[test]
    fn static_target_stops_mover() {
        let mut scene = Scene::new();
        let mover = spawn(&mut scene, 0.0, 0.0);
        let wall = spawn(&mut scene, 14.0, 0.0);
        scene.get_mut(wall).unwrap().is_static = true;
        scene.get_mut(mover).unwrap().body.velocity.x = 80.0;

        resolve_pushing(&mut scene, &PhysicsConfig::default());

        let m = scene.get(mover).unwrap();
        assert_eq!(m.body.hitbox().right(), 14.0);
        assert_eq!(m.body.velocity.x, 0.0);
        assert_eq!(scene.get(wall).unwrap().body.position.x, 14.0);
    }

    #[test]
    fn dynamic_target_takes_momentum() {
        let cfg = PhysicsConfig::default();
        let mut scene = Scene::new();
        let mover = spawn(&mut scene, 0.0, 0.0);
        let target = spawn(&mut scene, 12.0, 0.0);
        scene.get_mut(mover).unwrap().body.velocity.x = 100.0;

        resolve_pushing(&mut scene, &cfg);

        let m = scene.get(mover).unwrap();
        let t = scene.get(target).unwrap();
        assert_eq!(m.body.hitbox().right(), 12.0);
        assert!((t.body.velocity.x - 90.0).abs() < 1e-4);
        assert!((m.body.velocity.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn faster_body_is_the_mover() {
        let cfg = PhysicsConfig::default();
        let mut scene = Scene::new();
        let slow = spawn(&mut scene, 0.0, 0.0);
        let fast = spawn(&mut scene, 12.0, 0.0);
        scene.get_mut(fast).unwrap().body.velocity.x = -60.0;

        resolve_pushing(&mut scene, &cfg);

        assert_eq!(scene.get(slow).unwrap().body.position.x, 0.0);
        assert_eq!(scene.get(fast).unwrap().body.hitbox().left(), 16.0);
        assert!((scene.get(slow).unwrap().body.velocity.x + 54.0).abs() < 1e-4);
    }

    #[test]
    fn collectables_do_not_block() {
        let cfg = PhysicsConfig::default();
        let mut scene = Scene::new();
        let mover = spawn(&mut scene, 0.0, 0.0);
        let coin = scene.spawn(GameObject::new(
            &ObjectDesc::collectable_at(Vec2::new(10.0, 0.0), Vec2::new(8.0, 8.0), 1),
            &cfg,
        ));
        scene.get_mut(mover).unwrap().body.velocity.x = 50.0;
        resolve_pushing(&mut scene, &cfg);
        assert_eq!(scene.get(mover).unwrap().body.position.x, 0.0);
        assert_eq!(scene.get(coin).unwrap().body.velocity.x, 0.0);
    }

    #[test]
    fn broken_objects_are_ignored() {
        let cfg = PhysicsConfig::default();
        let mut scene = Scene::new();
        let mover = spawn(&mut scene, 0.0, 0.0);
        let wreck = spawn(&mut scene, 10.0, 0.0);
        scene.get_mut(wreck).unwrap().break_object();
        scene.get_mut(mover).unwrap().body.velocity.x = 50.0;
        resolve_pushing(&mut scene, &cfg);
        assert_eq!(scene.get(mover).unwrap().body.velocity.x, 50.0);
    }
}
