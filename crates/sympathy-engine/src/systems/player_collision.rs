//! Player-versus-object contacts.
//!
//! This pass only separates the player from objects and reports what
//! happened. Forces and impulses that result from a contact go through the
//! world so they can travel along a sympathy link.

use glam::Vec2;

use crate::api::config::PhysicsConfig;
use crate::api::types::BodyId;
use crate::core::body::Contact;
use crate::core::object::ObjectKind;
use crate::core::player::Player;
use crate::core::scene::Scene;

/// A contact the world still has to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerContact {
    /// Player landed on the object; push it down by `force`.
    Landed { id: BodyId, force: Vec2 },
    /// Player walked into the object's side; shove it by `impulse`.
    Pushed { id: BodyId, impulse: Vec2 },
    /// Player picked up a collectable worth `value`.
    Collected { id: BodyId, value: u32 },
}

pub fn resolve_player_objects(
    player: &mut Player,
    scene: &mut Scene,
    cfg: &PhysicsConfig,
) -> Vec<PlayerContact> {
    let mut contacts = Vec::new();
    for (id, obj) in scene.iter_mut() {
        if !obj.is_collidable || obj.is_broken || obj.collected {
            continue;
        }
        let obj_box = obj.body.hitbox();
        let player_box = player.body.hitbox();

        if let ObjectKind::Collectable { value } = obj.kind {
            if player_box.overlaps(&obj_box) {
                obj.collected = true;
                obj.is_collidable = false;
                contacts.push(PlayerContact::Collected { id, value });
            }
            continue;
        }

        let Some(contact) = player_box.contact_with(&obj_box) else {
            continue;
        };
        let velocity = player.body.velocity;
        match contact {
            Contact::Above if velocity.y >= 0.0 => {
                player.body.set_hitbox_bottom(obj_box.top());
                player.body.velocity.y = 0.0;
                player.body.is_on_ground = true;
                contacts.push(PlayerContact::Landed {
                    id,
                    force: Vec2::new(0.0, player.mass * cfg.landing_force),
                });
            }
            Contact::Above => {}
            Contact::Below => {
                player.body.set_hitbox_top(obj_box.bottom());
                if velocity.y < 0.0 {
                    player.body.velocity.y = 0.0;
                }
            }
            Contact::Left | Contact::Right => {
                let direction = if contact == Contact::Left { 1.0 } else { -1.0 };
                if direction > 0.0 {
                    player.body.set_hitbox_right(obj_box.left());
                } else {
                    player.body.set_hitbox_left(obj_box.right());
                }
                player.body.velocity.x = 0.0;
                if obj.is_dynamic() && velocity.x * direction > 0.0 {
                    contacts.push(PlayerContact::Pushed {
                        id,
                        impulse: Vec2::new(direction * cfg.push_impulse, 0.0),
                    });
                }
            }
        }
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::{GameObject, ObjectDesc};

    fn setup() -> (Player, Scene, PhysicsConfig) {
        let cfg = PhysicsConfig::default();
        (Player::new(Vec2::ZERO, &cfg), Scene::new(), cfg)
    }

    /// Place the player so its hitbox's top-left sits at `(x, y)`.
    fn place(player: &mut Player, x: f32, y: f32) {
        player.body.set_hitbox_origin(x, y);
    }

    #[test]
    fn landing_on_crate_grounds_player_and_reports_force() {
        let (mut player, mut scene, cfg) = setup();
        let id = scene.spawn(GameObject::new(
            &ObjectDesc::crate_at(Vec2::new(0.0, 100.0), Vec2::splat(32.0)),
            &cfg,
        ));
        // Hitbox 10x35; bottom 3 units into the crate.
        place(&mut player, 10.0, 68.0);
        player.body.velocity.y = 200.0;

        let contacts = resolve_player_objects(&mut player, &mut scene, &cfg);

        assert_eq!(player.body.hitbox().bottom(), 100.0);
        assert_eq!(player.body.velocity.y, 0.0);
        assert!(player.body.is_on_ground);
        assert_eq!(
            contacts,
            vec![PlayerContact::Landed {
                id,
                force: Vec2::new(0.0, 200.0)
            }]
        );
    }

    #[test]
    fn walking_into_crate_reports_push() {
        let (mut player, mut scene, cfg) = setup();
        let id = scene.spawn(GameObject::new(
            &ObjectDesc::crate_at(Vec2::new(100.0, 0.0), Vec2::splat(32.0)),
            &cfg,
        ));
        place(&mut player, 92.0, 0.0);
        player.body.velocity.x = 100.0;

        let contacts = resolve_player_objects(&mut player, &mut scene, &cfg);

        assert_eq!(player.body.hitbox().right(), 100.0);
        assert_eq!(player.body.velocity.x, 0.0, "side contact stops the player");
        assert_eq!(
            contacts,
            vec![PlayerContact::Pushed {
                id,
                impulse: Vec2::new(300.0, 0.0)
            }]
        );
    }

    #[test]
    fn static_crate_blocks_player() {
        let (mut player, mut scene, cfg) = setup();
        scene.spawn(GameObject::new(
            &ObjectDesc::crate_at(Vec2::new(0.0, 0.0), Vec2::splat(32.0)).with_static(true),
            &cfg,
        ));
        place(&mut player, 28.0, 0.0);
        player.body.velocity.x = -80.0;

        let contacts = resolve_player_objects(&mut player, &mut scene, &cfg);

        assert!(contacts.is_empty());
        assert_eq!(player.body.hitbox().left(), 32.0);
        assert_eq!(player.body.velocity.x, 0.0);
    }

    #[test]
    fn head_bump_stops_rise() {
        let (mut player, mut scene, cfg) = setup();
        scene.spawn(GameObject::new(
            &ObjectDesc::crate_at(Vec2::new(0.0, 0.0), Vec2::splat(32.0)),
            &cfg,
        ));
        place(&mut player, 10.0, 30.0);
        player.body.velocity.y = -300.0;

        let contacts = resolve_player_objects(&mut player, &mut scene, &cfg);

        assert!(contacts.is_empty());
        assert_eq!(player.body.hitbox().top(), 32.0);
        assert_eq!(player.body.velocity.y, 0.0);
    }

    #[test]
    fn collectable_is_picked_up_once() {
        let (mut player, mut scene, cfg) = setup();
        let coin = scene.spawn(GameObject::new(
            &ObjectDesc::collectable_at(Vec2::new(0.0, 0.0), Vec2::splat(16.0), 7),
            &cfg,
        ));
        place(&mut player, 4.0, 4.0);

        let first = resolve_player_objects(&mut player, &mut scene, &cfg);
        let second = resolve_player_objects(&mut player, &mut scene, &cfg);

        assert_eq!(first, vec![PlayerContact::Collected { id: coin, value: 7 }]);
        assert!(second.is_empty());
        assert_eq!(player.body.hitbox().left(), 4.0, "collectables never block");
    }
}
