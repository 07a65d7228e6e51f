pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod sympathy;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::config::PhysicsConfig;
pub use api::types::{BodyId, LinkId, SimEvent};
pub use assets::level::{LevelDef, LevelError};
pub use components::tilemap::{SolidTiles, TileFn, TileGrid};
pub use components::zone::{TemperatureZone, Trigger, TriggerKind};
pub use core::body::{Body, Contact, Hitbox};
pub use core::object::{GameObject, ObjectDesc, ObjectKind, StressLabel};
pub use core::player::{Concentration, Player, PlayerIntent, PlayerMotion};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use core::world::World;
pub use sympathy::{SelectionStep, SympathyLink, SympathyManager};
pub use systems::extract::{BodyInstance, SnapshotBuffer};

pub use glam::Vec2;
