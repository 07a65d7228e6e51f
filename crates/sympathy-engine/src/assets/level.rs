use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::config::PhysicsConfig;
use crate::components::tilemap::TileGrid;
use crate::components::zone::{TemperatureZone, Trigger};
use crate::core::object::{ObjectDesc, ObjectKind};
use crate::core::world::World;

/// Errors raised while reading or validating a level definition.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to parse level JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("solid layer has {found} rows, expected {expected}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} tiles, expected {expected}")]
    InvalidGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("tile layer has {found} tiles, expected {expected}")]
    TileCount { expected: usize, found: usize },
    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f32),
    #[error("grid of {width}x{height} tiles is too large")]
    GridTooLarge { width: u32, height: u32 },
}

/// A level as authored: tile grid, objects, zones, triggers and spawn point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// One string per row; `#` marks a solid tile.
    #[serde(default)]
    pub solid: Vec<String>,
    /// Alternative flat layout, row-major; non-zero marks a solid tile.
    /// Ignored when `solid` is present.
    #[serde(default)]
    pub tiles: Vec<u32>,
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub triggers: Vec<TriggerDef>,
    pub spawn: PointDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointDef {
    pub x: f32,
    pub y: f32,
}

/// An object placement. `y` is the object's bottom edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Named properties: `Weight`, `Temp`, `Value`, `Static` (non-zero = static).
    #[serde(default)]
    pub properties: HashMap<String, f32>,
}

/// A temperature zone. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub delta_per_second: f32,
}

/// A trigger region. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

fn default_tile_size() -> f32 {
    16.0
}

impl ObjectDef {
    fn property(&self, name: &str) -> Option<f32> {
        self.properties.get(name).copied().filter(|v| v.is_finite())
    }

    /// Resolve this placement into a typed descriptor, or `None` for an
    /// unknown type.
    pub fn to_desc(&self, cfg: &PhysicsConfig) -> Option<ObjectDesc> {
        let value = self.property("Value").map(|v| v.max(0.0).round() as u32);
        let kind = ObjectKind::from_type_name(&self.kind, value)?;
        Some(ObjectDesc {
            kind,
            position: Vec2::new(self.x, self.y - self.height),
            size: Vec2::new(self.width, self.height),
            mass: self.property("Weight").unwrap_or(1.0),
            temp: self.property("Temp").unwrap_or(cfg.ambient_temp),
            is_static: self.property("Static").is_some_and(|v| v != 0.0),
        })
    }
}

impl LevelDef {
    /// Parse a level from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.spawn.x, self.spawn.y)
    }

    /// Build the collision grid, checking its dimensions.
    pub fn tile_grid(&self) -> Result<TileGrid, LevelError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(LevelError::InvalidTileSize(self.tile_size));
        }
        let mut grid = TileGrid::try_new(self.width, self.height, self.tile_size).ok_or(
            LevelError::GridTooLarge {
                width: self.width,
                height: self.height,
            },
        )?;
        let width = self.width as usize;

        if !self.solid.is_empty() {
            if self.solid.len() != self.height as usize {
                return Err(LevelError::RowCount {
                    expected: self.height as usize,
                    found: self.solid.len(),
                });
            }
            for (row, line) in self.solid.iter().enumerate() {
                let found = line.chars().count();
                if found != width {
                    return Err(LevelError::InvalidGrid {
                        row,
                        expected: width,
                        found,
                    });
                }
                for (col, c) in line.chars().enumerate() {
                    grid.set_solid(col as i32, row as i32, c == '#');
                }
            }
        } else if !self.tiles.is_empty() {
            let expected = width * self.height as usize;
            if self.tiles.len() != expected {
                return Err(LevelError::TileCount {
                    expected,
                    found: self.tiles.len(),
                });
            }
            for (i, &tile) in self.tiles.iter().enumerate() {
                grid.set_solid((i % width) as i32, (i / width) as i32, tile != 0);
            }
        } else {
            log::warn!("level '{}' has no collision layer", self.id);
        }
        Ok(grid)
    }

    /// Typed descriptors for every placement with a known type. Unknown
    /// types are logged and skipped.
    pub fn object_descs(&self, cfg: &PhysicsConfig) -> Vec<ObjectDesc> {
        self.objects
            .iter()
            .filter_map(|def| {
                let desc = def.to_desc(cfg);
                if desc.is_none() {
                    log::warn!("level '{}': skipping object of unknown type '{}'", self.id, def.kind);
                }
                desc
            })
            .collect()
    }

    fn trigger_regions(&self) -> impl Iterator<Item = Trigger> + '_ {
        self.triggers.iter().filter_map(|def| match def.kind.as_str() {
            "Goal" => Some(Trigger::goal(
                Vec2::new(def.x, def.y),
                Vec2::new(def.width, def.height),
            )),
            other => {
                log::warn!("level '{}': skipping trigger of unknown type '{}'", self.id, other);
                None
            }
        })
    }
}

impl World {
    /// Build a fresh world for a level.
    pub fn from_level(def: &LevelDef, config: PhysicsConfig) -> Result<Self, LevelError> {
        let tiles = def.tile_grid()?;
        let mut world = World::new(tiles, def.spawn_point(), config);
        world.populate(def);
        Ok(world)
    }

    /// Replace the current level. The new definition is validated before
    /// anything is torn down, so a bad file leaves the world untouched.
    pub fn load_level(&mut self, def: &LevelDef) -> Result<(), LevelError> {
        let tiles = def.tile_grid()?;
        self.destroy();
        self.tiles = tiles;
        self.player.set_spawn_point(def.spawn_point());
        self.player.reset();
        self.populate(def);
        Ok(())
    }

    fn populate(&mut self, def: &LevelDef) {
        for desc in def.object_descs(&self.config) {
            self.spawn_object(&desc);
        }
        for zone in &def.zones {
            self.add_zone(TemperatureZone::new(
                Vec2::new(zone.x, zone.y),
                Vec2::new(zone.width, zone.height),
                zone.delta_per_second,
            ));
        }
        for trigger in def.trigger_regions() {
            self.add_trigger(trigger);
        }
        log::info!(
            "loaded level '{}': {}x{} tiles, {} objects, {} zones, {} triggers",
            def.id,
            def.width,
            def.height,
            self.scene.len(),
            self.zones().len(),
            self.triggers().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tilemap::SolidTiles;

    const LEVEL: &str = r#####"{
        "id": "test",
        "width": 4,
        "height": 3,
        "solid": [
            "....",
            "#..#",
            "####"
        ],
        "objects": [
            { "type": "Crate", "x": 16, "y": 32, "width": 16, "height": 16,
              "properties": { "Weight": 2.5, "Temp": 40 } },
            { "type": "Collectable", "x": 32, "y": 16, "width": 8, "height": 8,
              "properties": { "Value": 3 } },
            { "type": "Dragon", "x": 0, "y": 0, "width": 8, "height": 8 }
        ],
        "zones": [
            { "x": 0, "y": 0, "width": 64, "height": 16, "delta_per_second": -5 }
        ],
        "triggers": [
            { "type": "Goal", "x": 48, "y": 0, "width": 16, "height": 16 }
        ],
        "spawn": { "x": 4, "y": 8 }
    }"#####;

    #[test]
    fn parse_level_and_build_grid() {
        let def = LevelDef::from_json(LEVEL).unwrap();
        assert_eq!(def.tile_size, 16.0);
        let grid = def.tile_grid().unwrap();
        assert!(!grid.is_solid_tile_at(1, 0));
        assert!(grid.is_solid_tile_at(0, 1));
        assert!(!grid.is_solid_tile_at(1, 1));
        assert_eq!(grid.solid_count(), 6);
    }

    #[test]
    fn objects_use_bottom_edge_and_properties() {
        let cfg = PhysicsConfig::default();
        let def = LevelDef::from_json(LEVEL).unwrap();
        let descs = def.object_descs(&cfg);
        assert_eq!(descs.len(), 2, "unknown type must be skipped");

        assert_eq!(descs[0].kind, ObjectKind::Crate);
        assert_eq!(descs[0].position, Vec2::new(16.0, 16.0));
        assert_eq!(descs[0].mass, 2.5);
        assert_eq!(descs[0].temp, 40.0);

        assert_eq!(descs[1].kind, ObjectKind::Collectable { value: 3 });
        assert_eq!(descs[1].temp, cfg.ambient_temp);
    }

    #[test]
    fn flat_tiles_layout() {
        let json = r#"{ "id": "flat", "width": 2, "height": 2, "tile_size": 32,
                        "tiles": [0, 1, 1, 0], "spawn": { "x": 0, "y": 0 } }"#;
        let grid = LevelDef::from_json(json).unwrap().tile_grid().unwrap();
        assert!(grid.is_solid_tile_at(1, 0));
        assert!(grid.is_solid_tile_at(0, 1));
        assert_eq!(grid.solid_count(), 2);
        assert_eq!(grid.tile_size, 32.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let json = r####"{ "id": "bad", "width": 3, "height": 2,
                        "solid": ["###", "##"], "spawn": { "x": 0, "y": 0 } }"####;
        let err = LevelDef::from_json(json).unwrap().tile_grid().unwrap_err();
        assert!(matches!(
            err,
            LevelError::InvalidGrid {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let json = r#"{ "id": "bad", "width": 1, "height": 1, "tile_size": 0,
                        "spawn": { "x": 0, "y": 0 } }"#;
        let err = LevelDef::from_json(json).unwrap().tile_grid().unwrap_err();
        assert!(matches!(err, LevelError::InvalidTileSize(_)));
    }

    #[test]
    fn huge_dimensions_are_rejected() {
        let json = r#"{ "id": "huge", "width": 100000, "height": 100000,
                        "spawn": { "x": 0, "y": 0 } }"#;
        let def = LevelDef::from_json(json).unwrap();
        let err = def.tile_grid().unwrap_err();
        assert!(matches!(
            err,
            LevelError::GridTooLarge {
                width: 100_000,
                height: 100_000
            }
        ));
        assert!(World::from_level(&def, PhysicsConfig::default()).is_err());
    }

    #[test]
    fn world_from_level() {
        let def = LevelDef::from_json(LEVEL).unwrap();
        let world = World::from_level(&def, PhysicsConfig::default()).unwrap();
        assert_eq!(world.scene.len(), 2);
        assert_eq!(world.zones().len(), 1);
        assert_eq!(world.triggers().len(), 1);
        assert_eq!(world.player.spawn_point(), Vec2::new(4.0, 8.0));
        assert_eq!(world.map_size(), Vec2::new(64.0, 48.0));
    }

    #[test]
    fn bad_level_leaves_world_untouched() {
        let def = LevelDef::from_json(LEVEL).unwrap();
        let mut world = World::from_level(&def, PhysicsConfig::default()).unwrap();
        let mut bad = def.clone();
        bad.tile_size = -1.0;
        assert!(world.load_level(&bad).is_err());
        assert_eq!(world.scene.len(), 2);

        world.player.score = 9;
        world.load_level(&def).unwrap();
        assert_eq!(world.scene.len(), 2);
        assert_eq!(world.player.score, 9, "score carries across levels");
    }
}
