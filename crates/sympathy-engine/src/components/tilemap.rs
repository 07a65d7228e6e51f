//! Static collision grid.
//!
//! The collision layer is a row-major grid of solid/empty cells. Anything
//! outside the grid is empty, so bodies can walk off the map edge without
//! the resolver ever erroring.

use glam::Vec2;

/// Query the collision layer. Implemented by [`TileGrid`] and by any
/// `Fn(i32, i32) -> bool`, so tests and external level owners can inject
/// their own tile lookup.
pub trait SolidTiles {
    /// Size of one square tile in world units.
    fn tile_size(&self) -> f32;

    /// Whether the tile at `(col, row)` blocks movement. Out-of-range
    /// coordinates must return `false`.
    fn is_solid_tile_at(&self, col: i32, row: i32) -> bool;
}

/// Closure-backed tile lookup.
pub struct TileFn<F> {
    pub tile_size: f32,
    pub solid: F,
}

impl<F: Fn(i32, i32) -> bool> SolidTiles for TileFn<F> {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn is_solid_tile_at(&self, col: i32, row: i32) -> bool {
        (self.solid)(col, row)
    }
}

/// The level's collision layer.
///
/// Cells are stored in row-major order: index = row * width + col.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Size of each tile in world units.
    pub tile_size: f32,
    solid: Vec<bool>,
}

/// Largest grid, in cells, a level may declare.
pub const MAX_CELLS: usize = 1 << 24;

impl TileGrid {
    /// Create an empty (all non-solid) grid, or `None` when `width * height`
    /// exceeds [`MAX_CELLS`].
    pub fn try_new(width: u32, height: u32, tile_size: f32) -> Option<Self> {
        let cells = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n <= MAX_CELLS)?;
        Some(Self {
            width,
            height,
            tile_size,
            solid: vec![false; cells],
        })
    }

    /// Create an empty (all non-solid) grid. Oversized dimensions yield a
    /// grid without a collision layer.
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self::try_new(width, height, tile_size).unwrap_or_else(|| {
            log::warn!("tile grid {width}x{height} is too large, using an empty layer");
            Self::empty(tile_size)
        })
    }

    /// Grid without a collision layer. Every query answers "not solid".
    pub fn empty(tile_size: f32) -> Self {
        Self {
            width: 0,
            height: 0,
            tile_size,
            solid: Vec::new(),
        }
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Mark the tile at `(col, row)`. Out-of-range writes are ignored.
    pub fn set_solid(&mut self, col: i32, row: i32, solid: bool) {
        if let Some(i) = self.index(col, row) {
            self.solid[i] = solid;
        }
    }

    /// Fill a rectangular region of tiles.
    pub fn fill_rect(&mut self, col: i32, row: i32, w: i32, h: i32, solid: bool) {
        for r in row..row + h {
            for c in col..col + w {
                self.set_solid(c, r, solid);
            }
        }
    }

    pub fn clear(&mut self) {
        self.solid.fill(false);
    }

    /// World-space size of the grid.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    /// Tile coordinates containing a world position. May lie outside the grid.
    pub fn world_to_tile(&self, world_pos: Vec2) -> (i32, i32) {
        (
            (world_pos.x / self.tile_size).floor() as i32,
            (world_pos.y / self.tile_size).floor() as i32,
        )
    }

    /// Count of solid tiles.
    pub fn solid_count(&self) -> usize {
        self.solid.iter().filter(|s| **s).count()
    }
}

impl SolidTiles for TileGrid {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn is_solid_tile_at(&self, col: i32, row: i32) -> bool {
        self.index(col, row).map(|i| self.solid[i]).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = TileGrid::new(10, 8, 16.0);
        assert_eq!(grid.solid_count(), 0);
        assert_eq!(grid.pixel_size(), Vec2::new(160.0, 128.0));
    }

    #[test]
    fn out_of_bounds_is_not_solid() {
        let mut grid = TileGrid::new(4, 4, 16.0);
        grid.fill_rect(0, 0, 4, 4, true);
        assert!(grid.is_solid_tile_at(3, 3));
        assert!(!grid.is_solid_tile_at(-1, 0));
        assert!(!grid.is_solid_tile_at(0, 4));
        assert!(!grid.is_solid_tile_at(i32::MAX, i32::MIN));
    }

    #[test]
    fn missing_layer_answers_non_solid() {
        let grid = TileGrid::empty(16.0);
        assert!(!grid.is_solid_tile_at(0, 0));
    }

    #[test]
    fn fill_rect_clips_to_grid() {
        let mut grid = TileGrid::new(5, 5, 16.0);
        grid.fill_rect(3, 3, 10, 10, true);
        assert_eq!(grid.solid_count(), 4);
        grid.clear();
        assert_eq!(grid.solid_count(), 0);
    }

    #[test]
    fn world_to_tile_floors_negative_positions() {
        let grid = TileGrid::new(5, 5, 16.0);
        assert_eq!(grid.world_to_tile(Vec2::new(17.0, 31.9)), (1, 1));
        assert_eq!(grid.world_to_tile(Vec2::new(-0.5, 0.0)), (-1, 0));
    }

    #[test]
    fn oversized_grid_is_refused() {
        assert!(TileGrid::try_new(100_000, 100_000, 16.0).is_none());
        assert!(TileGrid::try_new(u32::MAX, u32::MAX, 16.0).is_none());

        let grid = TileGrid::new(100_000, 100_000, 16.0);
        assert_eq!((grid.width, grid.height), (0, 0));
        assert!(!grid.is_solid_tile_at(50_000, 50_000));

        assert!(TileGrid::try_new(4096, 4096, 16.0).is_some());
    }

    #[test]
    fn closure_lookup() {
        let tiles = TileFn { tile_size: 8.0, solid: |_c: i32, r: i32| r >= 10 };
        assert!(tiles.is_solid_tile_at(3, 10));
        assert!(!tiles.is_solid_tile_at(3, 9));
        assert_eq!(tiles.tile_size(), 8.0);
    }
}
