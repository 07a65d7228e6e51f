//! Resolve a moving body against the static tile grid, one axis at a time.
//!
//! Every test uses the body's hitbox. The trailing bound of the span
//! perpendicular to the tested axis is inset by one unit, so a hitbox whose
//! edge lies exactly on a tile boundary does not register the neighbouring
//! row/column.

use crate::components::tilemap::SolidTiles;
use crate::core::body::Body;

const EDGE_INSET: f32 = 1.0;

fn tile_coord(world: f32, tile_size: f32) -> i32 {
    (world / tile_size).floor() as i32
}

fn solid_in_column<T: SolidTiles + ?Sized>(tiles: &T, col: i32, rows: (i32, i32)) -> bool {
    (rows.0..=rows.1).any(|row| tiles.is_solid_tile_at(col, row))
}

fn solid_in_row<T: SolidTiles + ?Sized>(tiles: &T, row: i32, cols: (i32, i32)) -> bool {
    (cols.0..=cols.1).any(|col| tiles.is_solid_tile_at(col, row))
}

/// Push the body out of any solid column its leading horizontal edge has
/// entered. Returns `true` on contact.
pub fn resolve_horizontal<T: SolidTiles + ?Sized>(body: &mut Body, tiles: &T) -> bool {
    let ts = tiles.tile_size();
    let hb = body.hitbox();
    let rows = (tile_coord(hb.top(), ts), tile_coord(hb.bottom() - EDGE_INSET, ts));

    if body.velocity.x > 0.0 {
        let col = tile_coord(hb.right(), ts);
        if solid_in_column(tiles, col, rows) {
            body.set_hitbox_right(col as f32 * ts);
            body.velocity.x = 0.0;
            return true;
        }
    } else if body.velocity.x < 0.0 {
        let col = tile_coord(hb.left(), ts);
        if solid_in_column(tiles, col, rows) {
            body.set_hitbox_left((col + 1) as f32 * ts);
            body.velocity.x = 0.0;
            return true;
        }
    }
    false
}

/// Land the body on the row beneath it, or bump its head on the row above.
/// Landing sets `is_on_ground`. Returns `true` on contact.
pub fn resolve_vertical<T: SolidTiles + ?Sized>(body: &mut Body, tiles: &T) -> bool {
    let ts = tiles.tile_size();
    let hb = body.hitbox();
    let cols = (tile_coord(hb.left(), ts), tile_coord(hb.right() - EDGE_INSET, ts));

    if body.velocity.y >= 0.0 {
        let row = tile_coord(hb.bottom(), ts);
        if solid_in_row(tiles, row, cols) {
            body.set_hitbox_bottom(row as f32 * ts);
            body.velocity.y = 0.0;
            body.is_on_ground = true;
            return true;
        }
    } else {
        let row = tile_coord(hb.top(), ts);
        if solid_in_row(tiles, row, cols) {
            body.set_hitbox_top((row + 1) as f32 * ts);
            body.velocity.y = 0.0;
            return true;
        }
    }
    false
}

/// Resolve a body that has already been moved a full step from a position
/// whose y was `previous_y`. The horizontal pass runs at the old height so a
/// body dropping into a floor isn't mistaken for one walking into a wall.
pub fn resolve_tiles<T: SolidTiles + ?Sized>(body: &mut Body, previous_y: f32, tiles: &T) {
    let y = body.position.y;
    body.position.y = previous_y;
    resolve_horizontal(body, tiles);
    body.position.y = y;
    resolve_vertical(body, tiles);
}
