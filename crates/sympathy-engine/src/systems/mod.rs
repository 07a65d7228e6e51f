pub mod tile_collision;
pub mod object_collision;
pub mod player_collision;
pub mod extract;
