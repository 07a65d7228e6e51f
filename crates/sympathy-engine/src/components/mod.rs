pub mod tilemap;
pub mod zone;
