pub mod body;
pub mod object;
pub mod player;
pub mod scene;
pub mod time;
pub mod world;
