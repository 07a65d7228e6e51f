pub mod link;
pub mod manager;

pub use link::SympathyLink;
pub use manager::{SelectionStep, SympathyManager};
