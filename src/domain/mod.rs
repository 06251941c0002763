pub mod difficulty;
pub mod grid;
pub mod hole;
pub mod rng;
pub mod tile;
