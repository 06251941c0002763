//! Ladderforge: procedural ladder-and-platform levels for a NodeRunner
//! style game, each one checked for solvability before it is handed out.
//!
//!   - `domain`   — tiles, grid, holes, difficulty profiles, seeded RNG
//!   - `levelgen` — the generation pipeline and retry policy
//!   - `solver`   — reachability and the solvability verdict
//!   - `pack`     — NodeRunner level files and TOML export
//!   - `config`   — `ladderforge.toml`

pub mod config;
pub mod domain;
pub mod error;
pub mod levelgen;
pub mod pack;
pub mod solver;
pub mod ui;

pub use domain::difficulty::Difficulty;
pub use domain::grid::LevelGrid;
pub use domain::rng::Seed;
pub use levelgen::{generate, GeneratedLevel, LevelSource};
pub use solver::{check_solvability, SolvabilityReport};
