/// Solvability checking for generated levels.
///
/// `reach` is the movement model and BFS; `check` turns two reachability
/// passes into a score and an accept/reject verdict.

pub mod check;
pub mod reach;

pub use check::{check_solvability, ItemClass, SolvabilityReport};
