/// Solvability check: can a generated level actually be finished?
///
/// Two reachability passes, because the exit ladder only exists once
/// every item is collected:
///
///   - **Pass A** (exit hidden)   — classifies items.
///   - **Pass B** (exit revealed) — is row 0 reachable?
///
/// ## Item classes
///
/// ┌────────────┬──────────────────────────────────────────────────┐
/// │ Class       │ Condition                                        │
/// ├────────────┼──────────────────────────────────────────────────┤
/// │ Direct      │ in the player's Pass-A reach                     │
/// │ Assisted    │ restricted-reachable from an enemy spawn, and    │
/// │             │ restricted reach from the item overlaps the      │
/// │             │ player's reach in >= MIN_DELIVERY_OVERLAP cells  │
/// │ Unreachable │ otherwise                                        │
/// └────────────┴──────────────────────────────────────────────────┘
///
/// An assisted item is one an enemy could pick up and carry into the
/// player's territory. The overlap threshold rejects single-cell pinch
/// points. It is a proxy, not a chase simulation.
///
/// Score = covered fraction × (exit reachable ? 1 : 0).

use std::fmt;

use serde::Serialize;

use super::reach::{reach, Mover, ReachSet, Terrain};
use crate::domain::grid::{LevelGrid, Pos};

/// Restricted reach from an item must share at least this many cells
/// with the player's reach for the item to count as deliverable.
pub const MIN_DELIVERY_OVERLAP: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub enum ItemClass {
    Direct,
    Assisted,
    Unreachable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SolvabilityReport {
    pub solvable: bool,
    pub score: f64,
    pub direct: usize,
    pub assisted: usize,
    pub unreachable: Vec<Pos>,
    pub exit_reachable: bool,
    pub summary: String,
}

impl SolvabilityReport {
    pub fn item_count(&self) -> usize {
        self.direct + self.assisted + self.unreachable.len()
    }
}

impl fmt::Display for SolvabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Check a grid. Pure: the grid is only read.
pub fn check_solvability(grid: &LevelGrid) -> SolvabilityReport {
    let hidden = Terrain::hidden(grid);
    let player = reach(&hidden, grid.start, Mover::Player);
    let enemy_reach = enemy_territory(&hidden, &grid.enemies);

    let mut direct = 0;
    let mut assisted = 0;
    let mut unreachable = vec![];
    for &item in &grid.items {
        match classify_item(&hidden, &player, &enemy_reach, item) {
            ItemClass::Direct => direct += 1,
            ItemClass::Assisted => assisted += 1,
            ItemClass::Unreachable => unreachable.push(item),
        }
    }

    let exit_reachable = reach(&Terrain::revealed(grid), grid.start, Mover::Player).touches_row(0);

    let total = grid.items.len();
    let coverage = if total == 0 { 1.0 } else { (direct + assisted) as f64 / total as f64 };
    let score = if exit_reachable { coverage } else { 0.0 };

    let ceiling = grid.difficulty.profile().max_assisted;
    let solvable = unreachable.is_empty() && assisted <= ceiling && exit_reachable;

    let summary = format!(
        "items {}/{} direct, {} assisted (max {}), {} unreachable; exit {}; score {:.2}",
        direct,
        total,
        assisted,
        ceiling,
        unreachable.len(),
        if exit_reachable { "reachable" } else { "blocked" },
        score,
    );
    log::trace!("{summary}");

    SolvabilityReport { solvable, score, direct, assisted, unreachable, exit_reachable, summary }
}

/// Union of restricted reach from every enemy spawn.
fn enemy_territory(terrain: &Terrain, spawns: &[Pos]) -> Option<ReachSet> {
    let mut sets = spawns.iter().map(|&s| reach(terrain, s, Mover::Restricted));
    let mut union = sets.next()?;
    for set in sets {
        union.union_with(&set);
    }
    Some(union)
}

pub fn classify_item(
    terrain: &Terrain,
    player: &ReachSet,
    enemy_reach: &Option<ReachSet>,
    item: Pos,
) -> ItemClass {
    if player.contains(item) {
        return ItemClass::Direct;
    }
    let Some(enemies) = enemy_reach else {
        return ItemClass::Unreachable;
    };
    if !enemies.contains(item) {
        return ItemClass::Unreachable;
    }
    let carried = reach(terrain, item, Mover::Restricted);
    if carried.overlap(player) >= MIN_DELIVERY_OVERLAP {
        ItemClass::Assisted
    } else {
        ItemClass::Unreachable
    }
}
