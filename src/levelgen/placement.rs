/// Entity and exit placement, the last two pipeline stages.
///
/// Runs on finished terrain. Only `Tile::Gold` and hidden-zone ladder
/// clean-up touch the tiles; everything else is metadata on the grid.

use crate::config::PlacementConfig;
use crate::domain::difficulty::DifficultyProfile;
use crate::domain::grid::{LevelGrid, Pos};
use crate::domain::rng::LevelRng;
use crate::domain::tile::Tile;
use crate::solver::reach::{reach, Mover, Terrain};

use super::layout::{under_ladder_landing, Layout};

fn manhattan(a: Pos, b: Pos) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

/// Empty cell with something to stand on, outside the hidden zone.
fn is_standable_empty(grid: &LevelGrid, layout: &Layout, (x, y): Pos) -> bool {
    y >= layout.top
        && y < layout.ground
        && grid.get(x, y) == Tile::Empty
        && grid.supports_standing(x, y + 1)
}

// ══════════════════════════════════════════════════════════════
// 8. Entities
// ══════════════════════════════════════════════════════════════

/// Player start on the ground floor, then items, then enemies.
pub fn place_entities(
    grid: &mut LevelGrid,
    rng: &mut LevelRng,
    profile: &DifficultyProfile,
    placement: &PlacementConfig,
    layout: &Layout,
    level: u32,
) {
    place_start(grid, rng, layout);

    let mut free: Vec<Pos> = {
        let view: &LevelGrid = grid;
        view.positions()
            .filter(|&p| p != view.start && is_standable_empty(view, layout, p))
            .collect()
    };

    // Items prefer cells the player can walk to before any digging
    // happens. The rest only fill in when those run out.
    let player = reach(&Terrain::hidden(grid), grid.start, Mover::Player);
    let (mut near, mut far): (Vec<Pos>, Vec<Pos>) = free.iter().copied().partition(|&p| player.contains(p));
    rng.shuffle(&mut near);
    rng.shuffle(&mut far);
    near.extend(far);

    let item_count = rng.range(profile.items.min as i32, profile.items.max as i32 + 1) as usize;
    let items = spread(&near, item_count, placement.item_spacing, &[], true);
    for &(x, y) in &items {
        grid.set(x, y, Tile::Gold);
    }
    grid.items = items;

    free.retain(|p| !grid.items.contains(p));
    free.retain(|&p| manhattan(p, grid.start) >= placement.enemy_start_distance);
    rng.shuffle(&mut free);

    let bonus = (level.saturating_sub(1) / placement.progression_step).min(placement.progression_cap);
    let enemy_count =
        rng.range(profile.enemies.min as i32, profile.enemies.max as i32 + 1) as usize + bonus as usize;
    grid.enemies = spread(&free, enemy_count, placement.enemy_spacing, &[grid.start], false);

    if grid.enemies.len() < enemy_count {
        log::debug!("only {}/{} enemy spawns fit", grid.enemies.len(), enemy_count);
    }
}

fn place_start(grid: &mut LevelGrid, rng: &mut LevelRng, layout: &Layout) {
    let row = layout.ground - 1;
    let view: &LevelGrid = grid;
    let floor: Vec<Pos> = (0..layout.width)
        .map(|x| (x, row))
        .filter(|&p| is_standable_empty(view, layout, p))
        .collect();
    grid.start = rng
        .pick(&floor)
        .copied()
        .unwrap_or((layout.spine_bottom_col, row));
}

/// Greedy pick of up to `count` cells from `pool` (already shuffled),
/// keeping `spacing` from each other. With `fill`, any shortfall is then
/// topped up ignoring the spacing.
fn spread(pool: &[Pos], count: usize, spacing: i32, avoid: &[Pos], fill: bool) -> Vec<Pos> {
    let mut picked: Vec<Pos> = Vec::with_capacity(count);
    for &p in pool {
        if picked.len() >= count {
            break;
        }
        let clear = picked.iter().chain(avoid).all(|&q| manhattan(p, q) >= spacing);
        if clear {
            picked.push(p);
        }
    }
    if fill {
        for &p in pool {
            if picked.len() >= count {
                break;
            }
            if !picked.contains(&p) {
                picked.push(p);
            }
        }
    }
    picked
}

// ══════════════════════════════════════════════════════════════
// 9. Exit
// ══════════════════════════════════════════════════════════════

/// Pick the column the hidden exit ladder rises from and record its
/// cells. The cells themselves stay empty until the game reveals them.
pub fn place_exit(grid: &mut LevelGrid, rng: &mut LevelRng, layout: &Layout) {
    for y in 0..layout.top {
        for x in 0..layout.width {
            if grid.is_climbable(x, y) {
                grid.set(x, y, Tile::Empty);
            }
        }
    }

    let candidates: Vec<i32> = (0..layout.width)
        .filter(|&x| grid.get(x, layout.top) == Tile::Ladder)
        .filter(|&x| (0..layout.top).all(|y| grid.get(x, y) == Tile::Empty))
        .collect();

    let col = if candidates.contains(&layout.spine_top_col) {
        layout.spine_top_col
    } else if let Some(&x) = rng.pick(&candidates) {
        x
    } else {
        force_exit_column(grid, layout)
    };

    grid.exit_ladders = (0..layout.top).map(|y| (col, y)).collect();
}

/// No ladder reaches the top playable row: drive one down from the top
/// at the spine's upper column until it meets something to stand on.
/// Gold in the way is displaced; traps the new ladder lands on turn back
/// into plain brick.
fn force_exit_column(grid: &mut LevelGrid, layout: &Layout) -> i32 {
    let x = layout.spine_top_col;
    log::debug!("forcing exit column at x={x}");
    for y in 0..layout.top {
        grid.set(x, y, Tile::Empty);
    }
    let mut y = layout.top;
    while y < layout.ground {
        if grid.get(x, y) == Tile::Gold {
            grid.items.retain(|&p| p != (x, y));
            log::debug!("exit column displaces gold at ({x}, {y})");
        }
        let below_supports = grid.supports_standing(x, y + 1);
        grid.set(x, y, Tile::Ladder);
        if below_supports {
            break;
        }
        y += 1;
    }

    for ty in layout.top..=layout.ground {
        for tx in x - 1..=x + 1 {
            if grid.get(tx, ty) == Tile::TrapBrick && under_ladder_landing(grid, tx, ty) {
                grid.set(tx, ty, Tile::Brick);
            }
        }
    }
    x
}
