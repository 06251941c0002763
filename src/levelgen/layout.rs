/// Terrain stages of the generation pipeline.
///
/// Each stage mutates the working grid in place and may repair what an
/// earlier stage left behind:
///
///   1. Ground       — concrete bottom row
///   2. Spine        — full-height ladder corridor, optionally zig-zagging
///   3. Bands        — gapped brick platforms, each chained by a ladder to
///                     the ladder that reached the band below
///   4. Extra ladders — stub ladders from band segments down to the next
///                     surface
///   5. Poles        — bridge same-row gaps that have a real drop below
///   6. Hardening    — a few bricks become concrete or trap bricks
///   7. Repair       — no ladder top is boxed in
///
/// Rows `0..top` are the hidden zone and are never touched here.

use crate::domain::difficulty::DifficultyProfile;
use crate::domain::grid::LevelGrid;
use crate::domain::rng::LevelRng;
use crate::domain::tile::Tile;

/// Shortest gap a pole will bridge.
pub const MIN_POLE_GAP: i32 = 2;
/// Longest gap a pole will bridge.
pub const MAX_POLE_GAP: i32 = 8;

/// Band segment lengths, inclusive lower / exclusive upper bound.
const SEGMENT_LEN: (i32, i32) = (4, 10);
/// Gaps between segments of a band.
const SEGMENT_GAP: (i32, i32) = (2, 5);
/// How far a chain ladder may wander from the previous chain column.
const CHAIN_REACH: i32 = 6;

/// One horizontal platform band.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    /// Row the bricks sit on.
    pub row: i32,
    /// Inclusive x ranges of the brick segments, left to right.
    pub segments: Vec<(i32, i32)>,
    /// Column of the ladder that climbs up to this band.
    pub chain_col: i32,
}

/// Bookkeeping shared between stages of one candidate.
#[derive(Clone, Debug)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    /// First row below the hidden zone.
    pub top: i32,
    pub ground: i32,
    pub spine_bottom_col: i32,
    pub spine_top_col: i32,
    /// Bottom-up.
    pub bands: Vec<Band>,
    /// Walk paths between spine columns; never bricked over.
    pub reserved: Vec<(i32, i32)>,
}

impl Layout {
    pub fn new(grid: &LevelGrid, hidden_rows: usize) -> Self {
        let width = grid.width() as i32;
        let height = grid.height() as i32;
        Layout {
            width,
            height,
            top: hidden_rows as i32,
            ground: height - 1,
            spine_bottom_col: width / 2,
            spine_top_col: width / 2,
            bands: vec![],
            reserved: vec![],
        }
    }

    pub fn is_reserved(&self, x: i32, y: i32) -> bool {
        self.reserved.contains(&(x, y))
    }

    /// Brick at (x, y) unless the cell already holds something up or
    /// lies on a reserved path.
    fn brick_if_open(&self, grid: &mut LevelGrid, x: i32, y: i32) {
        if !grid.supports_standing(x, y) && !self.is_reserved(x, y) {
            grid.set(x, y, Tile::Brick);
        }
    }
}

/// Run stages 1–7.
pub fn build_terrain(
    grid: &mut LevelGrid,
    rng: &mut LevelRng,
    profile: &DifficultyProfile,
    layout: &mut Layout,
) {
    lay_ground(grid, layout);
    lay_spine(grid, rng, profile, layout);
    lay_bands(grid, rng, profile, layout);
    scatter_ladders(grid, rng, profile, layout);
    lay_poles(grid, rng, profile, layout);
    harden(grid, rng, profile, layout);
    repair_ladder_tops(grid, layout);
}

// ══════════════════════════════════════════════════════════════
// 1. Ground
// ══════════════════════════════════════════════════════════════

fn lay_ground(grid: &mut LevelGrid, layout: &Layout) {
    for x in 0..layout.width {
        grid.set(x, layout.ground, Tile::Concrete);
    }
}

// ══════════════════════════════════════════════════════════════
// 2. Spine
// ══════════════════════════════════════════════════════════════

/// Built bottom-up. Each zig ends a segment at row `r`, shifts the column
/// and lays bricks on row `r + 1` so row `r` is walkable between the two
/// ladder columns.
fn lay_spine(grid: &mut LevelGrid, rng: &mut LevelRng, profile: &DifficultyProfile, layout: &mut Layout) {
    let c = profile.complexity;
    let zigzag = rng.chance(0.2 + 0.6 * c);
    let longest = 4 + (c * 5.0).round() as i32;

    let mut col = rng.range(3, layout.width - 3);
    layout.spine_bottom_col = col;
    let mut bottom = layout.ground - 1;

    loop {
        let seg_len = if zigzag { rng.range(3, longest + 1) } else { layout.height };
        let seg_top = (bottom - seg_len + 1).max(layout.top);
        for y in seg_top..=bottom {
            grid.set(col, y, Tile::Ladder);
        }
        if seg_top <= layout.top {
            break;
        }

        let dist = rng.range(2, 6);
        let dir = if rng.chance(0.5) { 1 } else { -1 };
        let mut next = (col + dir * dist).clamp(2, layout.width - 3);
        if next == col {
            next = (col - dir * dist).clamp(2, layout.width - 3);
        }
        for x in span(col, next) {
            if x != col && !grid.supports_standing(x, seg_top + 1) {
                grid.set(x, seg_top + 1, Tile::Brick);
            }
            layout.reserved.push((x, seg_top));
        }
        col = next;
        bottom = seg_top;
    }

    layout.spine_top_col = col;
}

// ══════════════════════════════════════════════════════════════
// 3. Connected platform bands
// ══════════════════════════════════════════════════════════════

fn lay_bands(grid: &mut LevelGrid, rng: &mut LevelRng, profile: &DifficultyProfile, layout: &mut Layout) {
    let lo = layout.top + 2;
    let hi = layout.ground - 2;
    let span_rows = hi - lo + 1;
    let wanted = 2 + (3.0 * profile.complexity).round() as i32;
    let count = wanted.min(span_rows / 2).max(1);
    let step = span_rows / count;

    let mut prev_row = layout.ground;
    let mut prev_col = layout.spine_bottom_col;

    for i in 0..count {
        let jitter = rng.range(0, (step - 1).max(1));
        let row = hi - i * step - jitter;

        let segments = lay_segments(grid, rng, layout, row);
        let chain_col = chain_band(grid, rng, layout, &segments, row, prev_row, prev_col);

        log::trace!("band {i} at row {row}: {} segments, chained at x={chain_col}", segments.len());
        layout.bands.push(Band { row, segments, chain_col });
        prev_row = row;
        prev_col = chain_col;
    }
}

fn lay_segments(grid: &mut LevelGrid, rng: &mut LevelRng, layout: &Layout, row: i32) -> Vec<(i32, i32)> {
    let mut segments = vec![];
    let mut x = rng.range(0, 3);
    while x < layout.width {
        let len = rng.range(SEGMENT_LEN.0, SEGMENT_LEN.1);
        let end = (x + len - 1).min(layout.width - 1);
        for cx in x..=end {
            if grid.get(cx, row) == Tile::Empty && !layout.is_reserved(cx, row) {
                grid.set(cx, row, Tile::Brick);
            }
        }
        segments.push((x, end));
        x = end + 1 + rng.range(SEGMENT_GAP.0, SEGMENT_GAP.1);
    }
    segments
}

/// Ladder from the previous surface up to this band, starting near the
/// column that reached the previous band. Returns the ladder column.
fn chain_band(
    grid: &mut LevelGrid,
    rng: &mut LevelRng,
    layout: &Layout,
    segments: &[(i32, i32)],
    row: i32,
    prev_row: i32,
    prev_col: i32,
) -> i32 {
    let walk_row = prev_row - 1;
    let candidates: Vec<i32> = segments
        .iter()
        .flat_map(|&(s, e)| s..=e)
        .filter(|&x| (x - prev_col).abs() <= CHAIN_REACH)
        .filter(|&x| x > 0 && x < layout.width - 1)
        .filter(|&x| span(prev_col, x).all(|cx| !grid.is_solid(cx, walk_row)))
        .collect();
    let col = rng.pick(&candidates).copied().unwrap_or(prev_col);

    // walkable connector on the previous surface
    for x in span(prev_col, col) {
        layout.brick_if_open(grid, x, prev_row);
    }
    for y in row..prev_row {
        grid.set(col, y, Tile::Ladder);
    }
    // footing beside the ladder top so the band can be stepped onto
    if !grid.supports_standing(col - 1, row) && !grid.supports_standing(col + 1, row) {
        layout.brick_if_open(grid, col - 1, row);
        layout.brick_if_open(grid, col + 1, row);
    }
    col
}

// ══════════════════════════════════════════════════════════════
// 4. Extra ladders
// ══════════════════════════════════════════════════════════════

fn scatter_ladders(grid: &mut LevelGrid, rng: &mut LevelRng, profile: &DifficultyProfile, layout: &Layout) {
    if layout.bands.is_empty() {
        return;
    }
    let wanted = (profile.ladder_density * 6.0).round() as i32 + rng.range(0, 2);
    let mut placed = 0;

    for _ in 0..wanted * 4 {
        if placed >= wanted {
            break;
        }
        let Some(band) = rng.pick(&layout.bands) else { break };
        let Some(&(s, e)) = rng.pick(&band.segments) else { continue };
        let x = rng.range(s, e + 1);
        if try_stub_ladder(grid, layout, x, band.row) {
            placed += 1;
        }
    }
    log::trace!("extra ladders: {placed}/{wanted}");
}

/// Ladder from a band brick at (x, row) down to the next surface.
/// Only through empty cells, never beside another ladder.
fn try_stub_ladder(grid: &mut LevelGrid, layout: &Layout, x: i32, row: i32) -> bool {
    if !grid.get(x, row).is_brick_material() {
        return false;
    }
    if grid.is_climbable(x - 1, row) || grid.is_climbable(x + 1, row) || !grid.get(x, row - 1).is_passable() {
        return false;
    }

    let mut bottom = row + 1;
    loop {
        if bottom >= layout.ground || grid.get(x, bottom) != Tile::Empty {
            return false;
        }
        if grid.supports_standing(x, bottom + 1) {
            break;
        }
        bottom += 1;
    }
    if bottom == row + 1 {
        // one-cell drop: walking off the edge already does this
        return false;
    }
    for y in row..=bottom {
        grid.set(x, y, Tile::Ladder);
    }
    true
}

// ══════════════════════════════════════════════════════════════
// 5. Poles
// ══════════════════════════════════════════════════════════════

fn lay_poles(grid: &mut LevelGrid, rng: &mut LevelRng, profile: &DifficultyProfile, layout: &Layout) {
    let accept = 0.3 + 0.5 * profile.complexity;
    for band in &layout.bands {
        let pole_row = band.row - 1;
        if pole_row < layout.top {
            continue;
        }
        for pair in band.segments.windows(2) {
            let (left_end, right_start) = (pair[0].1, pair[1].0);
            if pole_fits(grid, left_end, right_start, band.row) && rng.chance(accept) {
                for x in left_end + 1..right_start {
                    grid.set(x, pole_row, Tile::Pole);
                }
            }
        }
    }
}

/// Gap (left_end, right_start) on `row`, pole one row above it.
fn pole_fits(grid: &LevelGrid, left_end: i32, right_start: i32, row: i32) -> bool {
    let gap = right_start - left_end - 1;
    if !(MIN_POLE_GAP..=MAX_POLE_GAP).contains(&gap) {
        return false;
    }
    // both edges must still be standable
    if !grid.supports_standing(left_end, row) || !grid.supports_standing(right_start, row) {
        return false;
    }
    let cells = left_end + 1..right_start;
    // path clear, which also rules out overlapping an existing pole
    if cells.clone().any(|x| grid.get(x, row - 1) != Tile::Empty) {
        return false;
    }
    // a floor already connecting the edges makes the pole pointless
    let connected = cells.clone().all(|x| grid.supports_standing(x, row));
    let drop_zone = cells.into_iter().any(|x| grid.get(x, row) == Tile::Empty);
    !connected && drop_zone
}

// ══════════════════════════════════════════════════════════════
// 6. Hardening
// ══════════════════════════════════════════════════════════════

fn harden(grid: &mut LevelGrid, rng: &mut LevelRng, profile: &DifficultyProfile, layout: &Layout) {
    let hard_p = 0.03 + 0.05 * profile.complexity;
    for y in layout.top..layout.ground {
        for x in 0..layout.width {
            if grid.get(x, y) != Tile::Brick {
                continue;
            }
            let roll = rng.next_f64();
            if roll < hard_p {
                grid.set(x, y, Tile::Concrete);
            } else if roll < hard_p + profile.trap_chance && !under_ladder_landing(grid, x, y) {
                grid.set(x, y, Tile::TrapBrick);
            }
        }
    }
}

/// Is (x, y) under a ladder or under the cell where a ladder is left?
pub fn under_ladder_landing(grid: &LevelGrid, x: i32, y: i32) -> bool {
    if (x - 1..=x + 1).any(|cx| grid.is_climbable(cx, y - 1)) {
        return true;
    }
    // a ladder topping out beside this brick lands the climber on it
    [-1, 1].iter().any(|&dx| grid.is_climbable(x + dx, y) && !grid.is_climbable(x + dx, y - 1))
}

// ══════════════════════════════════════════════════════════════
// 7. Ladder-accessibility repair
// ══════════════════════════════════════════════════════════════

fn repair_ladder_tops(grid: &mut LevelGrid, layout: &Layout) {
    for y in layout.top + 1..layout.ground {
        for x in 0..layout.width {
            if !grid.is_climbable(x, y) || grid.is_climbable(x, y - 1) {
                continue;
            }
            let boxed = grid.is_solid(x, y - 1) && grid.is_solid(x - 1, y) && grid.is_solid(x + 1, y);
            if boxed {
                log::trace!("clearing boxed ladder top above ({x}, {y})");
                grid.set(x, y - 1, Tile::Empty);
            }
        }
    }
}

/// Inclusive column range between two x values, in either order.
fn span(a: i32, b: i32) -> std::ops::RangeInclusive<i32> {
    a.min(b)..=a.max(b)
}
