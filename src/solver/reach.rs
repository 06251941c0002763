/// Reachability over a simplified movement model — BFS on resting cells.
///
/// Nodes are cells where an actor can rest. Edges follow the movement
/// truth table below; every horizontal step or drop is followed by a
/// simulated fall, and the landing cell is the real edge target.
///
/// ## Movement Truth Table
///
/// ┌──────────────┬────────────────────────────────────────────┐
/// │ Move          │ Legal when                                 │
/// ├──────────────┼────────────────────────────────────────────┤
/// │ Left / Right  │ has support here, side cell not solid      │
/// │ Up            │ ON a ladder here, cell above not solid     │
/// │ Down          │ on a ladder, ladder below, or on a pole;   │
/// │               │ cell below not solid                       │
/// │ Dig (player)  │ has support, side cell passable and not a  │
/// │               │ ladder, side-below cell diggable           │
/// └──────────────┴────────────────────────────────────────────┘
///
/// Support = on a ladder or pole, or ladder/solid directly below.
/// Out-of-bounds reads as concrete, so the bottom edge is a floor.
///
/// The dig edge is optimistic: no hole timer is modelled, the player
/// simply ends up wherever a fall through the dug cell lands.
///
/// ## Exit visibility
///
/// `Terrain::hidden` treats exit-ladder metadata as the empty cells they
/// are in the grid. `Terrain::revealed` reads them as ladders, which is
/// what the level looks like once every item has been collected.

use std::collections::VecDeque;

use crate::domain::grid::{LevelGrid, Pos};
use crate::domain::tile::Tile;

/// Who is moving.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mover {
    /// Walks, climbs, hangs, falls and digs.
    Player,
    /// Same model without digging; stands in for enemies.
    Restricted,
}

/// Read-only view of a grid with the exit either hidden or revealed.
#[derive(Clone, Copy)]
pub struct Terrain<'a> {
    grid: &'a LevelGrid,
    exit_open: bool,
}

impl<'a> Terrain<'a> {
    pub fn hidden(grid: &'a LevelGrid) -> Self {
        Terrain { grid, exit_open: false }
    }

    pub fn revealed(grid: &'a LevelGrid) -> Self {
        Terrain { grid, exit_open: true }
    }

    pub fn grid(&self) -> &'a LevelGrid {
        self.grid
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        if self.exit_open && self.grid.is_exit_cell(x, y) {
            return Tile::HiddenLadder;
        }
        self.grid.get(x, y)
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_passable()
    }

    pub fn is_climbable(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_climbable()
    }

    pub fn has_support(&self, x: i32, y: i32) -> bool {
        let here = self.tile_at(x, y);
        if here.is_climbable() || here.is_pole() {
            return true;
        }
        self.tile_at(x, y + 1).supports_standing()
    }

    /// Fall from (x, y) until something holds. Cells passed on the way
    /// down are pushed to `trail`; the resting cell is returned.
    pub fn settle(&self, x: i32, mut y: i32, trail: &mut Vec<Pos>) -> Pos {
        while !self.has_support(x, y) && self.is_passable(x, y + 1) {
            trail.push((x, y));
            y += 1;
        }
        (x, y)
    }
}

/// Set of reached cells, indexed like the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ReachSet {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl ReachSet {
    fn new(width: usize, height: usize) -> Self {
        ReachSet { width, height, cells: vec![false; width * height] }
    }

    #[inline]
    fn index(&self, (x, y): Pos) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Mark a cell. Returns true if it was not reached before.
    fn insert(&mut self, pos: Pos) -> bool {
        match self.index(pos) {
            Some(i) if !self.cells[i] => {
                self.cells[i] = true;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.index(pos).map_or(false, |i| self.cells[i])
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Number of cells reached by both sets.
    pub fn overlap(&self, other: &ReachSet) -> usize {
        self.cells.iter().zip(&other.cells).filter(|(a, b)| **a && **b).count()
    }

    pub fn union_with(&mut self, other: &ReachSet) {
        for (a, b) in self.cells.iter_mut().zip(&other.cells) {
            *a |= *b;
        }
    }

    /// Any reached cell on row `y`?
    pub fn touches_row(&self, y: i32) -> bool {
        if y < 0 || y as usize >= self.height {
            return false;
        }
        let row = y as usize * self.width;
        self.cells[row..row + self.width].iter().any(|&c| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c)
            .map(move |(i, _)| ((i % w) as i32, (i / w) as i32))
    }
}

/// Every cell `mover` can reach from `from`, including cells it only
/// falls through.
pub fn reach(terrain: &Terrain, from: Pos, mover: Mover) -> ReachSet {
    let grid = terrain.grid();
    let mut reached = ReachSet::new(grid.width(), grid.height());
    let mut rested = ReachSet::new(grid.width(), grid.height());
    let mut queue: VecDeque<Pos> = VecDeque::with_capacity(256);
    let mut trail = Vec::with_capacity(grid.height());

    let origin = terrain.settle(from.0, from.1, &mut trail);
    for p in trail.drain(..) {
        reached.insert(p);
    }
    reached.insert(origin);
    rested.insert(origin);
    queue.push_back(origin);

    while let Some(pos) = queue.pop_front() {
        for target in moves(terrain, pos, mover) {
            let landing = terrain.settle(target.0, target.1, &mut trail);
            for p in trail.drain(..) {
                reached.insert(p);
            }
            reached.insert(landing);
            if rested.insert(landing) {
                queue.push_back(landing);
            }
        }
    }

    reached
}

/// Raw move targets from a resting cell, before falling is applied.
fn moves(terrain: &Terrain, (x, y): Pos, mover: Mover) -> Vec<Pos> {
    let mut out = Vec::with_capacity(6);
    let supported = terrain.has_support(x, y);
    let here = terrain.tile_at(x, y);

    if supported {
        for dx in [-1, 1] {
            if terrain.is_passable(x + dx, y) {
                out.push((x + dx, y));
            }
        }
    }

    if here.is_climbable() && terrain.is_passable(x, y - 1) {
        out.push((x, y - 1));
    }

    let can_descend = here.is_climbable() || here.is_pole() || terrain.is_climbable(x, y + 1);
    if can_descend && terrain.is_passable(x, y + 1) {
        out.push((x, y + 1));
    }

    if mover == Mover::Player && supported {
        for dx in [-1, 1] {
            if let Some(target) = dig_target(terrain, x, y, dx) {
                out.push(target);
            }
        }
    }

    out
}

/// Diagonal-below dig: returns the dug cell if the dig is legal.
fn dig_target(terrain: &Terrain, x: i32, y: i32, dx: i32) -> Option<Pos> {
    let side = terrain.tile_at(x + dx, y);
    if !side.is_passable() || side.is_climbable() {
        return None;
    }
    let (tx, ty) = (x + dx, y + 1);
    if terrain.grid().is_diggable(tx, ty) && !terrain.is_climbable(tx, ty - 1) {
        Some((tx, ty))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    fn player_reach(rows: &[&str]) -> (LevelGrid, ReachSet) {
        let g = grid_from(rows);
        let r = reach(&Terrain::hidden(&g), g.start, Mover::Player);
        (g, r)
    }

    // ── Walking and falling ──

    #[test]
    fn walk_along_floor() {
        let (_, r) = player_reach(&[
            "P    ",
            "=====",
        ]);
        for x in 0..5 {
            assert!(r.contains((x, 0)));
        }
    }

    #[test]
    fn walls_block_walking() {
        let (_, r) = player_reach(&[
            "P = $",
            "=====",
        ]);
        assert!(r.contains((1, 0)));
        assert!(!r.contains((3, 0)));
        assert!(!r.contains((4, 0)));
    }

    #[test]
    fn step_off_ledge_falls_to_floor() {
        let (_, r) = player_reach(&[
            "P   ",
            "==  ",
            "    ",
            "====",
        ]);
        assert!(r.contains((2, 0)));
        assert!(r.contains((2, 1))); // fell through
        assert!(r.contains((2, 2))); // landed
        assert!(r.contains((3, 2)));
        assert!(r.contains((0, 2)));
    }

    #[test]
    fn falling_is_one_way() {
        let (_, r) = player_reach(&[
            "  $ ",
            "  ==",
            "P   ",
            "====",
        ]);
        assert!(!r.contains((2, 0)));
        assert!(!r.contains((3, 0)));
    }

    // ── Ladders ──

    #[test]
    fn climb_ladder_to_platform() {
        let (_, r) = player_reach(&[
            "  $ ",
            " H==",
            "PH  ",
            "====",
        ]);
        assert!(r.contains((1, 1)));
        assert!(r.contains((1, 0))); // off the top of the ladder
        assert!(r.contains((2, 0)));
    }

    #[test]
    fn cannot_reach_up_to_grab_ladder() {
        // ladder starts one cell above the floor: standing under it is not
        // standing on it
        let (_, r) = player_reach(&[
            " $ ",
            "=H=",
            " H ",
            "   ",
            "P  ",
            "===",
        ]);
        assert!(!r.contains((1, 2)));
        assert!(!r.contains((1, 0)));
    }

    #[test]
    fn climb_down_onto_ladder() {
        let (_, r) = player_reach(&[
            "PH  ",
            "=H==",
            " H $",
            "====",
        ]);
        assert!(r.contains((1, 1)));
        assert!(r.contains((3, 2)));
    }

    // ── Poles ──

    #[test]
    fn pole_crosses_gap_and_drops() {
        let (_, r) = player_reach(&[
            "P----  ",
            "=    ==",
            "       ",
            "=======",
        ]);
        assert!(r.contains((4, 0)));
        assert!(r.contains((5, 0)));
        assert!(r.contains((6, 0)));
        assert!(r.contains((2, 2))); // dropped off the pole
    }

    // ── Digging ──

    #[test]
    fn player_digs_down_restricted_does_not() {
        let g = grid_from(&[
            "P   ",
            "####",
            "  $ ",
            "====",
        ]);
        let player = reach(&Terrain::hidden(&g), g.start, Mover::Player);
        let restricted = reach(&Terrain::hidden(&g), g.start, Mover::Restricted);
        assert!(player.contains((2, 2)));
        assert!(!restricted.contains((2, 2)));
        assert!(!restricted.contains((1, 2)));
    }

    #[test]
    fn no_digging_concrete_or_under_ladders() {
        let (_, r) = player_reach(&[
            "P H ",
            "==# ",
            "    ",
            "====",
        ]);
        // (2,1) has a ladder above: not diggable. (3,1) is open: step off.
        assert!(r.contains((3, 2)));
        assert!(!r.contains((2, 1)));
    }

    #[test]
    fn no_dig_through_wall() {
        let (_, r) = player_reach(&[
            "P= ",
            "=##",
            "   ",
            "===",
        ]);
        assert!(!r.contains((1, 2)));
        assert!(!r.contains((2, 2)));
    }

    // ── Exit visibility ──

    #[test]
    fn revealed_exit_reaches_top_row() {
        let g = grid_from(&[
            " ~  ",
            " ~  ",
            " H  ",
            "PH  ",
            "====",
        ]);
        let hidden = reach(&Terrain::hidden(&g), g.start, Mover::Player);
        let open = reach(&Terrain::revealed(&g), g.start, Mover::Player);
        assert!(!hidden.touches_row(0));
        assert!(open.touches_row(0));
    }

    #[test]
    fn reach_set_ops() {
        let (_, a) = player_reach(&["P  ", "==="]);
        let (_, b) = player_reach(&["  P", "==="]);
        assert_eq!(a.len(), 3);
        assert_eq!(a.overlap(&b), 3);
        assert_eq!(a.iter().count(), 3);
        let mut c = a.clone();
        c.union_with(&b);
        assert_eq!(c, a);
        assert!(!c.is_empty());
    }
}
