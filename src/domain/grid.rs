/// LevelGrid: the level as handed from the generator to the game.
///
/// ## Layout
///
/// `tiles[y][x]`, row 0 at the top. Coordinates are signed so callers can
/// probe neighbours freely: anything outside the grid reads as
/// `Tile::Concrete`, which means movement code never special-cases edges.
///
/// ## Metadata
///
///   - `start`        — player spawn
///   - `enemies`      — enemy spawns
///   - `items`        — gold positions (also written as `Tile::Gold`)
///   - `exit_ladders` — cells of the hidden exit ladder. These are *not*
///     written into `tiles`; the game loop reveals them as
///     `Tile::HiddenLadder` once `items` is empty.
///
/// ## Holes
///
/// `dig_hole` turns a diggable brick into `Tile::Hole` and starts a
/// countdown; `update_holes` restores the brick when it runs out.
///
/// ## Text legend (NodeRunner level format)
///
///   '#' = Brick          '=' = Concrete       'T' = Trap brick
///   'H' = Ladder         '-' = Pole           '$' = Gold
///   'P' = Player start   'E' = Enemy spawn    '~' = Exit ladder cell
///   ' ' = Empty

use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::hole::Hole;
use super::tile::Tile;
use crate::error::LevelError;

pub type Pos = (i32, i32);

/// Seconds a freshly dug hole stays open at a 1.0 duration scale.
pub const HOLE_BASE_SECS: f32 = 6.0;
/// Remaining time below which a hole is reported as closing.
pub const HOLE_WARNING_SECS: f32 = 1.5;

/// Result of one `update_holes` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoleUpdate {
    /// Holes that closed this update; their cells are already restored.
    pub expired: Vec<Pos>,
    /// Holes still open but inside the warning window.
    pub closing: Vec<Pos>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelGrid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
    pub start: Pos,
    pub enemies: Vec<Pos>,
    pub items: Vec<Pos>,
    pub exit_ladders: Vec<Pos>,
    pub difficulty: Difficulty,
    pub hole_duration_scale: f32,
    #[serde(skip)]
    holes: Vec<Hole>,
}

// ── Construction ──

impl LevelGrid {
    pub fn new(width: usize, height: usize, difficulty: Difficulty) -> Self {
        LevelGrid {
            width,
            height,
            tiles: vec![vec![Tile::Empty; width]; height],
            start: (0, 0),
            enemies: vec![],
            items: vec![],
            exit_ladders: vec![],
            difficulty,
            hole_duration_scale: difficulty.profile().hole_duration_scale,
            holes: vec![],
        }
    }

    /// Build a grid from legend rows. Every row must be as wide as the
    /// first; pad loosely written files before calling this.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], difficulty: Difficulty) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if height == 0 || width == 0 {
            return Err(LevelError::Empty);
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.as_ref().chars().count() != width) {
            return Err(LevelError::Ragged { row: y, len: row.as_ref().chars().count(), width });
        }

        let mut grid = LevelGrid::new(width, height, difficulty);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                let pos = (x as i32, y as i32);
                match ch {
                    'P' => grid.start = pos,
                    'E' => grid.enemies.push(pos),
                    '~' => grid.exit_ladders.push(pos),
                    '$' => {
                        grid.tiles[y][x] = Tile::Gold;
                        grid.items.push(pos);
                    }
                    _ => match Tile::from_glyph(ch) {
                        Some(tile) => grid.tiles[y][x] = tile,
                        None => return Err(LevelError::UnknownGlyph { glyph: ch, x, y }),
                    },
                }
            }
        }
        Ok(grid)
    }

    /// Legend rows for this grid. Exit cells are marked `~`.
    pub fn to_rows(&self) -> Vec<String> {
        let mut chars: Vec<Vec<char>> = self
            .tiles
            .iter()
            .map(|row| row.iter().map(|t| t.glyph()).collect())
            .collect();

        let mut mark = |(x, y): Pos, ch: char| {
            if self.in_bounds(x, y) {
                chars[y as usize][x as usize] = ch;
            }
        };
        for &p in &self.exit_ladders {
            mark(p, '~');
        }
        for &p in &self.enemies {
            mark(p, 'E');
        }
        mark(self.start, 'P');

        chars.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}

// ── Tile query / mutation API ──

impl LevelGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at (x, y). Out of bounds = wall.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[y as usize][x as usize]
        } else {
            Tile::Concrete
        }
    }

    /// Set a tile. Writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            self.tiles[y as usize][x as usize] = tile;
        }
    }

    pub fn tiles(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_solid()
    }

    /// Can something stand on top of (x, y)?
    pub fn supports_standing(&self, x: i32, y: i32) -> bool {
        self.get(x, y).supports_standing()
    }

    pub fn is_climbable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_climbable()
    }

    pub fn is_pole(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_pole()
    }

    pub fn is_exit_cell(&self, x: i32, y: i32) -> bool {
        self.exit_ladders.contains(&(x, y))
    }

    /// A brick can be dug unless a ladder stands on it: digging there
    /// would strand the ladder's landing. Exit ladder cells count as
    /// ladders even while hidden.
    pub fn is_diggable(&self, x: i32, y: i32) -> bool {
        if !self.get(x, y).is_brick_material() {
            return false;
        }
        !(self.is_climbable(x, y - 1) || self.is_exit_cell(x, y - 1))
    }

    /// Does an entity at (x, y) rest without falling?
    /// On a ladder or pole, or standing on something that supports it.
    pub fn has_support(&self, x: i32, y: i32) -> bool {
        let here = self.get(x, y);
        here.is_climbable() || here.is_pole() || self.supports_standing(x, y + 1)
    }

    /// Every in-bounds position, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| (x, y)))
    }
}

// ── Holes ──

impl LevelGrid {
    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Dig (x, y). Returns false if the cell is not diggable.
    pub fn dig_hole(&mut self, x: i32, y: i32) -> bool {
        if !self.is_diggable(x, y) {
            return false;
        }
        let original = self.get(x, y);
        let duration = HOLE_BASE_SECS * self.hole_duration_scale;
        self.holes.push(Hole::new(x, y, duration, original));
        self.set(x, y, Tile::Hole);
        true
    }

    /// Advance every hole by `elapsed × speed_scale` seconds.
    /// Expired holes are restored and removed, so each is reported once.
    pub fn update_holes(&mut self, elapsed: f32, speed_scale: f32) -> HoleUpdate {
        let dt = elapsed * speed_scale;
        let mut update = HoleUpdate::default();
        let mut restored = vec![];

        self.holes.retain_mut(|hole| {
            if hole.advance(dt) {
                restored.push((hole.pos(), hole.original));
                false
            } else {
                if hole.is_closing(HOLE_WARNING_SECS) {
                    update.closing.push(hole.pos());
                }
                true
            }
        });

        for ((x, y), original) in restored {
            self.set(x, y, original);
            update.expired.push((x, y));
        }
        update
    }
}
