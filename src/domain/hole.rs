/// Hole: a dug brick tracked through its lifecycle.
///
/// Created when a dig completes. The grid cell shows `Tile::Hole` while
/// the countdown runs; when it reaches zero the grid writes `original`
/// back and drops the hole. Nothing outside the grid holds a reference.

use super::grid::Pos;
use super::tile::Tile;

#[derive(Clone, Debug, PartialEq)]
pub struct Hole {
    pub x: i32,
    pub y: i32,
    /// Seconds until the brick restores.
    pub remaining: f32,
    /// What to write back on expiry (Brick or TrapBrick).
    pub original: Tile,
}

impl Hole {
    pub fn new(x: i32, y: i32, duration: f32, original: Tile) -> Self {
        Hole { x, y, remaining: duration, original }
    }

    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }

    /// Advance by `dt` seconds. Returns true if the hole just expired.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }

    /// About to close: presentation layers flash these.
    pub fn is_closing(&self, warning_window: f32) -> bool {
        self.remaining > 0.0 && self.remaining <= warning_window
    }
}
