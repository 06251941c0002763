/// Tile categories and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Brick,        // Solid + Diggable
    Concrete,     // Solid only
    TrapBrick,    // Solid + Diggable, never placed under a ladder
    Ladder,       // Climbable
    HiddenLadder, // Exit ladder, written by the game loop once all gold is gone
    Pole,         // Hangable (horizontal bar)
    Gold,         // Pickup target
    Hole,         // Dug brick, restored when its timer runs out
}

impl Tile {
    /// Does this tile block movement (walls, floors)?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Brick | Tile::Concrete | Tile::TrapBrick)
    }

    /// Brick material that a dig can remove. The grid adds the
    /// "nothing climbable above" condition.
    pub fn is_brick_material(self) -> bool {
        matches!(self, Tile::Brick | Tile::TrapBrick)
    }

    /// Can an entity climb (move up/down) on this tile?
    pub fn is_climbable(self) -> bool {
        matches!(self, Tile::Ladder | Tile::HiddenLadder)
    }

    /// Can an entity hang and move horizontally on this tile?
    pub fn is_pole(self) -> bool {
        matches!(self, Tile::Pole)
    }

    /// Can an entity stand on top of this tile?
    pub fn supports_standing(self) -> bool {
        self.is_solid() || self.is_climbable()
    }

    /// Is this tile passable (entity can occupy this cell)?
    pub fn is_passable(self) -> bool {
        !self.is_solid()
    }

    /// Legend glyph used by level text files.
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Brick => '#',
            Tile::Concrete => '=',
            Tile::TrapBrick => 'T',
            Tile::Ladder => 'H',
            Tile::HiddenLadder => '~',
            Tile::Pole => '-',
            Tile::Gold => '$',
            Tile::Hole => 'o',
        }
    }

    /// Inverse of [`Tile::glyph`] for pure terrain glyphs.
    /// Entity markers (`P`, `E`, `~`) are handled by the grid parser.
    pub fn from_glyph(ch: char) -> Option<Tile> {
        match ch {
            ' ' | '.' => Some(Tile::Empty),
            '#' => Some(Tile::Brick),
            '=' => Some(Tile::Concrete),
            'T' => Some(Tile::TrapBrick),
            'H' => Some(Tile::Ladder),
            '-' => Some(Tile::Pole),
            '$' => Some(Tile::Gold),
            'o' => Some(Tile::Hole),
            _ => None,
        }
    }
}
