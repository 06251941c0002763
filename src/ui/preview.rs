/// Coloured terminal preview of a generated level.
///
/// Each grid cell is two terminal columns wide, tiles drawn with the
/// same glyph pairs and colours as the NodeRunner renderer. Entities and
/// the hidden exit column are overlaid on top. With `color` off the
/// plain legend rows are printed instead, so output can be piped.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::domain::grid::LevelGrid;
use crate::domain::tile::Tile;
use crate::levelgen::GeneratedLevel;

struct Glyph {
    left: char,
    right: char,
    fg: Color,
    bg: Color,
}

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

fn glyph(left: char, right: char, fg: Color, bg: Color) -> Glyph {
    Glyph { left, right, fg, bg }
}

fn tile_glyph(tile: Tile) -> Glyph {
    match tile {
        Tile::Empty => glyph(' ', ' ', Color::White, BASE_BG),
        Tile::Brick => glyph('░', '░', Color::Rgb { r: 180, g: 120, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        // traps look like brick in play; the preview gives them away
        Tile::TrapBrick => glyph('░', '░', Color::Rgb { r: 220, g: 90, b: 60 }, Color::Rgb { r: 100, g: 65, b: 30 }),
        Tile::Concrete => glyph('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        Tile::Ladder => glyph('╠', '╣', Color::Rgb { r: 100, g: 200, b: 255 }, BASE_BG),
        Tile::HiddenLadder => glyph('═', '═', Color::Rgb { r: 0, g: 180, b: 180 }, Color::Rgb { r: 0, g: 40, b: 40 }),
        Tile::Pole => glyph('━', '━', Color::Rgb { r: 180, g: 100, b: 200 }, BASE_BG),
        Tile::Gold => glyph('◆', '◆', Color::Rgb { r: 255, g: 220, b: 50 }, BASE_BG),
        Tile::Hole => glyph('·', '·', Color::DarkYellow, BASE_BG),
    }
}

/// What to draw at (x, y): entity markers win over the tile underneath.
fn cell_glyph(grid: &LevelGrid, x: i32, y: i32) -> Glyph {
    if grid.start == (x, y) {
        return glyph('P', '>', Color::Rgb { r: 80, g: 255, b: 80 }, BASE_BG);
    }
    if grid.enemies.contains(&(x, y)) {
        return glyph('E', '<', Color::Rgb { r: 255, g: 80, b: 80 }, BASE_BG);
    }
    if grid.is_exit_cell(x, y) {
        return glyph('┊', '┊', Color::Rgb { r: 0, g: 180, b: 180 }, BASE_BG);
    }
    tile_glyph(grid.get(x, y))
}

pub fn print_level<W: Write>(out: &mut W, level: &GeneratedLevel, color: bool) -> io::Result<()> {
    let grid = level.grid();
    writeln!(
        out,
        "seed {} · {} · level {} · {} after {} attempt(s)",
        level.seed,
        grid.difficulty.key(),
        level.level,
        level.source,
        level.attempts
    )?;
    writeln!(out, "{}", level.report)?;

    if !color {
        for row in grid.to_rows() {
            writeln!(out, "{row}")?;
        }
        return Ok(());
    }

    for y in 0..grid.height() as i32 {
        let mut last: Option<(Color, Color)> = None;
        for x in 0..grid.width() as i32 {
            let g = cell_glyph(grid, x, y);
            // only emit colour changes
            if last != Some((g.fg, g.bg)) {
                queue!(out, SetForegroundColor(g.fg), SetBackgroundColor(g.bg))?;
                last = Some((g.fg, g.bg));
            }
            queue!(out, Print(g.left), Print(g.right))?;
        }
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}
