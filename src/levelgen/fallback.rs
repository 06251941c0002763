/// Hand-authored level returned when no generated candidate is good
/// enough. Fixed at 28×16 whatever the configured size, and finishable
/// on every difficulty: all gold sits on the ladder network, the hidden
/// exit rises from the left ladder.

use crate::domain::difficulty::Difficulty;
use crate::domain::grid::LevelGrid;

pub const FALLBACK_ROWS: [&str; 16] = [
    "    ~                       ",
    "    ~                       ",
    "    H                       ",
    "    H   $      $            ",
    "  ##H####################   ",
    "    H                  H    ",
    "    H                  H    ",
    "    H   $   ------  $  H    ",
    "  ##H#######      #####H##  ",
    "    H                  H    ",
    "    H                  H    ",
    "    H $    E           H    ",
    "  ##H##################H##  ",
    "    H                  H    ",
    "  P H      $       E   H    ",
    "============================",
];

pub fn fallback_grid(difficulty: Difficulty) -> LevelGrid {
    match LevelGrid::from_rows(&FALLBACK_ROWS, difficulty) {
        Ok(grid) => grid,
        Err(e) => {
            log::error!("fallback layout does not parse: {e}");
            LevelGrid::new(FALLBACK_ROWS[0].len(), FALLBACK_ROWS.len(), difficulty)
        }
    }
}
