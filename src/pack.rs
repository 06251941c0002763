/// Level files in the NodeRunner formats, plus the TOML export.
///
/// ## Pack format (`.nlp`):
///   ```text
///   ## Pack Name
///   ## Author: name
///   ## Description: blah blah
///   ---
///   # Level 1 - Name
///   @ 1,2 3,4
///   <map rows>
///   ---
///   # Level 2 - Name
///   <map rows>
///   ```
///
/// Levels are separated by a line containing only `---`; pack metadata
/// lines before the first separator start with `##`. A single-level
/// `.txt` file is one section on its own.
///
/// `@` lists extra exit-ladder cells. Written packs mark exit cells with
/// `~` in the rows instead, so the `@` line is only ever read.

use serde::Serialize;

use crate::domain::difficulty::Difficulty;
use crate::domain::grid::{LevelGrid, Pos};
use crate::error::LevelError;
use crate::levelgen::GeneratedLevel;
use crate::solver::SolvabilityReport;

#[derive(Clone, Debug, PartialEq)]
pub struct PackLevel {
    pub name: String,
    pub rows: Vec<String>,
    pub extra_exit_cells: Vec<Pos>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pack {
    pub name: String,
    pub author: String,
    pub description: String,
    pub levels: Vec<PackLevel>,
}

impl PackLevel {
    pub fn from_generated(level: &GeneratedLevel) -> Self {
        let grid = level.grid();
        PackLevel {
            name: format!("Level {} - seed {} ({})", level.level, level.seed, grid.difficulty.key()),
            rows: grid.to_rows(),
            extra_exit_cells: vec![],
        }
    }

    /// Rows padded to the widest one, then parsed strictly.
    pub fn to_grid(&self, difficulty: Difficulty) -> Result<LevelGrid, LevelError> {
        let width = self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let padded: Vec<String> = self
            .rows
            .iter()
            .map(|r| format!("{r:<width$}"))
            .collect();
        let mut grid = LevelGrid::from_rows(&padded, difficulty)?;
        for &cell in &self.extra_exit_cells {
            if grid.in_bounds(cell.0, cell.1) && !grid.exit_ladders.contains(&cell) {
                grid.exit_ladders.push(cell);
            }
        }
        Ok(grid)
    }
}

// ══════════════════════════════════════════════════════════════
// Reading
// ══════════════════════════════════════════════════════════════

pub fn parse_pack(content: &str) -> Pack {
    let mut pack = Pack::default();
    let mut section = String::new();
    let mut in_levels = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed == "---" {
            if in_levels {
                pack.levels.extend(parse_level(&section));
            }
            section.clear();
            in_levels = true;
            continue;
        }
        if !in_levels {
            read_pack_header(&mut pack, trimmed);
            continue;
        }
        section.push_str(line);
        section.push('\n');
    }
    if in_levels {
        pack.levels.extend(parse_level(&section));
    }
    pack
}

fn read_pack_header(pack: &mut Pack, line: &str) {
    if let Some(author) = line.strip_prefix("## Author:") {
        pack.author = author.trim().to_string();
    } else if let Some(desc) = line.strip_prefix("## Description:") {
        pack.description = desc.trim().to_string();
    } else if let Some(name) = line.strip_prefix("##") {
        if pack.name.is_empty() {
            pack.name = name.trim().to_string();
        }
    }
}

/// One level section. `None` if it has no map rows.
pub fn parse_level(content: &str) -> Option<PackLevel> {
    let mut name = String::new();
    let mut rows = vec![];
    let mut extra_exit_cells = vec![];

    for line in content.lines() {
        if name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else if let Some(cells) = line.strip_prefix("@ ") {
            extra_exit_cells.extend(cells.split_whitespace().filter_map(parse_cell));
        } else {
            rows.push(line.to_string());
        }
    }
    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return None;
    }
    if name.is_empty() {
        name = "Unnamed".to_string();
    }
    Some(PackLevel { name, rows, extra_exit_cells })
}

/// `#Level Name` versus a row of bricks: names contain a letter.
fn is_name_line(line: &str) -> bool {
    line.strip_prefix('#').is_some_and(|rest| rest.chars().any(|c| c.is_alphabetic()))
}

fn parse_cell(pair: &str) -> Option<Pos> {
    let (x, y) = pair.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

// ══════════════════════════════════════════════════════════════
// Writing
// ══════════════════════════════════════════════════════════════

pub fn write_pack(pack: &Pack) -> String {
    let mut out = String::new();
    out.push_str(&format!("## {}\n", pack.name));
    if !pack.author.is_empty() {
        out.push_str(&format!("## Author: {}\n", pack.author));
    }
    if !pack.description.is_empty() {
        out.push_str(&format!("## Description: {}\n", pack.description));
    }
    for level in &pack.levels {
        out.push_str("---\n");
        out.push_str(&format!("# {}\n", level.name));
        if !level.extra_exit_cells.is_empty() {
            let cells: Vec<String> = level.extra_exit_cells.iter().map(|(x, y)| format!("{x},{y}")).collect();
            out.push_str(&format!("@ {}\n", cells.join(" ")));
        }
        for row in &level.rows {
            out.push_str(row);
            out.push('\n');
        }
    }
    out
}

// ══════════════════════════════════════════════════════════════
// TOML export
// ══════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct Export<'a> {
    levels: Vec<LevelExport<'a>>,
}

#[derive(Serialize)]
struct LevelExport<'a> {
    seed: u32,
    index: u32,
    source: String,
    attempts: usize,
    rows: Vec<String>,
    report: &'a SolvabilityReport,
    grid: &'a LevelGrid,
}

/// One `[[levels]]` entry per level: header values, then `report` and
/// `grid` sub-tables.
pub fn export_toml(levels: &[GeneratedLevel]) -> Result<String, toml::ser::Error> {
    let export = Export {
        levels: levels
            .iter()
            .map(|level| LevelExport {
                seed: level.seed.0,
                index: level.level,
                source: level.source.to_string(),
                attempts: level.attempts,
                rows: level.grid().to_rows(),
                report: &level.report,
                grid: level.grid(),
            })
            .collect(),
    };
    toml::to_string(&export)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
## Test Pack
## Author: someone
## Description: two levels
---
# Level 1 - First
@ 3,0
 ~
 H$
PH E
====
---
#Second
####
P $
=====

";

    #[test]
    fn reads_header_and_levels() {
        let pack = parse_pack(SAMPLE);
        assert_eq!(pack.name, "Test Pack");
        assert_eq!(pack.author, "someone");
        assert_eq!(pack.description, "two levels");
        assert_eq!(pack.levels.len(), 2);
        assert_eq!(pack.levels[0].name, "Level 1 - First");
        assert_eq!(pack.levels[0].extra_exit_cells, vec![(3, 0)]);
        assert_eq!(pack.levels[1].name, "Second");
        // brick row is data, not a name
        assert_eq!(pack.levels[1].rows[0], "####");
        // trailing blank lines dropped
        assert_eq!(pack.levels[1].rows.len(), 3);
    }

    #[test]
    fn loose_rows_are_padded() {
        let pack = parse_pack(SAMPLE);
        let g = pack.levels[1].to_grid(Difficulty::Easy).unwrap();
        assert_eq!(g.width(), 5);
        assert_eq!(g.items, vec![(2, 1)]);
    }

    #[test]
    fn extra_exit_cells_merge() {
        let pack = parse_pack(SAMPLE);
        let g = pack.levels[0].to_grid(Difficulty::Easy).unwrap();
        assert_eq!(g.exit_ladders, vec![(1, 0), (3, 0)]);
        assert_eq!(g.start, (0, 2));
        assert_eq!(g.enemies, vec![(3, 2)]);
    }

    #[test]
    fn bad_glyph_is_reported() {
        let level = parse_level("# Broken\n ? \n===\n").unwrap();
        assert!(matches!(level.to_grid(Difficulty::Normal), Err(LevelError::UnknownGlyph { glyph: '?', .. })));
    }

    #[test]
    fn written_pack_reads_back() {
        let pack = Pack {
            name: "Generated".into(),
            author: String::new(),
            description: "seed 7".into(),
            levels: vec![PackLevel {
                name: "Level 1 - seed 7 (easy)".into(),
                rows: vec![" ~ ".into(), "PH$".into(), "===".into()],
                extra_exit_cells: vec![],
            }],
        };
        let text = write_pack(&pack);
        assert!(text.starts_with("## Generated\n## Description: seed 7\n---\n# Level 1"));
        assert_eq!(parse_pack(&text), pack);
    }

    #[test]
    fn sections_without_rows_are_skipped() {
        let pack = parse_pack("## P\n---\n# Empty\n\n---\n# Real\nP\n=\n");
        assert_eq!(pack.levels.len(), 1);
        assert_eq!(pack.levels[0].name, "Real");
    }

    #[test]
    fn toml_export_parses_back() {
        use crate::config::GenConfig;
        use crate::domain::rng::Seed;
        use crate::levelgen::generate;

        let cfg = GenConfig::default();
        let levels: Vec<GeneratedLevel> =
            (1..=2).map(|n| generate(Seed(5), Difficulty::Normal, n, &cfg)).collect();
        let text = export_toml(&levels).unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();
        let entries = value["levels"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["index"].as_integer(), Some(2));
        assert_eq!(entries[0]["rows"].as_array().unwrap().len(), levels[0].grid().height());
        assert_eq!(entries[0]["report"]["solvable"].as_bool(), Some(levels[0].report.solvable));

        let grid: LevelGrid = entries[0]["grid"].clone().try_into().unwrap();
        assert_eq!(&grid, levels[0].grid());
    }
}
