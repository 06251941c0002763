/// Procedural level generation.
///
/// ## Pipeline (one attempt)
///
///   1–7  `layout::build_terrain`      ground, spine, bands, ladders,
///                                     poles, hardening, repair
///   8    `placement::place_entities`  start, gold, enemy spawns
///   9    `placement::place_exit`      hidden exit column
///
/// ## Retry policy
///
/// Every attempt is scored by `solver::check_solvability`:
///
///   - first solvable candidate           → `LevelSource::Solvable`
///   - else best score ≥ accept threshold → `LevelSource::BestEffort`
///   - else                               → `LevelSource::Fallback`
///
/// One RNG stream, seeded from (seed, level), runs across all attempts,
/// so a (seed, difficulty, level, config) tuple always produces the same
/// grid.

pub mod fallback;
pub mod layout;
pub mod placement;

use std::fmt;
use std::sync::Arc;

use crate::config::GenConfig;
use crate::domain::difficulty::Difficulty;
use crate::domain::grid::LevelGrid;
use crate::domain::rng::{LevelRng, Seed};
use crate::solver::{check_solvability, SolvabilityReport};

use self::fallback::fallback_grid;
use self::layout::{build_terrain, Layout};
use self::placement::{place_entities, place_exit};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelSource {
    Solvable,
    BestEffort,
    Fallback,
}

impl fmt::Display for LevelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LevelSource::Solvable => "solvable",
            LevelSource::BestEffort => "best-effort",
            LevelSource::Fallback => "fallback",
        })
    }
}

/// A finished level. The grid is shared read-only; the game takes a
/// `working_copy` to dig holes and collect gold in.
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    grid: Arc<LevelGrid>,
    pub report: SolvabilityReport,
    /// Attempts run, including the one returned.
    pub attempts: usize,
    pub source: LevelSource,
    pub seed: Seed,
    pub level: u32,
}

impl GeneratedLevel {
    pub fn grid(&self) -> &LevelGrid {
        &self.grid
    }

    pub fn shared(&self) -> Arc<LevelGrid> {
        Arc::clone(&self.grid)
    }

    pub fn working_copy(&self) -> LevelGrid {
        (*self.grid).clone()
    }
}

/// One full pipeline run.
pub fn build_candidate(rng: &mut LevelRng, difficulty: Difficulty, level: u32, config: &GenConfig) -> LevelGrid {
    let profile = difficulty.profile();
    let g = &config.generator;
    let mut grid = LevelGrid::new(g.width, g.height, difficulty);
    let mut layout = Layout::new(&grid, g.hidden_rows);

    build_terrain(&mut grid, rng, profile, &mut layout);
    place_entities(&mut grid, rng, profile, &config.placement, &layout, level);
    place_exit(&mut grid, rng, &layout);
    grid
}

pub fn generate(seed: Seed, difficulty: Difficulty, level: u32, config: &GenConfig) -> GeneratedLevel {
    let budget = config.generator.attempt_budget.max(1);
    let mut rng = LevelRng::for_level(seed, level);

    let candidates = (1..=budget).map(|attempt| {
        let grid = build_candidate(&mut rng, difficulty, level, config);
        let report = check_solvability(&grid);
        log::debug!("seed {seed} level {level} attempt {attempt}/{budget}: {report}");
        (grid, report)
    });
    let choice = choose(candidates, config.generator.accept_threshold, difficulty);

    match choice.source {
        LevelSource::Solvable => {
            log::info!("seed {seed} level {level}: solvable after {} attempt(s)", choice.attempts)
        }
        LevelSource::BestEffort => {
            log::info!("seed {seed} level {level}: best-effort level, score {:.2}", choice.report.score)
        }
        LevelSource::Fallback => log::warn!(
            "seed {seed} level {level}: nothing reached {:.2} after {} attempts, using fallback",
            config.generator.accept_threshold,
            choice.attempts
        ),
    }

    GeneratedLevel {
        grid: Arc::new(choice.grid),
        report: choice.report,
        attempts: choice.attempts,
        source: choice.source,
        seed,
        level,
    }
}

struct Choice {
    grid: LevelGrid,
    report: SolvabilityReport,
    attempts: usize,
    source: LevelSource,
}

/// Retry policy over scored candidates, consumed lazily: stops at the
/// first solvable one. Otherwise the best score wins (earliest on a tie)
/// if it reaches `threshold`, else the fallback level.
fn choose<I>(candidates: I, threshold: f64, difficulty: Difficulty) -> Choice
where
    I: IntoIterator<Item = (LevelGrid, SolvabilityReport)>,
{
    let mut best: Option<(LevelGrid, SolvabilityReport)> = None;
    let mut attempts = 0;

    for (grid, report) in candidates {
        attempts += 1;
        if report.solvable {
            return Choice { grid, report, attempts, source: LevelSource::Solvable };
        }
        // strictly better only
        if best.as_ref().map_or(true, |(_, b)| report.score > b.score) {
            best = Some((grid, report));
        }
    }

    match best {
        Some((grid, report)) if report.score >= threshold => {
            Choice { grid, report, attempts, source: LevelSource::BestEffort }
        }
        _ => {
            let grid = fallback_grid(difficulty);
            let report = check_solvability(&grid);
            Choice { grid, report, attempts, source: LevelSource::Fallback }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    #[test]
    fn same_inputs_same_level() {
        let cfg = GenConfig::default();
        let a = generate(Seed(42), Difficulty::Hard, 3, &cfg);
        let b = generate(Seed(42), Difficulty::Hard, 3, &cfg);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.attempts, b.attempts);
        assert_eq!(a.source, b.source);
    }

    #[test]
    fn levels_of_a_run_differ() {
        let cfg = GenConfig::default();
        let a = generate(Seed(42), Difficulty::Normal, 1, &cfg);
        let b = generate(Seed(42), Difficulty::Normal, 2, &cfg);
        if a.source != LevelSource::Fallback || b.source != LevelSource::Fallback {
            assert_ne!(a.grid(), b.grid());
        }
    }

    #[test]
    fn candidate_has_configured_shape() {
        let cfg = GenConfig::default();
        let mut rng = LevelRng::new(Seed(5));
        let g = build_candidate(&mut rng, Difficulty::Normal, 1, &cfg);
        assert_eq!((g.width(), g.height()), (28, 16));
        assert_eq!(g.exit_ladders.len(), 2);
        for &(x, y) in &g.exit_ladders {
            assert_eq!(g.get(x, y), Tile::Empty);
        }
        let (ex, _) = g.exit_ladders[0];
        assert!(g.is_climbable(ex, 2));
    }

    #[test]
    fn zero_threshold_never_falls_back() {
        let mut cfg = GenConfig::default();
        cfg.generator.accept_threshold = 0.0;
        cfg.generator.attempt_budget = 1;
        let level = generate(Seed(7), Difficulty::Ninja, 1, &cfg);
        assert_ne!(level.source, LevelSource::Fallback);
        assert_eq!(level.attempts, 1);
    }

    /// A blank grid tagged by its width, with a hand-made report.
    fn scored(tag: usize, score: f64, solvable: bool) -> (LevelGrid, SolvabilityReport) {
        let grid = LevelGrid::new(4 + tag, 4, Difficulty::Normal);
        let report = SolvabilityReport {
            solvable,
            score,
            direct: 0,
            assisted: 0,
            unreachable: Vec::new(),
            exit_reachable: solvable,
            summary: format!("candidate {tag}"),
        };
        (grid, report)
    }

    #[test]
    fn first_solvable_candidate_wins() {
        let mut pulled = 0;
        let candidates = vec![scored(0, 0.5, false), scored(1, 1.0, true), scored(2, 1.0, true)];
        let c = choose(candidates.into_iter().inspect(|_| pulled += 1), 1.0, Difficulty::Normal);
        assert_eq!(c.source, LevelSource::Solvable);
        assert_eq!(c.grid.width(), 5);
        assert_eq!(c.attempts, 2);
        assert_eq!(pulled, 2);
    }

    #[test]
    fn tie_goes_to_earliest_at_threshold() {
        let candidates = vec![scored(0, 0.8, false), scored(1, 0.8, false), scored(2, 0.3, false)];
        let c = choose(candidates, 0.8, Difficulty::Normal);
        assert_eq!(c.source, LevelSource::BestEffort);
        assert_eq!(c.grid.width(), 4);
        assert_eq!(c.report.summary, "candidate 0");
        assert_eq!(c.attempts, 3);
    }

    #[test]
    fn higher_score_beats_earlier() {
        let candidates = vec![scored(0, 0.6, false), scored(1, 0.9, false), scored(2, 0.7, false)];
        let c = choose(candidates, 0.5, Difficulty::Hard);
        assert_eq!(c.source, LevelSource::BestEffort);
        assert_eq!(c.grid.width(), 5);
    }

    #[test]
    fn below_threshold_uses_fallback() {
        for d in Difficulty::ALL {
            let candidates = vec![scored(0, 0.79, false), scored(1, 0.5, false)];
            let c = choose(candidates, 0.8, d);
            assert_eq!(c.source, LevelSource::Fallback);
            assert_eq!(c.grid, fallback_grid(d));
            assert_eq!(c.grid.to_rows(), fallback::FALLBACK_ROWS.to_vec());
            assert_eq!(c.report, check_solvability(&c.grid));
            assert!(c.report.solvable);
            assert_eq!(c.attempts, 2);
        }
    }

    #[test]
    fn no_candidates_uses_fallback() {
        let none: Vec<(LevelGrid, SolvabilityReport)> = Vec::new();
        let c = choose(none, 0.0, Difficulty::Easy);
        assert_eq!(c.source, LevelSource::Fallback);
        assert_eq!(c.attempts, 0);
    }

    #[test]
    fn working_copy_is_independent() {
        let level = generate(Seed(1), Difficulty::Easy, 1, &GenConfig::default());
        let mut copy = level.working_copy();
        let (x, y) = copy.start;
        copy.set(x, y + 1, Tile::Empty);
        assert_ne!(&copy, level.grid());
        assert_eq!(Arc::strong_count(&level.shared()), 2);
    }
}
