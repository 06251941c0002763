use ladderforge::config::GenConfig;
use ladderforge::levelgen::fallback::fallback_grid;
use ladderforge::{check_solvability, generate, Difficulty, LevelGrid, LevelSource, Seed};

fn cfg() -> GenConfig {
    GenConfig::default()
}

#[test]
fn abc123_normal_level_one() {
    let config = cfg();
    let level = generate(Seed::parse("ABC123"), Difficulty::Normal, 1, &config);
    assert!(level.attempts >= 1 && level.attempts <= config.generator.attempt_budget);
    let items = level.grid().items.len();
    assert!((6..=9).contains(&items), "{items} items");
}

#[test]
fn generation_is_deterministic() {
    let config = cfg();
    for d in Difficulty::ALL {
        let a = generate(Seed::parse("determinism"), d, 2, &config);
        let b = generate(Seed::parse("determinism"), d, 2, &config);
        assert_eq!(a.grid(), b.grid(), "{}", d.key());
        assert_eq!(a.report, b.report);
    }
}

#[test]
fn every_level_is_solvable_or_a_documented_fallback() {
    let config = cfg();
    for d in Difficulty::ALL {
        for n in 0..12u32 {
            let level = generate(Seed(1000 + n), d, 1 + n % 4, &config);
            let report = check_solvability(level.grid());
            match level.source {
                LevelSource::Solvable => assert!(report.solvable, "{}", report),
                LevelSource::Fallback => assert_eq!(level.grid(), &fallback_grid(d)),
                LevelSource::BestEffort => {
                    assert!(report.score >= config.generator.accept_threshold, "{}", report)
                }
            }
        }
    }
}

#[test]
fn generated_levels_keep_their_shape() {
    let config = cfg();
    for n in 0..10u32 {
        let level = generate(Seed(n), Difficulty::Hard, 1, &config);
        let g = level.grid();
        if level.source == LevelSource::Fallback {
            continue;
        }
        assert_eq!((g.width(), g.height()), (28, 16));
        assert_eq!(g.exit_ladders.len(), config.generator.hidden_rows);
        // the exit is metadata only
        for &(x, y) in &g.exit_ladders {
            assert!(g.get(x, y).is_passable());
            assert!(!g.is_climbable(x, y));
        }
        for &(x, y) in &g.items {
            assert_eq!(g.get(x, y), ladderforge::domain::tile::Tile::Gold);
        }
        assert!(Difficulty::Hard.profile().items.contains(g.items.len()));
    }
}

#[test]
fn custom_size_is_honoured() {
    let config = GenConfig::from_toml_str("[generator]\nwidth = 40\nheight = 22\nhidden_rows = 3\n").unwrap();
    let level = generate(Seed(77), Difficulty::Normal, 1, &config);
    if level.source != LevelSource::Fallback {
        assert_eq!((level.grid().width(), level.grid().height()), (40, 22));
        assert_eq!(level.grid().exit_ladders.len(), 3);
    }
}

#[test]
fn unreachable_item_over_gap() {
    let grid = LevelGrid::from_rows(&[" $ ", "P  ", "= ="], Difficulty::Normal).unwrap();
    let report = check_solvability(&grid);
    assert!(!report.unreachable.is_empty());
    assert!(!report.solvable);
}

/// Gold reachable only by an enemy carrying it out of a walled pocket.
const ASSISTED: [&str; 7] = [
    " ~        ",
    " ~        ",
    " H   E$   ",
    " H  ===== ",
    " H        ",
    "PH        ",
    "==========",
];

#[test]
fn assisted_ceiling_per_difficulty() {
    let easy = check_solvability(&LevelGrid::from_rows(&ASSISTED, Difficulty::Easy).unwrap());
    assert_eq!(easy.assisted, 1);
    assert!(!easy.solvable);

    let hard = check_solvability(&LevelGrid::from_rows(&ASSISTED, Difficulty::Hard).unwrap());
    assert!(hard.solvable);

    let ninja = check_solvability(&LevelGrid::from_rows(&ASSISTED, Difficulty::Ninja).unwrap());
    assert_eq!(ninja.assisted, 1);
    assert!(ninja.solvable);
}

#[test]
fn checking_does_not_mutate() {
    let level = generate(Seed(31), Difficulty::Ninja, 3, &cfg());
    let before = level.working_copy();
    let a = check_solvability(level.grid());
    let b = check_solvability(level.grid());
    assert_eq!(a, b);
    assert_eq!(level.grid(), &before);
}

#[test]
fn unknown_difficulty_is_normal() {
    assert_eq!(Difficulty::from_key("impossible"), Difficulty::Normal);
    let a = generate(Seed(8), Difficulty::from_key("NINJA"), 1, &cfg());
    assert_eq!(a.grid().difficulty, Difficulty::Ninja);
}
