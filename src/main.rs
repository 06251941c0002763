/// Command-line front end: generate, preview, export and check levels.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use crossterm::tty::IsTty;

use ladderforge::config::GenConfig;
use ladderforge::pack::{export_toml, parse_level, parse_pack, write_pack, Pack, PackLevel};
use ladderforge::ui::preview::print_level;
use ladderforge::{check_solvability, generate, Difficulty, GeneratedLevel, LevelSource, Seed};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Coloured preview (plain legend rows when piped)
    Text,
    /// NodeRunner `.nlp` level pack
    Pack,
    /// TOML, one `[[levels]]` entry per level
    Toml,
}

/// Generate solvable NodeRunner levels from a seed.
#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
struct Args {
    /// Seed: a number, or any text
    #[arg(short, long, default_value = "1")]
    seed: String,

    /// easy, normal, hard or ninja
    #[arg(short, long, default_value = "normal")]
    difficulty: String,

    /// 1-based level index within a run
    #[arg(short, long, default_value_t = 1)]
    level: u32,

    /// Number of consecutive levels to generate
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Config file (default: ladderforge.toml beside the binary, then in the CWD)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Never colour the text preview
    #[arg(long, default_value_t = false)]
    plain: bool,

    /// Generate N levels from successive seeds and summarise the outcomes
    #[arg(long, value_name = "N")]
    fuzz: Option<u32>,

    /// Check every level of an existing .nlp pack or .txt level file
    #[arg(long, value_name = "FILE", conflicts_with = "fuzz")]
    check: Option<PathBuf>,

    /// Enable debug messages
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.debug {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ladderforge: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => GenConfig::load_from(path)?,
        None => GenConfig::load(),
    };
    let difficulty = Difficulty::from_key(&args.difficulty);
    let seed = Seed::parse(&args.seed);

    if let Some(path) = &args.check {
        return check_file(path, difficulty);
    }
    if let Some(n) = args.fuzz {
        return fuzz(seed, difficulty, args.level, n, &config);
    }

    let levels: Vec<GeneratedLevel> = (0..args.count.max(1))
        .map(|i| generate(seed, difficulty, args.level + i, &config))
        .collect();

    let stdout = io::stdout();
    let color = !args.plain && stdout.is_tty();
    let mut out = stdout.lock();
    match args.format {
        Format::Text => {
            for (i, level) in levels.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                print_level(&mut out, level, color)?;
            }
        }
        Format::Pack => {
            let pack = Pack {
                name: format!("Ladderforge {}", args.seed),
                author: "ladderforge".to_string(),
                description: format!("{} {} level(s) from seed {}", levels.len(), difficulty.key(), seed),
                levels: levels.iter().map(PackLevel::from_generated).collect(),
            };
            out.write_all(write_pack(&pack).as_bytes())?;
        }
        Format::Toml => out.write_all(export_toml(&levels)?.as_bytes())?,
    }
    Ok(())
}

// ── Fuzzing ──

#[derive(Default)]
struct FuzzTally {
    solvable: u32,
    best_effort: u32,
    fallback: u32,
    attempts: usize,
}

/// Generate from `n` successive seeds. Every level is generated twice
/// and re-checked; any disagreement is an error.
fn fuzz(first: Seed, difficulty: Difficulty, level: u32, n: u32, config: &GenConfig) -> Result<(), Box<dyn Error>> {
    let mut tally = FuzzTally::default();
    let mut seed = first;

    for _ in 0..n {
        let generated = generate(seed, difficulty, level, config);
        let again = generate(seed, difficulty, level, config);
        if generated.grid() != again.grid() {
            return Err(format!("seed {seed}: generation is not deterministic").into());
        }
        let recheck = check_solvability(generated.grid());
        if recheck != generated.report {
            return Err(format!("seed {seed}: re-check disagrees: {recheck}").into());
        }
        if generated.source == LevelSource::Fallback && !recheck.solvable {
            return Err(format!("seed {seed}: fallback level is not solvable: {recheck}").into());
        }

        match generated.source {
            LevelSource::Solvable => tally.solvable += 1,
            LevelSource::BestEffort => tally.best_effort += 1,
            LevelSource::Fallback => tally.fallback += 1,
        }
        tally.attempts += generated.attempts;
        log::debug!("seed {seed}: {} after {} attempt(s)", generated.source, generated.attempts);
        seed = seed.next();
    }

    println!(
        "{n} level(s), {} level {level}: {} solvable, {} best-effort, {} fallback; {:.1} attempts on average",
        difficulty.key(),
        tally.solvable,
        tally.best_effort,
        tally.fallback,
        tally.attempts as f64 / n.max(1) as f64
    );
    Ok(())
}

// ── Checking existing level files ──

fn check_file(path: &Path, difficulty: Difficulty) -> Result<(), Box<dyn Error>> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let levels = if path.extension().is_some_and(|e| e == "nlp") {
        parse_pack(&content).levels
    } else {
        parse_level(&content).into_iter().collect()
    };
    if levels.is_empty() {
        return Err(format!("{}: no levels found", path.display()).into());
    }

    let mut failed = 0;
    for level in &levels {
        let grid = level.to_grid(difficulty).map_err(|e| format!("{}: {e}", level.name))?;
        let report = check_solvability(&grid);
        let verdict = if report.solvable { "ok" } else { "UNSOLVABLE" };
        println!("{verdict:>10}  {}: {report}", level.name);
        if !report.solvable {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} level(s) not solvable", levels.len()).into());
    }
    Ok(())
}
