/// External configuration loader.
///
/// Reads `ladderforge.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "ladderforge.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GenConfig {
    pub generator: GeneratorConfig,
    pub placement: PlacementConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub hidden_rows: usize,     // top rows reserved for the exit ladder
    pub attempt_budget: usize,  // full pipeline runs before falling back
    pub accept_threshold: f64,  // minimum score for a best-effort level
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    pub item_spacing: i32,          // preferred manhattan gap between items
    pub enemy_start_distance: i32,  // enemies never spawn closer to the start
    pub enemy_spacing: i32,
    pub progression_step: u32,      // levels per extra enemy
    pub progression_cap: u32,       // max extra enemies from progression
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    generator: TomlGenerator,
    #[serde(default)]
    placement: TomlPlacement,
}

#[derive(Deserialize, Debug)]
struct TomlGenerator {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
    #[serde(default = "default_hidden_rows")]
    hidden_rows: usize,
    #[serde(default = "default_attempt_budget")]
    attempt_budget: usize,
    #[serde(default = "default_accept_threshold")]
    accept_threshold: f64,
}

#[derive(Deserialize, Debug)]
struct TomlPlacement {
    #[serde(default = "default_item_spacing")]
    item_spacing: i32,
    #[serde(default = "default_enemy_start_distance")]
    enemy_start_distance: i32,
    #[serde(default = "default_enemy_spacing")]
    enemy_spacing: i32,
    #[serde(default = "default_progression_step")]
    progression_step: u32,
    #[serde(default = "default_progression_cap")]
    progression_cap: u32,
}

// ── Defaults ──

fn default_width() -> usize { 28 }
fn default_height() -> usize { 16 }
fn default_hidden_rows() -> usize { 2 }
fn default_attempt_budget() -> usize { 24 }
fn default_accept_threshold() -> f64 { 1.0 }  // every item collectable + exit reachable

fn default_item_spacing() -> i32 { 3 }
fn default_enemy_start_distance() -> i32 { 8 }
fn default_enemy_spacing() -> i32 { 3 }
fn default_progression_step() -> u32 { 3 }
fn default_progression_cap() -> u32 { 2 }

impl Default for TomlGenerator {
    fn default() -> Self {
        TomlGenerator {
            width: default_width(),
            height: default_height(),
            hidden_rows: default_hidden_rows(),
            attempt_budget: default_attempt_budget(),
            accept_threshold: default_accept_threshold(),
        }
    }
}

impl Default for TomlPlacement {
    fn default() -> Self {
        TomlPlacement {
            item_spacing: default_item_spacing(),
            enemy_start_distance: default_enemy_start_distance(),
            enemy_spacing: default_enemy_spacing(),
            progression_step: default_progression_step(),
            progression_cap: default_progression_cap(),
        }
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GenConfig {
    /// Load config from `ladderforge.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// A missing or broken file falls back to defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join(CONFIG_FILE);
            if !path.is_file() {
                continue;
            }
            match GenConfig::load_from(&path) {
                Ok(cfg) => {
                    log::info!("config loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => log::warn!("ignoring {}: {e}", path.display()),
            }
        }
        GenConfig::default()
    }

    /// Load an explicit config file. Unlike `load`, errors are reported.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        GenConfig::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let cfg = GenConfig::from_toml(parsed);
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_toml(t: TomlConfig) -> Self {
        GenConfig {
            generator: GeneratorConfig {
                width: t.generator.width,
                height: t.generator.height,
                hidden_rows: t.generator.hidden_rows,
                attempt_budget: t.generator.attempt_budget,
                accept_threshold: t.generator.accept_threshold,
            },
            placement: PlacementConfig {
                item_spacing: t.placement.item_spacing,
                enemy_start_distance: t.placement.enemy_start_distance,
                enemy_spacing: t.placement.enemy_spacing,
                progression_step: t.placement.progression_step,
                progression_cap: t.placement.progression_cap,
            },
        }
    }

    /// The layout stages need room for a spine, a few bands and the
    /// hidden zone; anything smaller is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generator;
        if g.width < 12 || g.width > 256 {
            return Err(ConfigError::Invalid(format!("width {} not in 12..=256", g.width)));
        }
        if g.hidden_rows == 0 {
            return Err(ConfigError::Invalid("hidden_rows must be at least 1".into()));
        }
        if g.height < g.hidden_rows + 10 || g.height > 256 {
            return Err(ConfigError::Invalid(format!(
                "height {} needs hidden_rows + 10 ({}) and at most 256",
                g.height,
                g.hidden_rows + 10
            )));
        }
        if g.attempt_budget == 0 {
            return Err(ConfigError::Invalid("attempt_budget must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&g.accept_threshold) {
            return Err(ConfigError::Invalid(format!(
                "accept_threshold {} not in 0..=1",
                g.accept_threshold
            )));
        }
        if self.placement.progression_step == 0 {
            return Err(ConfigError::Invalid("progression_step must be at least 1".into()));
        }
        Ok(())
    }
}

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Exe directory (resolve symlinks)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. CWD
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    dirs
}
