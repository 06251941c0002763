/// Difficulty profiles: static, immutable, looked up by key.
///
/// Unknown keys fall back to `Normal`; callers never see an error
/// for a bad difficulty name.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Ninja,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] =
        [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard, Difficulty::Ninja];

    /// Case-insensitive lookup; anything unrecognized is `Normal`.
    pub fn from_key(key: &str) -> Difficulty {
        match key.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "normal" => Difficulty::Normal,
            "hard" => Difficulty::Hard,
            "ninja" => Difficulty::Ninja,
            other => {
                log::debug!("unknown difficulty {other:?}, using normal");
                Difficulty::Normal
            }
        }
    }

    pub fn key(self) -> &'static str {
        self.profile().name
    }

    pub fn profile(self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
            Difficulty::Ninja => &NINJA,
        }
    }
}

/// Inclusive integer range used for entity counts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn contains(&self, n: usize) -> bool {
        n >= self.min as usize && n <= self.max as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DifficultyProfile {
    pub name: &'static str,
    pub lives: u32,
    pub enemies: CountRange,
    pub items: CountRange,
    /// 0..1, scales the number of extra stub ladders.
    pub ladder_density: f64,
    /// 0..1, chance a plain brick becomes a trap brick.
    pub trap_chance: f64,
    /// 0..1, drives band count, spine zig-zag and pole acceptance.
    pub complexity: f64,
    /// Multiplier applied to the base hole duration.
    pub hole_duration_scale: f32,
    /// How many items may rely on enemy delivery and still count as solvable.
    pub max_assisted: usize,
}

static EASY: DifficultyProfile = DifficultyProfile {
    name: "easy",
    lives: 5,
    enemies: CountRange { min: 1, max: 2 },
    items: CountRange { min: 4, max: 6 },
    ladder_density: 0.60,
    trap_chance: 0.0,
    complexity: 0.20,
    hole_duration_scale: 1.5,
    max_assisted: 0,
};

static NORMAL: DifficultyProfile = DifficultyProfile {
    name: "normal",
    lives: 4,
    enemies: CountRange { min: 2, max: 3 },
    items: CountRange { min: 6, max: 9 },
    ladder_density: 0.45,
    trap_chance: 0.05,
    complexity: 0.45,
    hole_duration_scale: 1.0,
    max_assisted: 0,
};

static HARD: DifficultyProfile = DifficultyProfile {
    name: "hard",
    lives: 3,
    enemies: CountRange { min: 3, max: 4 },
    items: CountRange { min: 8, max: 11 },
    ladder_density: 0.35,
    trap_chance: 0.10,
    complexity: 0.70,
    hole_duration_scale: 0.8,
    max_assisted: 1,
};

static NINJA: DifficultyProfile = DifficultyProfile {
    name: "ninja",
    lives: 2,
    enemies: CountRange { min: 4, max: 6 },
    items: CountRange { min: 10, max: 14 },
    ladder_density: 0.25,
    trap_chance: 0.15,
    complexity: 0.90,
    hole_duration_scale: 0.6,
    max_assisted: 2,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_falls_back_to_normal() {
        assert_eq!(Difficulty::from_key("nightmare"), Difficulty::Normal);
        assert_eq!(Difficulty::from_key(""), Difficulty::Normal);
        assert_eq!(Difficulty::from_key(" NINJA "), Difficulty::Ninja);
    }

    #[test]
    fn assisted_ceilings() {
        assert_eq!(Difficulty::Easy.profile().max_assisted, 0);
        assert_eq!(Difficulty::Normal.profile().max_assisted, 0);
        assert!(Difficulty::Hard.profile().max_assisted >= 1);
        assert_eq!(Difficulty::Ninja.profile().max_assisted, 2);
    }

    #[test]
    fn profiles_are_well_formed() {
        for d in Difficulty::ALL {
            let p = d.profile();
            assert_eq!(Difficulty::from_key(p.name), d);
            assert!(p.items.min <= p.items.max);
            assert!(p.enemies.min <= p.enemies.max);
            assert!((0.0..=1.0).contains(&p.complexity));
            assert!((0.0..=1.0).contains(&p.ladder_density));
            assert!((0.0..=1.0).contains(&p.trap_chance));
        }
    }
}
