/// Error types for the fallible edges of the crate.
///
/// Generation and checking never fail: a bad candidate is just a low
/// score. Errors only come from parsing level text and loading config.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("level has no rows")]
    Empty,

    #[error("row {row} is {len} cells wide, expected {width}")]
    Ragged { row: usize, len: usize, width: usize },

    #[error("unknown tile glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
