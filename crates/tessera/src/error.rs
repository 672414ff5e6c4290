//! # Game Error Types
//!
//! Failures surfaced while entering a game state: configuration, level and
//! sprite manifest loading. Per-frame operations do not fail.

use std::path::PathBuf;

use tessera_core::CoreError;
use tessera_tilemap::TileMapError;
use thiserror::Error;

/// Errors raised by the game crate.
#[derive(Error, Debug)]
pub enum GameError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unknown keys.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The level could not be loaded.
    #[error(transparent)]
    TileMap(#[from] TileMapError),

    /// A pool or sprite library operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
