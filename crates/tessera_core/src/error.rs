//! # Core Error Types
//!
//! Pool exhaustion and stale handles are recoverable: the caller logs or
//! skips the spawn. Manifest errors happen once, at game-state entry.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::{EntityHandle, PoolId};

/// Errors raised by pools and the sprite library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Every slot of the pool is alive.
    #[error("pool {pool} exhausted ({capacity} slots in use)")]
    Exhausted {
        /// The pool that ran out of slots.
        pool: PoolId,
        /// Its fixed capacity.
        capacity: usize,
    },

    /// The handle refers to a slot that has since been released.
    #[error("stale entity handle {0}")]
    StaleHandle(EntityHandle),

    /// No sprite sheet registered under this name.
    #[error("unknown sprite {0:?}")]
    UnknownSprite(String),

    /// A sprite sheet definition is unusable.
    #[error("invalid sprite sheet {sprite:?}: {reason}")]
    InvalidSheet {
        /// Sheet name.
        sprite: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The sprite manifest is not valid TOML or has the wrong shape.
    #[error("malformed sprite manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    /// A manifest file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
