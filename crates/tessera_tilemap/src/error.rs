//! # Tile Map Error Types
//!
//! Everything that can go wrong while loading a level. Queries never fail.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a collision grid.
#[derive(Error, Debug)]
pub enum TileMapError {
    /// The level file could not be read.
    #[error("failed to read level {path}: {source}")]
    Io {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The level document is not valid TOML or has the wrong shape.
    #[error("malformed level document: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required dimension attribute is absent.
    #[error("level is missing the {0} attribute")]
    MissingDimension(&'static str),

    /// Width or height is zero or negative.
    #[error("invalid level dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: i64,
        /// Declared height.
        height: i64,
    },

    /// A cell is not a single decimal digit.
    #[error("invalid cell {found:?} at position {index}")]
    InvalidCell {
        /// Index of the cell in row-major order.
        index: usize,
        /// The offending character.
        found: char,
    },

    /// The map body does not hold exactly `width * height` cells.
    #[error("expected {expected} cells, found {found}")]
    CellCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Cells actually present.
        found: usize,
    },
}

/// Result type for tile map loading.
pub type TileMapResult<T> = Result<T, TileMapError>;
