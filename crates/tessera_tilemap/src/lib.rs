//! # Tessera Tile Map
//!
//! Static 2-D collision grid for side-view levels.
//!
//! ## Addressing
//!
//! Cells are stored row-major (`x + y * width`). A world coordinate maps to
//! the cell containing it, so `(2.7, 0.1)` is cell `(2, 0)`. The Y axis grows
//! upward: the BOTTOM side of a probe samples `pos_y - extent_y / 2`.
//!
//! ## Failure model
//!
//! - Loading a malformed level is an error ([`TileMapError`]).
//! - Querying outside the grid is not: it reads as an empty cell.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_tilemap::{CollisionFlags, TileGrid};
//!
//! let grid = TileGrid::load_or_empty("assets/levels/room.toml");
//! let flags = grid.probe(2.5, 1.5, 1.0, 1.0);
//! if flags.contains(CollisionFlags::BOTTOM) {
//!     // standing on something
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod document;
mod error;
mod flags;
mod grid;

pub use document::{Dimension, LevelDocument, MapBody};
pub use error::{TileMapError, TileMapResult};
pub use flags::CollisionFlags;
pub use grid::TileGrid;
