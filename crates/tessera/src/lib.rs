//! # Tessera
//!
//! The game crate: wires the engine crates into a playable state.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          GameContext                             │
//! │                                                                  │
//! │  ┌──────────┐  ┌──────────┐  ┌────────────┐  ┌──────────┐        │
//! │  │  Player  │  │  Enemy   │  │ Projectile │  │  Effect  │  pools │
//! │  └────┬─────┘  └────┬─────┘  └─────┬──────┘  └────┬─────┘        │
//! │       └─────────────┴───────┬──────┴──────────────┘              │
//! │                             │ FrameContext                       │
//! │        ┌────────────────────┼─────────────────────┐              │
//! │        ▼                    ▼                     ▼              │
//! │   TileGrid            SpriteLibrary         ReferenceTable       │
//! │  (tessera_tilemap)    (tessera_core)        (per-frame snapshot) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `archetype`: entity kinds and their pool behaviours
//! - `config`: TOML game configuration
//! - `context`: pools, level and camera of a game state
//! - `game_loop`: frame orchestration and timing

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod archetype;
pub mod config;
pub mod context;
mod error;
pub mod game_loop;

// Re-export the engine crates
pub use tessera_core as core;
pub use tessera_shared as shared;
pub use tessera_tilemap as tilemap;

// Re-export commonly used types
pub use archetype::{behavior, Kind};
pub use config::GameConfig;
pub use context::GameContext;
pub use error::{GameError, GameResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop, GameLoopConfig};
