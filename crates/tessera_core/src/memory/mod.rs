//! # Memory Management
//!
//! Entity storage is allocated once per pool, when the game state starts.
//! Acquiring and releasing entities reuses slots and never touches the heap.

mod pool;

pub use pool::{EntityPool, Recycling, RenderStats, UpdateStats};
