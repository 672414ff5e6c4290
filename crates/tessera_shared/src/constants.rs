//! # Engine Constants
//!
//! Values shared by every pool and every entity. Runtime-tunable values
//! (pool sizes per archetype, camera field of view) live in the game
//! configuration; these are the defaults it falls back to.

// =============================================================================
// SIMULATION
// =============================================================================

/// Fixed physics step (seconds). Queued forces are applied once per step.
pub const PHYSICS_STEP: f32 = 1.0 / 60.0;

/// Frame duration used by `set_default_animation` (seconds).
pub const DEFAULT_FRAME_SECONDS: f32 = 0.1;

// =============================================================================
// POOLS
// =============================================================================

/// Default number of slots in an entity pool.
pub const DEFAULT_POOL_CAPACITY: usize = 512;

// =============================================================================
// CAMERA
// =============================================================================

/// Default horizontal half field of view, in world units.
pub const DEFAULT_FOV_X: f32 = 16.0;

/// Divisor turning world Z into render depth.
pub const DEPTH_DIVISOR: f32 = 100.0;
