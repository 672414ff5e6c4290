//! # Tessera Shared
//!
//! Common types used by the tile map, the entity core and the game crate.
//!
//! ## Rule
//!
//! This crate must never depend on a graphics device or a window. The
//! render device is an external collaborator and lives behind a trait in
//! `tessera_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod color;
pub mod constants;
pub mod math;

pub use color::Argb;
pub use constants::{DEFAULT_FOV_X, DEFAULT_FRAME_SECONDS, DEFAULT_POOL_CAPACITY, PHYSICS_STEP};
pub use math::{Camera, Mat3, Mat4, Vec2, Vec3};
