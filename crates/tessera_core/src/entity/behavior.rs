//! Per-pool behaviour hooks.
//!
//! A pool holds homogeneous [`EntityState`] slots; what makes a pool of
//! projectiles different from a pool of enemies is the [`Archetype`] it was
//! created with. The pool calls the hooks at fixed points of the lifecycle.

use super::state::{EntityState, Lifecycle};
use crate::frame::FrameContext;

/// Behaviour shared by every entity of one pool.
pub trait Archetype {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs right after a slot is acquired and reset.
    fn init(&self, entity: &mut EntityState) {
        let _ = entity;
    }

    /// Runs after the built-in update of a live entity.
    ///
    /// Returning [`Lifecycle::Expired`] releases the entity in the same pass.
    fn update(&self, entity: &mut EntityState, frame: &FrameContext<'_>) -> Lifecycle {
        let _ = (entity, frame);
        Lifecycle::Alive
    }

    /// Runs right before a slot is released.
    fn destroy(&self, entity: &mut EntityState) {
        let _ = entity;
    }
}

/// Archetype with no behaviour beyond the built-in update.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inert;

impl Archetype for Inert {
    fn name(&self) -> &'static str {
        "inert"
    }
}
