//! Fixed-step force integration.

use tessera_shared::{Vec3, PHYSICS_STEP};

/// Most physics steps one `integrate` call will take.
pub const MAX_CATCH_UP_STEPS: u32 = 8;

/// Forces queued by gameplay code, applied to velocity on physics steps.
///
/// Frame time is accumulated; every time a full [`PHYSICS_STEP`] has
/// elapsed the whole queue is added to the velocity and cleared. Forces
/// queued in a frame too short to complete a step wait for the next one.
#[derive(Clone, Debug, Default)]
pub struct ForceAccumulator {
    pending: Vec<Vec3>,
    accumulated: f32,
}

impl ForceAccumulator {
    /// Queues a force.
    #[inline]
    pub fn push(&mut self, force: Vec3) {
        self.pending.push(force);
    }

    /// Forces not yet applied.
    #[must_use]
    pub fn pending(&self) -> &[Vec3] {
        &self.pending
    }

    /// Drops queued forces and the partial step.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.accumulated = 0.0;
    }

    /// Advances by `dt` and applies queued forces on each completed step.
    ///
    /// At most [`MAX_CATCH_UP_STEPS`] steps are taken per call; a longer
    /// backlog is dropped. A non-finite or negative `dt` is ignored.
    ///
    /// Returns the number of steps taken.
    pub fn integrate(&mut self, dt: f32, velocity: &mut Vec3) -> u32 {
        if !dt.is_finite() || dt < 0.0 {
            return 0;
        }
        self.accumulated += dt;

        let whole = (self.accumulated / PHYSICS_STEP).floor();
        if whole < 1.0 {
            return 0;
        }

        let steps = if whole > MAX_CATCH_UP_STEPS as f32 {
            self.accumulated = 0.0;
            MAX_CATCH_UP_STEPS
        } else {
            self.accumulated = (self.accumulated - whole * PHYSICS_STEP).max(0.0);
            whole as u32
        };

        for force in &self.pending {
            *velocity += *force;
        }
        self.pending.clear();
        steps
    }
}
