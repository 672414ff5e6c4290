//! # Entities
//!
//! One entity is one [`EntityState`] slot inside a pool, addressed from the
//! outside by a generation-tagged [`EntityHandle`].

mod animation;
mod behavior;
mod bounds;
mod handle;
mod physics;
mod state;
mod transform;

pub use animation::{AnimationPhase, AnimationState};
pub use behavior::{Archetype, Inert};
pub use bounds::BoundingVolume;
pub use handle::{EntityHandle, EntityId, PoolId};
pub use physics::ForceAccumulator;
pub use state::{Brain, EntityState, FollowTarget, Lifecycle, TileResponse};
pub use transform::{Orientation, TransformCache};
