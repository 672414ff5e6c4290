//! # Tessera Core
//!
//! Entity lifecycle pools and per-entity state for a 2-D side-view sprite
//! engine.
//!
//! ## Architecture Rules
//!
//! 1. **Fixed capacity** - pools allocate every slot upfront; acquisition
//!    fails instead of growing
//! 2. **Handles, not references** - entities point at each other through
//!    generation-tagged [`EntityHandle`]s; a released target is detected,
//!    never dereferenced
//! 3. **Lazy matrices** - setters only store values; render and collision
//!    matrices are rebuilt on demand and only when their inputs changed
//! 4. **Collaborators behind traits** - sprite data comes from an
//!    [`AssetProvider`], draw calls go to a [`RenderDevice`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{EntityPool, FrameContext, Inert, PoolId, RecordingDevice};
//!
//! let mut pool = EntityPool::new(PoolId(0), 256, Box::new(Inert));
//! let spark = pool.acquire("quad", "spark")?;
//! pool.get_mut(spark.id).unwrap().set_lifetime(0.25);
//!
//! let frame = FrameContext::new(dt, camera, &grid, &sprites, &references);
//! pool.update_all(&frame);
//! pool.render_all(&mut RecordingDevice::new(), &frame);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod assets;
pub mod entity;
mod error;
pub mod frame;
pub mod memory;
pub mod render;
pub mod tween;

pub use assets::{AnimationStrip, AssetProvider, SheetCell, SheetLayout, SpriteLibrary, SpriteSheet};
pub use entity::{
    AnimationPhase, AnimationState, Archetype, BoundingVolume, Brain, EntityHandle, EntityId,
    EntityState, FollowTarget, ForceAccumulator, Inert, Lifecycle, Orientation, PoolId,
    TileResponse, TransformCache,
};
pub use error::{CoreError, CoreResult};
pub use frame::{FrameContext, ReferenceTable};
pub use memory::{EntityPool, Recycling, RenderStats, UpdateStats};
pub use render::{BlendMode, DrawCommand, RecordingDevice, RenderDevice};
pub use tween::{Interpolant, TweenMode};
