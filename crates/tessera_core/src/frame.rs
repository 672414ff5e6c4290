//! # Frame Context
//!
//! Everything an update or render pass reads but does not own: the frame
//! delta, the camera, the collision grid, the asset provider and the
//! snapshot of cross-pool entity positions.

use std::collections::HashMap;

use tessera_shared::{Camera, Vec3};
use tessera_tilemap::TileGrid;

use crate::assets::AssetProvider;
use crate::entity::EntityHandle;

/// Positions of referenced entities, captured before the update pass.
///
/// Followers and AI targets in *other* pools are resolved here, so no pool
/// is borrowed while another one mutates. Entities missing from the table
/// are dead or were never referenced.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    positions: HashMap<EntityHandle, Vec3>,
}

impl ReferenceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the position of a live entity.
    pub fn insert(&mut self, handle: EntityHandle, position: Vec3) {
        self.positions.insert(handle, position);
    }

    /// Position of `handle`, if it was alive when the snapshot was taken.
    #[must_use]
    pub fn position(&self, handle: EntityHandle) -> Option<Vec3> {
        self.positions.get(&handle).copied()
    }

    /// Forgets every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Read-only inputs of one frame.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Camera used for parallax and culling.
    pub camera: Camera,
    /// Static collision grid.
    pub grid: &'a TileGrid,
    /// Sprite and animation lookup.
    pub assets: &'a dyn AssetProvider,
    /// Cross-pool reference snapshot.
    pub references: &'a ReferenceTable,
}

impl<'a> FrameContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        dt: f32,
        camera: Camera,
        grid: &'a TileGrid,
        assets: &'a dyn AssetProvider,
        references: &'a ReferenceTable,
    ) -> Self {
        Self {
            dt,
            camera,
            grid,
            assets,
            references,
        }
    }

    /// Same context with a different delta.
    #[must_use]
    pub fn with_dt(self, dt: f32) -> Self {
        Self { dt, ..self }
    }
}
