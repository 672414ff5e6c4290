//! # Entity Pool
//!
//! Fixed-size slot array for entities that are spawned and killed at a
//! high rate (projectiles, effects, enemies).

use std::ops::AddAssign;

use serde::Deserialize;
use tessera_shared::Vec3;

use crate::entity::{Archetype, EntityHandle, EntityId, EntityState, Lifecycle, PoolId};
use crate::error::{CoreError, CoreResult};
use crate::frame::FrameContext;
use crate::render::RenderDevice;

/// How released slots are found again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recycling {
    /// Linear probe from a rotating cursor. Iteration is bounded by the
    /// highest slot ever claimed.
    #[default]
    HighWaterMark,
    /// Stack of free slot indices. The iteration bound shrinks again when
    /// the top slots are released.
    FreeList,
}

/// Counters from one [`EntityPool::update_all`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Live entities updated.
    pub updated: usize,
    /// Entities released because their lifetime ran out or their
    /// archetype expired them.
    pub expired: usize,
    /// Follow targets found stale and dropped.
    pub follows_dropped: usize,
}

impl AddAssign for UpdateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.updated += rhs.updated;
        self.expired += rhs.expired;
        self.follows_dropped += rhs.follows_dropped;
    }
}

/// Counters from one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Quads or line strips drawn.
    pub draw_calls: usize,
    /// Texture binds issued.
    pub texture_binds: usize,
    /// Mesh binds issued.
    pub mesh_binds: usize,
    /// Blend/depth state refreshes.
    pub mode_changes: usize,
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, rhs: Self) {
        self.draw_calls += rhs.draw_calls;
        self.texture_binds += rhs.texture_binds;
        self.mesh_binds += rhs.mesh_binds;
        self.mode_changes += rhs.mode_changes;
    }
}

/// A pool of entity slots.
///
/// Capacity is fixed at construction. Acquisition either claims a dead slot
/// or fails with [`CoreError::Exhausted`]; it never grows or blocks.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Update and render run on the frame thread.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = EntityPool::new(PoolId(0), 512, Box::new(Inert));
///
/// let handle = pool.acquire("quad", "spark")?;
/// pool.get_mut(handle.id).unwrap().set_lifetime(0.5);
///
/// pool.update_all(&frame);
/// pool.render_all(&mut device, &frame);
/// ```
pub struct EntityPool {
    /// Pool identifier stamped into every handle.
    id: PoolId,
    /// The slots.
    slots: Box<[EntityState]>,
    /// Where the next probe starts.
    cursor: usize,
    /// Exclusive bound of slot indices ever claimed.
    high_water: usize,
    /// Number of live entities.
    live: usize,
    /// Slot search strategy.
    recycling: Recycling,
    /// Free slot indices, lowest on top. Only used with [`Recycling::FreeList`].
    free_list: Vec<u32>,
    /// Hooks shared by every entity in the pool.
    archetype: Box<dyn Archetype>,
}

impl EntityPool {
    /// Creates a pool using high-water-mark recycling.
    ///
    /// All slots are allocated upfront.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier stamped into handles
    /// * `capacity` - Maximum number of live entities
    /// * `archetype` - Behaviour hooks of the pool
    #[must_use]
    pub fn new(id: PoolId, capacity: usize, archetype: Box<dyn Archetype>) -> Self {
        Self::with_recycling(id, capacity, Recycling::HighWaterMark, archetype)
    }

    /// Creates a pool with an explicit recycling strategy.
    #[must_use]
    pub fn with_recycling(
        id: PoolId,
        capacity: usize,
        recycling: Recycling,
        archetype: Box<dyn Archetype>,
    ) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        let slots: Vec<EntityState> = (0..capacity).map(|i| EntityState::new(i as u32)).collect();

        let free_list = match recycling {
            Recycling::FreeList => (0..capacity as u32).rev().collect(),
            Recycling::HighWaterMark => Vec::new(),
        };

        Self {
            id,
            slots: slots.into_boxed_slice(),
            cursor: 0,
            high_water: 0,
            live: 0,
            recycling,
            free_list,
            archetype,
        }
    }

    /// Pool identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Exclusive bound of the slots visited by update and render.
    #[inline]
    #[must_use]
    pub const fn high_water_mark(&self) -> usize {
        self.high_water
    }

    /// Recycling strategy.
    #[inline]
    #[must_use]
    pub const fn recycling(&self) -> Recycling {
        self.recycling
    }

    /// Name of the pool's archetype.
    #[must_use]
    pub fn archetype_name(&self) -> &'static str {
        self.archetype.name()
    }

    // =========================================================================
    // ACQUIRE / RELEASE
    // =========================================================================

    /// Claims a dead slot for a new entity.
    ///
    /// The slot is reset, given its mesh and sprite, left without an
    /// animation and handed to the archetype's `init` hook.
    ///
    /// # Errors
    ///
    /// [`CoreError::Exhausted`] when every slot is alive.
    pub fn acquire(&mut self, mesh: &str, sprite: &str) -> CoreResult<EntityHandle> {
        let index = match self.recycling {
            Recycling::HighWaterMark => self.probe_free_slot(),
            Recycling::FreeList => self.free_list.pop().map(|i| i as usize),
        };

        let Some(index) = index else {
            tracing::warn!(
                "Pool {} ({}) out of slots: {} in use",
                self.id,
                self.archetype.name(),
                self.capacity()
            );
            return Err(CoreError::Exhausted {
                pool: self.id,
                capacity: self.capacity(),
            });
        };

        let slot = &mut self.slots[index];
        slot.spawn(mesh, sprite);
        self.archetype.init(slot);
        let id = slot.id();

        self.live += 1;
        self.high_water = self.high_water.max(index + 1);

        Ok(EntityHandle::new(self.id, id))
    }

    /// Linear probe from the cursor, wrapping once around the array.
    fn probe_free_slot(&mut self) -> Option<usize> {
        let capacity = self.slots.len();
        if capacity == 0 {
            return None;
        }

        let start = self.cursor;
        while self.slots[self.cursor].is_alive() {
            self.cursor = (self.cursor + 1) % capacity;
            if self.cursor == start {
                return None;
            }
        }
        Some(self.cursor)
    }

    /// Releases an entity. The slot is kept for the next `acquire`.
    ///
    /// # Errors
    ///
    /// [`CoreError::StaleHandle`] when the handle belongs to another pool
    /// or its entity was already released.
    pub fn release(&mut self, handle: EntityHandle) -> CoreResult<()> {
        if handle.pool != self.id || self.get(handle.id).is_none() {
            return Err(CoreError::StaleHandle(handle));
        }
        self.release_slot(handle.index());
        Ok(())
    }

    fn release_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        self.archetype.destroy(slot);
        slot.despawn();
        self.live -= 1;

        if self.recycling == Recycling::FreeList {
            self.free_list.push(index as u32);
            while self.high_water > 0 && !self.slots[self.high_water - 1].is_alive() {
                self.high_water -= 1;
            }
        }
    }

    /// Releases every live entity.
    pub fn release_all(&mut self) {
        for index in 0..self.high_water {
            if self.slots[index].is_alive() {
                let slot = &mut self.slots[index];
                self.archetype.destroy(slot);
                slot.despawn();
            }
        }

        self.live = 0;
        self.high_water = 0;
        if self.recycling == Recycling::FreeList {
            self.free_list.clear();
            self.free_list.extend((0..self.slots.len() as u32).rev());
        }
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Live entity with this exact id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.is_alive() && slot.generation() == id.generation())
    }

    /// Mutable live entity with this exact id.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityState> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.is_alive() && slot.generation() == id.generation())
    }

    /// True when `id` names a live entity of this pool.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Position of a live entity.
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        self.get(id).map(EntityState::position)
    }

    /// Iterates over live entities.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &EntityState)> {
        let pool = self.id;
        self.slots[..self.high_water]
            .iter()
            .filter(|slot| slot.is_alive())
            .map(move |slot| (EntityHandle::new(pool, slot.id()), slot))
    }

    /// Iterates mutably over live entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut EntityState)> {
        let pool = self.id;
        self.slots[..self.high_water]
            .iter_mut()
            .filter(|slot| slot.is_alive())
            .map(move |slot| (EntityHandle::new(pool, slot.id()), slot))
    }

    // =========================================================================
    // FRAME PASSES
    // =========================================================================

    /// Updates every live entity, then releases the ones that expired.
    ///
    /// Follow targets in this pool are resolved live; targets in other pools
    /// come from `frame.references`. A target that is gone is dropped and
    /// the follower integrates its own velocity from then on.
    pub fn update_all(&mut self, frame: &FrameContext<'_>) -> UpdateStats {
        let mut stats = UpdateStats::default();

        for index in 0..self.high_water {
            if !self.slots[index].is_alive() {
                continue;
            }

            let anchor = match self.slots[index].follow() {
                None => None,
                Some(follow) => {
                    let anchor = self.resolve(follow.target, frame);
                    if anchor.is_none() {
                        tracing::debug!(
                            "Entity {}:{} dropped stale follow target {}",
                            self.id,
                            self.slots[index].id(),
                            follow.target
                        );
                        self.slots[index].clear_follow();
                        stats.follows_dropped += 1;
                    }
                    anchor
                }
            };

            let slot = &mut self.slots[index];
            let mut lifecycle = slot.update(frame, anchor);
            if lifecycle == Lifecycle::Alive {
                lifecycle = self.archetype.update(slot, frame);
            }
            stats.updated += 1;

            if lifecycle == Lifecycle::Expired {
                self.release_slot(index);
                stats.expired += 1;
            }
        }

        stats
    }

    fn resolve(&self, target: EntityHandle, frame: &FrameContext<'_>) -> Option<Vec3> {
        if target.pool == self.id {
            self.position_of(target.id)
        } else {
            frame.references.position(target)
        }
    }

    /// Draws every live, visible entity, binding textures and meshes only
    /// when they differ from the previous entity's.
    ///
    /// The blend state is refreshed from the entity that triggers a mesh
    /// bind.
    pub fn render_all(
        &mut self,
        device: &mut dyn RenderDevice,
        frame: &FrameContext<'_>,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut last_sprite: Option<usize> = None;
        let mut last_mesh: Option<usize> = None;

        for index in 0..self.high_water {
            let slot = &self.slots[index];
            if !slot.is_alive() || !slot.is_visible(&frame.camera) {
                continue;
            }

            let sprite_changed = match last_sprite {
                Some(last) => self.slots[last].sprite() != slot.sprite(),
                None => true,
            };
            if sprite_changed {
                device.bind_texture(slot.sprite());
                stats.texture_binds += 1;
                last_sprite = Some(index);
            }

            let mesh_changed = match last_mesh {
                Some(last) => self.slots[last].mesh() != slot.mesh(),
                None => true,
            };
            if mesh_changed {
                device.bind_mesh(slot.mesh());
                slot.apply_render_mode(device);
                stats.mesh_binds += 1;
                stats.mode_changes += 1;
                last_mesh = Some(index);
            }

            self.slots[index].render(device, frame);
            stats.draw_calls += 1;
        }

        stats
    }

    /// Draws every live, visible entity with one texture and mesh bind.
    ///
    /// Only valid when every entity in the pool shares the same sprite and
    /// mesh; the first visible entity decides what is bound.
    pub fn render_homogeneous(
        &mut self,
        device: &mut dyn RenderDevice,
        frame: &FrameContext<'_>,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut bound = false;

        for slot in &mut self.slots[..self.high_water] {
            if !slot.is_alive() || !slot.is_visible(&frame.camera) {
                continue;
            }

            if !bound {
                device.bind_texture(slot.sprite());
                device.bind_mesh(slot.mesh());
                slot.apply_render_mode(device);
                stats.texture_binds += 1;
                stats.mesh_binds += 1;
                stats.mode_changes += 1;
                bound = true;
            }

            slot.render(device, frame);
            stats.draw_calls += 1;
        }

        stats
    }

    /// Outlines the collision box of every live entity with debug drawing
    /// enabled.
    pub fn render_debug(
        &mut self,
        device: &mut dyn RenderDevice,
        frame: &FrameContext<'_>,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        let mut started = false;

        for slot in &mut self.slots[..self.high_water] {
            if !slot.is_alive() || !slot.debug_draw() {
                continue;
            }

            if !started {
                device.begin_debug_boxes();
                stats.mode_changes += 1;
                started = true;
            }

            slot.render_debug(device, &frame.camera);
            stats.draw_calls += 1;
        }

        stats
    }
}

impl std::fmt::Debug for EntityPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityPool")
            .field("id", &self.id)
            .field("archetype", &self.archetype.name())
            .field("capacity", &self.capacity())
            .field("live", &self.live)
            .field("high_water", &self.high_water)
            .field("recycling", &self.recycling)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Inert;

    fn pool(capacity: usize) -> EntityPool {
        EntityPool::new(PoolId(0), capacity, Box::new(Inert))
    }

    #[test]
    fn test_pool_acquire_release() {
        let mut pool = pool(10);

        let h1 = pool.acquire("quad", "hero").unwrap();
        assert!(pool.get(h1.id).unwrap().is_alive());
        assert_eq!(pool.live_count(), 1);

        pool.release(h1).unwrap();
        assert!(pool.get(h1.id).is_none());
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_pool_full() {
        let mut pool = pool(2);

        let _ = pool.acquire("", "").unwrap();
        let _ = pool.acquire("", "").unwrap();
        assert!(matches!(
            pool.acquire("", ""),
            Err(CoreError::Exhausted { capacity: 2, .. })
        ));
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool = pool(1);

        let h1 = pool.acquire("", "").unwrap();
        pool.release(h1).unwrap();

        let h2 = pool.acquire("", "").unwrap();
        assert_eq!(h1.index(), h2.index()); // Same slot reused
        assert_ne!(h1.id, h2.id); // New generation
        assert!(matches!(pool.release(h1), Err(CoreError::StaleHandle(_))));
    }

    #[test]
    fn test_high_water_mark_never_shrinks() {
        let mut pool = pool(8);
        let handles: Vec<_> = (0..4).map(|_| pool.acquire("", "").unwrap()).collect();
        assert_eq!(pool.high_water_mark(), 4);

        pool.release(handles[3]).unwrap();
        assert_eq!(pool.high_water_mark(), 4);

        pool.release_all();
        assert_eq!(pool.high_water_mark(), 0);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_free_list_trims_bound() {
        let mut pool =
            EntityPool::with_recycling(PoolId(1), 8, Recycling::FreeList, Box::new(Inert));
        let handles: Vec<_> = (0..4).map(|_| pool.acquire("", "").unwrap()).collect();
        assert_eq!(handles[0].index(), 0);
        assert_eq!(handles[3].index(), 3);

        pool.release(handles[2]).unwrap();
        assert_eq!(pool.high_water_mark(), 4);

        pool.release(handles[3]).unwrap();
        assert_eq!(pool.high_water_mark(), 2);

        // Most recently released slot comes back first.
        let again = pool.acquire("", "").unwrap();
        assert_eq!(again.index(), 3);
        assert_eq!(pool.high_water_mark(), 4);
    }

    #[test]
    fn test_foreign_handle_is_stale() {
        let mut pool = pool(2);
        let h = pool.acquire("", "").unwrap();
        let foreign = EntityHandle::new(PoolId(9), h.id);
        assert!(matches!(pool.release(foreign), Err(CoreError::StaleHandle(_))));
    }

    #[test]
    fn test_zero_capacity_is_always_exhausted() {
        let mut pool = pool(0);
        assert!(pool.acquire("", "").is_err());
    }
}
