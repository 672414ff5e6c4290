//! # Game Context
//!
//! Owns everything a game state needs for one level: one entity pool per
//! [`Kind`], the collision grid, the sprite library and the camera.
//!
//! ## Frame order
//!
//! ```text
//! update(dt)
//!   1. snapshot positions of every follow / AI target
//!   2. EntityPool::update_all for each kind, in Kind::ALL order
//! render(device)
//!   3. EntityPool::render_all (render_homogeneous for shared-sprite kinds)
//!   4. EntityPool::render_debug when debug boxes are enabled
//! ```

use tessera_core::{
    EntityHandle, EntityPool, EntityState, FrameContext, ReferenceTable, RenderDevice,
    RenderStats, SpriteLibrary, UpdateStats,
};
use tessera_shared::{Camera, Vec2, Vec3};
use tessera_tilemap::TileGrid;

use crate::archetype::{behavior, Kind};
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};

/// Pools, level and camera of a running game state.
pub struct GameContext {
    /// One pool per kind, indexed by `Kind as usize`.
    pools: Vec<EntityPool>,
    grid: TileGrid,
    sprites: SpriteLibrary,
    camera: Camera,
    /// Target positions captured at the start of `update`.
    references: ReferenceTable,
    /// Scratch list of targets, reused every frame.
    targets: Vec<EntityHandle>,
    debug_boxes: bool,
}

impl GameContext {
    /// Creates a context from already loaded assets.
    #[must_use]
    pub fn new(config: &GameConfig, grid: TileGrid, sprites: SpriteLibrary) -> Self {
        let pools = Kind::ALL
            .iter()
            .map(|&kind| {
                EntityPool::with_recycling(
                    kind.pool_id(),
                    config.pools.capacity(kind),
                    config.pools.recycling,
                    behavior(kind, &config.physics),
                )
            })
            .collect();

        tracing::info!(
            "Game context ready: grid {}x{}, {} sprites, pools {:?}",
            grid.width(),
            grid.height(),
            sprites.len(),
            Kind::ALL.map(|kind| config.pools.capacity(kind))
        );

        Self {
            pools,
            grid,
            sprites,
            camera: Camera::new(
                Vec2::new(config.camera.start_x, config.camera.start_y),
                config.camera.fov_x,
            ),
            references: ReferenceTable::new(),
            targets: Vec::new(),
            debug_boxes: config.debug.draw_boxes,
        }
    }

    /// Loads the configured level and sprite manifest, then creates the
    /// context.
    ///
    /// A missing or broken level degrades to the empty grid.
    ///
    /// # Errors
    ///
    /// Fails when the sprite manifest cannot be read or parsed.
    pub fn from_config(config: &GameConfig) -> GameResult<Self> {
        let grid = match &config.assets.level {
            Some(path) => TileGrid::load_or_empty(path),
            None => TileGrid::empty(),
        };
        let sprites = match &config.assets.sprites {
            Some(path) => SpriteLibrary::load(path)?,
            None => SpriteLibrary::new(),
        };
        Ok(Self::new(config, grid, sprites))
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Acquires an entity in the pool of `kind`.
    ///
    /// # Errors
    ///
    /// [`GameError::Core`] when the pool is exhausted.
    pub fn spawn(&mut self, kind: Kind, mesh: &str, sprite: &str) -> GameResult<EntityHandle> {
        let debug_boxes = self.debug_boxes;
        let pool = self.pool_mut(kind);
        let handle = pool.acquire(mesh, sprite)?;
        if let Some(entity) = pool.get_mut(handle.id) {
            entity.set_debug_draw(debug_boxes);
        }
        Ok(handle)
    }

    /// Releases an entity.
    ///
    /// # Errors
    ///
    /// [`GameError::Core`] when the handle is stale or names no pool.
    pub fn release(&mut self, handle: EntityHandle) -> GameResult<()> {
        let pool = self
            .pools
            .get_mut(usize::from(handle.pool.0))
            .ok_or(tessera_core::CoreError::StaleHandle(handle))?;
        pool.release(handle).map_err(GameError::from)
    }

    /// Releases every entity of every pool.
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.release_all();
        }
        self.references.clear();
    }

    /// Live entity behind a handle.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&EntityState> {
        self.pools
            .get(usize::from(handle.pool.0))
            .and_then(|pool| pool.get(handle.id))
    }

    /// Mutable live entity behind a handle.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut EntityState> {
        self.pools
            .get_mut(usize::from(handle.pool.0))
            .and_then(|pool| pool.get_mut(handle.id))
    }

    /// Position of a live entity.
    #[must_use]
    pub fn position_of(&self, handle: EntityHandle) -> Option<Vec3> {
        self.get(handle).map(EntityState::position)
    }

    /// Plays an animation on an entity.
    ///
    /// Returns `false` when the entity is gone or the animation is unknown.
    pub fn set_animation(
        &mut self,
        handle: EntityHandle,
        id: &str,
        frame_seconds: f32,
        looping: bool,
    ) -> bool {
        let Some(pool) = self.pools.get_mut(usize::from(handle.pool.0)) else {
            return false;
        };
        match pool.get_mut(handle.id) {
            Some(entity) => entity.set_animation(id, frame_seconds, looping, &self.sprites),
            None => false,
        }
    }

    /// True when both entities are alive and their collision boxes overlap.
    #[must_use]
    pub fn overlapping(&self, a: EntityHandle, b: EntityHandle) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }

    /// Pool of a kind.
    #[must_use]
    pub fn pool(&self, kind: Kind) -> &EntityPool {
        &self.pools[kind as usize]
    }

    /// Mutable pool of a kind.
    pub fn pool_mut(&mut self, kind: Kind) -> &mut EntityPool {
        &mut self.pools[kind as usize]
    }

    /// Live entities over all pools.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.pools.iter().map(EntityPool::live_count).sum()
    }

    // =========================================================================
    // WORLD
    // =========================================================================

    /// Collision grid of the level.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Sprite library.
    #[must_use]
    pub fn sprites(&self) -> &SpriteLibrary {
        &self.sprites
    }

    /// Camera.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Moves the camera.
    pub fn set_camera_position(&mut self, position: Vec2) {
        self.camera.position = position;
    }

    /// Enables or disables collision box outlines for every entity.
    pub fn set_debug_boxes(&mut self, enabled: bool) {
        self.debug_boxes = enabled;
        for pool in &mut self.pools {
            for (_, entity) in pool.iter_mut() {
                entity.set_debug_draw(enabled);
            }
        }
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Advances every pool by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> UpdateStats {
        self.snapshot_references();

        let frame = FrameContext::new(
            dt,
            self.camera,
            &self.grid,
            &self.sprites,
            &self.references,
        );

        let mut stats = UpdateStats::default();
        for pool in &mut self.pools {
            stats += pool.update_all(&frame);
        }
        stats
    }

    /// Records the positions of every entity named as a follow or AI target.
    fn snapshot_references(&mut self) {
        self.references.clear();
        self.targets.clear();

        for pool in &self.pools {
            for (_, entity) in pool.iter() {
                if let Some(follow) = entity.follow() {
                    self.targets.push(follow.target);
                }
                if let Some(target) = entity.brain().target {
                    self.targets.push(target);
                }
            }
        }

        for &target in &self.targets {
            let position = self
                .pools
                .get(usize::from(target.pool.0))
                .and_then(|pool| pool.position_of(target.id));
            if let Some(position) = position {
                self.references.insert(target, position);
            }
        }
    }

    /// Draws every pool, then the debug boxes when enabled.
    pub fn render(&mut self, device: &mut dyn RenderDevice) -> RenderStats {
        let frame = FrameContext::new(
            0.0,
            self.camera,
            &self.grid,
            &self.sprites,
            &self.references,
        );

        let mut stats = RenderStats::default();
        for (kind, pool) in Kind::ALL.into_iter().zip(self.pools.iter_mut()) {
            stats += if kind.shares_sprite() {
                pool.render_homogeneous(device, &frame)
            } else {
                pool.render_all(device, &frame)
            };
        }

        if self.debug_boxes {
            for pool in &mut self.pools {
                stats += pool.render_debug(device, &frame);
            }
        }
        stats
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("pools", &self.pools)
            .field("grid", &(self.grid.width(), self.grid.height()))
            .field("camera", &self.camera)
            .field("debug_boxes", &self.debug_boxes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::RecordingDevice;

    fn context() -> GameContext {
        let mut config = GameConfig::default();
        config.pools.enemy = 2;
        GameContext::new(&config, TileGrid::empty(), SpriteLibrary::new())
    }

    #[test]
    fn test_spawn_lands_in_kind_pool() {
        let mut ctx = context();
        let hero = ctx.spawn(Kind::Player, "quad", "hero").unwrap();
        let grunt = ctx.spawn(Kind::Enemy, "quad", "grunt").unwrap();

        assert_eq!(hero.pool, Kind::Player.pool_id());
        assert_eq!(grunt.pool, Kind::Enemy.pool_id());
        assert_eq!(ctx.pool(Kind::Enemy).live_count(), 1);
        assert_eq!(ctx.live_count(), 2);
    }

    #[test]
    fn test_exhausted_pool_is_an_error() {
        let mut ctx = context();
        ctx.spawn(Kind::Enemy, "", "").unwrap();
        ctx.spawn(Kind::Enemy, "", "").unwrap();
        assert!(matches!(
            ctx.spawn(Kind::Enemy, "", ""),
            Err(GameError::Core(tessera_core::CoreError::Exhausted { .. }))
        ));
    }

    #[test]
    fn test_snapshot_feeds_cross_pool_follow() {
        let mut ctx = context();
        let hero = ctx.spawn(Kind::Player, "quad", "hero").unwrap();
        let halo = ctx.spawn(Kind::Effect, "quad", "halo").unwrap();
        ctx.get_mut(halo)
            .unwrap()
            .set_follow(hero, Vec3::new(0.0, 1.0, 0.0));

        ctx.update(0.0);
        let hero_pos = ctx.position_of(hero).unwrap();
        assert_eq!(ctx.position_of(halo), Some(hero_pos + Vec3::new(0.0, 1.0, 0.0)));

        ctx.release(hero).unwrap();
        let stats = ctx.update(0.0);
        assert_eq!(stats.follows_dropped, 1);
        assert!(ctx.get(halo).unwrap().follow().is_none());
    }

    #[test]
    fn test_debug_boxes_follow_switch() {
        let mut ctx = context();
        ctx.spawn(Kind::Player, "quad", "hero").unwrap();

        let mut device = RecordingDevice::new();
        assert_eq!(ctx.render(&mut device).draw_calls, 1);

        ctx.set_debug_boxes(true);
        device.clear();
        let stats = ctx.render(&mut device);
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(device.quad_count(), 1);
    }

    #[test]
    fn test_release_unknown_pool_is_stale() {
        let mut ctx = context();
        let hero = ctx.spawn(Kind::Player, "", "").unwrap();
        let bogus = EntityHandle::new(tessera_core::PoolId(42), hero.id);
        assert!(ctx.release(bogus).is_err());
    }
}
