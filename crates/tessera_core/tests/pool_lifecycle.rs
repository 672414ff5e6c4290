//! # Pool Lifecycle Tests
//!
//! Acquire/release bookkeeping, lifetime expiry, follow resolution and the
//! batched render passes of [`EntityPool`].
//!
//! Run with: cargo test -p tessera_core --test pool_lifecycle

use std::cell::Cell;
use std::rc::Rc;

use tessera_core::{
    Archetype, CoreError, DrawCommand, EntityPool, EntityState, FrameContext, Inert, Lifecycle,
    PoolId, RecordingDevice, Recycling, ReferenceTable, SpriteLibrary,
};
use tessera_shared::{Camera, Vec3};
use tessera_tilemap::TileGrid;

fn pool(capacity: usize) -> EntityPool {
    EntityPool::new(PoolId(0), capacity, Box::new(Inert))
}

// ============================================================================
// ACQUIRE / RELEASE
// ============================================================================

#[test]
fn verify_alive_between_acquire_and_release() {
    let mut pool = pool(4);

    let handle = pool.acquire("quad", "hero").unwrap();
    let entity = pool.get(handle.id).unwrap();
    assert!(entity.is_alive());
    assert_eq!(entity.sprite(), "hero");
    assert_eq!(entity.mesh(), "quad");
    assert_eq!(entity.animation().current(), "");

    pool.release(handle).unwrap();
    assert!(!pool.contains(handle.id));
    assert_eq!(pool.live_count(), 0);
}

#[test]
fn verify_released_slot_comes_back_when_cursor_wraps() {
    let mut pool = pool(3);
    let first = pool.acquire("", "").unwrap();
    let _second = pool.acquire("", "").unwrap();
    let _third = pool.acquire("", "").unwrap();

    pool.release(first).unwrap();

    let again = pool.acquire("", "").unwrap();
    assert_eq!(again.index(), first.index());
    assert_ne!(again.id.generation(), first.id.generation());
    assert!(pool.get(first.id).is_none());
    assert!(pool.get(again.id).is_some());
}

#[test]
fn verify_exactly_one_failure_past_capacity() {
    let capacity = 16;
    let mut pool = pool(capacity);

    let results: Vec<_> = (0..=capacity).map(|_| pool.acquire("", "")).collect();

    let failures: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        results.last(),
        Some(Err(CoreError::Exhausted { capacity: 16, .. }))
    ));
    assert_eq!(pool.live_count(), capacity);
}

#[test]
fn verify_free_list_reuses_latest_release() {
    let mut pool = EntityPool::with_recycling(PoolId(3), 4, Recycling::FreeList, Box::new(Inert));
    let handles: Vec<_> = (0..3).map(|_| pool.acquire("", "").unwrap()).collect();
    assert_eq!(
        handles.iter().map(|h| h.index()).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    pool.release(handles[1]).unwrap();
    let again = pool.acquire("", "").unwrap();
    assert_eq!(again.index(), 1);
    assert_eq!(again.pool, PoolId(3));
}

#[test]
fn verify_double_release_is_stale() {
    let mut pool = pool(2);
    let handle = pool.acquire("", "").unwrap();
    pool.release(handle).unwrap();

    assert!(matches!(pool.release(handle), Err(CoreError::StaleHandle(h)) if h == handle));
}

// ============================================================================
// UPDATE PASS
// ============================================================================

#[test]
fn verify_lifetime_releases_entity() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(0.5, Camera::default(), &grid, &assets, &refs);

    let mut pool = pool(4);
    let spark = pool.acquire("quad", "spark").unwrap();
    pool.get_mut(spark.id).unwrap().set_lifetime(2.0);
    let keeper = pool.acquire("quad", "spark").unwrap();

    for _ in 0..3 {
        let stats = pool.update_all(&frame);
        assert_eq!(stats.expired, 0);
    }

    let stats = pool.update_all(&frame);
    assert_eq!(stats.updated, 2);
    assert_eq!(stats.expired, 1);
    assert!(!pool.contains(spark.id));
    assert!(pool.contains(keeper.id));
}

#[test]
fn verify_lifetime_expires_by_boundary_for_inexact_deltas() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();

    for dt in [1.0_f32 / 60.0, 1.0 / 30.0, 0.05, 0.1] {
        for duration in [0.5_f32, 1.0, 2.0, 3.0] {
            let frame = FrameContext::new(dt, Camera::default(), &grid, &assets, &refs);
            let mut pool = pool(1);
            let spark = pool.acquire("quad", "spark").unwrap();
            pool.get_mut(spark.id).unwrap().set_lifetime(duration);

            let bound = (f64::from(duration) / f64::from(dt)).ceil() as usize;
            let mut updates = 0;
            while pool.contains(spark.id) && updates < bound {
                pool.update_all(&frame);
                updates += 1;
            }

            assert!(
                !pool.contains(spark.id),
                "lifetime {duration} still alive after {bound} updates of {dt}"
            );
            assert!(
                updates + 1 >= bound,
                "lifetime {duration} expired after {updates} of {bound} updates of {dt}"
            );
        }
    }
}

#[test]
fn verify_stale_follow_is_dropped() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(1.0, Camera::default(), &grid, &assets, &refs);

    let mut pool = pool(4);
    let leader = pool.acquire("", "").unwrap();
    let follower = pool.acquire("", "").unwrap();
    {
        let f = pool.get_mut(follower.id).unwrap();
        f.set_follow(leader, Vec3::new(0.0, 1.0, 0.0));
        f.set_velocity(Vec3::new(1.0, 0.0, 0.0));
    }
    pool.get_mut(leader.id)
        .unwrap()
        .set_position(Vec3::new(5.0, 0.0, 0.0));

    pool.update_all(&frame);
    assert_eq!(pool.position_of(follower.id), Some(Vec3::new(5.0, 1.0, 0.0)));

    pool.release(leader).unwrap();
    let stats = pool.update_all(&frame);

    assert_eq!(stats.follows_dropped, 1);
    let f = pool.get(follower.id).unwrap();
    assert!(f.follow().is_none());
    assert_eq!(f.position(), Vec3::new(6.0, 1.0, 0.0));
}

#[test]
fn verify_cross_pool_follow_uses_snapshot() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();

    let mut heroes = EntityPool::new(PoolId(0), 2, Box::new(Inert));
    let mut effects = EntityPool::new(PoolId(1), 2, Box::new(Inert));

    let hero = heroes.acquire("", "").unwrap();
    heroes
        .get_mut(hero.id)
        .unwrap()
        .set_position(Vec3::new(2.0, 3.0, 0.0));

    let halo = effects.acquire("", "").unwrap();
    effects
        .get_mut(halo.id)
        .unwrap()
        .set_follow(hero, Vec3::new(0.0, 0.5, 0.0));

    let mut refs = ReferenceTable::new();
    refs.insert(hero, heroes.position_of(hero.id).unwrap());
    let frame = FrameContext::new(0.1, Camera::default(), &grid, &assets, &refs);

    let stats = effects.update_all(&frame);
    assert_eq!(stats.follows_dropped, 0);
    assert_eq!(effects.position_of(halo.id), Some(Vec3::new(2.0, 3.5, 0.0)));
}

/// Counts hook calls and expires every entity on its first update.
struct Counting {
    inits: Rc<Cell<usize>>,
    destroys: Rc<Cell<usize>>,
}

impl Archetype for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn init(&self, entity: &mut EntityState) {
        self.inits.set(self.inits.get() + 1);
        entity.set_velocity(Vec3::X);
    }

    fn update(&self, _entity: &mut EntityState, _frame: &FrameContext<'_>) -> Lifecycle {
        Lifecycle::Expired
    }

    fn destroy(&self, _entity: &mut EntityState) {
        self.destroys.set(self.destroys.get() + 1);
    }
}

#[test]
fn verify_archetype_hooks_run_at_lifecycle_points() {
    let inits = Rc::new(Cell::new(0));
    let destroys = Rc::new(Cell::new(0));
    let mut pool = EntityPool::new(
        PoolId(2),
        4,
        Box::new(Counting {
            inits: Rc::clone(&inits),
            destroys: Rc::clone(&destroys),
        }),
    );
    assert_eq!(pool.archetype_name(), "counting");

    let a = pool.acquire("", "").unwrap();
    let _b = pool.acquire("", "").unwrap();
    assert_eq!(inits.get(), 2);
    assert_eq!(pool.get(a.id).unwrap().velocity(), Vec3::X);

    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(0.1, Camera::default(), &grid, &assets, &refs);

    let stats = pool.update_all(&frame);
    assert_eq!(stats.expired, 2);
    assert_eq!(destroys.get(), 2);
    assert_eq!(pool.live_count(), 0);
}

// ============================================================================
// RENDER PASSES
// ============================================================================

#[test]
fn verify_render_binds_only_on_change() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(0.0, Camera::default(), &grid, &assets, &refs);

    let mut pool = pool(8);
    pool.acquire("quad", "a").unwrap();
    pool.acquire("quad", "a").unwrap();
    pool.acquire("quad", "b").unwrap();
    let hidden = pool.acquire("quad", "c").unwrap();
    pool.get_mut(hidden.id).unwrap().set_visible(false);

    let mut device = RecordingDevice::new();
    let stats = pool.render_all(&mut device, &frame);

    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.texture_binds, 2);
    assert_eq!(stats.mesh_binds, 1);
    assert_eq!(device.quad_count(), 3);
    assert_eq!(device.texture_binds(), 2);
    assert_eq!(device.mesh_binds(), 1);
    assert_eq!(
        device.commands()[0],
        DrawCommand::BindTexture("a".to_owned())
    );
}

#[test]
fn verify_homogeneous_render_binds_once() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(0.0, Camera::default(), &grid, &assets, &refs);

    let mut pool = pool(8);
    for _ in 0..5 {
        pool.acquire("quad", "spark").unwrap();
    }

    let mut device = RecordingDevice::new();
    let stats = pool.render_homogeneous(&mut device, &frame);

    assert_eq!(stats.draw_calls, 5);
    assert_eq!(device.texture_binds(), 1);
    assert_eq!(device.mesh_binds(), 1);
    assert_eq!(device.quad_count(), 5);
}

#[test]
fn verify_debug_pass_draws_flagged_entities_only() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(0.0, Camera::default(), &grid, &assets, &refs);

    let mut pool = pool(4);
    let boxed = pool.acquire("quad", "a").unwrap();
    pool.acquire("quad", "a").unwrap();
    pool.get_mut(boxed.id).unwrap().set_debug_draw(true);

    let mut device = RecordingDevice::new();
    let stats = pool.render_debug(&mut device, &frame);

    assert_eq!(stats.draw_calls, 1);
    assert_eq!(device.count(|c| matches!(c, DrawCommand::DebugBoxes)), 1);
    assert_eq!(device.count(|c| matches!(c, DrawCommand::LineStrip(4))), 1);
    assert_eq!(device.quad_count(), 0);
}

#[test]
fn verify_empty_pool_renders_nothing() {
    let grid = TileGrid::empty();
    let assets = SpriteLibrary::new();
    let refs = ReferenceTable::new();
    let frame = FrameContext::new(0.0, Camera::default(), &grid, &assets, &refs);

    let mut pool = pool(4);
    let mut device = RecordingDevice::new();

    assert_eq!(pool.render_all(&mut device, &frame).draw_calls, 0);
    assert_eq!(pool.render_debug(&mut device, &frame).mode_changes, 0);
    assert!(device.commands().is_empty());
}
