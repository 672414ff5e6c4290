//! # Archetypes
//!
//! The closed set of entity kinds a game context pools, and the behaviour
//! attached to each pool.
//!
//! | Kind | Tile response | Behaviour |
//! |---|---|---|
//! | Player | snap | gravity |
//! | Enemy | snap | gravity, Idle/Chase toward its target |
//! | Projectile | probe | expires on any wall contact |
//! | Effect | none | additive, fades out over its lifetime |

use tessera_core::{Archetype, EntityState, FrameContext, Lifecycle, PoolId, TileResponse};
use tessera_shared::Argb;

use crate::config::PhysicsConfig;

// ============================================================================
// KINDS
// ============================================================================

/// Entity kind. Each kind owns one pool; the pool id is the kind's index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Player-controlled character.
    Player,
    /// Hostile character.
    Enemy,
    /// Short-lived moving hazard.
    Projectile,
    /// Purely visual particle.
    Effect,
}

impl Kind {
    /// Every kind, in pool order.
    pub const ALL: [Kind; 4] = [Kind::Player, Kind::Enemy, Kind::Projectile, Kind::Effect];

    /// Pool holding entities of this kind.
    #[inline]
    #[must_use]
    pub const fn pool_id(self) -> PoolId {
        PoolId(self as u16)
    }

    /// Kind stored in a pool.
    #[must_use]
    pub fn from_pool(pool: PoolId) -> Option<Self> {
        Self::ALL.get(usize::from(pool.0)).copied()
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Player => "player",
            Kind::Enemy => "enemy",
            Kind::Projectile => "projectile",
            Kind::Effect => "effect",
        }
    }

    /// True when every entity of the kind is expected to share one sprite
    /// and mesh, so the pool can render with a single bind.
    #[must_use]
    pub const fn shares_sprite(self) -> bool {
        matches!(self, Kind::Projectile)
    }
}

/// Builds the behaviour of a kind's pool.
#[must_use]
pub fn behavior(kind: Kind, physics: &PhysicsConfig) -> Box<dyn Archetype> {
    match kind {
        Kind::Player => Box::new(Player {
            gravity: physics.gravity,
            terminal_velocity: physics.terminal_velocity,
        }),
        Kind::Enemy => Box::new(Enemy {
            gravity: physics.gravity,
            terminal_velocity: physics.terminal_velocity,
            speed: physics.enemy_speed,
            detection_range: physics.detection_range,
        }),
        Kind::Projectile => Box::new(Projectile),
        Kind::Effect => Box::new(Effect),
    }
}

/// Gravity applies every frame, grounded or not; the floor snap cancels it.
fn fall(entity: &mut EntityState, dt: f32, gravity: f32, terminal_velocity: f32) {
    let mut velocity = entity.velocity();
    velocity.y = (velocity.y - gravity * dt).max(-terminal_velocity);
    entity.set_velocity(velocity);
}

// ============================================================================
// PLAYER
// ============================================================================

struct Player {
    gravity: f32,
    terminal_velocity: f32,
}

impl Archetype for Player {
    fn name(&self) -> &'static str {
        Kind::Player.name()
    }

    fn init(&self, entity: &mut EntityState) {
        entity.set_tile_collision(true, TileResponse::Snap);
    }

    fn update(&self, entity: &mut EntityState, frame: &FrameContext<'_>) -> Lifecycle {
        fall(entity, frame.dt, self.gravity, self.terminal_velocity);
        Lifecycle::Alive
    }
}

// ============================================================================
// ENEMY
// ============================================================================

/// Brain state: standing still.
pub const ENEMY_IDLE: u8 = 0;
/// Brain state: walking toward the target.
pub const ENEMY_CHASE: u8 = 1;

struct Enemy {
    gravity: f32,
    terminal_velocity: f32,
    speed: f32,
    detection_range: f32,
}

impl Archetype for Enemy {
    fn name(&self) -> &'static str {
        Kind::Enemy.name()
    }

    fn init(&self, entity: &mut EntityState) {
        entity.set_tile_collision(true, TileResponse::Snap);
        entity.brain_mut().transition(ENEMY_IDLE);
    }

    fn update(&self, entity: &mut EntityState, frame: &FrameContext<'_>) -> Lifecycle {
        let target = entity.brain().target;
        let target_position = target.and_then(|handle| frame.references.position(handle));
        if target.is_some() && target_position.is_none() {
            entity.set_target(None);
        }

        let dx = target_position.map(|p| p.x - entity.position().x);
        let next = match dx {
            Some(dx) if dx.abs() <= self.detection_range => ENEMY_CHASE,
            _ => ENEMY_IDLE,
        };

        let brain = entity.brain_mut();
        if brain.state == next {
            brain.timer += frame.dt;
        } else {
            brain.transition(next);
        }

        let mut velocity = entity.velocity();
        velocity.x = match dx {
            Some(dx) if next == ENEMY_CHASE && dx != 0.0 => dx.signum() * self.speed,
            _ => 0.0,
        };
        entity.set_velocity(velocity);
        if velocity.x != 0.0 {
            entity.set_flip_horizontal(velocity.x < 0.0);
        }

        fall(entity, frame.dt, self.gravity, self.terminal_velocity);
        Lifecycle::Alive
    }
}

// ============================================================================
// PROJECTILE
// ============================================================================

struct Projectile;

impl Archetype for Projectile {
    fn name(&self) -> &'static str {
        Kind::Projectile.name()
    }

    fn init(&self, entity: &mut EntityState) {
        entity.set_tile_collision(true, TileResponse::Probe);
    }

    fn update(&self, entity: &mut EntityState, _frame: &FrameContext<'_>) -> Lifecycle {
        if entity.tile_flags().is_empty() {
            Lifecycle::Alive
        } else {
            Lifecycle::Expired
        }
    }
}

// ============================================================================
// EFFECT
// ============================================================================

struct Effect;

impl Archetype for Effect {
    fn name(&self) -> &'static str {
        Kind::Effect.name()
    }

    fn init(&self, entity: &mut EntityState) {
        entity.set_additive_blend(true);
        entity.set_depth_write(false);
    }

    fn update(&self, entity: &mut EntityState, _frame: &FrameContext<'_>) -> Lifecycle {
        let alpha = ((1.0 - entity.lifetime_fraction()) * 255.0).round() as u8;
        entity.set_color(Some(Argb::WHITE.with_alpha(alpha)));
        Lifecycle::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{EntityHandle, EntityId, EntityPool, ReferenceTable, SpriteLibrary};
    use tessera_shared::{Camera, Vec3};
    use tessera_tilemap::TileGrid;

    fn pool(kind: Kind) -> EntityPool {
        EntityPool::new(kind.pool_id(), 4, behavior(kind, &PhysicsConfig::default()))
    }

    #[test]
    fn test_kind_pool_roundtrip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_pool(kind.pool_id()), Some(kind));
        }
        assert_eq!(Kind::from_pool(PoolId(9)), None);
    }

    #[test]
    fn test_enemy_chases_target_in_range() {
        let grid = TileGrid::empty();
        let assets = SpriteLibrary::new();
        let player = EntityHandle::new(Kind::Player.pool_id(), EntityId::new(0, 0));
        let mut refs = ReferenceTable::new();
        refs.insert(player, Vec3::new(-3.0, 0.0, 0.0));
        let frame = FrameContext::new(0.1, Camera::default(), &grid, &assets, &refs);

        let mut enemies = pool(Kind::Enemy);
        let enemy = enemies.acquire("quad", "grunt").unwrap();
        enemies.get_mut(enemy.id).unwrap().set_target(Some(player));

        enemies.update_all(&frame);

        let e = enemies.get(enemy.id).unwrap();
        assert_eq!(e.brain().state, ENEMY_CHASE);
        assert_eq!(e.velocity().x, -2.0);
        assert!(e.animation().flip_horizontal());
    }

    #[test]
    fn test_enemy_forgets_released_target() {
        let grid = TileGrid::empty();
        let assets = SpriteLibrary::new();
        let refs = ReferenceTable::new();
        let frame = FrameContext::new(0.1, Camera::default(), &grid, &assets, &refs);

        let mut enemies = pool(Kind::Enemy);
        let enemy = enemies.acquire("quad", "grunt").unwrap();
        let gone = EntityHandle::new(Kind::Player.pool_id(), EntityId::new(0, 3));
        enemies.get_mut(enemy.id).unwrap().set_target(Some(gone));

        enemies.update_all(&frame);

        let e = enemies.get(enemy.id).unwrap();
        assert_eq!(e.brain().target, None);
        assert_eq!(e.brain().state, ENEMY_IDLE);
        assert_eq!(e.velocity().x, 0.0);
    }

    #[test]
    fn test_projectile_expires_on_wall() {
        let grid = TileGrid::from_codes(3, 1, vec![0, 0, 1]).unwrap();
        let assets = SpriteLibrary::new();
        let refs = ReferenceTable::new();
        let frame = FrameContext::new(0.1, Camera::default(), &grid, &assets, &refs);

        let mut shots = pool(Kind::Projectile);
        let shot = shots.acquire("quad", "bolt").unwrap();
        {
            let s = shots.get_mut(shot.id).unwrap();
            s.set_position(Vec3::new(0.5, 0.5, 0.0));
            s.set_velocity(Vec3::new(10.0, 0.0, 0.0));
        }

        // x = 1.5: right hotspot at 2.0 hits the wall column.
        let stats = shots.update_all(&frame);
        assert_eq!(stats.expired, 1);
        assert!(!shots.contains(shot.id));
    }

    #[test]
    fn test_effect_fades_with_lifetime() {
        let grid = TileGrid::empty();
        let assets = SpriteLibrary::new();
        let refs = ReferenceTable::new();
        let frame = FrameContext::new(0.5, Camera::default(), &grid, &assets, &refs);

        let mut effects = pool(Kind::Effect);
        let spark = effects.acquire("quad", "spark").unwrap();
        effects.get_mut(spark.id).unwrap().set_lifetime(1.0);
        assert!(effects.get(spark.id).unwrap().is_additive());

        effects.update_all(&frame);
        let color = effects.get(spark.id).unwrap().color().unwrap();
        assert_eq!(color.alpha(), 128);

        effects.update_all(&frame);
        assert!(!effects.contains(spark.id));
    }

    #[test]
    fn test_player_lands_and_stays_grounded() {
        #[rustfmt::skip]
        let grid = TileGrid::from_codes(3, 3, vec![
            1, 1, 1,
            0, 0, 0,
            0, 0, 0,
        ]).unwrap();
        let assets = SpriteLibrary::new();
        let refs = ReferenceTable::new();
        let frame = FrameContext::new(1.0 / 60.0, Camera::default(), &grid, &assets, &refs);

        let mut players = pool(Kind::Player);
        let hero = players.acquire("quad", "hero").unwrap();
        players
            .get_mut(hero.id)
            .unwrap()
            .set_position(Vec3::new(1.5, 2.0, 0.0));

        for _ in 0..120 {
            players.update_all(&frame);
        }

        let h = players.get(hero.id).unwrap();
        assert!(h.is_on_ground());
        assert_eq!(h.position().y, 1.5);
    }
}
