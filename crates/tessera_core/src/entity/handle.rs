//! # Entity Handles
//!
//! Entities are addressed by a slot index plus a generation counter. The
//! generation of a slot is bumped on every release, so a handle kept across
//! a release no longer matches and is detected as stale instead of
//! silently pointing at whatever was spawned into the slot next.

use std::fmt;

/// Identifier of an entity within one pool.
///
/// The ID is split into two parts:
/// - Lower 32 bits: slot index
/// - Upper 32 bits: generation of the slot when the entity was acquired
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from slot index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The slot generation (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Identifier of a pool inside a game context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub u16);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity address valid across pools: which pool, which slot, which generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    /// Owning pool.
    pub pool: PoolId,
    /// Slot and generation inside that pool.
    pub id: EntityId,
}

impl EntityHandle {
    /// Creates a handle.
    #[inline]
    #[must_use]
    pub const fn new(pool: PoolId, id: EntityId) -> Self {
        Self { pool, id }
    }

    /// Slot index inside the owning pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.id.index() as usize
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pool, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
    }

    #[test]
    fn test_generation_distinguishes_reuse() {
        let first = EntityId::new(3, 0);
        let reused = EntityId::new(3, 1);
        assert_ne!(first, reused);
        assert_eq!(first.index(), reused.index());
    }

    #[test]
    fn test_null_and_display() {
        assert!(EntityId::default().is_null());
        assert_eq!(EntityId::NULL.to_string(), "null");

        let handle = EntityHandle::new(PoolId(2), EntityId::new(7, 1));
        assert_eq!(handle.to_string(), "#2:7v1");
        assert_eq!(handle.index(), 7);
    }
}
