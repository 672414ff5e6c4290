//! Directional collision bitmask returned by the hotspot probe.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of sides that touched a collidable cell.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CollisionFlags(u8);

impl CollisionFlags {
    /// No contact.
    pub const NONE: Self = Self(0);
    /// Left side (`0001`).
    pub const LEFT: Self = Self(1 << 0);
    /// Right side (`0010`).
    pub const RIGHT: Self = Self(1 << 1);
    /// Top side (`0100`).
    pub const TOP: Self = Self(1 << 2);
    /// Bottom side (`1000`).
    pub const BOTTOM: Self = Self(1 << 3);

    /// Raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds flags from a raw pattern, discarding unknown bits.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// True when every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True when no side collided.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sets the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for CollisionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CollisionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for CollisionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::LEFT, "LEFT"),
            (Self::RIGHT, "RIGHT"),
            (Self::TOP, "TOP"),
            (Self::BOTTOM, "BOTTOM"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in names {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bits_match_side_order() {
        assert_eq!(CollisionFlags::LEFT.bits(), 0b0001);
        assert_eq!(CollisionFlags::RIGHT.bits(), 0b0010);
        assert_eq!(CollisionFlags::TOP.bits(), 0b0100);
        assert_eq!(CollisionFlags::BOTTOM.bits(), 0b1000);
    }

    #[test]
    fn test_contains_and_insert() {
        let mut flags = CollisionFlags::NONE;
        assert!(flags.is_empty());

        flags.insert(CollisionFlags::LEFT);
        flags |= CollisionFlags::BOTTOM;

        assert!(flags.contains(CollisionFlags::LEFT | CollisionFlags::BOTTOM));
        assert!(!flags.contains(CollisionFlags::TOP));
        assert!(flags.intersects(CollisionFlags::TOP | CollisionFlags::LEFT));
        assert_eq!(format!("{flags:?}"), "{LEFT, BOTTOM}");
    }
}
