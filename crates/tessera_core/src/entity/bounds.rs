//! Axis-aligned collision box expressed as a fraction of the sprite scale.

use tessera_shared::Vec3;

/// Collision box of an entity.
///
/// Per axis, `min_percent..max_percent` are fractions in `-1..1` of the
/// sprite half-size; the default `-1..1` covers the whole sprite. The
/// centre offset and half extent are derived from the percentages and the
/// current scale; the world centre is derived from the position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingVolume {
    min_percent: Vec3,
    max_percent: Vec3,
    center_offset: Vec3,
    half_extent: Vec3,
    center: Vec3,
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self {
            min_percent: Vec3::NEG_ONE,
            max_percent: Vec3::ONE,
            center_offset: Vec3::ZERO,
            half_extent: Vec3::ZERO,
            center: Vec3::ZERO,
        }
    }
}

impl BoundingVolume {
    /// Sets new percentages and re-derives everything.
    pub fn set_percentages(&mut self, min: Vec3, max: Vec3, scale: Vec3, position: Vec3) {
        self.min_percent = min;
        self.max_percent = max;
        self.rescale(scale, position);
    }

    /// Re-derives offset and extent from the stored percentages.
    pub fn rescale(&mut self, scale: Vec3, position: Vec3) {
        let span = self.max_percent - self.min_percent;
        self.center_offset = (self.min_percent + span * 0.5) * scale * 0.5;
        self.half_extent = span * scale * 0.25;
        self.update_center(position);
    }

    /// Moves the box with its entity.
    #[inline]
    pub fn update_center(&mut self, position: Vec3) {
        self.center = position + self.center_offset;
    }

    /// World centre.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Half size per axis.
    #[inline]
    #[must_use]
    pub fn half_extent(&self) -> Vec3 {
        self.half_extent
    }

    /// Offset of the centre from the entity position.
    #[inline]
    #[must_use]
    pub fn center_offset(&self) -> Vec3 {
        self.center_offset
    }

    /// Lower percentages.
    #[must_use]
    pub fn min_percent(&self) -> Vec3 {
        self.min_percent
    }

    /// Upper percentages.
    #[must_use]
    pub fn max_percent(&self) -> Vec3 {
        self.max_percent
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extent
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extent
    }

    /// True when the boxes overlap in X and Y. Depth is ignored.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let d = (self.center - other.center).abs();
        let r = self.half_extent.abs() + other.half_extent.abs();
        d.x < r.x && d.y < r.y
    }
}
