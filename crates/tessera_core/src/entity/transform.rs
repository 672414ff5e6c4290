//! # Transform Cache
//!
//! Two-tier memo for an entity's object-to-world matrix.
//!
//! ```text
//! tier 1: orientation + scale  ──►  linear = R · S      (costly)
//! tier 2: linear + translation ──►  affine 4x4          (cheap)
//! ```
//!
//! Tier 1 runs only when the orientation or the (flipped) scale differs
//! from the inputs of the previous call. Tier 2 runs when tier 1 ran or the
//! translation moved. Inputs are compared bit for bit, so a cached result
//! is exactly the matrix a fresh computation would produce.

use serde::{Deserialize, Serialize};
use tessera_shared::math::{affine, rotation_from_degrees, scale_rotation};
use tessera_shared::{Mat3, Mat4, Vec3};

/// Euler angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Rotation about X.
    pub pitch: f32,
    /// Rotation about Y.
    pub yaw: f32,
    /// Rotation about Z (the in-plane rotation of a sprite).
    pub roll: f32,
}

impl Orientation {
    /// Creates an orientation from pitch, yaw and roll in degrees.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    #[inline]
    fn key(self) -> [u32; 3] {
        [self.roll.to_bits(), self.yaw.to_bits(), self.pitch.to_bits()]
    }
}

#[inline]
fn vec_key(v: Vec3) -> [u32; 3] {
    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

/// Memoized `T · R · S` matrix.
#[derive(Clone, Debug, Default)]
pub struct TransformCache {
    orientation_key: Option<[u32; 3]>,
    scale_key: Option<[u32; 3]>,
    translation_key: Option<[u32; 3]>,
    rotation: Mat3,
    linear: Mat3,
    matrix: Mat4,
    linear_recomputes: u64,
    compositions: u64,
}

impl TransformCache {
    /// Creates an empty cache. The first lookup always computes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the matrix for these inputs, recomputing only stale tiers.
    pub fn recompute_if_stale(
        &mut self,
        orientation: Orientation,
        scale: Vec3,
        translation: Vec3,
    ) -> Mat4 {
        let mut linear_stale = false;

        let orientation_key = orientation.key();
        if self.orientation_key != Some(orientation_key) {
            self.rotation =
                rotation_from_degrees(orientation.roll, orientation.yaw, orientation.pitch);
            self.orientation_key = Some(orientation_key);
            linear_stale = true;
        }

        let scale_key = vec_key(scale);
        if self.scale_key != Some(scale_key) {
            self.scale_key = Some(scale_key);
            linear_stale = true;
        }

        if linear_stale {
            self.linear = scale_rotation(self.rotation, scale);
            self.linear_recomputes += 1;
        }

        let translation_key = vec_key(translation);
        if linear_stale || self.translation_key != Some(translation_key) {
            self.matrix = affine(self.linear, translation);
            self.translation_key = Some(translation_key);
            self.compositions += 1;
        }

        self.matrix
    }

    /// Last computed matrix, without checking inputs.
    #[inline]
    #[must_use]
    pub fn cached(&self) -> Mat4 {
        self.matrix
    }

    /// Forces the next lookup to recompute both tiers.
    pub fn invalidate(&mut self) {
        self.orientation_key = None;
        self.scale_key = None;
        self.translation_key = None;
    }

    /// Number of tier-1 (rotation and scale) recomputations so far.
    #[inline]
    #[must_use]
    pub fn linear_recomputes(&self) -> u64 {
        self.linear_recomputes
    }

    /// Number of tier-2 (translation) compositions so far.
    #[inline]
    #[must_use]
    pub fn compositions(&self) -> u64 {
        self.compositions
    }
}
