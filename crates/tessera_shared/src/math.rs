//! Mathematical types and the transform conventions of the engine.
//!
//! Vectors and matrices are `glam` types. Matrices are column-major and
//! act on column vectors (`m * v`), so a world matrix is `T * R * S`.
//!
//! ## Orthographic side view
//!
//! The camera looks down -Z at the XY plane. World Z is "depth into the
//! scene": it lifts sprites by half of it on screen and contributes a small
//! amount of render depth. The manual layer index dominates depth so that
//! two entities sharing a world Z are ordered by layer.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FOV_X, DEPTH_DIVISOR};

pub use glam::{EulerRot, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Side-view camera. Only the horizontal axis takes part in culling and
/// parallax.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Camera position in world units.
    pub position: Vec2,
    /// Horizontal half field of view, in world units.
    pub fov_x: f32,
}

impl Camera {
    /// Creates a camera at `position` with the given horizontal half field of view.
    #[must_use]
    pub const fn new(position: Vec2, fov_x: f32) -> Self {
        Self { position, fov_x }
    }

    /// Horizontal parallax displacement for an entity with the given factor.
    #[inline]
    #[must_use]
    pub fn parallax_offset(&self, parallax: f32) -> f32 {
        self.position.x * parallax
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::ZERO, DEFAULT_FOV_X)
    }
}

/// Builds a rotation from degrees, applying roll (Z), then pitch (X), then yaw (Y).
#[must_use]
pub fn rotation_from_degrees(roll: f32, yaw: f32, pitch: f32) -> Mat3 {
    Mat3::from_euler(
        EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Combines a rotation and a non-uniform scale. Scale is applied first.
#[inline]
#[must_use]
pub fn scale_rotation(rotation: Mat3, scale: Vec3) -> Mat3 {
    rotation * Mat3::from_diagonal(scale)
}

/// Composes a linear part and a translation into an affine 4x4 matrix.
#[inline]
#[must_use]
pub fn affine(linear: Mat3, translation: Vec3) -> Mat4 {
    Mat4::from_cols(
        linear.x_axis.extend(0.0),
        linear.y_axis.extend(0.0),
        linear.z_axis.extend(0.0),
        translation.extend(1.0),
    )
}

/// Projects a world position into the orthographic render space.
///
/// `x` is shifted by the camera parallax, `y` is lifted by half of the world
/// depth, and render depth is `z / 100 - layer`.
#[inline]
#[must_use]
pub fn ortho_translation(position: Vec3, parallax_offset: f32, layer: i32) -> Vec3 {
    Vec3::new(
        position.x + parallax_offset,
        position.y + position.z / 2.0,
        position.z / DEPTH_DIVISOR - layer as f32,
    )
}

/// Texture-space transform selecting one cell of a sprite sheet.
///
/// Scales unit texture coordinates down to one cell and offsets them to the
/// cell origin. Acts on homogeneous `(u, v, 1)` coordinates.
#[must_use]
pub fn sheet_cell_transform(columns: u32, rows: u32, start: Vec2) -> Mat3 {
    let columns = columns.max(1) as f32;
    let rows = rows.max(1) as f32;
    Mat3::from_cols(
        Vec3::new(1.0 / columns, 0.0, 0.0),
        Vec3::new(0.0, 1.0 / rows, 0.0),
        Vec3::new(start.x, start.y, 1.0),
    )
}
