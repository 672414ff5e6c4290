//! # Collision Grid
//!
//! Immutable after load. Holds the raw cell codes of a level and a derived
//! binary array (collidable = 1) of the same shape.

use std::path::Path;

use crate::document::LevelDocument;
use crate::error::{TileMapError, TileMapResult};
use crate::flags::CollisionFlags;

/// Static tile collision grid.
///
/// An empty grid (0x0) is the "not loaded" state: every query answers as
/// if the cell were empty, so entities simply never collide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileGrid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Raw cell codes as read from the level.
    codes: Box<[u8]>,
    /// 1 where the code is non-zero, 0 elsewhere.
    collision: Box<[u8]>,
}

impl TileGrid {
    /// Creates the empty grid. Every query returns 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a grid from row-major codes.
    ///
    /// # Errors
    ///
    /// Fails when a dimension is zero, a dimension does not fit the `i32`
    /// cell coordinates, `width * height` overflows, or
    /// `codes.len() != width * height`.
    pub fn from_codes(width: usize, height: usize, codes: Vec<u8>) -> TileMapResult<Self> {
        let addressable = |n: usize| n != 0 && i32::try_from(n).is_ok();
        let expected = (addressable(width) && addressable(height))
            .then(|| width.checked_mul(height))
            .flatten()
            .ok_or(TileMapError::InvalidDimensions {
                width: i64::try_from(width).unwrap_or(i64::MAX),
                height: i64::try_from(height).unwrap_or(i64::MAX),
            })?;

        if codes.len() != expected {
            return Err(TileMapError::CellCountMismatch {
                expected,
                found: codes.len(),
            });
        }

        let collision: Box<[u8]> = codes.iter().map(|&code| u8::from(code != 0)).collect();

        Ok(Self {
            width,
            height,
            codes: codes.into_boxed_slice(),
            collision,
        })
    }

    /// Parses a TOML level document.
    ///
    /// # Errors
    ///
    /// Any structural problem in the document, see [`TileMapError`].
    pub fn from_toml_str(text: &str) -> TileMapResult<Self> {
        let doc = LevelDocument::from_toml_str(text)?;
        let (width, height) = doc.dimensions()?;
        Self::from_codes(width, height, doc.cell_codes()?)
    }

    /// Reads and parses a level file.
    ///
    /// # Errors
    ///
    /// [`TileMapError::Io`] when the file cannot be read, otherwise as
    /// [`TileGrid::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> TileMapResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TileMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grid = Self::from_toml_str(&text)?;
        tracing::info!(
            "Loaded collision grid {}x{} from {}",
            grid.width,
            grid.height,
            path.display()
        );
        Ok(grid)
    }

    /// Loads a level, degrading to the empty grid on failure.
    ///
    /// The failure is logged; collision queries afterwards report nothing.
    #[must_use]
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(grid) => grid,
            Err(err) => {
                tracing::error!("Collision grid {} unavailable: {}", path.display(), err);
                Self::empty()
            }
        }
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// False for the empty grid.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    /// Raw codes, row-major.
    #[must_use]
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    /// Binary collision array, row-major.
    #[must_use]
    pub fn collision(&self) -> &[u8] {
        &self.collision
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| x + y * self.width)
    }

    /// Binary collision value of cell `(x, y)`; 0 outside the grid.
    #[inline]
    #[must_use]
    pub fn cell_value(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.collision[i])
    }

    /// Raw code of cell `(x, y)`; 0 outside the grid.
    #[inline]
    #[must_use]
    pub fn cell_code(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.codes[i])
    }

    /// Binary collision value of the cell containing a world point; 0 for
    /// a non-finite coordinate.
    #[inline]
    #[must_use]
    pub fn value_at(&self, x: f32, y: f32) -> u8 {
        match (cell_of(x), cell_of(y)) {
            (Some(x), Some(y)) => self.cell_value(x, y),
            _ => 0,
        }
    }

    /// Probes the eight side hotspots of a box centred on `(pos_x, pos_y)`.
    ///
    /// Each side is sampled twice, at a quarter of the box extent either side
    /// of the side's midpoint. A side's bit is set if either sample lands on
    /// a collidable cell. The box is assumed to be about one cell in size.
    #[must_use]
    pub fn probe(&self, pos_x: f32, pos_y: f32, extent_x: f32, extent_y: f32) -> CollisionFlags {
        let half_x = extent_x / 2.0;
        let half_y = extent_y / 2.0;
        let quarter_x = extent_x / 4.0;
        let quarter_y = extent_y / 4.0;

        let mut flags = CollisionFlags::NONE;

        if self.value_at(pos_x + half_x, pos_y + quarter_y) != 0
            || self.value_at(pos_x + half_x, pos_y - quarter_y) != 0
        {
            flags |= CollisionFlags::RIGHT;
        }

        if self.value_at(pos_x + quarter_x, pos_y - half_y) != 0
            || self.value_at(pos_x - quarter_x, pos_y - half_y) != 0
        {
            flags |= CollisionFlags::BOTTOM;
        }

        if self.value_at(pos_x - half_x, pos_y + quarter_y) != 0
            || self.value_at(pos_x - half_x, pos_y - quarter_y) != 0
        {
            flags |= CollisionFlags::LEFT;
        }

        if self.value_at(pos_x + quarter_x, pos_y + half_y) != 0
            || self.value_at(pos_x - quarter_x, pos_y + half_y) != 0
        {
            flags |= CollisionFlags::TOP;
        }

        flags
    }

    /// Moves a coordinate to the centre of the cell that contains it.
    #[inline]
    #[must_use]
    pub fn snap_to_cell_center(coord: f32) -> f32 {
        coord.floor() + 0.5
    }
}

/// Cell index containing a world coordinate. Coordinates past the `i32`
/// range saturate, which is outside every grid.
#[inline]
fn cell_of(coord: f32) -> Option<i32> {
    coord.is_finite().then(|| coord.floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5x5 room: solid border, hollow inside except a block at (2, 2).
    fn room() -> TileGrid {
        #[rustfmt::skip]
        let codes = vec![
            1, 1, 1, 1, 1,
            1, 0, 0, 0, 1,
            1, 0, 1, 0, 1,
            1, 0, 0, 0, 1,
            1, 1, 1, 1, 1,
        ];
        TileGrid::from_codes(5, 5, codes).unwrap()
    }

    #[test]
    fn test_cell_value_out_of_range_is_zero() {
        let grid = room();
        assert_eq!(grid.cell_value(-1, -1), 0);
        assert_eq!(grid.cell_value(5, 0), 0);
        assert_eq!(grid.cell_value(0, 5), 0);
        assert_eq!(grid.cell_value(0, 0), 1);
        assert_eq!(grid.cell_value(2, 2), 1);
        assert_eq!(grid.cell_value(1, 1), 0);
    }

    #[test]
    fn test_binary_array_is_derived_from_codes() {
        let grid = TileGrid::from_codes(3, 1, vec![0, 3, 7]).unwrap();
        assert_eq!(grid.codes(), &[0, 3, 7]);
        assert_eq!(grid.collision(), &[0, 1, 1]);
        assert_eq!(grid.cell_code(1, 0), 3);
        assert_eq!(grid.cell_value(1, 0), 1);
    }

    #[test]
    fn test_probe_on_interior_block() {
        // Hotspots for (2.5, 2.5) with a 1x1 box:
        // RIGHT  (3.0, 2.75) (3.0, 2.25) -> cell (3, 2) = 0
        // BOTTOM (2.75, 2.0) (2.25, 2.0) -> cell (2, 2) = 1
        // LEFT   (2.0, 2.75) (2.0, 2.25) -> cell (2, 2) = 1
        // TOP    (2.75, 3.0) (2.25, 3.0) -> cell (2, 3) = 0
        let flags = room().probe(2.5, 2.5, 1.0, 1.0);
        assert_eq!(flags, CollisionFlags::LEFT | CollisionFlags::BOTTOM);
    }

    #[test]
    fn test_probe_against_left_wall() {
        // Left hotspots sit at x = 0.9, inside the border column.
        let flags = room().probe(1.4, 3.5, 1.0, 1.0);
        assert_eq!(flags, CollisionFlags::LEFT);
    }

    #[test]
    fn test_probe_in_corner_reports_two_sides() {
        // Bottom-left corner of the hollow: border below and to the left.
        let flags = room().probe(1.4, 1.4, 1.0, 1.0);
        assert_eq!(flags, CollisionFlags::LEFT | CollisionFlags::BOTTOM);
    }

    #[test]
    fn test_probe_outside_grid_is_empty() {
        let flags = room().probe(-1.0, -1.0, 1.0, 1.0);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_empty_grid_never_collides() {
        let grid = TileGrid::empty();
        assert!(!grid.is_loaded());
        assert_eq!(grid.cell_value(0, 0), 0);
        assert!(grid.probe(0.5, 0.5, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_snap_to_cell_center() {
        assert_eq!(TileGrid::snap_to_cell_center(3.9), 3.5);
        assert_eq!(TileGrid::snap_to_cell_center(3.0), 3.5);
        assert_eq!(TileGrid::snap_to_cell_center(0.2), 0.5);
    }

    #[test]
    fn test_from_codes_rejects_wrong_length() {
        let err = TileGrid::from_codes(2, 2, vec![1, 1, 1]).unwrap_err();
        assert!(matches!(
            err,
            TileMapError::CellCountMismatch { expected: 4, found: 3 }
        ));
    }

    #[test]
    fn test_from_codes_rejects_overflowing_dimensions() {
        let err = TileGrid::from_codes(usize::MAX, 2, Vec::new()).unwrap_err();
        assert!(matches!(err, TileMapError::InvalidDimensions { height: 2, .. }));

        let err = TileGrid::from_codes(1 << 31, 1, Vec::new()).unwrap_err();
        assert!(matches!(err, TileMapError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_non_finite_point_never_collides() {
        let grid = room();
        assert_eq!(grid.value_at(0.5, 0.5), 1);
        assert_eq!(grid.value_at(f32::NAN, 0.5), 0);
        assert_eq!(grid.value_at(0.5, f32::INFINITY), 0);
        assert!(grid.probe(f32::NAN, f32::NAN, 1.0, 1.0).is_empty());
        assert!(grid.probe(f32::NEG_INFINITY, 2.5, 1.0, 1.0).is_empty());
    }
}
