//! # Sprite Assets
//!
//! Entities refer to sprites and animations by string key. Frame counts and
//! sheet cells come from an [`AssetProvider`]; [`SpriteLibrary`] is the
//! in-memory provider built from a TOML manifest:
//!
//! ```toml
//! [sprites.hero]
//! texture_width = 512
//! texture_height = 256
//! columns = 8
//! rows = 4
//!
//! [sprites.hero.animations.run]
//! row = 1
//! frames = 6
//! ```
//!
//! Frames of an animation run left to right from `start_column` on `row`,
//! continuing on the next row when they pass the last column.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Texture-space origin of one sheet cell, in `[0, 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SheetCell {
    /// Left edge.
    pub start_x: f32,
    /// Top edge.
    pub start_y: f32,
}

/// Grid layout of a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    /// Cells per row.
    pub columns: u32,
    /// Rows of cells.
    pub rows: u32,
}

/// Asset lookup consumed by entity state.
///
/// Every method answers `None` for an unknown sprite or animation.
pub trait AssetProvider {
    /// Number of frames in an animation.
    fn frame_count(&self, sprite: &str, animation: &str) -> Option<u32>;
    /// Animation played by `set_default_animation`.
    fn default_animation(&self, sprite: &str) -> Option<&str>;
    /// Cell shown when no animation is active.
    fn default_cell(&self, sprite: &str) -> Option<SheetCell>;
    /// Cell of frame `frame` of an animation.
    fn cell(&self, sprite: &str, animation: &str, frame: u32) -> Option<SheetCell>;
    /// Column and row count of the sheet.
    fn sheet_layout(&self, sprite: &str) -> Option<SheetLayout>;
    /// Raw texture size in pixels.
    fn texture_size(&self, sprite: &str) -> Option<(u32, u32)>;
}

/// A contiguous run of cells played as one animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct AnimationStrip {
    /// Row of the first frame.
    pub row: u32,
    /// Column of the first frame.
    #[serde(default)]
    pub start_column: u32,
    /// Number of frames.
    pub frames: u32,
}

/// One sprite sheet and its animations.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpriteSheet {
    /// Texture width in pixels.
    pub texture_width: u32,
    /// Texture height in pixels.
    pub texture_height: u32,
    /// Cells per row.
    pub columns: u32,
    /// Rows of cells.
    pub rows: u32,
    /// Explicit default animation. Falls back to the first by name.
    #[serde(default)]
    pub default_animation: Option<String>,
    /// Animations by name.
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationStrip>,
}

impl SpriteSheet {
    /// Creates a sheet without animations.
    #[must_use]
    pub fn new(texture_width: u32, texture_height: u32, columns: u32, rows: u32) -> Self {
        Self {
            texture_width,
            texture_height,
            columns,
            rows,
            default_animation: None,
            animations: BTreeMap::new(),
        }
    }

    /// Adds an animation.
    #[must_use]
    pub fn with_animation(mut self, name: &str, strip: AnimationStrip) -> Self {
        self.animations.insert(name.to_owned(), strip);
        self
    }

    /// Name of the default animation, if the sheet has any.
    #[must_use]
    pub fn default_animation(&self) -> Option<&str> {
        match &self.default_animation {
            Some(name) if self.animations.contains_key(name) => Some(name.as_str()),
            _ => self.animations.keys().next().map(String::as_str),
        }
    }

    /// Cell at a linear index counted from `(row, column)`.
    fn cell_at(&self, row: u32, column: u32, offset: u32) -> SheetCell {
        let columns = self.columns.max(1);
        let linear = row * columns + column + offset;
        SheetCell {
            start_x: (linear % columns) as f32 / columns as f32,
            start_y: ((linear / columns) % self.rows.max(1)) as f32 / self.rows.max(1) as f32,
        }
    }

    fn validate(&self, name: &str) -> CoreResult<()> {
        let invalid = |reason| CoreError::InvalidSheet {
            sprite: name.to_owned(),
            reason,
        };
        if self.columns == 0 || self.rows == 0 {
            return Err(invalid("columns and rows must be positive"));
        }
        if self.texture_width == 0 || self.texture_height == 0 {
            return Err(invalid("texture size must be positive"));
        }
        for strip in self.animations.values() {
            if strip.frames == 0 {
                return Err(invalid("animation without frames"));
            }
            if strip.row >= self.rows || strip.start_column >= self.columns {
                return Err(invalid("animation starts outside the sheet"));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    sprites: BTreeMap<String, SpriteSheet>,
}

/// In-memory [`AssetProvider`].
#[derive(Clone, Debug, Default)]
pub struct SpriteLibrary {
    sheets: BTreeMap<String, SpriteSheet>,
}

impl SpriteLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML manifest.
    ///
    /// # Errors
    ///
    /// [`CoreError::Manifest`] for malformed TOML, [`CoreError::InvalidSheet`]
    /// for a sheet with zero cells or an animation outside its sheet.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let manifest: Manifest = toml::from_str(text)?;
        for (name, sheet) in &manifest.sprites {
            sheet.validate(name)?;
        }
        Ok(Self {
            sheets: manifest.sprites,
        })
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// [`CoreError::Io`] when the file cannot be read, otherwise as
    /// [`SpriteLibrary::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_toml_str(&text)?;
        tracing::info!(
            "Loaded {} sprite sheets from {}",
            library.sheets.len(),
            path.display()
        );
        Ok(library)
    }

    /// Registers a sheet, replacing any sheet of the same name.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidSheet`] when the sheet fails validation.
    pub fn insert(&mut self, name: &str, sheet: SpriteSheet) -> CoreResult<()> {
        sheet.validate(name)?;
        self.sheets.insert(name.to_owned(), sheet);
        Ok(())
    }

    /// Looks up a sheet.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownSprite`] when no sheet has this name.
    pub fn sheet(&self, name: &str) -> CoreResult<&SpriteSheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| CoreError::UnknownSprite(name.to_owned()))
    }

    /// Number of registered sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// True when no sheet is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl AssetProvider for SpriteLibrary {
    fn frame_count(&self, sprite: &str, animation: &str) -> Option<u32> {
        Some(self.sheets.get(sprite)?.animations.get(animation)?.frames)
    }

    fn default_animation(&self, sprite: &str) -> Option<&str> {
        self.sheets.get(sprite)?.default_animation()
    }

    fn default_cell(&self, sprite: &str) -> Option<SheetCell> {
        let sheet = self.sheets.get(sprite)?;
        let cell = match sheet
            .default_animation()
            .and_then(|name| sheet.animations.get(name))
        {
            Some(strip) => sheet.cell_at(strip.row, strip.start_column, 0),
            None => SheetCell::default(),
        };
        Some(cell)
    }

    fn cell(&self, sprite: &str, animation: &str, frame: u32) -> Option<SheetCell> {
        let sheet = self.sheets.get(sprite)?;
        let strip = sheet.animations.get(animation)?;
        let frame = frame.min(strip.frames.saturating_sub(1));
        Some(sheet.cell_at(strip.row, strip.start_column, frame))
    }

    fn sheet_layout(&self, sprite: &str) -> Option<SheetLayout> {
        let sheet = self.sheets.get(sprite)?;
        Some(SheetLayout {
            columns: sheet.columns,
            rows: sheet.rows,
        })
    }

    fn texture_size(&self, sprite: &str) -> Option<(u32, u32)> {
        let sheet = self.sheets.get(sprite)?;
        Some((sheet.texture_width, sheet.texture_height))
    }
}
