//! Level document schema.
//!
//! ```toml
//! [dimension]
//! width = 5
//! height = 5
//!
//! [map]
//! cells = """
//! 1 1 1 1 1
//! 1 0 0 0 1
//! 1 0 1 0 1
//! 1 0 0 0 1
//! 1 1 1 1 1
//! """
//! ```
//!
//! Cells are single digits, row-major, delimited by whitespace or commas.

use serde::Deserialize;

use crate::error::{TileMapError, TileMapResult};

/// Raw level document as read from disk.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelDocument {
    /// Grid size.
    pub dimension: Dimension,
    /// Grid body.
    pub map: MapBody,
}

/// `[dimension]` table. Both attributes are required; they are optional
/// here only so a missing one is reported by name.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Dimension {
    /// Number of columns.
    pub width: Option<i64>,
    /// Number of rows.
    pub height: Option<i64>,
}

/// `[map]` table.
#[derive(Clone, Debug, Deserialize)]
pub struct MapBody {
    /// Delimited digit sequence.
    pub cells: String,
}

impl LevelDocument {
    /// Parses a TOML level document.
    ///
    /// # Errors
    ///
    /// Returns [`TileMapError::Parse`] when the text is not a level document.
    pub fn from_toml_str(text: &str) -> TileMapResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validated `(width, height)`.
    ///
    /// # Errors
    ///
    /// Fails when an attribute is missing or not strictly positive.
    pub fn dimensions(&self) -> TileMapResult<(usize, usize)> {
        let width = self
            .dimension
            .width
            .ok_or(TileMapError::MissingDimension("width"))?;
        let height = self
            .dimension
            .height
            .ok_or(TileMapError::MissingDimension("height"))?;

        if width <= 0 || height <= 0 {
            return Err(TileMapError::InvalidDimensions { width, height });
        }

        let (Ok(w), Ok(h)) = (usize::try_from(width), usize::try_from(height)) else {
            return Err(TileMapError::InvalidDimensions { width, height });
        };
        Ok((w, h))
    }

    /// Decodes the cell body into raw codes.
    ///
    /// # Errors
    ///
    /// Fails on any character that is neither a delimiter nor a digit.
    pub fn cell_codes(&self) -> TileMapResult<Vec<u8>> {
        let mut codes = Vec::with_capacity(self.map.cells.len() / 2);
        for ch in self.map.cells.chars() {
            if ch.is_whitespace() || ch == ',' {
                continue;
            }
            match ch.to_digit(10) {
                Some(digit) => codes.push(digit as u8),
                None => {
                    return Err(TileMapError::InvalidCell {
                        index: codes.len(),
                        found: ch,
                    })
                }
            }
        }
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_dimensions_and_cells() {
        let doc = LevelDocument::from_toml_str(
            "[dimension]\nwidth = 3\nheight = 1\n[map]\ncells = \"1, 0, 2\"\n",
        )
        .unwrap();

        assert_eq!(doc.dimensions().unwrap(), (3, 1));
        assert_eq!(doc.cell_codes().unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn test_missing_height_is_named() {
        let doc =
            LevelDocument::from_toml_str("[dimension]\nwidth = 3\n[map]\ncells = \"1 0 2\"\n")
                .unwrap();

        assert!(matches!(
            doc.dimensions(),
            Err(TileMapError::MissingDimension("height"))
        ));
    }

    #[test]
    fn test_rejects_non_digit() {
        let doc = LevelDocument::from_toml_str(
            "[dimension]\nwidth = 2\nheight = 1\n[map]\ncells = \"1 x\"\n",
        )
        .unwrap();

        assert!(matches!(
            doc.cell_codes(),
            Err(TileMapError::InvalidCell { index: 1, found: 'x' })
        ));
    }

    #[test]
    fn test_missing_map_table_is_parse_error() {
        let result = LevelDocument::from_toml_str("[dimension]\nwidth = 2\nheight = 1\n");
        assert!(matches!(result, Err(TileMapError::Parse(_))));
    }
}
