//! # Game Configuration
//!
//! Read once when a game state is entered. Every section and key is
//! optional; missing values fall back to the engine defaults.
//!
//! ```toml
//! [pools]
//! enemy = 64
//! recycling = "free_list"
//!
//! [camera]
//! fov_x = 12.0
//!
//! [physics]
//! gravity = 30.0
//!
//! [debug]
//! draw_boxes = true
//!
//! [assets]
//! level = "levels/room.toml"
//! sprites = "sprites/sprites.toml"
//! ```
//!
//! Relative asset paths are resolved against the directory of the config
//! file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tessera_core::Recycling;
use tessera_shared::{DEFAULT_FOV_X, DEFAULT_POOL_CAPACITY};

use crate::archetype::Kind;
use crate::error::{GameError, GameResult};

/// Top-level game configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Pool sizes and recycling.
    pub pools: PoolConfig,
    /// Camera setup.
    pub camera: CameraConfig,
    /// Archetype physics tuning.
    pub physics: PhysicsConfig,
    /// Debug switches.
    pub debug: DebugConfig,
    /// Level and sprite manifest locations.
    pub assets: AssetPaths,
}

/// Slot count of each archetype pool.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Player pool.
    pub player: usize,
    /// Enemy pool.
    pub enemy: usize,
    /// Projectile pool.
    pub projectile: usize,
    /// Effect pool.
    pub effect: usize,
    /// Slot search strategy shared by every pool.
    pub recycling: Recycling,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            player: 4,
            enemy: 128,
            projectile: DEFAULT_POOL_CAPACITY,
            effect: DEFAULT_POOL_CAPACITY,
            recycling: Recycling::HighWaterMark,
        }
    }
}

impl PoolConfig {
    /// Capacity of the pool holding `kind`.
    #[must_use]
    pub const fn capacity(&self, kind: Kind) -> usize {
        match kind {
            Kind::Player => self.player,
            Kind::Enemy => self.enemy,
            Kind::Projectile => self.projectile,
            Kind::Effect => self.effect,
        }
    }
}

/// Initial camera placement.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Horizontal half field of view in world units.
    pub fov_x: f32,
    /// Starting X position.
    pub start_x: f32,
    /// Starting Y position.
    pub start_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_x: DEFAULT_FOV_X,
            start_x: 0.0,
            start_y: 0.0,
        }
    }
}

/// Movement tuning for the built-in archetypes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Downward acceleration (units per second squared).
    pub gravity: f32,
    /// Maximum falling speed (units per second).
    pub terminal_velocity: f32,
    /// Horizontal chase speed of enemies (units per second).
    pub enemy_speed: f32,
    /// Horizontal distance at which enemies start chasing.
    pub detection_range: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 32.0,
            terminal_velocity: 50.0,
            enemy_speed: 2.0,
            detection_range: 10.0,
        }
    }
}

/// Debug switches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Outline collision boxes after the sprite pass.
    pub draw_boxes: bool,
    /// Warn about frames that exceed the time budget.
    pub frame_timing_logs: bool,
}

/// Asset manifest locations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetPaths {
    /// Level document. No level means an empty collision grid.
    pub level: Option<PathBuf>,
    /// Sprite manifest. No manifest means an empty sprite library.
    pub sprites: Option<PathBuf>,
}

impl GameConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// [`GameError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file and resolves its asset paths.
    ///
    /// # Errors
    ///
    /// [`GameError::Io`] when the file cannot be read, otherwise as
    /// [`GameConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.assets.resolve_against(base);
        }
        tracing::info!("Loaded game config from {}", path.display());
        Ok(config)
    }
}

impl AssetPaths {
    /// Prefixes relative paths with `base`.
    pub fn resolve_against(&mut self, base: &Path) {
        for path in [&mut self.level, &mut self.sprites].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.pools.capacity(Kind::Effect), DEFAULT_POOL_CAPACITY);
        assert_eq!(config.camera.fov_x, DEFAULT_FOV_X);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = GameConfig::from_toml_str(
            "[pools]\nenemy = 8\nrecycling = \"free_list\"\n[debug]\ndraw_boxes = true\n",
        )
        .unwrap();

        assert_eq!(config.pools.capacity(Kind::Enemy), 8);
        assert_eq!(config.pools.capacity(Kind::Player), 4);
        assert_eq!(config.pools.recycling, Recycling::FreeList);
        assert!(config.debug.draw_boxes);
        assert!(!config.debug.frame_timing_logs);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = GameConfig::from_toml_str("[camera]\nzoom = 2.0\n");
        assert!(matches!(result, Err(GameError::Config(_))));
    }

    #[test]
    fn test_relative_assets_resolved() {
        let mut assets = AssetPaths {
            level: Some(PathBuf::from("levels/room.toml")),
            sprites: Some(PathBuf::from("/abs/sprites.toml")),
        };
        assets.resolve_against(Path::new("/game/assets"));

        assert_eq!(
            assets.level.as_deref(),
            Some(Path::new("/game/assets/levels/room.toml"))
        );
        assert_eq!(assets.sprites.as_deref(), Some(Path::new("/abs/sprites.toml")));
    }
}
