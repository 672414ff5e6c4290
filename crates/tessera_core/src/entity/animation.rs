//! # Sprite Animation State
//!
//! ```text
//!            set_animation(id)            frame == frame_count (once)
//!   Idle ───────────────────────► Playing ───────────────────────► Paused
//!    ▲                              │  ▲                               │
//!    │      set_animation("")       │  └──── frame_count (loop) ◄┐     │
//!    └──────────────────────────────┴────────────────────────────┴─────┘
//! ```
//!
//! Idle shows the sheet's default cell. A finished one-shot animation holds
//! its last frame in `Paused`.

use tessera_shared::math::sheet_cell_transform;
use tessera_shared::{Mat3, Vec2, DEFAULT_FRAME_SECONDS};

use crate::assets::AssetProvider;

/// Observable phase of an [`AnimationState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationPhase {
    /// No animation selected.
    Idle,
    /// Advancing frames.
    Playing {
        /// Wraps to frame 0 after the last frame.
        looping: bool,
    },
    /// Frame frozen, either by request or after a one-shot finished.
    Paused,
}

/// Frame selection and texture-transform memo for one entity.
#[derive(Clone, Debug)]
pub struct AnimationState {
    current: String,
    frame: u32,
    frame_count: u32,
    frame_seconds: f32,
    elapsed: f32,
    looping: bool,
    paused: bool,
    flip_horizontal: bool,
    flip_vertical: bool,
    frame_changed: bool,
    matrix_changed: bool,
    texture_transform: Mat3,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            current: String::new(),
            frame: 0,
            frame_count: 0,
            frame_seconds: 0.0,
            elapsed: 0.0,
            looping: true,
            paused: false,
            flip_horizontal: false,
            flip_vertical: false,
            frame_changed: true,
            matrix_changed: true,
            texture_transform: Mat3::IDENTITY,
        }
    }
}

impl AnimationState {
    /// Back to the freshly constructed state, keeping the id allocation.
    pub fn reset(&mut self) {
        let mut current = std::mem::take(&mut self.current);
        current.clear();
        *self = Self {
            current,
            ..Self::default()
        };
    }

    /// Selects an animation of `sprite`.
    ///
    /// An empty `id` returns to idle. Selecting a different animation
    /// restarts at frame 0; re-selecting the current one only updates the
    /// duration and resumes. Returns `false`, leaving everything untouched,
    /// when the sprite has no animation called `id`.
    pub fn set(
        &mut self,
        id: &str,
        frame_seconds: f32,
        looping: bool,
        sprite: &str,
        assets: &dyn AssetProvider,
    ) -> bool {
        if id.is_empty() {
            self.looping = looping;
            self.clear();
            return true;
        }

        if id != self.current {
            let Some(frame_count) = assets.frame_count(sprite, id) else {
                tracing::warn!("Sprite {:?} has no animation {:?}", sprite, id);
                return false;
            };
            self.current.clear();
            self.current.push_str(id);
            self.frame_count = frame_count;
            self.frame = 0;
            self.elapsed = 0.0;
        }

        self.looping = looping;
        self.frame_changed = true;
        self.matrix_changed = true;
        self.frame_seconds = frame_seconds;
        self.paused = false;
        true
    }

    /// Plays the sheet's default animation, looping at the default rate.
    ///
    /// Returns `false` when the sprite is unknown or has no animations.
    pub fn set_default(&mut self, sprite: &str, assets: &dyn AssetProvider) -> bool {
        let Some(id) = assets.default_animation(sprite) else {
            tracing::warn!("Sprite {:?} has no default animation", sprite);
            return false;
        };
        self.set(id, DEFAULT_FRAME_SECONDS, true, sprite, assets)
    }

    /// Returns to idle: no animation, zero duration, paused.
    pub fn clear(&mut self) {
        if !self.current.is_empty() {
            self.matrix_changed = true;
        }
        self.current.clear();
        self.frame = 0;
        self.frame_count = 0;
        self.frame_seconds = 0.0;
        self.elapsed = 0.0;
        self.paused = true;
    }

    /// Advances the frame clock by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        self.elapsed += dt;
        if self.elapsed < self.frame_seconds {
            self.frame_changed = false;
            return;
        }

        self.elapsed = 0.0;
        self.frame += 1;
        self.frame_changed = true;
        self.matrix_changed = true;

        if self.frame >= self.frame_count {
            if self.looping {
                self.frame = 0;
            } else {
                self.frame = self.frame_count.saturating_sub(1);
                self.paused = true;
            }
        }
    }

    /// Jumps to a frame, clamped to the animation.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame.min(self.frame_count.saturating_sub(1));
        self.elapsed = 0.0;
        self.frame_changed = true;
        self.matrix_changed = true;
    }

    /// Freezes or resumes the frame clock.
    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Mirrors the sprite horizontally.
    pub fn set_flip_horizontal(&mut self, flip: bool) {
        self.flip_horizontal = flip;
    }

    /// Mirrors the sprite vertically.
    pub fn set_flip_vertical(&mut self, flip: bool) {
        self.flip_vertical = flip;
    }

    /// Forces the texture transform to be rebuilt on next use.
    pub fn mark_dirty(&mut self) {
        self.frame_changed = true;
        self.matrix_changed = true;
    }

    /// Texture transform selecting the current cell of `sprite`.
    ///
    /// Rebuilt only when the frame or the animation changed since the last
    /// call; otherwise the memoized matrix is returned.
    pub fn texture_transform(&mut self, sprite: &str, assets: &dyn AssetProvider) -> Mat3 {
        if !self.matrix_changed {
            return self.texture_transform;
        }
        self.matrix_changed = false;

        if sprite.is_empty() {
            return self.texture_transform;
        }
        let Some(layout) = assets.sheet_layout(sprite) else {
            return self.texture_transform;
        };

        let cell = if self.current.is_empty() {
            assets.default_cell(sprite)
        } else {
            assets.cell(sprite, &self.current, self.frame)
        }
        .unwrap_or_default();

        self.texture_transform = sheet_cell_transform(
            layout.columns,
            layout.rows,
            Vec2::new(cell.start_x, cell.start_y),
        );
        self.texture_transform
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> AnimationPhase {
        if self.current.is_empty() {
            AnimationPhase::Idle
        } else if self.paused {
            AnimationPhase::Paused
        } else {
            AnimationPhase::Playing {
                looping: self.looping,
            }
        }
    }

    /// Active animation id, empty when idle.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// True when `id` is the active animation.
    #[must_use]
    pub fn is_current(&self, id: &str) -> bool {
        self.current == id
    }

    /// Current frame index.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Frames in the active animation.
    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Seconds per frame.
    #[must_use]
    pub fn frame_seconds(&self) -> f32 {
        self.frame_seconds
    }

    /// True when the clock is frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True when the animation wraps.
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// True when the last `advance` moved to a new frame.
    #[must_use]
    pub fn frame_changed(&self) -> bool {
        self.frame_changed
    }

    /// True when the texture transform is stale.
    #[must_use]
    pub fn matrix_changed(&self) -> bool {
        self.matrix_changed
    }

    /// Horizontal mirroring.
    #[must_use]
    pub fn flip_horizontal(&self) -> bool {
        self.flip_horizontal
    }

    /// Vertical mirroring.
    #[must_use]
    pub fn flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    /// True when a one-shot animation is holding its last frame.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.current.is_empty()
            && !self.looping
            && self.paused
            && self.frame_count > 0
            && self.frame + 1 == self.frame_count
    }

    /// True once at least `fraction` of the frames have been shown.
    #[must_use]
    pub fn is_fraction_finished(&self, fraction: f32) -> bool {
        if self.frame_count == 0 {
            return false;
        }
        (self.frame + 1) as f32 / self.frame_count as f32 >= fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AnimationStrip, SpriteLibrary, SpriteSheet};

    fn library() -> SpriteLibrary {
        let mut lib = SpriteLibrary::new();
        lib.insert(
            "hero",
            SpriteSheet::new(128, 64, 4, 2)
                .with_animation("run", AnimationStrip { row: 0, start_column: 0, frames: 4 })
                .with_animation("jump", AnimationStrip { row: 1, start_column: 0, frames: 2 }),
        )
        .unwrap();
        lib
    }

    #[test]
    fn test_loop_wraps_after_last_frame() {
        let lib = library();
        let mut anim = AnimationState::default();
        assert!(anim.set("run", 0.1, true, "hero", &lib));

        for _ in 0..5 {
            anim.advance(0.1);
        }

        assert_eq!(anim.frame(), 1);
        assert_eq!(anim.phase(), AnimationPhase::Playing { looping: true });
    }

    #[test]
    fn test_once_holds_last_frame() {
        let lib = library();
        let mut anim = AnimationState::default();
        assert!(anim.set("run", 0.1, false, "hero", &lib));

        for _ in 0..5 {
            anim.advance(0.1);
        }

        assert_eq!(anim.frame(), 3);
        assert!(anim.is_paused());
        assert!(anim.is_finished());
        assert_eq!(anim.phase(), AnimationPhase::Paused);
    }

    #[test]
    fn test_short_step_clears_frame_changed() {
        let lib = library();
        let mut anim = AnimationState::default();
        anim.set("run", 0.1, true, "hero", &lib);
        assert!(anim.frame_changed());

        anim.advance(0.05);
        assert!(!anim.frame_changed());
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn test_empty_id_is_idle() {
        let lib = library();
        let mut anim = AnimationState::default();
        anim.set("run", 0.1, true, "hero", &lib);
        anim.advance(0.1);

        assert!(anim.set("", 0.5, true, "hero", &lib));
        assert_eq!(anim.phase(), AnimationPhase::Idle);
        assert_eq!(anim.current(), "");
        assert_eq!(anim.frame_seconds(), 0.0);
        assert!(anim.is_paused());
    }

    #[test]
    fn test_unknown_animation_is_noop() {
        let lib = library();
        let mut anim = AnimationState::default();
        anim.set("run", 0.1, true, "hero", &lib);
        anim.advance(0.1);

        assert!(!anim.set("swim", 0.5, false, "hero", &lib));
        assert!(anim.is_current("run"));
        assert_eq!(anim.frame(), 1);
        assert_eq!(anim.frame_seconds(), 0.1);
        assert!(anim.is_looping());
    }

    #[test]
    fn test_reselecting_keeps_frame() {
        let lib = library();
        let mut anim = AnimationState::default();
        anim.set("run", 0.1, true, "hero", &lib);
        anim.advance(0.1);
        anim.advance(0.1);

        anim.set("run", 0.2, true, "hero", &lib);
        assert_eq!(anim.frame(), 2);
        assert_eq!(anim.frame_seconds(), 0.2);
    }

    #[test]
    fn test_texture_transform_memoized() {
        let lib = library();
        let mut anim = AnimationState::default();
        anim.set("jump", 0.1, true, "hero", &lib);

        let m = anim.texture_transform("hero", &lib);
        assert!(!anim.matrix_changed());
        // Frame 0 of "jump" is column 0, row 1 of a 4x2 sheet.
        assert_eq!(m.z_axis.x, 0.0);
        assert_eq!(m.z_axis.y, 0.5);
        assert_eq!(m.x_axis.x, 0.25);

        anim.advance(0.1);
        let m = anim.texture_transform("hero", &lib);
        assert_eq!(m.z_axis.x, 0.25);
    }

    #[test]
    fn test_default_animation() {
        let lib = library();
        let mut anim = AnimationState::default();
        assert!(anim.set_default("hero", &lib));
        assert!(anim.is_current("jump"));
        assert_eq!(anim.frame_seconds(), DEFAULT_FRAME_SECONDS);

        assert!(!anim.set_default("ghost", &lib));
    }

    #[test]
    fn test_fraction_finished() {
        let lib = library();
        let mut anim = AnimationState::default();
        anim.set("run", 0.1, false, "hero", &lib);
        assert!(!anim.is_fraction_finished(0.5));

        anim.set_frame(1);
        assert!(anim.is_fraction_finished(0.5));

        anim.set_frame(99);
        assert_eq!(anim.frame(), 3);
    }
}
