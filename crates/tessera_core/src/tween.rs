//! # Interpolants
//!
//! Time-driven interpolation between two values, used for camera pans,
//! fades and other scripted motion.

use std::ops::{Add, Mul, Sub};

/// What happens when an interpolant reaches its end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TweenMode {
    /// Jump back to the start and keep going.
    #[default]
    Loop,
    /// Stop on the end value and pause.
    Once,
    /// Reverse direction at either end.
    PingPong,
}

/// Value moving from `start` to `end` over a fixed duration.
#[derive(Clone, Copy, Debug)]
pub struct Interpolant<T> {
    start: T,
    end: T,
    seconds: f32,
    mode: TweenMode,
    /// Progress in `[0, 1]`.
    fraction: f32,
    /// +1 towards `end`, -1 towards `start`.
    direction: f32,
    paused: bool,
}

impl<T> Interpolant<T>
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    /// Creates an interpolant at `start`.
    ///
    /// A non-positive duration completes in a single update.
    #[must_use]
    pub fn new(start: T, end: T, seconds: f32, mode: TweenMode) -> Self {
        Self {
            start,
            end,
            seconds,
            mode,
            fraction: 0.0,
            direction: 1.0,
            paused: false,
        }
    }

    /// Advances by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        let step = if self.seconds > 0.0 { dt / self.seconds } else { 1.0 };
        let mut f = self.fraction + step * self.direction;

        match self.mode {
            TweenMode::Loop => {
                if f > 1.0 {
                    f = (f - 1.0).fract();
                }
            }
            TweenMode::Once => {
                if f >= 1.0 {
                    f = 1.0;
                    self.paused = true;
                }
            }
            TweenMode::PingPong => {
                if f > 1.0 {
                    f = 2.0 - f;
                    self.direction = -1.0;
                } else if f < 0.0 {
                    f = -f;
                    self.direction = 1.0;
                }
                f = f.clamp(0.0, 1.0);
            }
        }

        self.fraction = f;
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.start + (self.end - self.start) * self.fraction
    }

    /// Progress in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Replaces both ends and restarts from `start`.
    pub fn set_range(&mut self, start: T, end: T) {
        self.start = start;
        self.end = end;
        self.reset();
    }

    /// Replaces the end value, keeping the start.
    pub fn set_end(&mut self, end: T) {
        self.set_range(self.start, end);
    }

    /// Changes the start-to-end duration without moving the value.
    pub fn set_seconds(&mut self, seconds: f32) {
        self.seconds = seconds;
    }

    /// Jumps to a progress in `[0, 1]`.
    pub fn set_fraction(&mut self, fraction: f32) {
        self.fraction = fraction.clamp(0.0, 1.0);
    }

    /// Changes the end behaviour.
    pub fn set_mode(&mut self, mode: TweenMode) {
        self.mode = mode;
    }

    /// Pauses or resumes.
    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// True while paused, including after a `Once` tween completed.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Back to `start`, moving forward, unpaused.
    pub fn reset(&mut self) {
        self.fraction = 0.0;
        self.direction = 1.0;
        self.paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_shared::Vec3;

    #[test]
    fn test_once_stops_at_end() {
        let mut t = Interpolant::new(0.0_f32, 10.0, 1.0, TweenMode::Once);
        t.update(0.5);
        assert!((t.value() - 5.0).abs() < 1e-5);

        t.update(0.75);
        assert_eq!(t.value(), 10.0);
        assert!(t.is_paused());

        t.update(1.0);
        assert_eq!(t.value(), 10.0);
    }

    #[test]
    fn test_loop_wraps_remainder() {
        let mut t = Interpolant::new(0.0_f32, 4.0, 1.0, TweenMode::Loop);
        t.update(1.25);
        assert!((t.value() - 1.0).abs() < 1e-5);
        assert!(!t.is_paused());
    }

    #[test]
    fn test_ping_pong_reflects() {
        let mut t = Interpolant::new(0.0_f32, 1.0, 1.0, TweenMode::PingPong);
        t.update(1.25);
        assert!((t.fraction() - 0.75).abs() < 1e-5);

        t.update(0.5);
        assert!((t.fraction() - 0.25).abs() < 1e-5);

        t.update(0.5);
        assert!((t.fraction() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_vector_interpolation_and_reset() {
        let mut t = Interpolant::new(Vec3::ZERO, Vec3::new(2.0, 4.0, 0.0), 2.0, TweenMode::Once);
        t.update(1.0);
        assert!((t.value() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);

        t.set_end(Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(t.value(), Vec3::ZERO);

        t.set_fraction(0.5);
        assert!((t.value() - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
    }
}
