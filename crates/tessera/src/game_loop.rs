//! # Game Loop
//!
//! Frame orchestration and timing:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. BEGIN FRAME                                                      │
//! │    └─ Measure and clamp the delta since the previous frame          │
//! │                                                                     │
//! │ 2. UPDATE                                                           │
//! │    ├─ Snapshot follow / AI targets                                  │
//! │    └─ Update every pool (physics, animation, lifetime, tiles)       │
//! │                                                                     │
//! │ 3. RENDER                                                           │
//! │    ├─ Sprite pass per pool                                          │
//! │    └─ Debug box pass (optional)                                     │
//! │                                                                     │
//! │ 4. END FRAME                                                        │
//! │    └─ Record timing, warn when over budget                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use tessera_core::RenderDevice;

use crate::context::GameContext;

/// Frame budget at 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Frames slower than this are logged when timing logs are on.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Game loop settings.
#[derive(Clone, Debug)]
pub struct GameLoopConfig {
    /// Largest delta handed to the update pass (seconds). Longer pauses
    /// are simulated as one step of this length.
    pub max_delta: f32,
    /// Warn about frames slower than [`MAX_FRAME_TIME`].
    pub enable_timing_logs: bool,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            enable_timing_logs: false,
        }
    }
}

/// What one frame cost and did.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Update plus render, in microseconds.
    pub total_us: u64,
    /// Update pass, in microseconds.
    pub update_us: u64,
    /// Render pass, in microseconds.
    pub render_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Live entities updated.
    pub updated: usize,
    /// Entities released by the update pass.
    pub expired: usize,
    /// Draw calls issued.
    pub draw_calls: usize,
}

impl FrameStats {
    /// True when the frame missed the 60 FPS budget.
    #[inline]
    #[must_use]
    pub fn over_budget(&self) -> bool {
        self.total_us > micros(TARGET_FRAME_TIME)
    }
}

#[inline]
fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Drives a [`GameContext`] one frame at a time.
pub struct GameLoop {
    config: GameLoopConfig,
    frame_count: u64,
    /// Start of the previous `begin_frame`.
    last_tick: Instant,
    stats: FrameStatsAccumulator,
}

impl GameLoop {
    /// Creates a game loop.
    ///
    /// # Arguments
    ///
    /// * `config` - Delta clamp and logging switches
    #[must_use]
    pub fn new(config: GameLoopConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            last_tick: Instant::now(),
            stats: FrameStatsAccumulator::new(),
        }
    }

    /// Starts a wall-clock frame and returns the elapsed seconds since the
    /// previous call, clamped to `max_delta`.
    #[must_use]
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        elapsed.as_secs_f32().min(self.config.max_delta)
    }

    /// Updates then renders `context` for a step of `dt` seconds.
    pub fn run_frame(
        &mut self,
        context: &mut GameContext,
        device: &mut dyn RenderDevice,
        dt: f32,
    ) -> FrameStats {
        let started = Instant::now();
        let update = context.update(dt.min(self.config.max_delta));
        let updated_at = Instant::now();
        let render = context.render(device);
        let rendered_at = Instant::now();

        let stats = FrameStats {
            total_us: micros(rendered_at - started),
            update_us: micros(updated_at - started),
            render_us: micros(rendered_at - updated_at),
            frame: self.frame_count,
            updated: update.updated,
            expired: update.expired,
            draw_calls: render.draw_calls,
        };
        self.end_frame(stats);
        stats
    }

    /// Closes a frame: bumps the counter and records `stats`.
    pub fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats.record(stats);

        if self.config.enable_timing_logs && stats.total_us > micros(MAX_FRAME_TIME) {
            tracing::warn!(
                "Frame {} took {:.2}ms (update {:.2}ms, render {:.2}ms, {} draws)",
                stats.frame,
                stats.total_us as f64 / 1000.0,
                stats.update_us as f64 / 1000.0,
                stats.render_us as f64 / 1000.0,
                stats.draw_calls
            );
        }
    }

    /// Frames completed so far.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Statistics over every completed frame.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }
}

/// Running totals over many [`FrameStats`].
#[derive(Clone, Debug, Default)]
pub struct FrameStatsAccumulator {
    /// Frames recorded.
    pub frames_recorded: u64,
    /// Sum of frame times, in microseconds.
    pub total_us_sum: u64,
    /// Sum of update pass times, in microseconds.
    pub update_us_sum: u64,
    /// Sum of render pass times, in microseconds.
    pub render_us_sum: u64,
    /// Fastest frame, in microseconds. `None` before the first frame.
    pub fastest_us: Option<u64>,
    /// Slowest frame, in microseconds.
    pub slowest_us: u64,
    /// Frames over the 60 FPS budget.
    pub frames_over_budget: u64,
    /// Entities released over all frames.
    pub expired_total: u64,
    /// Draw calls over all frames.
    pub draw_calls_total: u64,
    /// Most entities updated in one frame.
    pub peak_updated: usize,
}

impl FrameStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one frame.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.update_us_sum += stats.update_us;
        self.render_us_sum += stats.render_us;
        self.fastest_us = Some(self.fastest_us.map_or(stats.total_us, |f| f.min(stats.total_us)));
        self.slowest_us = self.slowest_us.max(stats.total_us);
        self.expired_total += stats.expired as u64;
        self.draw_calls_total += stats.draw_calls as u64;
        self.peak_updated = self.peak_updated.max(stats.updated);
        if stats.over_budget() {
            self.frames_over_budget += 1;
        }
    }

    fn mean(&self, sum_us: u64) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        sum_us as f64 / self.frames_recorded as f64 / 1000.0
    }

    /// Mean frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.mean(self.total_us_sum)
    }

    /// Frames per second implied by the mean frame time.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        match self.avg_frame_ms() {
            ms if ms > 0.0 => 1000.0 / ms,
            _ => 0.0,
        }
    }

    /// Mean draw calls per frame.
    #[must_use]
    pub fn avg_draw_calls(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.draw_calls_total as f64 / self.frames_recorded as f64
    }

    /// Share of frames over budget, in `[0, 1]`.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs the totals at `info` level.
    pub fn log_summary(&self) {
        let Some(fastest) = self.fastest_us else {
            tracing::info!("No frames recorded");
            return;
        };

        tracing::info!(
            "{} frames | avg {:.3}ms ({:.1} FPS) | fastest {:.3}ms | slowest {:.3}ms | over budget {:.1}%",
            self.frames_recorded,
            self.avg_frame_ms(),
            self.avg_fps(),
            fastest as f64 / 1000.0,
            self.slowest_us as f64 / 1000.0,
            self.over_budget_ratio() * 100.0
        );
        tracing::info!(
            "update {:.3}ms | render {:.3}ms | {:.1} draws/frame | peak {} entities | {} expired",
            self.mean(self.update_us_sum),
            self.mean(self.render_us_sum),
            self.avg_draw_calls(),
            self.peak_updated,
            self.expired_total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Kind;
    use crate::config::GameConfig;
    use tessera_core::{RecordingDevice, SpriteLibrary};
    use tessera_tilemap::TileGrid;

    fn frame(total_us: u64, draw_calls: usize) -> FrameStats {
        FrameStats {
            total_us,
            update_us: total_us / 2,
            render_us: total_us / 2,
            draw_calls,
            updated: draw_calls,
            expired: 1,
            ..FrameStats::default()
        }
    }

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new(GameLoopConfig::default());
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.stats().frames_recorded, 0);
        assert_eq!(game_loop.stats().avg_fps(), 0.0);
    }

    #[test]
    fn test_frame_cycle() {
        let mut context =
            GameContext::new(&GameConfig::default(), TileGrid::empty(), SpriteLibrary::new());
        context.spawn(Kind::Player, "quad", "hero").unwrap();
        let mut device = RecordingDevice::new();
        let mut game_loop = GameLoop::new(GameLoopConfig::default());

        let dt = game_loop.begin_frame();
        assert!(dt <= 0.1);

        let stats = game_loop.run_frame(&mut context, &mut device, 1.0 / 60.0);
        assert_eq!(stats.frame, 0);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(game_loop.frame_count(), 1);
        assert_eq!(device.quad_count(), 1);
    }

    #[test]
    fn test_accumulator_totals() {
        let mut acc = FrameStatsAccumulator::new();
        acc.record(frame(10_000, 4));
        acc.record(frame(20_000, 8));
        acc.record(frame(30_000, 12));

        assert_eq!(acc.frames_recorded, 3);
        assert_eq!(acc.expired_total, 3);
        assert_eq!(acc.fastest_us, Some(10_000));
        assert_eq!(acc.slowest_us, 30_000);
        assert_eq!(acc.peak_updated, 12);
        assert!((acc.avg_frame_ms() - 20.0).abs() < 1e-9);
        assert!((acc.avg_fps() - 50.0).abs() < 1e-9);
        assert!((acc.avg_draw_calls() - 8.0).abs() < 1e-9);
        // 20ms and 30ms miss the 16.666ms budget.
        assert_eq!(acc.frames_over_budget, 2);
    }
}
