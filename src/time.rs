//! Frame timing for driving silo fields.
//!
//! The kernel assumes `dt` is small. [`FrameClock`] measures real frame
//! time and clamps long stalls (window drags, debugger pauses) so a single
//! frame never launches grain through the floor.
//!
//! # Example
//!
//! ```
//! use silo_flow::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! clock.set_fixed_delta(Some(1.0 / 60.0));
//!
//! let dt = clock.tick();
//! assert!((dt - 1.0 / 60.0).abs() < 1e-6);
//! assert_eq!(clock.frame(), 1);
//! ```

use log::warn;
use std::time::{Duration, Instant};

/// Longest frame the clock will report by default, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Per-frame `dt` source.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta_secs: f32,
    elapsed_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Fixed delta time for deterministic stepping.
    fixed_delta: Option<f32>,
    time_scale: f32,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Advance to the next frame and return its `dt` in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let mut delta = self.fixed_delta.unwrap_or(raw_delta) * self.time_scale;
        if delta > self.max_delta {
            warn!(
                "Frame took {:.3}s, clamping dt to {:.3}s",
                delta, self.max_delta
            );
            delta = self.max_delta;
        }

        self.delta_secs = delta;
        self.elapsed_secs += delta;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        delta
    }

    /// `dt` returned by the last [`tick`](Self::tick).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Simulated seconds so far (sum of reported deltas).
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Frames ticked while not paused.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Report a fixed `dt` every frame instead of measuring.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Multiply every `dt` by `scale`. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Upper bound on reported `dt`.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        self.max_delta = max_delta.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_tick_measures_time() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let dt = clock.tick();
        assert!(dt > 0.0);
        assert_eq!(clock.frame(), 1);
        assert_eq!(clock.elapsed(), dt);
    }

    #[test]
    fn test_pause() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(0.01));
        clock.tick();
        clock.pause();

        let elapsed_before = clock.elapsed();
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.elapsed(), elapsed_before);
        assert_eq!(clock.frame(), 1);

        clock.resume();
        assert_eq!(clock.tick(), 0.01);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(2.0));
        assert_eq!(clock.tick(), DEFAULT_MAX_DELTA);

        clock.set_max_delta(5.0);
        assert_eq!(clock.tick(), 2.0);
    }

    #[test]
    fn test_time_scale() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(0.02));
        clock.set_time_scale(2.0);
        assert!((clock.tick() - 0.04).abs() < 1e-6);

        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
        assert_eq!(clock.tick(), 0.0);
    }
}
