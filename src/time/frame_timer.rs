//! Frame timing and frame-rate limiting.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Largest delta handed to game logic, so a long stall does not turn into a
/// single huge simulation step.
pub const MAX_DELTA_SECONDS: f32 = 0.1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    #[error("target frame rate must be greater than zero")]
    ZeroTargetFps,
}

/// Aggregate frame statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceInfo {
    /// Shortest frame so far, `None` before the first frame ends.
    pub min: Option<Duration>,
    pub max: Duration,
    /// Rolling average, weighted 9:1 towards history.
    pub average: Duration,
    pub frames_over_budget: u64,
}

/// Measures frame durations against a target frame rate.
///
/// Call [`frame_start`](Self::frame_start) before work and
/// [`frame_end`](Self::frame_end) after it, then sleep for
/// [`frame_shortfall`](Self::frame_shortfall).
#[derive(Debug, Clone)]
pub struct FrameTimer {
    target_fps: u32,
    target_frame_time: Duration,
    game_start: Instant,
    frame_start: Instant,
    last_frame_time: Duration,
    min_frame_time: Option<Duration>,
    max_frame_time: Duration,
    avg_frame_time: Duration,
    frames_over_budget: u64,
    frame_count: u64,
    total_time: Duration,
}

impl FrameTimer {
    pub fn new(target_fps: u32) -> Result<Self, TimingError> {
        Self::new_at(target_fps, Instant::now())
    }

    pub fn new_at(target_fps: u32, now: Instant) -> Result<Self, TimingError> {
        if target_fps == 0 {
            return Err(TimingError::ZeroTargetFps);
        }
        let target_frame_time = Duration::from_secs(1) / target_fps;
        Ok(Self {
            target_fps,
            target_frame_time,
            game_start: now,
            frame_start: now,
            last_frame_time: target_frame_time,
            min_frame_time: None,
            max_frame_time: Duration::ZERO,
            avg_frame_time: target_frame_time,
            frames_over_budget: 0,
            frame_count: 0,
            total_time: Duration::ZERO,
        })
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn target_frame_time(&self) -> Duration {
        self.target_frame_time
    }

    pub fn frame_start(&mut self) {
        self.frame_start_at(Instant::now());
    }

    pub fn frame_start_at(&mut self, now: Instant) {
        self.frame_start = now;
    }

    pub fn frame_end(&mut self) {
        self.frame_end_at(Instant::now());
    }

    pub fn frame_end_at(&mut self, now: Instant) {
        let duration = now.saturating_duration_since(self.frame_start);

        self.last_frame_time = duration;
        self.frame_count += 1;
        self.total_time = now.saturating_duration_since(self.game_start);

        self.min_frame_time = Some(self.min_frame_time.map_or(duration, |m| m.min(duration)));
        self.max_frame_time = self.max_frame_time.max(duration);
        if duration > self.target_frame_time {
            self.frames_over_budget += 1;
        }
        self.avg_frame_time = (self.avg_frame_time * 9 + duration) / 10;
    }

    /// Whether the last frame finished early enough to sleep.
    pub fn should_limit_frame(&self) -> bool {
        self.last_frame_time < self.target_frame_time
    }

    /// Time left in the frame budget; zero when the frame ran over.
    pub fn frame_shortfall(&self) -> Duration {
        self.target_frame_time.saturating_sub(self.last_frame_time)
    }

    /// Last frame duration in seconds, clamped to [`MAX_DELTA_SECONDS`].
    pub fn delta_time(&self) -> f32 {
        self.last_frame_time.as_secs_f32().min(MAX_DELTA_SECONDS)
    }

    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }

    /// Frame rate implied by the last frame.
    pub fn current_fps(&self) -> f32 {
        if self.last_frame_time.is_zero() {
            return 0.0;
        }
        1.0 / self.last_frame_time.as_secs_f32()
    }

    /// Frame rate implied by the rolling average.
    pub fn average_fps(&self) -> f32 {
        if self.avg_frame_time.is_zero() {
            return 0.0;
        }
        1.0 / self.avg_frame_time.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time from construction to the end of the last frame.
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn performance(&self) -> PerformanceInfo {
        PerformanceInfo {
            min: self.min_frame_time,
            max: self.max_frame_time,
            average: self.avg_frame_time,
            frames_over_budget: self.frames_over_budget,
        }
    }
}
