//! Frame timing for the game loop.

pub mod frame_timer;

pub use frame_timer::{FrameTimer, PerformanceInfo, TimingError, MAX_DELTA_SECONDS};
