//! Resize debouncing.
//!
//! Window managers deliver resize events in bursts while the user drags a
//! window edge. Each event only refreshes the pending state here; the surfaces
//! are rebuilt once, after no event has arrived for the configured delay.

use std::time::{Duration, Instant};

/// Quiet period required before a resize is applied.
pub const RESIZE_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Stable,
    Resizing {
        last_event: Instant,
        pending: (i32, i32),
    },
}

/// Result of polling the debouncer for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceStatus {
    /// No resize in flight.
    Stable,
    /// A resize is in flight and the delay has not elapsed yet.
    Waiting,
    /// The delay elapsed; apply this window size now. Reported once per burst.
    Settled { width: i32, height: i32 },
}

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    state: DebounceState,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DELAY)
    }
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Stable,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, DebounceState::Resizing { .. })
    }

    /// Record a resize event at `now`.
    pub fn on_resize(&mut self, width: i32, height: i32, now: Instant) {
        if !self.is_resizing() {
            log::trace!("resize started at {}x{}", width, height);
        }
        self.state = DebounceState::Resizing {
            last_event: now,
            pending: (width, height),
        };
    }

    /// Advance the state machine. `Settled` returns the debouncer to `Stable`.
    pub fn poll(&mut self, now: Instant) -> DebounceStatus {
        match self.state {
            DebounceState::Stable => DebounceStatus::Stable,
            DebounceState::Resizing {
                last_event,
                pending: (width, height),
            } => {
                if now.saturating_duration_since(last_event) >= self.delay {
                    self.state = DebounceState::Stable;
                    DebounceStatus::Settled { width, height }
                } else {
                    DebounceStatus::Waiting
                }
            }
        }
    }
}
