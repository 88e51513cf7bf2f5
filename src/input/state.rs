//! Logical input events and per-event state.

use std::fmt;

/// Logical input event, independent of the device that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputEvent {
    Up,
    Right,
    Down,
    Left,
    A,
    B,
    C,
    D,
    LeftBumper,
    LeftTrigger,
    RightBumper,
    RightTrigger,
    Start,
    Select,
    /// Held to leave the game. Keyboard only.
    Quit,
    ToggleFps,
    ToggleResolution,
    ToggleResizeMode,
    CycleDisplayMode,
}

impl InputEvent {
    pub const COUNT: usize = 19;

    pub const ALL: [InputEvent; Self::COUNT] = [
        Self::Up,
        Self::Right,
        Self::Down,
        Self::Left,
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::LeftBumper,
        Self::LeftTrigger,
        Self::RightBumper,
        Self::RightTrigger,
        Self::Start,
        Self::Select,
        Self::Quit,
        Self::ToggleFps,
        Self::ToggleResolution,
        Self::ToggleResizeMode,
        Self::CycleDisplayMode,
    ];

    /// Position in [`InputEvent::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::LeftBumper => "lb",
            Self::LeftTrigger => "lt",
            Self::RightBumper => "rb",
            Self::RightTrigger => "rt",
            Self::Start => "start",
            Self::Select => "select",
            Self::Quit => "quit",
            Self::ToggleFps => "toggle-fps",
            Self::ToggleResolution => "toggle-resolution",
            Self::ToggleResizeMode => "toggle-resize-mode",
            Self::CycleDisplayMode => "cycle-display-mode",
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one logical event on one device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Went down this frame.
    pub pressed: bool,
    /// Down this frame.
    pub held: bool,
    /// Went up this frame.
    pub released: bool,
    /// Seconds held so far; 0 while up.
    pub duration: f32,
    /// Raw state seen by the previous update.
    pub prev_state: bool,
    /// How long the hold that ended this frame lasted.
    pub last_hold: f32,
}

impl InputState {
    /// Advance one frame with the current raw state.
    pub fn update(&mut self, down: bool, delta_time: f32) {
        self.pressed = down && !self.prev_state;
        self.released = !down && self.prev_state;
        self.held = down;
        self.prev_state = down;

        if self.released {
            self.last_hold = self.duration;
        }
        if self.held {
            self.duration += delta_time.max(0.0);
        } else {
            self.duration = 0.0;
        }
    }

    /// Drop all state, as if the input had never been touched.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Scale a hold of `duration` seconds towards `hold_time` onto `0..=255`.
///
/// Returns 255 once the hold is complete and 0 for a non-positive
/// `hold_time`.
pub fn hold_progress(duration: f32, hold_time: f32) -> u8 {
    if hold_time.is_nan() || duration.is_nan() || hold_time <= 0.0 || duration <= 0.0 {
        return 0;
    }
    let fraction = (duration / hold_time).min(1.0);
    (fraction * f32::from(u8::MAX)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_index() {
        for (i, event) in InputEvent::ALL.iter().enumerate() {
            assert_eq!(event.index(), i);
        }
        assert_eq!(InputEvent::CycleDisplayMode.to_string(), "cycle-display-mode");
    }

    #[test]
    fn test_edges_and_duration() {
        let mut state = InputState::default();

        state.update(true, 0.1);
        assert!(state.pressed && state.held && !state.released);
        assert!((state.duration - 0.1).abs() < 1e-6);

        state.update(true, 0.1);
        assert!(!state.pressed && state.held);
        assert!((state.duration - 0.2).abs() < 1e-6);

        state.update(false, 0.1);
        assert!(state.released && !state.held && !state.pressed);
        assert_eq!(state.duration, 0.0);
        assert!((state.last_hold - 0.2).abs() < 1e-6);

        state.update(false, 0.1);
        assert!(!state.released);
    }

    #[test]
    fn test_hold_progress() {
        assert_eq!(hold_progress(0.0, 1.0), 0);
        assert_eq!(hold_progress(0.5, 1.0), 128);
        assert_eq!(hold_progress(1.0, 1.0), 255);
        assert_eq!(hold_progress(7.0, 1.0), 255);
        assert_eq!(hold_progress(0.5, 0.0), 0);
        assert_eq!(hold_progress(f32::NAN, 1.0), 0);
        // A quarter of a second is far from the full hold.
        assert!(hold_progress(0.255, 1.0) < 128);
    }
}
