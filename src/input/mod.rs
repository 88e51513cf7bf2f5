//! Device-abstracted input
//!
//! Raw key and button state from every device is folded into per-device
//! [`InputState`]s indexed by logical [`InputEvent`]. Game code asks whether
//! an event was pressed, held or released this frame on a given device, and
//! for how long it has been held.
//!
//! # Architecture
//!
//! - Device 0 is always the keyboard. It is fed from backend
//!   [`GraphicsEvent`](crate::graphics::sdl::GraphicsEvent)s through
//!   [`KeyboardBindings`].
//! - Devices 1.. are pads. They connect and disconnect at runtime and their
//!   raw state is pushed in by whoever polls the hardware.
//! - [`InputSystem::update`] runs once per frame, performs edge detection and
//!   returns the events freshly pressed this frame, tagged with the active
//!   [`GameContext`].

pub mod keyboard;
pub mod state;
pub mod system;

pub use keyboard::KeyboardBindings;
pub use state::{hold_progress, InputEvent, InputState};
pub use system::{
    DeviceInfo, GameContext, InputError, InputPress, InputSystem, KEYBOARD_DEVICE,
    MAX_INPUT_DEVICES,
};
