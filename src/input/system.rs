//! Input system state: devices, context and per-frame update.

use thiserror::Error;

use crate::graphics::sdl::GraphicsEvent;
use crate::input::keyboard::KeyboardBindings;
use crate::input::state::{InputEvent, InputState};

/// Number of device slots, keyboard included.
pub const MAX_INPUT_DEVICES: usize = 4;

/// Device id of the keyboard. Always connected.
pub const KEYBOARD_DEVICE: usize = 0;

/// Frames a pad may stay disconnected before its info is forgotten.
pub const STALE_DEVICE_FRAMES: u64 = 1800;

/// Default window for [`InputSystem::pressed_buffered`], in seconds.
pub const DEFAULT_BUFFER_TIME: f32 = 0.1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("device id {0} is out of range")]
    InvalidDevice(usize),
    #[error("device {0} is the keyboard")]
    KeyboardDevice(usize),
    #[error("device {0} is not connected")]
    NotConnected(usize),
}

/// Which part of the game currently receives presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameContext {
    #[default]
    Title,
    Menu,
    DeviceSelect,
    Play,
    Dialog,
}

impl GameContext {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Menu => "menu",
            Self::DeviceSelect => "device-select",
            Self::Play => "play",
            Self::Dialog => "dialog",
        }
    }
}

/// Remembered identity of a device, kept across disconnects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
}

#[derive(Debug, Clone)]
struct InputDevice {
    connected: bool,
    info: Option<DeviceInfo>,
    states: [InputState; InputEvent::COUNT],
    /// Raw state for pads, pushed in by the caller.
    raw: [bool; InputEvent::COUNT],
    last_seen_frame: u64,
}

impl InputDevice {
    fn new() -> Self {
        Self {
            connected: false,
            info: None,
            states: [InputState::default(); InputEvent::COUNT],
            raw: [false; InputEvent::COUNT],
            last_seen_frame: 0,
        }
    }

    fn state(&self, event: InputEvent) -> Option<&InputState> {
        self.connected.then(|| &self.states[event.index()])
    }
}

/// A press seen by [`InputSystem::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputPress {
    pub event: InputEvent,
    pub device: usize,
    pub context: GameContext,
    pub state: InputState,
}

/// Per-device input state for every logical event.
#[derive(Debug, Clone)]
pub struct InputSystem {
    devices: Vec<InputDevice>,
    keyboard: KeyboardBindings,
    context: GameContext,
    players: [Option<usize>; 2],
    frame_count: u64,
    buffer_time: f32,
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSystem {
    /// Keyboard connected with default bindings, pad slots empty.
    pub fn new() -> Self {
        Self::with_keyboard(KeyboardBindings::with_defaults())
    }

    pub fn with_keyboard(keyboard: KeyboardBindings) -> Self {
        let mut devices = vec![InputDevice::new(); MAX_INPUT_DEVICES];
        devices[KEYBOARD_DEVICE].connected = true;
        devices[KEYBOARD_DEVICE].info = Some(DeviceInfo {
            name: "keyboard".to_string(),
        });
        Self {
            devices,
            keyboard,
            context: GameContext::default(),
            players: [None; 2],
            frame_count: 0,
            buffer_time: DEFAULT_BUFFER_TIME,
        }
    }

    pub fn keyboard(&self) -> &KeyboardBindings {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardBindings {
        &mut self.keyboard
    }

    /// Feed a backend event. Key events update the keyboard's raw state;
    /// the rest are ignored. Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &GraphicsEvent) -> bool {
        self.keyboard.handle_event(event)
    }

    /// Attach a pad to `device`. Reconnecting keeps its state slots.
    pub fn connect_device(&mut self, device: usize, info: DeviceInfo) -> Result<(), InputError> {
        let slot = self.pad_mut(device)?;
        slot.connected = true;
        log::info!("device {} connected: {}", device, info.name);
        slot.info = Some(info);
        Ok(())
    }

    /// Detach a pad. Its info is remembered for a while so a reconnect can
    /// be matched back to the same slot.
    pub fn disconnect_device(&mut self, device: usize) -> Result<(), InputError> {
        let frame = self.frame_count;
        let slot = self.pad_mut(device)?;
        if !slot.connected {
            return Err(InputError::NotConnected(device));
        }
        slot.connected = false;
        slot.raw = [false; InputEvent::COUNT];
        for state in &mut slot.states {
            state.clear();
        }
        slot.last_seen_frame = frame;
        log::info!("device {} disconnected", device);
        Ok(())
    }

    /// Push the raw state of one event on a pad.
    pub fn set_device_input(&mut self, device: usize, event: InputEvent, down: bool) -> Result<(), InputError> {
        let slot = self.pad_mut(device)?;
        if !slot.connected {
            return Err(InputError::NotConnected(device));
        }
        slot.raw[event.index()] = down;
        Ok(())
    }

    /// Slot holding a remembered device with this name.
    pub fn find_device(&self, name: &str) -> Option<usize> {
        self.devices
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, d)| d.info.as_ref().is_some_and(|i| i.name == name))
            .map(|(id, _)| id)
    }

    pub fn device_info(&self, device: usize) -> Option<&DeviceInfo> {
        self.devices.get(device)?.info.as_ref()
    }

    pub fn is_device_connected(&self, device: usize) -> bool {
        self.devices.get(device).is_some_and(|d| d.connected)
    }

    fn pad_mut(&mut self, device: usize) -> Result<&mut InputDevice, InputError> {
        if device == KEYBOARD_DEVICE {
            return Err(InputError::KeyboardDevice(device));
        }
        self.devices
            .get_mut(device)
            .ok_or(InputError::InvalidDevice(device))
    }

    /// Advance one frame: edge detection and hold durations on every
    /// connected device. Returns the events that went down this frame.
    pub fn update(&mut self, delta_time: f32) -> Vec<InputPress> {
        self.frame_count += 1;
        let frame = self.frame_count;
        let mut presses = Vec::new();

        for (id, device) in self.devices.iter_mut().enumerate() {
            if !device.connected {
                continue;
            }
            device.last_seen_frame = frame;
            for event in InputEvent::ALL {
                let down = if id == KEYBOARD_DEVICE {
                    self.keyboard.is_raw_pressed(event)
                } else {
                    device.raw[event.index()]
                };
                let state = &mut device.states[event.index()];
                state.update(down, delta_time);
                if state.pressed {
                    log::trace!("[{}] {} pressed in {}", id, event, self.context.name());
                    presses.push(InputPress {
                        event,
                        device: id,
                        context: self.context,
                        state: *state,
                    });
                }
            }
        }

        if frame % STALE_DEVICE_FRAMES == 0 {
            self.forget_stale_devices();
        }
        presses
    }

    fn forget_stale_devices(&mut self) {
        let frame = self.frame_count;
        for (id, device) in self.devices.iter_mut().enumerate().skip(1) {
            if !device.connected
                && device.info.is_some()
                && frame - device.last_seen_frame > STALE_DEVICE_FRAMES
            {
                log::debug!("forgetting stale device {}", id);
                device.info = None;
            }
        }
    }

    fn state(&self, event: InputEvent, device: usize) -> Option<&InputState> {
        self.devices.get(device)?.state(event)
    }

    pub fn is_pressed(&self, event: InputEvent, device: usize) -> bool {
        self.state(event, device).is_some_and(|s| s.pressed)
    }

    pub fn is_held(&self, event: InputEvent, device: usize) -> bool {
        self.state(event, device).is_some_and(|s| s.held)
    }

    pub fn is_released(&self, event: InputEvent, device: usize) -> bool {
        self.state(event, device).is_some_and(|s| s.released)
    }

    /// Seconds `event` has been held on `device`; 0 if up or unknown.
    pub fn duration(&self, event: InputEvent, device: usize) -> f32 {
        self.state(event, device).map_or(0.0, |s| s.duration)
    }

    /// Pressed this frame, or tapped: released this frame after a hold no
    /// longer than the buffer time.
    pub fn pressed_buffered(&self, event: InputEvent, device: usize) -> bool {
        self.state(event, device)
            .is_some_and(|s| s.pressed || (s.released && s.last_hold <= self.buffer_time))
    }

    pub fn set_buffer_time(&mut self, seconds: f32) {
        self.buffer_time = seconds.max(0.0);
    }

    /// `secondary` pressed while `primary` is held.
    pub fn combo_pressed(&self, primary: InputEvent, secondary: InputEvent, device: usize) -> bool {
        self.is_held(primary, device) && self.is_pressed(secondary, device)
    }

    pub fn context(&self) -> GameContext {
        self.context
    }

    pub fn set_context(&mut self, context: GameContext) {
        if self.context != context {
            log::debug!("input context changed to {}", context.name());
            self.context = context;
        }
    }

    /// Assign a device to player 1 or 2. Other player numbers are ignored.
    pub fn set_player_device(&mut self, player: usize, device: Option<usize>) {
        match self.players.get_mut(player.wrapping_sub(1)) {
            Some(slot) => {
                *slot = device;
                log::info!("player {} assigned to device {:?}", player, device);
            }
            None => log::warn!("no player {}", player),
        }
    }

    pub fn player_device(&self, player: usize) -> Option<usize> {
        self.players.get(player.wrapping_sub(1)).copied().flatten()
    }

    /// Player (1 or 2) that owns `device`, if any.
    pub fn player_for_device(&self, device: usize) -> Option<usize> {
        self.players
            .iter()
            .position(|&d| d == Some(device))
            .map(|i| i + 1)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
