//! Keyboard bindings
//!
//! Maps backend keys to logical events and tracks which keys are down.

use std::collections::{HashMap, HashSet};

use crate::graphics::sdl::{GraphicsEvent, Key};
use crate::input::state::InputEvent;

/// Key-to-event table plus the set of keys currently down.
#[derive(Debug, Clone)]
pub struct KeyboardBindings {
    bindings: HashMap<Key, InputEvent>,
    down: HashSet<Key>,
}

impl Default for KeyboardBindings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl KeyboardBindings {
    /// Empty table.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            down: HashSet::new(),
        }
    }

    /// Arrows for directions, Return for start, Escape for quit and the
    /// function keys for the display hotkeys.
    pub fn with_defaults() -> Self {
        let mut keyboard = Self::new();
        keyboard.bind(Key::Up, InputEvent::Up);
        keyboard.bind(Key::Right, InputEvent::Right);
        keyboard.bind(Key::Down, InputEvent::Down);
        keyboard.bind(Key::Left, InputEvent::Left);
        keyboard.bind(Key::Return, InputEvent::Start);
        keyboard.bind(Key::Escape, InputEvent::Quit);
        keyboard.bind(Key::F3, InputEvent::ToggleFps);
        keyboard.bind(Key::F9, InputEvent::ToggleResolution);
        keyboard.bind(Key::F10, InputEvent::ToggleResizeMode);
        keyboard.bind(Key::F11, InputEvent::CycleDisplayMode);
        keyboard
    }

    /// Bind `key` to `event`, replacing any previous binding of that key.
    /// Several keys may drive the same event.
    pub fn bind(&mut self, key: Key, event: InputEvent) -> Option<InputEvent> {
        self.bindings.insert(key, event)
    }

    pub fn unbind(&mut self, key: Key) -> Option<InputEvent> {
        self.down.remove(&key);
        self.bindings.remove(&key)
    }

    pub fn binding(&self, key: Key) -> Option<InputEvent> {
        self.bindings.get(&key).copied()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Track key state from a backend event. Returns `true` if the event
    /// was a key event for a bound key.
    pub fn handle_event(&mut self, event: &GraphicsEvent) -> bool {
        let (key, down) = match *event {
            GraphicsEvent::KeyDown(key) => (key, true),
            GraphicsEvent::KeyUp(key) => (key, false),
            _ => return false,
        };
        if !self.bindings.contains_key(&key) {
            return false;
        }
        if down {
            self.down.insert(key);
        } else {
            self.down.remove(&key);
        }
        true
    }

    /// Whether any key bound to `event` is down.
    pub fn is_raw_pressed(&self, event: InputEvent) -> bool {
        self.down
            .iter()
            .any(|key| self.bindings.get(key) == Some(&event))
    }

    /// Forget which keys are down, e.g. after focus loss.
    pub fn release_all(&mut self) {
        self.down.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_hotkeys() {
        let keyboard = KeyboardBindings::default();
        assert_eq!(keyboard.binding(Key::Escape), Some(InputEvent::Quit));
        assert_eq!(keyboard.binding(Key::F11), Some(InputEvent::CycleDisplayMode));
        assert_eq!(keyboard.binding(Key::Other(4)), None);
        assert_eq!(keyboard.binding_count(), 10);
    }

    #[test]
    fn test_key_state_follows_events() {
        let mut keyboard = KeyboardBindings::default();
        assert!(keyboard.handle_event(&GraphicsEvent::KeyDown(Key::Escape)));
        assert!(keyboard.is_raw_pressed(InputEvent::Quit));
        assert!(!keyboard.is_raw_pressed(InputEvent::Start));

        assert!(keyboard.handle_event(&GraphicsEvent::KeyUp(Key::Escape)));
        assert!(!keyboard.is_raw_pressed(InputEvent::Quit));

        assert!(!keyboard.handle_event(&GraphicsEvent::KeyDown(Key::Other(4))));
        assert!(!keyboard.handle_event(&GraphicsEvent::Quit));
    }

    #[test]
    fn test_two_keys_one_event() {
        let mut keyboard = KeyboardBindings::default();
        keyboard.bind(Key::Other(26), InputEvent::Up);
        keyboard.handle_event(&GraphicsEvent::KeyDown(Key::Up));
        keyboard.handle_event(&GraphicsEvent::KeyDown(Key::Other(26)));
        keyboard.handle_event(&GraphicsEvent::KeyUp(Key::Up));
        assert!(keyboard.is_raw_pressed(InputEvent::Up));

        keyboard.unbind(Key::Other(26));
        assert!(!keyboard.is_raw_pressed(InputEvent::Up));
    }
}
