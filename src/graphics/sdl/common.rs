//!
//! Common types, traits, and errors for display backends.
//!
//! The renderer composites every frame in software and hands the finished
//! ARGB8888 buffer to a [`DisplayBackend`], which owns the window, stretches
//! the buffer to the window and translates platform events.
//!

use std::fmt;

use crate::graphics::coords::DisplayMode;
use crate::graphics::surface::CompositeSurface;

/// Error types for backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Backend not opened.
    NotInitialized,
    /// Backend already opened.
    AlreadyInitialized,
    /// Video subsystem initialization failed.
    VideoModeFailed(String),
    /// Window creation failed.
    WindowCreationFailed(String),
    /// Renderer creation failed.
    RendererCreationFailed(String),
    /// Switching between windowed, borderless and fullscreen failed.
    DisplayModeFailed(String),
    /// Uploading or presenting a frame failed.
    PresentFailed(String),
    /// Invalid operation for current state.
    InvalidOperation(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "Display backend not initialized"),
            Self::AlreadyInitialized => write!(f, "Display backend already initialized"),
            Self::VideoModeFailed(msg) => write!(f, "Video mode configuration failed: {}", msg),
            Self::WindowCreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
            Self::RendererCreationFailed(msg) => write!(f, "Renderer creation failed: {}", msg),
            Self::DisplayModeFailed(msg) => write!(f, "Display mode change failed: {}", msg),
            Self::PresentFailed(msg) => write!(f, "Present failed: {}", msg),
            Self::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

/// Result type for backend operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Keys the runtime reacts to. Everything else arrives as `Other` with the
/// platform scancode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    F3,
    F9,
    F10,
    F11,
    Up,
    Down,
    Left,
    Right,
    Return,
    Other(i32),
}

/// Backend-neutral event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsEvent {
    /// Quit event (window close, quit command, etc.).
    Quit,
    /// Key press. Repeats are filtered by the backend.
    KeyDown(Key),
    KeyUp(Key),
    /// Window size changed to the given physical size.
    Resized(i32, i32),
    /// Other window event (expose, focus, etc.).
    WindowEvent,
    /// Unknown/other event.
    Unknown,
}

/// Window configuration used when opening a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub title: String,
    /// Initial window width in pixels.
    pub width: u32,
    /// Initial window height in pixels.
    pub height: u32,
    /// Smallest size the user may shrink the window to.
    pub min_width: u32,
    pub min_height: u32,
    pub display_mode: DisplayMode,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::windowed(854, 480)
    }
}

impl DriverConfig {
    /// Resizable window of the given size.
    #[must_use]
    pub fn windowed(width: u32, height: u32) -> Self {
        Self {
            title: format!("teaf v{}", env!("CARGO_PKG_VERSION")),
            width,
            height,
            min_width: 1,
            min_height: 1,
            display_mode: DisplayMode::Windowed,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub const fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    #[must_use]
    pub const fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    #[must_use]
    pub const fn is_fullscreen(&self) -> bool {
        self.display_mode.is_fullscreen()
    }
}

/// Trait for display backends.
///
/// A backend owns the platform window. The renderer never touches platform
/// surfaces directly: it asks the backend for the window size, switches its
/// display mode and hands it finished frames.
pub trait DisplayBackend {
    /// Open the window.
    fn open(&mut self, config: &DriverConfig) -> DriverResult<()>;

    /// Close the window and release platform resources.
    fn close(&mut self) -> DriverResult<()>;

    #[must_use]
    fn is_open(&self) -> bool;

    /// Current physical window size.
    fn window_size(&self) -> DriverResult<(i32, i32)>;

    /// Switch display mode. When switching to `Windowed`, the window is
    /// resized to `restore_size`.
    fn set_display_mode(&mut self, mode: DisplayMode, restore_size: (i32, i32)) -> DriverResult<()>;

    /// Stretch `composite` over the whole window and show it.
    fn present(&mut self, composite: &CompositeSurface) -> DriverResult<()>;

    /// Drain pending platform events.
    fn poll_events(&mut self) -> DriverResult<Vec<GraphicsEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_config_default() {
        let config = DriverConfig::default();
        assert_eq!(config.width, 854);
        assert_eq!(config.height, 480);
        assert!(!config.is_fullscreen());
        assert!(config.title.starts_with("teaf v"));
    }

    #[test]
    fn test_driver_config_builders() {
        let config = DriverConfig::windowed(1280, 720)
            .with_title("demo")
            .with_min_size(640, 480)
            .with_display_mode(DisplayMode::Borderless);
        assert_eq!(config.title, "demo");
        assert_eq!((config.min_width, config.min_height), (640, 480));
        assert!(config.is_fullscreen());
    }

    #[test]
    fn test_driver_error_display() {
        assert_eq!(
            DriverError::NotInitialized.to_string(),
            "Display backend not initialized"
        );
        assert_eq!(
            DriverError::DisplayModeFailed("nope".into()).to_string(),
            "Display mode change failed: nope"
        );
    }
}
