//! Null (headless) display backend
//!
//! Keeps a virtual window in memory instead of opening a platform one. Every
//! presented frame is stretched to the virtual window size and recorded in a
//! shared [`NullRecorder`], so tests and tooling can drive the renderer and
//! inspect its output without a display.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::graphics::coords::DisplayMode;
use crate::graphics::sdl::common::{
    DisplayBackend, DriverConfig, DriverError, DriverResult, GraphicsEvent,
};
use crate::graphics::surface::CompositeSurface;

/// Size reported for borderless and fullscreen modes unless overridden.
pub const DEFAULT_DESKTOP_SIZE: (i32, i32) = (1920, 1080);

/// Observable state of a [`NullBackend`].
#[derive(Debug, Default)]
pub struct NullRecorder {
    pub open: bool,
    pub window_size: (i32, i32),
    pub min_size: (i32, i32),
    pub display_mode: DisplayMode,
    /// Number of frames presented since open.
    pub presented: usize,
    /// Size of the last composite handed to `present`.
    pub last_source_size: (i32, i32),
    /// Last presented frame, stretched to the window.
    pub last_frame: Option<CompositeSurface>,
    /// Every display mode switch with its restore size.
    pub mode_changes: Vec<(DisplayMode, (i32, i32))>,
    pending_events: VecDeque<GraphicsEvent>,
}

impl NullRecorder {
    /// Queue an event for the next `poll_events`.
    pub fn push_event(&mut self, event: GraphicsEvent) {
        self.pending_events.push_back(event);
    }

    /// Change the virtual window size the way a user drag would: the size
    /// changes at once and a `Resized` event is queued.
    pub fn resize_window(&mut self, width: i32, height: i32) {
        self.window_size = (width, height);
        self.pending_events
            .push_back(GraphicsEvent::Resized(width, height));
    }

    pub fn pending_event_count(&self) -> usize {
        self.pending_events.len()
    }

    /// Pixel of the last presented frame in window coordinates.
    pub fn frame_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.last_frame.as_ref().and_then(|f| f.get(x, y))
    }
}

/// Shared handle to a recorder.
pub type SharedRecorder = Arc<Mutex<NullRecorder>>;

/// Headless display backend.
pub struct NullBackend {
    recorder: SharedRecorder,
    desktop_size: (i32, i32),
}

impl NullBackend {
    pub fn new() -> Self {
        Self::with_desktop_size(DEFAULT_DESKTOP_SIZE.0, DEFAULT_DESKTOP_SIZE.1)
    }

    /// Backend whose fullscreen modes report the given size.
    pub fn with_desktop_size(width: i32, height: i32) -> Self {
        Self {
            recorder: Arc::new(Mutex::new(NullRecorder::default())),
            desktop_size: (width, height),
        }
    }

    /// Handle to the shared recorder. Clone it before boxing the backend.
    pub fn recorder(&self) -> SharedRecorder {
        Arc::clone(&self.recorder)
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for NullBackend {
    fn open(&mut self, config: &DriverConfig) -> DriverResult<()> {
        let mut recorder = self.recorder.lock();
        if recorder.open {
            return Err(DriverError::AlreadyInitialized);
        }
        if config.width == 0 || config.height == 0 {
            return Err(DriverError::WindowCreationFailed(format!(
                "invalid window size {}x{}",
                config.width, config.height
            )));
        }
        recorder.open = true;
        recorder.window_size = if config.display_mode.is_fullscreen() {
            self.desktop_size
        } else {
            (config.width as i32, config.height as i32)
        };
        recorder.min_size = (config.min_width as i32, config.min_height as i32);
        recorder.display_mode = config.display_mode;
        recorder.presented = 0;
        log::debug!(
            "null backend opened at {}x{}",
            recorder.window_size.0,
            recorder.window_size.1
        );
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        let mut recorder = self.recorder.lock();
        if !recorder.open {
            return Err(DriverError::NotInitialized);
        }
        recorder.open = false;
        recorder.pending_events.clear();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.recorder.lock().open
    }

    fn window_size(&self) -> DriverResult<(i32, i32)> {
        let recorder = self.recorder.lock();
        if !recorder.open {
            return Err(DriverError::NotInitialized);
        }
        Ok(recorder.window_size)
    }

    fn set_display_mode(&mut self, mode: DisplayMode, restore_size: (i32, i32)) -> DriverResult<()> {
        let mut recorder = self.recorder.lock();
        if !recorder.open {
            return Err(DriverError::NotInitialized);
        }
        let size = match mode {
            DisplayMode::Windowed if restore_size.0 > 0 && restore_size.1 > 0 => {
                (
                    restore_size.0.max(recorder.min_size.0),
                    restore_size.1.max(recorder.min_size.1),
                )
            }
            DisplayMode::Windowed => recorder.window_size,
            DisplayMode::Borderless | DisplayMode::Fullscreen => self.desktop_size,
        };
        recorder.display_mode = mode;
        recorder.mode_changes.push((mode, restore_size));
        if size != recorder.window_size {
            recorder.resize_window(size.0, size.1);
        }
        Ok(())
    }

    fn present(&mut self, composite: &CompositeSurface) -> DriverResult<()> {
        let mut recorder = self.recorder.lock();
        if !recorder.open {
            return Err(DriverError::NotInitialized);
        }
        let (w, h) = recorder.window_size;
        let frame = if (w, h) == (composite.width(), composite.height()) {
            composite.clone()
        } else {
            composite
                .stretch_into(w, h)
                .map_err(|e| DriverError::PresentFailed(e.to_string()))?
        };
        recorder.last_source_size = (composite.width(), composite.height());
        recorder.last_frame = Some(frame);
        recorder.presented += 1;
        Ok(())
    }

    fn poll_events(&mut self) -> DriverResult<Vec<GraphicsEvent>> {
        let mut recorder = self.recorder.lock();
        if !recorder.open {
            return Err(DriverError::NotInitialized);
        }
        Ok(recorder.pending_events.drain(..).collect())
    }
}
