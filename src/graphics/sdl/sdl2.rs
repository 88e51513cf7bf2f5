//!
//! SDL2 display backend.
//!
//! **Supported:**
//! - Resizable window creation with a minimum size
//! - Windowed, borderless (desktop fullscreen) and exclusive fullscreen modes
//! - Presenting the software composite, stretched to the window
//! - Keyboard, quit and window resize events
//!
//! **NOT Supported:**
//! - Drawing on the GPU (all drawing happens on indexed layers in software)
//! - Mouse input
//!
//! The composite is uploaded into a streaming texture every frame and copied
//! over the whole render target with nearest-neighbour filtering. Textures are
//! created per frame to avoid tying their lifetime to the backend.
//!

use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Scancode,
    pixels::PixelFormatEnum,
    render::{TextureAccess, WindowCanvas},
    video::{FullscreenType, WindowPos},
    EventPump, Sdl, VideoSubsystem,
};

use crate::graphics::coords::DisplayMode;
use crate::graphics::sdl::common::{
    DisplayBackend, DriverConfig, DriverError, DriverResult, GraphicsEvent, Key,
};
use crate::graphics::surface::CompositeSurface;

/// Pixel format of the composite surface.
const PIXEL_FORMAT: PixelFormatEnum = PixelFormatEnum::ARGB8888;

/// SDL2 window plus software-composite presenter.
///
/// # Thread Safety
///
/// SDL2 must be initialized on the main thread. Methods that interact with
/// SDL should be called from the same thread that created the backend.
pub struct SdlBackend {
    /// SDL2 context.
    sdl_context: Option<Sdl>,
    /// Video subsystem.
    video_subsystem: Option<VideoSubsystem>,
    /// Canvas owning the window.
    canvas: Option<WindowCanvas>,
    /// Event pump for input handling.
    event_pump: Option<EventPump>,
    /// Reused byte buffer for texture uploads.
    upload: Vec<u8>,
    display_mode: DisplayMode,
}

impl SdlBackend {
    /// Create a new SDL2 backend. Nothing is opened until `open()`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sdl_context: None,
            video_subsystem: None,
            canvas: None,
            event_pump: None,
            upload: Vec::new(),
            display_mode: DisplayMode::Windowed,
        }
    }

    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    fn init_sdl(&mut self, config: &DriverConfig) -> DriverResult<()> {
        log::info!("Initializing SDL2");

        let sdl_context =
            sdl2::init().map_err(|e| DriverError::VideoModeFailed(format!("SDL2 init: {}", e)))?;

        let video_subsystem = sdl_context
            .video()
            .map_err(|e| DriverError::VideoModeFailed(format!("video subsystem: {}", e)))?;

        log::info!(
            "SDL2 video driver: {}",
            video_subsystem.current_video_driver()
        );

        log::info!("Creating window: {}x{}", config.width, config.height);

        let mut window = video_subsystem
            .window(&config.title, config.width, config.height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| DriverError::WindowCreationFailed(e.to_string()))?;

        window
            .set_minimum_size(config.min_width, config.min_height)
            .map_err(|e| DriverError::WindowCreationFailed(format!("minimum size: {}", e)))?;

        let event_pump = sdl_context
            .event_pump()
            .map_err(|e| DriverError::InvalidOperation(format!("event pump: {}", e)))?;

        sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", "nearest");

        let canvas = window
            .into_canvas()
            .software()
            .build()
            .map_err(|e| DriverError::RendererCreationFailed(e.to_string()))?;
        log::info!("SDL2 renderer: {}", canvas.info().name);

        self.sdl_context = Some(sdl_context);
        self.video_subsystem = Some(video_subsystem);
        self.event_pump = Some(event_pump);
        self.canvas = Some(canvas);

        if config.display_mode != DisplayMode::Windowed {
            let restore = (config.width as i32, config.height as i32);
            self.set_display_mode(config.display_mode, restore)?;
        }
        Ok(())
    }

    fn cleanup(&mut self) {
        log::info!("Cleaning up SDL2 backend");

        self.canvas = None;
        self.event_pump = None;
        self.video_subsystem = None;
        self.sdl_context = None;
        self.upload = Vec::new();
        self.display_mode = DisplayMode::Windowed;
    }
}

impl Default for SdlBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SdlBackend {
    fn drop(&mut self) {
        if self.canvas.is_some() {
            log::debug!("SdlBackend dropping, cleaning up resources");
            self.cleanup();
        }
    }
}

fn map_scancode(scancode: Scancode) -> Key {
    match scancode {
        Scancode::Escape => Key::Escape,
        Scancode::F3 => Key::F3,
        Scancode::F9 => Key::F9,
        Scancode::F10 => Key::F10,
        Scancode::F11 => Key::F11,
        Scancode::Up => Key::Up,
        Scancode::Down => Key::Down,
        Scancode::Left => Key::Left,
        Scancode::Right => Key::Right,
        Scancode::Return => Key::Return,
        other => Key::Other(other as i32),
    }
}

impl DisplayBackend for SdlBackend {
    fn open(&mut self, config: &DriverConfig) -> DriverResult<()> {
        if self.is_open() {
            return Err(DriverError::AlreadyInitialized);
        }
        if let Err(err) = self.init_sdl(config) {
            self.cleanup();
            return Err(err);
        }
        log::info!("SDL2 backend initialized successfully");
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        if !self.is_open() {
            return Err(DriverError::NotInitialized);
        }
        self.cleanup();
        log::info!("SDL2 backend shut down");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.canvas.is_some()
    }

    fn window_size(&self) -> DriverResult<(i32, i32)> {
        let canvas = self.canvas.as_ref().ok_or(DriverError::NotInitialized)?;
        let (w, h) = canvas.window().size();
        Ok((w as i32, h as i32))
    }

    fn set_display_mode(&mut self, mode: DisplayMode, restore_size: (i32, i32)) -> DriverResult<()> {
        let canvas = self.canvas.as_mut().ok_or(DriverError::NotInitialized)?;
        let window = canvas.window_mut();

        match mode {
            DisplayMode::Windowed => {
                window
                    .set_fullscreen(FullscreenType::Off)
                    .map_err(|e| DriverError::DisplayModeFailed(format!("unset fullscreen: {}", e)))?;
                let (w, h) = restore_size;
                if w > 0 && h > 0 {
                    window
                        .set_size(w as u32, h as u32)
                        .map_err(|e| DriverError::DisplayModeFailed(format!("set size: {}", e)))?;
                    window.set_position(WindowPos::Centered, WindowPos::Centered);
                }
                log::info!("Switched to windowed mode: {}x{}", w, h);
            }
            DisplayMode::Borderless => {
                window
                    .set_fullscreen(FullscreenType::Desktop)
                    .map_err(|e| DriverError::DisplayModeFailed(format!("set borderless: {}", e)))?;
                log::info!("Switched to borderless mode");
            }
            DisplayMode::Fullscreen => {
                window
                    .set_fullscreen(FullscreenType::True)
                    .map_err(|e| DriverError::DisplayModeFailed(format!("set fullscreen: {}", e)))?;
                log::info!("Switched to fullscreen mode");
            }
        }

        self.display_mode = mode;
        Ok(())
    }

    fn present(&mut self, composite: &CompositeSurface) -> DriverResult<()> {
        let canvas = self.canvas.as_mut().ok_or(DriverError::NotInitialized)?;
        let texture_creator = canvas.texture_creator();

        let (width, height) = (composite.width() as u32, composite.height() as u32);
        let mut texture = texture_creator
            .create_texture(PIXEL_FORMAT, TextureAccess::Streaming, width, height)
            .map_err(|e| DriverError::PresentFailed(format!("composite texture: {}", e)))?;

        composite.write_ne_bytes(&mut self.upload);
        texture
            .update(None, &self.upload, width as usize * 4)
            .map_err(|e| DriverError::PresentFailed(format!("texture update: {}", e)))?;

        canvas.set_draw_color(sdl2::pixels::Color::RGB(0, 0, 0));
        canvas.clear();
        canvas
            .copy(&texture, None, None)
            .map_err(|e| DriverError::PresentFailed(format!("render copy: {}", e)))?;
        canvas.present();

        Ok(())
    }

    fn poll_events(&mut self) -> DriverResult<Vec<GraphicsEvent>> {
        let event_pump = self
            .event_pump
            .as_mut()
            .ok_or(DriverError::NotInitialized)?;

        let mut events = Vec::new();

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => {
                    events.push(GraphicsEvent::Quit);
                }
                Event::KeyDown {
                    scancode: Some(scancode),
                    repeat: false,
                    ..
                } => {
                    events.push(GraphicsEvent::KeyDown(map_scancode(scancode)));
                }
                Event::KeyDown { .. } => {}
                Event::KeyUp {
                    scancode: Some(scancode),
                    ..
                } => {
                    events.push(GraphicsEvent::KeyUp(map_scancode(scancode)));
                }
                Event::KeyUp { .. } => {}
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::SizeChanged(w, h) => {
                        log::debug!("Window resized to {}x{}", w, h);
                        events.push(GraphicsEvent::Resized(w, h));
                    }
                    WindowEvent::FocusGained => {
                        log::debug!("Window focus gained");
                        events.push(GraphicsEvent::WindowEvent);
                    }
                    WindowEvent::FocusLost => {
                        log::debug!("Window focus lost");
                        events.push(GraphicsEvent::WindowEvent);
                    }
                    _ => events.push(GraphicsEvent::WindowEvent),
                },
                _ => {
                    events.push(GraphicsEvent::Unknown);
                }
            }
        }

        Ok(events)
    }
}
