//! Layered software renderer.
//!
//! The [`Renderer`] owns the display backend, the coordinate mapper, the layer
//! stack and the truecolor composite. Game code draws onto indexed layers in
//! logical units from inside a [`Scene`]; [`Renderer::present`] clears the
//! layers, runs the scene, blends the visible layers in creation order and
//! hands the composite to the backend.
//!
//! Nothing works before [`Renderer::init`] or after [`Renderer::cleanup`]:
//! mutators and drawing calls are silent no-ops and queries return defaults.

use std::time::Instant;

use thiserror::Error;

use crate::graphics::coords::{
    is_valid_scale, CoordinateMapper, DisplayMode, DisplayResolution, ResizeMode,
    GAME_HEIGHT_FWVGA, GAME_WIDTH_FWVGA, MAX_SCALE, MIN_SCALE,
};
use crate::graphics::debounce::{DebounceStatus, ResizeDebouncer};
use crate::graphics::draw::LayerCanvas;
use crate::graphics::layer::{
    self, Layer, LayerError, LayerHandle, LayerStack, SurfaceSizes, INITIAL_LAYER_CAPACITY,
    MAX_LAYER_SIZE,
};
use crate::graphics::palette::{self, PALETTE_SIZE, PALETTE_TRANSPARENT};
use crate::graphics::rect::{Point, Rect};
use crate::graphics::sdl::common::{DisplayBackend, DriverConfig, DriverError, GraphicsEvent};
use crate::graphics::sheets::{Font, ImageData, SheetLibrary, Sprite};
use crate::graphics::surface::{CompositeSurface, IndexedSurface, SurfaceError};

/// Text shown on the system layer while quit is held.
pub const QUIT_MESSAGE: &str = "Quitting game...";

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("renderer is already initialized")]
    AlreadyInitialized,
    #[error("scale factor {0} is outside the supported range")]
    InvalidScale(f32),
    #[error("clear color {0} is not a palette index")]
    InvalidClearColor(u8),
    #[error("display backend error: {0}")]
    Backend(#[from] DriverError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("layer creation failed: {0}")]
    Layer(#[from] LayerError),
}

/// Per-frame scene callback.
pub trait Scene {
    fn render(&mut self, renderer: &mut Renderer);
}

impl<F> Scene for F
where
    F: FnMut(&mut Renderer),
{
    fn render(&mut self, renderer: &mut Renderer) {
        self(renderer)
    }
}

/// Diagnostic lines the renderer can draw on the system layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemData {
    CurrentFps,
    AverageFps,
    LayerCount,
}

impl SystemData {
    pub const ALL: [SystemData; 3] = [Self::CurrentFps, Self::AverageFps, Self::LayerCount];

    const fn bit(self) -> u8 {
        match self {
            Self::CurrentFps => 1 << 0,
            Self::AverageFps => 1 << 1,
            Self::LayerCount => 1 << 2,
        }
    }
}

/// Startup settings for [`Renderer::init`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub resolution: DisplayResolution,
    pub resize_mode: ResizeMode,
    pub display_mode: DisplayMode,
    /// Initial window scale; also the scale used in fixed resize mode.
    pub scale: f32,
    pub clear_color: u8,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            resolution: DisplayResolution::Vga,
            resize_mode: ResizeMode::Fit,
            display_mode: DisplayMode::Windowed,
            scale: 1.0,
            clear_color: palette::DEFAULT_CLEAR_COLOR,
        }
    }
}

struct RendererState {
    backend: Box<dyn DisplayBackend>,
    mapper: CoordinateMapper,
    last_windowed_size: (i32, i32),
    clear_color: u8,
    transparent_color: u8,
    colors: [u32; PALETTE_SIZE],
    composite: CompositeSurface,
    layers: LayerStack,
    debouncer: ResizeDebouncer,
    bg_layer: LayerHandle,
    system_layer: LayerHandle,
    system_data: u8,
    quit_active: bool,
    current_fps: f32,
    average_fps: f32,
    sheets: SheetLibrary,
    recreations: u64,
}

impl RendererState {
    fn surface_sizes(&self) -> SurfaceSizes {
        let screen = self.mapper.screen();
        let viewport = self.mapper.visible_viewport();
        SurfaceSizes {
            window: (screen.w.max(1), screen.h.max(1)),
            viewport: (viewport.w.max(1), viewport.h.max(1)),
        }
    }

    /// Rebuild the composite and every layer surface for the current mapping.
    /// Everything is allocated before anything is replaced, so a failure
    /// keeps the previous surfaces.
    fn recreate_surfaces(&mut self) -> Result<(), SurfaceError> {
        let sizes = self.surface_sizes();
        let composite = CompositeSurface::new(sizes.window.0, sizes.window.1)?;
        let surfaces = self.layers.allocate_surfaces(&sizes)?;
        self.composite = composite;
        self.layers.install_surfaces(surfaces);
        self.recreations += 1;
        log::debug!(
            "surfaces recreated: window {}x{}, viewport {}",
            sizes.window.0,
            sizes.window.1,
            self.mapper.viewport()
        );
        Ok(())
    }

    fn clear_frame(&mut self) {
        self.composite.fill(self.colors[self.clear_color as usize]);
        let bg = self.bg_layer;
        for layer in self.layers.iter_mut() {
            let index = if layer.handle() == bg {
                self.clear_color
            } else {
                self.transparent_color
            };
            layer.surface_mut().fill(index);
        }
    }

    fn layer_origin(&self, layer: &Layer) -> Point {
        if layer.can_draw_outside() {
            Point::origin()
        } else {
            self.mapper.visible_viewport().origin()
        }
    }

    fn composite_layers(&mut self) {
        let system = self.system_layer;
        for layer in self.layers.iter() {
            if layer.handle() == system || !layer.is_visible() {
                continue;
            }
            let origin = self.layer_origin(layer);
            self.composite.blend_indexed(
                layer.surface(),
                origin,
                layer.opacity(),
                self.transparent_color,
                &self.colors,
            );
        }
        if let Some(layer) = self.layers.get(system) {
            if layer.is_visible() {
                let origin = self.layer_origin(layer);
                self.composite.blend_indexed(
                    layer.surface(),
                    origin,
                    layer.opacity(),
                    self.transparent_color,
                    &self.colors,
                );
            }
        }
    }

    fn update_system_visibility(&mut self) {
        let visible = self.quit_active || self.system_data != 0;
        if let Some(layer) = self.layers.get_mut(self.system_layer) {
            layer.set_visible(visible);
        }
    }
}

/// Layered software renderer.
#[derive(Default)]
pub struct Renderer {
    state: Option<RendererState>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) => f
                .debug_struct("Renderer")
                .field("window", &state.mapper.screen())
                .field("viewport", &state.mapper.viewport())
                .field("scale", &state.mapper.scale_factor())
                .field("layers", &state.layers.len())
                .finish(),
            None => f.write_str("Renderer(uninitialized)"),
        }
    }
}

fn check_color(color: u8) -> bool {
    if palette::is_valid_index(color) {
        true
    } else {
        log::warn!("rejected color index {} (palette has {} entries)", color, PALETTE_SIZE);
        false
    }
}

impl Renderer {
    /// Create an uninitialized renderer.
    #[must_use]
    pub fn new() -> Self {
        Self { state: None }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Open the backend and build the initial surfaces and layers.
    ///
    /// The window opens at FWVGA size times `config.scale`, never smaller than
    /// the logical canvas. The background layer (first in paint order) and the
    /// hidden system layer are created here; both draw outside the viewport.
    pub fn init(
        &mut self,
        mut backend: Box<dyn DisplayBackend>,
        config: &RendererConfig,
        sheets: SheetLibrary,
    ) -> Result<(), RendererError> {
        if self.state.is_some() {
            log::error!("the renderer is already initialized");
            return Err(RendererError::AlreadyInitialized);
        }
        if !is_valid_scale(config.scale) {
            log::error!(
                "scale factor {} is outside {}..={}",
                config.scale,
                MIN_SCALE,
                MAX_SCALE
            );
            return Err(RendererError::InvalidScale(config.scale));
        }
        if !palette::is_valid_index(config.clear_color) {
            return Err(RendererError::InvalidClearColor(config.clear_color));
        }

        let width = (GAME_WIDTH_FWVGA as f32 * config.scale) as u32;
        let height = (GAME_HEIGHT_FWVGA as f32 * config.scale) as u32;
        let (game_w, game_h) = config.resolution.extent();
        let driver_config = DriverConfig::windowed(width, height)
            .with_min_size(game_w as u32, game_h as u32)
            .with_display_mode(config.display_mode);
        backend.open(&driver_config)?;

        match Self::build_state(backend, config, sheets, (width as i32, height as i32)) {
            Ok(state) => {
                log::info!("renderer initialized");
                log::debug!("window: {}", state.mapper.screen());
                log::debug!("viewport: {}", state.mapper.viewport());
                self.state = Some(state);
                Ok(())
            }
            Err((mut backend, err)) => {
                if let Err(close_err) = backend.close() {
                    log::warn!("backend close failed during init rollback: {}", close_err);
                }
                Err(err)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn build_state(
        backend: Box<dyn DisplayBackend>,
        config: &RendererConfig,
        sheets: SheetLibrary,
        requested_size: (i32, i32),
    ) -> Result<RendererState, (Box<dyn DisplayBackend>, RendererError)> {
        let (screen_w, screen_h) = match backend.window_size() {
            Ok(size) => size,
            Err(err) => return Err((backend, err.into())),
        };

        let mut mapper =
            CoordinateMapper::new(config.resolution, screen_w, screen_h, config.scale);
        mapper.set_resize_mode(config.resize_mode);
        mapper.set_display_mode(config.display_mode);

        let composite = match CompositeSurface::new(screen_w.max(1), screen_h.max(1)) {
            Ok(composite) => composite,
            Err(err) => return Err((backend, err.into())),
        };
        let layers = match LayerStack::with_capacity(INITIAL_LAYER_CAPACITY) {
            Ok(layers) => layers,
            Err(err) => return Err((backend, err.into())),
        };

        let last_windowed_size = if config.display_mode == DisplayMode::Windowed {
            (screen_w, screen_h)
        } else {
            requested_size
        };

        let mut state = RendererState {
            backend,
            mapper,
            last_windowed_size,
            clear_color: config.clear_color,
            transparent_color: PALETTE_TRANSPARENT,
            colors: palette::argb_table(),
            composite,
            layers,
            debouncer: ResizeDebouncer::default(),
            bg_layer: LayerHandle::INVALID,
            system_layer: LayerHandle::INVALID,
            system_data: 0,
            quit_active: false,
            current_fps: 0.0,
            average_fps: 0.0,
            sheets,
            recreations: 0,
        };

        let sizes = state.surface_sizes();
        state.bg_layer = match state.layers.create(true, &sizes) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("could not create background layer: {}", err);
                return Err((state.backend, err.into()));
            }
        };
        state.system_layer = match state.layers.create(true, &sizes) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("could not create system layer: {}", err);
                return Err((state.backend, err.into()));
            }
        };
        state.update_system_visibility();
        Ok(state)
    }

    /// Destroy every layer, free the composite and close the backend.
    pub fn cleanup(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };
        state.layers.clear();
        if let Err(err) = state.backend.close() {
            log::warn!("backend close failed: {}", err);
        }
        log::info!("renderer cleaned up");
    }

    // ----- configuration -----

    /// Scale factor used in fixed resize mode. Values outside 1..=100 are
    /// rejected.
    pub fn set_scale(&mut self, scale: f32) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.mapper.set_fixed_scale(scale) {
            state.debouncer.on_resize(
                state.mapper.screen().w,
                state.mapper.screen().h,
                Instant::now(),
            );
        }
    }

    pub fn set_display_resolution(&mut self, resolution: DisplayResolution) {
        self.set_display_resolution_at(resolution, Instant::now());
    }

    /// Switch the logical canvas size. Layers are rebuilt once the resize
    /// debounce settles.
    pub fn set_display_resolution_at(&mut self, resolution: DisplayResolution, now: Instant) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.mapper.set_resolution(resolution) {
            log::info!("display resolution set to {}", resolution.name());
            let screen = state.mapper.screen();
            state.debouncer.on_resize(screen.w, screen.h, now);
        }
    }

    pub fn set_resize_mode(&mut self, mode: ResizeMode) {
        self.set_resize_mode_at(mode, Instant::now());
    }

    pub fn set_resize_mode_at(&mut self, mode: ResizeMode, now: Instant) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.mapper.set_resize_mode(mode) {
            log::info!("resize mode set to {}", mode.name());
            let screen = state.mapper.screen();
            state.debouncer.on_resize(screen.w, screen.h, now);
        }
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), RendererError> {
        self.set_display_mode_at(mode, Instant::now())
    }

    /// Switch between windowed, borderless and fullscreen. Leaving windowed
    /// mode remembers the window size; returning restores it.
    pub fn set_display_mode_at(&mut self, mode: DisplayMode, now: Instant) -> Result<(), RendererError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        let current = state.mapper.display_mode();
        if mode == current {
            return Ok(());
        }
        if current == DisplayMode::Windowed {
            state.last_windowed_size = state.backend.window_size()?;
        }
        state
            .backend
            .set_display_mode(mode, state.last_windowed_size)?;
        state.mapper.set_display_mode(mode);
        log::info!("display mode set to {}", mode.name());

        let (w, h) = state.backend.window_size()?;
        state.debouncer.on_resize(w, h, now);
        Ok(())
    }

    /// Color painted behind everything and into the background layer.
    pub fn set_clear_color(&mut self, color: u8) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if check_color(color) {
            state.clear_color = color;
        }
    }

    // ----- events -----

    /// Record a window resize. Surfaces are rebuilt after the debounce delay.
    pub fn handle_resize(&mut self, width: i32, height: i32) {
        self.handle_resize_at(width, height, Instant::now());
    }

    pub fn handle_resize_at(&mut self, width: i32, height: i32, now: Instant) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let screen = state.mapper.screen();
        if !state.debouncer.is_resizing() && (screen.w, screen.h) == (width, height) {
            return;
        }
        state.debouncer.on_resize(width, height, now);
    }

    /// Feed one event to the renderer. Only resizes are acted on.
    pub fn handle_event(&mut self, event: &GraphicsEvent) {
        if let GraphicsEvent::Resized(w, h) = *event {
            self.handle_resize(w, h);
        }
    }

    /// Drain backend events, act on resizes and return all of them.
    pub fn poll_events(&mut self) -> Result<Vec<GraphicsEvent>, RendererError> {
        let Some(state) = self.state.as_mut() else {
            return Ok(Vec::new());
        };
        let events = state.backend.poll_events()?;
        for event in &events {
            self.handle_event(event);
        }
        Ok(events)
    }

    // ----- frame -----

    /// Render and present one frame.
    pub fn present(&mut self, scene: &mut dyn Scene) -> Result<(), RendererError> {
        self.present_at(scene, Instant::now())
    }

    /// [`present`](Self::present) with an explicit clock reading.
    pub fn present_at(&mut self, scene: &mut dyn Scene, now: Instant) -> Result<(), RendererError> {
        {
            let Some(state) = self.state.as_mut() else {
                return Ok(());
            };
            match state.debouncer.poll(now) {
                DebounceStatus::Settled { width, height } => {
                    state.mapper.set_screen_size(width, height);
                    if state.mapper.display_mode() == DisplayMode::Windowed {
                        state.last_windowed_size = (width, height);
                    }
                    state.recreate_surfaces()?;
                }
                DebounceStatus::Waiting => {
                    state.backend.present(&state.composite)?;
                    return Ok(());
                }
                DebounceStatus::Stable => {}
            }
            state.clear_frame();
        }

        scene.render(self);
        self.draw_system_overlay();

        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        state.composite_layers();
        state.backend.present(&state.composite)?;
        Ok(())
    }

    /// Last composited frame.
    pub fn composite(&self) -> Option<&CompositeSurface> {
        self.state.as_ref().map(|s| &s.composite)
    }

    // ----- layers -----

    /// Append a layer at the top of the paint order (below the system
    /// layer). Returns [`LayerHandle::INVALID`] on failure.
    pub fn create_layer(&mut self, can_draw_outside: bool) -> LayerHandle {
        let Some(state) = self.state.as_mut() else {
            return LayerHandle::INVALID;
        };
        let sizes = state.surface_sizes();
        match state.layers.create(can_draw_outside, &sizes) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("layer creation failed: {}", err);
                LayerHandle::INVALID
            }
        }
    }

    pub fn destroy_layer(&mut self, handle: LayerHandle) {
        if !handle.is_valid() {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !state.layers.destroy(handle) {
            log::debug!("destroy_layer: {} not found", handle);
        }
    }

    fn layer_mut(&mut self, handle: LayerHandle, op: &str) -> Option<&mut Layer> {
        let layer = self.state.as_mut()?.layers.get_mut(handle);
        if layer.is_none() {
            log::debug!("{}: {} not found", op, handle);
        }
        layer
    }

    pub fn set_layer_visible(&mut self, handle: LayerHandle, visible: bool) {
        if let Some(layer) = self.layer_mut(handle, "set_layer_visible") {
            layer.set_visible(visible);
        }
    }

    pub fn set_layer_opacity(&mut self, handle: LayerHandle, opacity: u8) {
        if let Some(layer) = self.layer_mut(handle, "set_layer_opacity") {
            layer.set_opacity(opacity);
        }
    }

    /// Logical pixel size for the layer. Sizes outside 1..=255 are rejected.
    pub fn set_layer_size(&mut self, handle: LayerHandle, size: u32) {
        if !layer::is_valid_size(size) {
            log::warn!(
                "rejected layer size {} for {} (must be within 1..={})",
                size,
                handle,
                MAX_LAYER_SIZE
            );
            return;
        }
        if let Some(layer) = self.layer_mut(handle, "set_layer_size") {
            layer.set_size(size);
        }
    }

    /// Toggle drawing into the letterbox margins. The layer surface is
    /// reallocated at the size the new flag needs and its content dropped.
    pub fn set_layer_draw_outside(&mut self, handle: LayerHandle, can_draw_outside: bool) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let sizes = state.surface_sizes();
        let Some(layer) = state.layers.get_mut(handle) else {
            log::debug!("set_layer_draw_outside: {} not found", handle);
            return;
        };
        if let Err(err) = layer.set_can_draw_outside(can_draw_outside, &sizes) {
            log::error!("could not recreate surface for {}: {}", handle, err);
        }
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&Layer> {
        self.state.as_ref()?.layers.get(handle)
    }

    pub fn layer_surface(&self, handle: LayerHandle) -> Option<&IndexedSurface> {
        self.layer(handle).map(Layer::surface)
    }

    /// Handles in paint order, system layer included.
    pub fn layer_handles(&self) -> Vec<LayerHandle> {
        self.state
            .as_ref()
            .map(|s| s.layers.handles())
            .unwrap_or_default()
    }

    pub fn background_layer(&self) -> LayerHandle {
        self.state
            .as_ref()
            .map_or(LayerHandle::INVALID, |s| s.bg_layer)
    }

    pub fn system_layer(&self) -> LayerHandle {
        self.state
            .as_ref()
            .map_or(LayerHandle::INVALID, |s| s.system_layer)
    }

    // ----- drawing -----

    /// Resolve a drawable canvas, or `None` if drawing must be skipped.
    fn canvas(&mut self, handle: LayerHandle, color: u8) -> Option<LayerCanvas<'_>> {
        let state = self.state.as_mut()?;
        if state.debouncer.is_resizing() {
            return None;
        }
        if !check_color(color) {
            return None;
        }
        let mapper = &state.mapper;
        let layer = state.layers.get_mut(handle)?;
        Some(LayerCanvas::new(layer, mapper))
    }

    /// One logical pixel at the layer's pixel size.
    pub fn draw_pixel(&mut self, handle: LayerHandle, x: i32, y: i32, color: u8) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.pixel(x, y, color);
        }
    }

    pub fn draw_rect(&mut self, handle: LayerHandle, rect: Rect, color: u8) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.rect(rect, color);
        }
    }

    /// Fill a rectangle given in surface pixels.
    pub fn draw_rect_raw(&mut self, handle: LayerHandle, rect: Rect, color: u8) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.rect_raw(rect, color);
        }
    }

    pub fn draw_fill(&mut self, handle: LayerHandle, color: u8) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.fill(color);
        }
    }

    pub fn blit_masked(
        &mut self,
        handle: LayerHandle,
        image: &ImageData,
        src_rect: Rect,
        dest_x: i32,
        dest_y: i32,
        color: u8,
    ) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.blit_masked(image, src_rect, dest_x, dest_y, color);
        }
    }

    pub fn draw_char(&mut self, handle: LayerHandle, font: &Font, ch: char, x: i32, y: i32, color: u8) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.char(font, ch, x, y, color);
        }
    }

    pub fn draw_string(&mut self, handle: LayerHandle, font: &Font, text: &str, x: i32, y: i32, color: u8) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.string(font, text, x, y, color);
        }
    }

    pub fn draw_sprite_tile(
        &mut self,
        handle: LayerHandle,
        sprite: &Sprite,
        tile: u32,
        x: i32,
        y: i32,
        color: u8,
    ) {
        if let Some(mut canvas) = self.canvas(handle, color) {
            canvas.sprite_tile(sprite, tile, x, y, color);
        }
    }

    // ----- sheets -----

    pub fn sheets(&self) -> Option<&SheetLibrary> {
        self.state.as_ref().map(|s| &s.sheets)
    }

    /// Font by name. Cheap to clone: the bitmap is shared.
    pub fn font(&self, name: &str) -> Option<Font> {
        self.sheets()?.font(name).cloned()
    }

    pub fn default_font(&self) -> Option<Font> {
        self.sheets()?.default_font().cloned()
    }

    pub fn sprite(&self, name: &str) -> Option<Sprite> {
        self.sheets()?.sprite(name).cloned()
    }

    // ----- system layer -----

    pub fn set_system_data(&mut self, data: SystemData, enabled: bool) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if enabled {
            state.system_data |= data.bit();
        } else {
            state.system_data &= !data.bit();
        }
        state.update_system_visibility();
    }

    pub fn toggle_system_data(&mut self, data: SystemData) {
        let enabled = self.is_system_data_enabled(data);
        self.set_system_data(data, !enabled);
    }

    pub fn is_system_data_enabled(&self, data: SystemData) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.system_data & data.bit() != 0)
    }

    /// Frame statistics shown by the fps overlay lines.
    pub fn update_frame_stats(&mut self, current_fps: f32, average_fps: f32) {
        if let Some(state) = self.state.as_mut() {
            state.current_fps = current_fps;
            state.average_fps = average_fps;
        }
    }

    /// Quit prompt. `0` hides it; otherwise the message is drawn in a grey
    /// that brightens the longer quit is held. Call from inside a scene.
    pub fn draw_system_quit(&mut self, duration_held: u8) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.quit_active = duration_held != 0;
        state.update_system_visibility();
        if duration_held == 0 {
            return;
        }

        let color = match duration_held {
            0..=63 => 3,
            64..=127 => 2,
            128..=191 => 1,
            _ => 0,
        };
        let handle = state.system_layer;
        if let Some(font) = self.default_font() {
            self.draw_string(handle, &font, QUIT_MESSAGE, 1, 1, color);
        }
    }

    fn draw_system_overlay(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        if state.system_data == 0 {
            return;
        }
        let mut lines = Vec::with_capacity(SystemData::ALL.len());
        for data in SystemData::ALL {
            if state.system_data & data.bit() == 0 {
                continue;
            }
            lines.push(match data {
                SystemData::CurrentFps => format!("FPS: {:.0}", state.current_fps),
                SystemData::AverageFps => format!("AVG: {:.0}", state.average_fps),
                SystemData::LayerCount => format!("LAYERS: {}", state.layers.len()),
            });
        }
        let handle = state.system_layer;
        let Some(font) = self.default_font() else {
            log::trace!("no font loaded, system overlay skipped");
            return;
        };
        let line_height = font.grid().tile_h as i32 + 1;
        // Row 0 belongs to the quit prompt.
        for (row, line) in lines.iter().enumerate() {
            let y = 1 + (row as i32 + 1) * line_height;
            self.draw_string(handle, &font, line, 1, y, 0);
        }
    }

    // ----- queries -----

    pub fn window_size(&self) -> (i32, i32) {
        self.state.as_ref().map_or((0, 0), |s| {
            let screen = s.mapper.screen();
            (screen.w, screen.h)
        })
    }

    /// Physical viewport rectangle within the window.
    pub fn viewport(&self) -> Rect {
        self.state
            .as_ref()
            .map_or(Rect::default(), |s| s.mapper.viewport())
    }

    pub fn viewport_size(&self) -> (i32, i32) {
        let viewport = self.viewport();
        (viewport.w, viewport.h)
    }

    /// Logical canvas size.
    pub fn game_size(&self) -> (i32, i32) {
        self.state
            .as_ref()
            .map_or((0, 0), |s| s.mapper.resolution().extent())
    }

    pub fn scale_factor(&self) -> f32 {
        self.state.as_ref().map_or(0.0, |s| s.mapper.scale_factor())
    }

    /// Whether a window pixel falls inside the viewport.
    pub fn is_in_viewport(&self, x: i32, y: i32) -> bool {
        self.viewport().contains(x, y)
    }

    /// Whether a window pixel falls inside the window.
    pub fn is_in_window(&self, x: i32, y: i32) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.mapper.is_in_window(x, y))
    }

    pub fn game_to_screen(&self, rect: Rect) -> Option<Rect> {
        self.state.as_ref().map(|s| s.mapper.game_to_screen(rect))
    }

    pub fn screen_to_game(&self, rect: Rect) -> Option<Rect> {
        self.state.as_ref().map(|s| s.mapper.screen_to_game(rect))
    }

    pub fn display_resolution(&self) -> DisplayResolution {
        self.state
            .as_ref()
            .map_or(DisplayResolution::default(), |s| s.mapper.resolution())
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.state
            .as_ref()
            .map_or(ResizeMode::default(), |s| s.mapper.resize_mode())
    }

    pub fn effective_resize_mode(&self) -> ResizeMode {
        self.state
            .as_ref()
            .map_or(ResizeMode::default(), |s| s.mapper.effective_resize_mode())
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state
            .as_ref()
            .map_or(DisplayMode::default(), |s| s.mapper.display_mode())
    }

    pub fn clear_color(&self) -> u8 {
        self.state
            .as_ref()
            .map_or(palette::DEFAULT_CLEAR_COLOR, |s| s.clear_color)
    }

    /// Window size that returning to windowed mode restores.
    pub fn last_windowed_size(&self) -> (i32, i32) {
        self.state.as_ref().map_or((0, 0), |s| s.last_windowed_size)
    }

    pub fn layer_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.layers.len())
    }

    pub fn layer_capacity(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.layers.capacity())
    }

    /// Number of times the layer array has doubled.
    pub fn layer_growths(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.layers.growths())
    }

    /// Number of resize-triggered surface rebuilds.
    pub fn recreation_count(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.recreations)
    }

    pub fn is_resizing(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.debouncer.is_resizing())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if self.state.is_some() {
            log::debug!("Renderer dropping, cleaning up resources");
            self.cleanup();
        }
    }
}
