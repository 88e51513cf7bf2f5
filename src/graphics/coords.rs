//! Logical-to-physical coordinate mapping.
//!
//! All drawing is expressed in logical game units on a fixed virtual canvas
//! (640x480 or 854x480). The mapper converts those units into physical window
//! pixels using a scale factor and a letterbox origin, and recomputes both
//! whenever the window size, display resolution, resize mode or display mode
//! changes.
//!
//! Rectangles are always converted edge by edge: left, right, top and bottom are
//! mapped and rounded independently and the size is the difference of the
//! rounded edges. Two logical rectangles that share an edge therefore map to
//! physical rectangles that share an edge, at any scale.

use crate::graphics::rect::{Point, Rect};

/// Smallest accepted scale factor.
pub const MIN_SCALE: f32 = 1.0;
/// Largest accepted scale factor.
pub const MAX_SCALE: f32 = 100.0;

pub const GAME_WIDTH_VGA: i32 = 640;
pub const GAME_HEIGHT_VGA: i32 = 480;
pub const GAME_WIDTH_FWVGA: i32 = 854;
pub const GAME_HEIGHT_FWVGA: i32 = 480;

/// Logical canvas size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayResolution {
    /// 640x480 (4:3).
    #[default]
    Vga,
    /// 854x480 (roughly 16:9).
    Fwvga,
}

impl DisplayResolution {
    /// Logical canvas size in game units.
    #[must_use]
    pub const fn extent(self) -> (i32, i32) {
        match self {
            Self::Vga => (GAME_WIDTH_VGA, GAME_HEIGHT_VGA),
            Self::Fwvga => (GAME_WIDTH_FWVGA, GAME_HEIGHT_FWVGA),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vga => "VGA",
            Self::Fwvga => "FWVGA",
        }
    }

    /// The other resolution, for toggling.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Vga => Self::Fwvga,
            Self::Fwvga => Self::Vga,
        }
    }
}

/// How the logical canvas reacts to window size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeMode {
    /// Canvas scales to fit the window, preserving aspect, letterboxed.
    #[default]
    Fit,
    /// Canvas keeps its pixel size and stays centered.
    Fixed,
}

impl ResizeMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Fixed => "fixed",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Fit => Self::Fixed,
            Self::Fixed => Self::Fit,
        }
    }
}

/// Window presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    #[default]
    Windowed,
    /// Desktop-resolution fullscreen without a mode switch.
    Borderless,
    /// Exclusive fullscreen.
    Fullscreen,
}

impl DisplayMode {
    #[must_use]
    pub const fn is_fullscreen(self) -> bool {
        matches!(self, Self::Borderless | Self::Fullscreen)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Windowed => "windowed",
            Self::Borderless => "borderless",
            Self::Fullscreen => "fullscreen",
        }
    }

    /// Next mode in windowed -> borderless -> fullscreen -> windowed order.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Windowed => Self::Borderless,
            Self::Borderless => Self::Fullscreen,
            Self::Fullscreen => Self::Windowed,
        }
    }
}

/// Check a scale factor against the accepted range.
#[must_use]
pub fn is_valid_scale(scale: f32) -> bool {
    scale.is_finite() && (MIN_SCALE..=MAX_SCALE).contains(&scale)
}

/// Bidirectional logical/physical mapping state.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    resolution: DisplayResolution,
    resize_mode: ResizeMode,
    display_mode: DisplayMode,
    /// Physical window size.
    screen: Rect,
    /// Scale used while the effective resize mode is `Fixed`.
    fixed_scale: f32,
    scale_factor: f32,
    /// Physical rectangle covered by the logical canvas.
    viewport: Rect,
}

impl CoordinateMapper {
    /// Create a mapper for a window of the given physical size.
    ///
    /// `fixed_scale` must already be validated with [`is_valid_scale`].
    #[must_use]
    pub fn new(resolution: DisplayResolution, screen_w: i32, screen_h: i32, fixed_scale: f32) -> Self {
        let (game_w, game_h) = resolution.extent();
        let mut mapper = Self {
            resolution,
            resize_mode: ResizeMode::Fit,
            display_mode: DisplayMode::Windowed,
            screen: Rect::sized(screen_w, screen_h),
            fixed_scale,
            scale_factor: fixed_scale,
            viewport: Rect::sized(game_w, game_h),
        };
        mapper.recompute();
        mapper
    }

    #[must_use]
    pub fn resolution(&self) -> DisplayResolution {
        self.resolution
    }

    #[must_use]
    pub fn resize_mode(&self) -> ResizeMode {
        self.resize_mode
    }

    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Resize mode actually in force: fullscreen modes always fit.
    #[must_use]
    pub fn effective_resize_mode(&self) -> ResizeMode {
        if self.display_mode.is_fullscreen() {
            ResizeMode::Fit
        } else {
            self.resize_mode
        }
    }

    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    #[must_use]
    pub fn fixed_scale(&self) -> f32 {
        self.fixed_scale
    }

    /// Physical viewport rectangle, relative to the window.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Physical window rectangle (always at the origin).
    #[must_use]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Logical canvas rectangle in game units.
    #[must_use]
    pub fn game_rect(&self) -> Rect {
        let (w, h) = self.resolution.extent();
        Rect::sized(w, h)
    }

    /// Update the physical window size. Returns `true` if it changed.
    pub fn set_screen_size(&mut self, width: i32, height: i32) -> bool {
        if self.screen.w == width && self.screen.h == height {
            return false;
        }
        self.screen = Rect::sized(width, height);
        self.recompute();
        true
    }

    pub fn set_resolution(&mut self, resolution: DisplayResolution) -> bool {
        if self.resolution == resolution {
            return false;
        }
        self.resolution = resolution;
        self.recompute();
        true
    }

    pub fn set_resize_mode(&mut self, mode: ResizeMode) -> bool {
        if self.resize_mode == mode {
            return false;
        }
        self.resize_mode = mode;
        self.recompute();
        true
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> bool {
        if self.display_mode == mode {
            return false;
        }
        self.display_mode = mode;
        self.recompute();
        true
    }

    /// Set the scale used in fixed mode. Out-of-range values are rejected and
    /// leave the mapper unchanged.
    pub fn set_fixed_scale(&mut self, scale: f32) -> bool {
        if !is_valid_scale(scale) {
            log::warn!(
                "rejected scale factor {} (must be within {}..={})",
                scale,
                MIN_SCALE,
                MAX_SCALE
            );
            return false;
        }
        if self.fixed_scale == scale {
            return false;
        }
        self.fixed_scale = scale;
        self.recompute();
        true
    }

    /// Recompute scale factor and viewport from the current inputs.
    pub fn recompute(&mut self) {
        let (game_w, game_h) = self.resolution.extent();
        let (screen_w, screen_h) = (self.screen.w, self.screen.h);

        match self.effective_resize_mode() {
            ResizeMode::Fit => {
                if screen_w <= 0 || screen_h <= 0 {
                    // Minimized windows report a zero size; keep the last mapping.
                    return;
                }
                let canvas_wider =
                    i64::from(game_w) * i64::from(screen_h) > i64::from(screen_w) * i64::from(game_h);
                let (fill_w, fill_h) = if canvas_wider {
                    // Letterbox top and bottom.
                    self.scale_factor = screen_w as f32 / game_w as f32;
                    let h = i64::from(screen_w) * i64::from(game_h) / i64::from(game_w);
                    (screen_w, h as i32)
                } else {
                    // Letterbox left and right.
                    self.scale_factor = screen_h as f32 / game_h as f32;
                    let w = i64::from(screen_h) * i64::from(game_w) / i64::from(game_h);
                    (w as i32, screen_h)
                };
                self.viewport = Rect::new(
                    (screen_w - fill_w) / 2,
                    (screen_h - fill_h) / 2,
                    fill_w,
                    fill_h,
                );
            }
            ResizeMode::Fixed => {
                self.scale_factor = self.fixed_scale;
                let w = (game_w as f32 * self.fixed_scale).round() as i32;
                let h = (game_h as f32 * self.fixed_scale).round() as i32;
                self.viewport = Rect::new((screen_w - w) / 2, (screen_h - h) / 2, w, h);
            }
        }

        log::trace!(
            "viewport recalculated to {} (scale {:.3}, window {}x{}, {} {})",
            self.viewport,
            self.scale_factor,
            screen_w,
            screen_h,
            self.resolution.name(),
            self.effective_resize_mode().name()
        );
    }

    /// Map a logical rectangle to physical pixels relative to `origin`.
    ///
    /// Edges are computed in `f64` and clamped to the `i32` range, so
    /// rectangles reaching past `i32::MAX` come back truncated, not wrapped.
    #[must_use]
    pub fn map_rect(&self, rect: Rect, origin: Point) -> Rect {
        let scale = f64::from(self.scale_factor);
        let left = f64::from(origin.x) + f64::from(rect.x) * scale;
        let right = f64::from(origin.x) + (f64::from(rect.x) + f64::from(rect.w)) * scale;
        let top = f64::from(origin.y) + f64::from(rect.y) * scale;
        let bottom = f64::from(origin.y) + (f64::from(rect.y) + f64::from(rect.h)) * scale;
        rect_from_edges(left, top, right, bottom)
    }

    /// Map a physical rectangle, relative to `origin`, back to logical units.
    #[must_use]
    pub fn unmap_rect(&self, rect: Rect, origin: Point) -> Rect {
        let scale = f64::from(self.scale_factor);
        let left = (f64::from(rect.x) - f64::from(origin.x)) / scale;
        let right = (f64::from(rect.x) + f64::from(rect.w) - f64::from(origin.x)) / scale;
        let top = (f64::from(rect.y) - f64::from(origin.y)) / scale;
        let bottom = (f64::from(rect.y) + f64::from(rect.h) - f64::from(origin.y)) / scale;
        rect_from_edges(left, top, right, bottom)
    }

    /// Logical rectangle to window pixels, anchored at the viewport origin.
    #[must_use]
    pub fn game_to_screen(&self, rect: Rect) -> Rect {
        self.map_rect(rect, self.viewport.origin())
    }

    /// Window pixels to logical rectangle.
    #[must_use]
    pub fn screen_to_game(&self, rect: Rect) -> Rect {
        self.unmap_rect(rect, self.viewport.origin())
    }

    /// Logical region whose pixels can land on a `width`x`height` surface
    /// whose logical origin sits at `origin`. Edges are widened outward so the
    /// region never under-covers the surface.
    #[must_use]
    pub fn visible_game_bounds(&self, origin: Point, width: i32, height: i32) -> Rect {
        let scale = f64::from(self.scale_factor);
        let left = (-f64::from(origin.x) / scale).floor() as i32;
        let top = (-f64::from(origin.y) / scale).floor() as i32;
        let right = ((f64::from(width) - f64::from(origin.x)) / scale).ceil() as i32;
        let bottom = ((f64::from(height) - f64::from(origin.y)) / scale).ceil() as i32;
        Rect::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }

    /// Part of the viewport that lies inside the window.
    ///
    /// In fixed mode a large scale can push the viewport past every window
    /// edge; layers confined to the viewport only need this much surface.
    /// When nothing overlaps, an empty rectangle at the clamped viewport
    /// origin is returned.
    #[must_use]
    pub fn visible_viewport(&self) -> Rect {
        self.viewport.intersect(&self.screen).unwrap_or_else(|| {
            Rect::new(
                self.viewport.x.clamp(0, self.screen.w.max(0)),
                self.viewport.y.clamp(0, self.screen.h.max(0)),
                0,
                0,
            )
        })
    }

    /// Whether a window pixel lies inside the window.
    #[must_use]
    pub fn is_in_window(&self, x: i32, y: i32) -> bool {
        self.screen.contains(x, y)
    }
}

/// Round mapped edges and narrow them to an `i32` rectangle.
fn rect_from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Rect {
    let x = round_to_i32(left);
    let y = round_to_i32(top);
    let w = (i64::from(round_to_i32(right)) - i64::from(x)).clamp(0, i64::from(i32::MAX));
    let h = (i64::from(round_to_i32(bottom)) - i64::from(y)).clamp(0, i64::from(i32::MAX));
    Rect::new(x, y, w as i32, h as i32)
}

fn round_to_i32(value: f64) -> i32 {
    value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
