//!
//! Graphics subsystem: palette, coordinate mapping, layers, drawing and
//! compositing.

pub mod coords;
pub mod debounce;
pub mod draw;
pub mod layer;
pub mod palette;
pub mod rect;
pub mod renderer;
pub mod sdl;
pub mod sheets;
pub mod surface;

pub use coords::{CoordinateMapper, DisplayMode, DisplayResolution, ResizeMode};
pub use debounce::{DebounceStatus, ResizeDebouncer, RESIZE_DELAY};
pub use draw::LayerCanvas;
pub use layer::{Layer, LayerError, LayerHandle, LayerStack};
pub use palette::{PALETTE, PALETTE_SIZE, PALETTE_TRANSPARENT};
pub use rect::{Point, Rect};
pub use renderer::{Renderer, RendererConfig, RendererError, Scene, SystemData};
pub use sheets::{AssetError, Font, ImageData, SheetLibrary, Sprite};
pub use surface::{CompositeSurface, IndexedSurface, SurfaceError};
