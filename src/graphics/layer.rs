//! Layer storage and handles.
//!
//! Layers live in one growable array whose order is the paint order. The array
//! is compacted on destroy, so positions shift; callers hold a [`LayerHandle`]
//! instead and every access resolves it with a linear search.

use std::fmt;

use thiserror::Error;

use crate::graphics::surface::{IndexedSurface, SurfaceError};

/// Starting capacity of the layer array.
pub const INITIAL_LAYER_CAPACITY: usize = 16;

/// Largest accepted logical pixel size.
pub const MAX_LAYER_SIZE: u32 = u8::MAX as u32;

/// Opaque, non-owning reference to a layer.
///
/// Handles come from a process-lifetime counter starting at 1 and are never
/// reused. [`LayerHandle::INVALID`] (0) is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LayerHandle(u32);

impl LayerHandle {
    pub const INVALID: LayerHandle = LayerHandle(0);

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("failed to grow layer array to {0} entries")]
    CapacityExhausted(usize),
    #[error("layer handle space exhausted")]
    HandlesExhausted,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Physical sizes a layer surface can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSizes {
    /// Full window, used by draw-outside layers.
    pub window: (i32, i32),
    /// On-screen part of the physical viewport, used by all other layers.
    pub viewport: (i32, i32),
}

impl SurfaceSizes {
    pub fn for_layer(&self, can_draw_outside: bool) -> (i32, i32) {
        if can_draw_outside {
            self.window
        } else {
            self.viewport
        }
    }
}

#[derive(Debug)]
pub struct Layer {
    handle: LayerHandle,
    surface: IndexedSurface,
    visible: bool,
    opacity: u8,
    size: u32,
    can_draw_outside: bool,
}

impl Layer {
    fn new(handle: LayerHandle, surface: IndexedSurface, can_draw_outside: bool) -> Self {
        Self {
            handle,
            surface,
            visible: true,
            opacity: u8::MAX,
            size: 1,
            can_draw_outside,
        }
    }

    pub fn handle(&self) -> LayerHandle {
        self.handle
    }

    pub fn surface(&self) -> &IndexedSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut IndexedSurface {
        &mut self.surface
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Logical pixel size used by `draw_pixel` and masked blits.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn can_draw_outside(&self) -> bool {
        self.can_draw_outside
    }

    /// Returns `true` if the value changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    pub fn set_opacity(&mut self, opacity: u8) -> bool {
        let changed = self.opacity != opacity;
        self.opacity = opacity;
        changed
    }

    /// Sizes outside `1..=MAX_LAYER_SIZE` are rejected and leave the layer
    /// unchanged.
    pub fn set_size(&mut self, size: u32) -> bool {
        if !is_valid_size(size) || self.size == size {
            return false;
        }
        self.size = size;
        true
    }

    /// Switch the draw-outside flag, reallocating the surface for the new
    /// flag's size. Content is dropped. Returns `Ok(false)` if unchanged.
    pub fn set_can_draw_outside(
        &mut self,
        can_draw_outside: bool,
        sizes: &SurfaceSizes,
    ) -> Result<bool, SurfaceError> {
        if self.can_draw_outside == can_draw_outside {
            return Ok(false);
        }
        let (w, h) = sizes.for_layer(can_draw_outside);
        self.surface = IndexedSurface::new(w, h)?;
        self.can_draw_outside = can_draw_outside;
        Ok(true)
    }

}

/// Whether `size` is an accepted logical pixel size.
pub fn is_valid_size(size: u32) -> bool {
    (1..=MAX_LAYER_SIZE).contains(&size)
}

/// Ordered layer collection with explicit capacity doubling.
#[derive(Debug)]
pub struct LayerStack {
    layers: Vec<Layer>,
    capacity: usize,
    growths: usize,
    next_handle: u32,
}

impl LayerStack {
    pub fn with_capacity(capacity: usize) -> Result<Self, LayerError> {
        let capacity = capacity.max(1);
        let mut layers = Vec::new();
        layers
            .try_reserve_exact(capacity)
            .map_err(|_| LayerError::CapacityExhausted(capacity))?;
        Ok(Self {
            layers,
            capacity,
            growths: 0,
            next_handle: 1,
        })
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Current logical capacity of the array.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the array has doubled.
    pub fn growths(&self) -> usize {
        self.growths
    }

    fn ensure_room(&mut self) -> Result<(), LayerError> {
        if self.layers.len() < self.capacity {
            return Ok(());
        }
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .ok_or(LayerError::CapacityExhausted(usize::MAX))?;
        self.layers
            .try_reserve_exact(new_capacity - self.layers.len())
            .map_err(|_| LayerError::CapacityExhausted(new_capacity))?;
        log::debug!(
            "layer array grown from {} to {}",
            self.capacity,
            new_capacity
        );
        self.capacity = new_capacity;
        self.growths += 1;
        Ok(())
    }

    /// Append a new layer at the top of the paint order.
    pub fn create(
        &mut self,
        can_draw_outside: bool,
        sizes: &SurfaceSizes,
    ) -> Result<LayerHandle, LayerError> {
        self.ensure_room()?;
        let (w, h) = sizes.for_layer(can_draw_outside);
        let surface = IndexedSurface::new(w, h)?;
        let handle = LayerHandle(self.next_handle);
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or(LayerError::HandlesExhausted)?;
        self.layers.push(Layer::new(handle, surface, can_draw_outside));
        log::debug!(
            "created {} ({}x{}, draw outside: {})",
            handle,
            w,
            h,
            can_draw_outside
        );
        Ok(handle)
    }

    /// Remove a layer and compact the array. Returns `false` if not found.
    pub fn destroy(&mut self, handle: LayerHandle) -> bool {
        match self.position(handle) {
            Some(index) => {
                self.layers.remove(index);
                log::debug!("destroyed {}", handle);
                true
            }
            None => false,
        }
    }

    /// Current array index of a handle.
    pub fn position(&self, handle: LayerHandle) -> Option<usize> {
        if !handle.is_valid() {
            return None;
        }
        self.layers.iter().position(|l| l.handle == handle)
    }

    pub fn get(&self, handle: LayerHandle) -> Option<&Layer> {
        self.position(handle).map(|i| &self.layers[i])
    }

    pub fn get_mut(&mut self, handle: LayerHandle) -> Option<&mut Layer> {
        self.position(handle).map(move |i| &mut self.layers[i])
    }

    pub fn contains(&self, handle: LayerHandle) -> bool {
        self.position(handle).is_some()
    }

    /// Layers in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    pub fn handles(&self) -> Vec<LayerHandle> {
        self.layers.iter().map(|l| l.handle).collect()
    }

    /// Allocate a fresh surface for every layer, in paint order, without
    /// touching the stack. Pair with [`install_surfaces`](Self::install_surfaces);
    /// content is dropped on install.
    pub fn allocate_surfaces(&self, sizes: &SurfaceSizes) -> Result<Vec<IndexedSurface>, SurfaceError> {
        self.layers
            .iter()
            .map(|layer| {
                let (w, h) = sizes.for_layer(layer.can_draw_outside);
                IndexedSurface::new(w, h)
            })
            .collect()
    }

    /// Swap in surfaces from [`allocate_surfaces`](Self::allocate_surfaces).
    /// Layers created or destroyed in between keep their current surface.
    pub fn install_surfaces(&mut self, surfaces: Vec<IndexedSurface>) {
        if surfaces.len() != self.layers.len() {
            log::warn!(
                "surface count {} does not match layer count {}",
                surfaces.len(),
                self.layers.len()
            );
            return;
        }
        for (layer, surface) in self.layers.iter_mut().zip(surfaces) {
            layer.surface = surface;
        }
    }

    /// Drop every layer. The handle counter keeps running.
    pub fn clear(&mut self) {
        self.layers.clear();
    }
}
