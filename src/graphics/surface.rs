//! Pixel buffers.
//!
//! [`IndexedSurface`] is the per-layer drawing target: one palette index per
//! pixel. [`CompositeSurface`] is the truecolor ARGB8888 buffer that layers are
//! blended onto before the backend presents it.

use thiserror::Error;

use crate::graphics::palette::{PALETTE_SIZE, PALETTE_TRANSPARENT};
use crate::graphics::rect::{Point, Rect};

/// Errors raised while allocating surfaces.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("failed to allocate {bytes} bytes for a {width}x{height} surface")]
    AllocationFailed { width: i32, height: i32, bytes: usize },
}

fn checked_len(width: i32, height: i32) -> Result<usize, SurfaceError> {
    if width <= 0 || height <= 0 {
        return Err(SurfaceError::InvalidSize { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(SurfaceError::InvalidSize { width, height })
}

fn allocate<T: Copy>(width: i32, height: i32, value: T) -> Result<Vec<T>, SurfaceError> {
    let len = checked_len(width, height)?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| SurfaceError::AllocationFailed {
            width,
            height,
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    pixels.resize(len, value);
    Ok(pixels)
}

/// 8-bit palette-indexed drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSurface {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
}

impl IndexedSurface {
    /// Allocate a surface filled with the transparent index.
    pub fn new(width: i32, height: i32) -> Result<Self, SurfaceError> {
        Ok(Self {
            width,
            height,
            pixels: allocate(width, height, PALETTE_TRANSPARENT)?,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    /// Raw row-major pixel indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Write one pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, index: u8) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = index;
        }
    }

    pub fn fill(&mut self, index: u8) {
        self.pixels.fill(index);
    }

    /// Fill a rectangle clipped to the surface bounds.
    pub fn fill_rect(&mut self, rect: Rect, index: u8) {
        let Some(clipped) = rect.intersect(&self.bounds()) else {
            return;
        };
        let stride = self.width as usize;
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * stride;
            let start = row + clipped.x as usize;
            let end = row + clipped.right() as usize;
            self.pixels[start..end].fill(index);
        }
    }

    /// Count of pixels that are not the transparent index.
    pub fn opaque_pixel_count(&self) -> usize {
        self.pixels
            .iter()
            .filter(|&&p| p != PALETTE_TRANSPARENT)
            .count()
    }
}

/// Truecolor ARGB8888 surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSurface {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
}

impl CompositeSurface {
    pub fn new(width: i32, height: i32) -> Result<Self, SurfaceError> {
        Ok(Self {
            width,
            height,
            pixels: allocate(width, height, 0xFF00_0000u32)?,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn fill(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    /// Blend an indexed surface onto this one with its top-left at `dest`.
    ///
    /// `colorkey` pixels are skipped. `opacity` 255 copies, 0 draws nothing,
    /// anything between blends per channel. The result is always opaque.
    pub fn blend_indexed(
        &mut self,
        src: &IndexedSurface,
        dest: Point,
        opacity: u8,
        colorkey: u8,
        table: &[u32; PALETTE_SIZE],
    ) {
        if opacity == 0 {
            return;
        }
        let dst_rect = Rect::new(dest.x, dest.y, src.width(), src.height());
        let Some(clipped) = dst_rect.intersect(&Rect::sized(self.width, self.height)) else {
            return;
        };

        let src_stride = src.width() as usize;
        let dst_stride = self.width as usize;
        for y in clipped.y..clipped.bottom() {
            let sy = (y - dest.y) as usize;
            for x in clipped.x..clipped.right() {
                let sx = (x - dest.x) as usize;
                let index = src.pixels[sy * src_stride + sx];
                if index == colorkey {
                    continue;
                }
                let Some(&color) = table.get(index as usize) else {
                    continue;
                };
                let slot = &mut self.pixels[y as usize * dst_stride + x as usize];
                *slot = if opacity == u8::MAX {
                    color | 0xFF00_0000
                } else {
                    blend_argb(color, *slot, opacity)
                };
            }
        }
    }

    /// Nearest-neighbour stretch into a new `width`x`height` buffer.
    pub fn stretch_into(&self, width: i32, height: i32) -> Result<CompositeSurface, SurfaceError> {
        let mut out = CompositeSurface::new(width, height)?;
        let (sw, sh) = (self.width as i64, self.height as i64);
        for y in 0..height {
            let sy = (i64::from(y) * sh / i64::from(height)) as usize;
            for x in 0..width {
                let sx = (i64::from(x) * sw / i64::from(width)) as usize;
                out.pixels[y as usize * width as usize + x as usize] =
                    self.pixels[sy * self.width as usize + sx];
            }
        }
        Ok(out)
    }

    /// Copy pixels out as native-endian bytes, reusing `buffer`.
    pub fn write_ne_bytes(&self, buffer: &mut Vec<u8>) {
        buffer.clear();
        buffer.reserve(self.pixels.len() * 4);
        for pixel in &self.pixels {
            buffer.extend_from_slice(&pixel.to_ne_bytes());
        }
    }
}

/// Blend `src` over `dst` with `alpha` (0-255). Output alpha is opaque.
#[inline]
pub fn blend_argb(src: u32, dst: u32, alpha: u8) -> u32 {
    let a = u32::from(alpha);
    let inv = 255 - a;
    let channel = |shift: u32| {
        let s = (src >> shift) & 0xFF;
        let d = (dst >> shift) & 0xFF;
        ((s * a + d * inv + 127) / 255) << shift
    };
    0xFF00_0000 | channel(16) | channel(8) | channel(0)
}
