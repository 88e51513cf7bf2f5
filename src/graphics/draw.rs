//! Drawing primitives.
//!
//! A [`LayerCanvas`] binds one layer's surface to the coordinate mapper for
//! the duration of a single draw call. Coordinates are logical game units
//! unless the method name says otherwise. Everything is clipped to the
//! surface.

use crate::graphics::coords::CoordinateMapper;
use crate::graphics::layer::{Layer, MAX_LAYER_SIZE};
use crate::graphics::rect::{Point, Rect};
use crate::graphics::sheets::{Font, ImageData, Sprite};
use crate::graphics::surface::IndexedSurface;

/// Source pixels whose green channel exceeds this are not drawn.
pub const MASK_THRESHOLD: u8 = 128;

/// Whether a source pixel is drawn by a masked blit.
#[inline]
pub fn is_mask_opaque(rgba: [u8; 4]) -> bool {
    rgba[1] <= MASK_THRESHOLD
}

/// Borrowed drawing target for one layer.
pub struct LayerCanvas<'a> {
    surface: &'a mut IndexedSurface,
    mapper: &'a CoordinateMapper,
    /// Where logical (0, 0) lands on the surface.
    origin: Point,
    /// Logical pixel size.
    size: i32,
}

impl<'a> LayerCanvas<'a> {
    pub fn new(layer: &'a mut Layer, mapper: &'a CoordinateMapper) -> Self {
        let viewport = mapper.viewport();
        // Inside layers cover only the on-screen part of the viewport.
        let origin = if layer.can_draw_outside() {
            viewport.origin()
        } else {
            let visible = mapper.visible_viewport();
            Point::new(
                viewport.x.saturating_sub(visible.x),
                viewport.y.saturating_sub(visible.y),
            )
        };
        let size = pixel_size(layer.size());
        Self {
            surface: layer.surface_mut(),
            mapper,
            origin,
            size,
        }
    }

    /// Canvas over a bare surface. Used where no layer is involved.
    pub fn from_parts(
        surface: &'a mut IndexedSurface,
        mapper: &'a CoordinateMapper,
        origin: Point,
        size: u32,
    ) -> Self {
        Self {
            surface,
            mapper,
            origin,
            size: pixel_size(size),
        }
    }

    /// Physical rectangle for a logical one on this surface.
    pub fn map(&self, rect: Rect) -> Rect {
        self.mapper.map_rect(rect, self.origin)
    }

    /// One logical pixel, `size` x `size` logical units.
    pub fn pixel(&mut self, x: i32, y: i32, color: u8) {
        let mapped = self.map(Rect::new(x, y, self.size, self.size));
        self.surface.fill_rect(mapped, color);
    }

    pub fn rect(&mut self, rect: Rect, color: u8) {
        let mapped = self.map(rect);
        self.surface.fill_rect(mapped, color);
    }

    /// Physical rectangle, no mapping.
    pub fn rect_raw(&mut self, rect: Rect, color: u8) {
        self.surface.fill_rect(rect, color);
    }

    pub fn fill(&mut self, color: u8) {
        self.surface.fill(color);
    }

    /// Stencil `src_rect` of `image` at logical `(dest_x, dest_y)`.
    ///
    /// Each source pixel covers a `size` x `size` logical block. Pixels with
    /// a green channel above [`MASK_THRESHOLD`] are skipped, the rest are
    /// painted with `color`.
    pub fn blit_masked(&mut self, image: &ImageData, src_rect: Rect, dest_x: i32, dest_y: i32, color: u8) {
        let image_rect = Rect::sized(image.width() as i32, image.height() as i32);
        let Some(src) = src_rect.intersect(&image_rect) else {
            return;
        };
        let size = self.size;
        let dest_x = dest_x.saturating_add((src.x - src_rect.x).saturating_mul(size));
        let dest_y = dest_y.saturating_add((src.y - src_rect.y).saturating_mul(size));

        // Only walk source pixels whose block can land on the surface.
        let visible = self.mapper.visible_game_bounds(
            self.origin,
            self.surface.width(),
            self.surface.height(),
        );
        let (px_start, px_end) = visible_span(visible.x, visible.right(), dest_x, size, src.w);
        let (py_start, py_end) = visible_span(visible.y, visible.bottom(), dest_y, size, src.h);

        for py in py_start..py_end {
            for px in px_start..px_end {
                let Some(rgba) = image.pixel((src.x + px) as u32, (src.y + py) as u32) else {
                    continue;
                };
                if !is_mask_opaque(rgba) {
                    continue;
                }
                let block = Rect::new(
                    dest_x.saturating_add(px.saturating_mul(size)),
                    dest_y.saturating_add(py.saturating_mul(size)),
                    size,
                    size,
                );
                let mapped = self.map(block);
                self.surface.fill_rect(mapped, color);
            }
        }
    }

    /// One glyph. Characters the font does not contain draw nothing.
    pub fn char(&mut self, font: &Font, ch: char, x: i32, y: i32, color: u8) {
        let Some(index) = font.glyph_index(ch) else {
            return;
        };
        if let Some((sx, sy, sw, sh)) = font.grid().tile_rect(index) {
            self.blit_masked(font.image(), Rect::new(sx, sy, sw, sh), x, y, color);
        }
    }

    /// A line of text. Every character, drawn or not, advances the pen by
    /// one tile width times the pixel size.
    pub fn string(&mut self, font: &Font, text: &str, x: i32, y: i32, color: u8) {
        let advance = (font.grid().tile_w as i32).saturating_mul(self.size);
        let mut pen = x;
        for ch in text.chars() {
            if ch != ' ' {
                self.char(font, ch, pen, y, color);
            }
            pen = pen.saturating_add(advance);
        }
    }

    /// One tile of a sprite sheet.
    pub fn sprite_tile(&mut self, sprite: &Sprite, tile: u32, x: i32, y: i32, color: u8) {
        if let Some((sx, sy, sw, sh)) = sprite.grid().tile_rect(tile) {
            self.blit_masked(sprite.image(), Rect::new(sx, sy, sw, sh), x, y, color);
        }
    }
}

fn pixel_size(size: u32) -> i32 {
    size.clamp(1, MAX_LAYER_SIZE) as i32
}

/// Range of source indices `i` in `0..len` whose block
/// `[dest + i*size, dest + (i+1)*size)` overlaps `[lo, hi)`.
fn visible_span(lo: i32, hi: i32, dest: i32, size: i32, len: i32) -> (i32, i32) {
    let size = i64::from(size.max(1));
    let dest = i64::from(dest);
    let start = (i64::from(lo) - dest).div_euclid(size).max(0);
    let end = -((dest - i64::from(hi)).div_euclid(size));
    let end = end.min(i64::from(len));
    if end <= start {
        return (0, 0);
    }
    (start as i32, end as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::coords::DisplayResolution;
    use crate::graphics::palette::PALETTE_TRANSPARENT;
    use std::sync::Arc;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    /// 2x2 image, black on the diagonal.
    fn checker() -> ImageData {
        let data = [BLACK, WHITE, WHITE, BLACK].concat();
        ImageData::from_rgba(2, 2, data).unwrap()
    }

    fn mapper(screen_w: i32, screen_h: i32) -> CoordinateMapper {
        CoordinateMapper::new(DisplayResolution::Vga, screen_w, screen_h, 1.0)
    }

    #[test]
    fn test_mask_threshold() {
        assert!(is_mask_opaque([0, 128, 0, 255]));
        assert!(!is_mask_opaque([0, 129, 0, 255]));
        assert!(is_mask_opaque([255, 0, 255, 255]));
    }

    #[test]
    fn test_visible_span() {
        assert_eq!(visible_span(0, 10, 0, 1, 4), (0, 4));
        assert_eq!(visible_span(0, 10, -3, 1, 8), (3, 8));
        assert_eq!(visible_span(0, 10, -3, 2, 8), (1, 7));
        assert_eq!(visible_span(0, 10, 9, 2, 8), (0, 1));
        assert_eq!(visible_span(0, 10, 10, 1, 8), (0, 0));
        assert_eq!(visible_span(0, 10, -20, 1, 8), (0, 0));
    }

    #[test]
    fn test_pixel_uses_layer_size_and_scale() {
        let mapper = mapper(1280, 960);
        let mut surface = IndexedSurface::new(1280, 960).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 3);
        canvas.pixel(1, 1, 7);
        assert_eq!(surface.opaque_pixel_count(), 36);
        assert_eq!(surface.get(2, 2), Some(7));
        assert_eq!(surface.get(7, 7), Some(7));
        assert_eq!(surface.get(8, 8), Some(PALETTE_TRANSPARENT));
    }

    #[test]
    fn test_rect_raw_skips_mapping() {
        let mapper = mapper(1280, 960);
        let mut surface = IndexedSurface::new(100, 100).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.rect_raw(Rect::new(0, 0, 3, 3), 2);
        canvas.rect(Rect::new(10, 10, 1, 1), 3);
        assert_eq!(surface.get(2, 2), Some(2));
        assert_eq!(surface.get(20, 20), Some(3));
        assert_eq!(surface.get(21, 21), Some(3));
        assert_eq!(surface.opaque_pixel_count(), 9 + 4);
    }

    #[test]
    fn test_blit_masked_draws_stencil() {
        let mapper = mapper(640, 480);
        let mut surface = IndexedSurface::new(640, 480).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.blit_masked(&checker(), Rect::new(0, 0, 2, 2), 5, 5, 11);
        assert_eq!(surface.get(5, 5), Some(11));
        assert_eq!(surface.get(6, 6), Some(11));
        assert_eq!(surface.get(6, 5), Some(PALETTE_TRANSPARENT));
        assert_eq!(surface.opaque_pixel_count(), 2);
    }

    #[test]
    fn test_blit_masked_clips_source_to_image() {
        let mapper = mapper(640, 480);
        let mut surface = IndexedSurface::new(640, 480).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        // Starts one pixel left of the image; the first column is dropped
        // and the destination shifts with it.
        canvas.blit_masked(&checker(), Rect::new(-1, 0, 3, 2), 10, 10, 1);
        assert_eq!(surface.get(11, 10), Some(1));
        assert_eq!(surface.get(12, 11), Some(1));
        assert_eq!(surface.opaque_pixel_count(), 2);
    }

    #[test]
    fn test_blit_masked_partially_off_surface() {
        let mapper = mapper(640, 480);
        let mut surface = IndexedSurface::new(640, 480).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.blit_masked(&checker(), Rect::new(0, 0, 2, 2), -1, -1, 4);
        assert_eq!(surface.get(0, 0), Some(4));
        assert_eq!(surface.opaque_pixel_count(), 1);

        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.blit_masked(&checker(), Rect::new(0, 0, 2, 2), 5000, 5000, 4);
        assert_eq!(surface.opaque_pixel_count(), 1);
    }

    #[test]
    fn test_blit_masked_with_pixel_size() {
        let mapper = mapper(640, 480);
        let mut surface = IndexedSurface::new(640, 480).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 2);
        canvas.blit_masked(&checker(), Rect::new(0, 0, 2, 2), 0, 0, 9);
        assert_eq!(surface.get(1, 1), Some(9));
        assert_eq!(surface.get(2, 2), Some(9));
        assert_eq!(surface.get(2, 0), Some(PALETTE_TRANSPARENT));
        assert_eq!(surface.opaque_pixel_count(), 8);
    }

    #[test]
    fn test_string_advances_over_spaces_and_missing_glyphs() {
        // 2 glyphs ('!' and '"'), each 2x2 and fully opaque.
        let image = ImageData::from_rgba(4, 2, BLACK.repeat(8)).unwrap();
        let font = Font::new("tiny", Arc::new(image), 2, 2);
        let mapper = mapper(640, 480);
        let mut surface = IndexedSurface::new(640, 480).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);

        canvas.string(&font, "! Z\"", 0, 0, 1);
        assert_eq!(surface.get(0, 0), Some(1));
        assert_eq!(surface.get(2, 0), Some(PALETTE_TRANSPARENT));
        assert_eq!(surface.get(4, 0), Some(PALETTE_TRANSPARENT));
        assert_eq!(surface.get(6, 0), Some(1));
        assert_eq!(surface.opaque_pixel_count(), 8);
    }

    #[test]
    fn test_sprite_tile_selects_tile() {
        let data = [BLACK, BLACK, WHITE, WHITE].concat();
        let sprite = Sprite::new("bar", Arc::new(ImageData::from_rgba(4, 1, data).unwrap()), 2, 1);
        let mapper = mapper(640, 480);
        let mut surface = IndexedSurface::new(640, 480).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);

        canvas.sprite_tile(&sprite, 1, 0, 0, 3);
        assert_eq!(surface.opaque_pixel_count(), 0);
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.sprite_tile(&sprite, 0, 0, 0, 3);
        assert_eq!(surface.opaque_pixel_count(), 2);
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.sprite_tile(&sprite, 2, 0, 0, 3);
        assert_eq!(surface.opaque_pixel_count(), 2);
    }

    #[test]
    fn test_huge_coordinates_clip_without_overflow() {
        let mapper = mapper(1280, 960);
        let mut surface = IndexedSurface::new(64, 64).unwrap();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), u32::MAX);
        canvas.pixel(i32::MAX, i32::MAX, 1);
        canvas.pixel(i32::MIN, 0, 1);
        assert_eq!(surface.opaque_pixel_count(), 0);

        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, Point::origin(), 1);
        canvas.rect(Rect::new(10, 0, i32::MAX, 4), 2);
        // Logical x 10 is physical x 20 at scale 2; everything right of it fills.
        assert_eq!(surface.get(19, 0), Some(PALETTE_TRANSPARENT));
        assert_eq!(surface.get(20, 0), Some(2));
        assert_eq!(surface.get(63, 7), Some(2));
        assert_eq!(surface.opaque_pixel_count(), 44 * 8);
    }

    #[test]
    fn test_layer_canvas_offsets_clipped_viewport() {
        use crate::graphics::coords::ResizeMode;
        use crate::graphics::layer::{LayerStack, SurfaceSizes};

        let mut mapper = CoordinateMapper::new(DisplayResolution::Vga, 854, 480, 20.0);
        mapper.set_resize_mode(ResizeMode::Fixed);
        let visible = mapper.visible_viewport();
        let sizes = SurfaceSizes {
            window: (854, 480),
            viewport: (visible.w, visible.h),
        };
        let mut stack = LayerStack::with_capacity(1).unwrap();
        let handle = stack.create(false, &sizes).unwrap();
        let layer = stack.get_mut(handle).unwrap();

        // Logical (320, 240) sits at the centre of the window.
        let mut canvas = LayerCanvas::new(layer, &mapper);
        let centre = canvas.map(Rect::new(320, 240, 1, 1));
        let expected = mapper.game_to_screen(Rect::new(320, 240, 1, 1));
        assert_eq!(centre, expected);
        canvas.rect(Rect::new(320, 240, 1, 1), 6);
        let surface = stack.get(handle).unwrap().surface();
        assert_eq!(surface.width(), 854);
        assert_eq!(surface.get(427, 240), Some(6));
    }

    #[test]
    fn test_outside_origin_offsets_drawing() {
        let mapper = mapper(1280, 720);
        let mut surface = IndexedSurface::new(1280, 720).unwrap();
        let origin = mapper.viewport().origin();
        let mut canvas = LayerCanvas::from_parts(&mut surface, &mapper, origin, 1);
        canvas.rect(Rect::new(-2, 0, 2, 2), 5);
        assert_eq!(surface.get(157, 0), Some(5));
        assert_eq!(surface.get(159, 2), Some(5));
        assert_eq!(surface.get(160, 0), Some(PALETTE_TRANSPARENT));
    }
}
