//! Font and sprite sheets.
//!
//! Sheets are bitmaps named `[type]_[name]_[w]x[h].bmp` where `type` is `font`
//! or `sprite` and `w`x`h` is the tile size. They are decoded to RGBA once at
//! startup and shared read-only with the renderer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// First character code stored in a font sheet (`'!'`).
pub const FONT_ASCII_START: u32 = 33;

/// Font used for the system overlay when present.
pub const DEFAULT_FONT_NAME: &str = "acer";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("sheet directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image data is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    InvalidImageData {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Decoded RGBA image, 4 bytes per pixel, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageData {
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(AssetError::InvalidImageData {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA bytes of one pixel, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Tile grid over an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub tile_w: u32,
    pub tile_h: u32,
    /// Whole tiles per row.
    pub columns: u32,
    /// Whole tiles per column.
    pub rows: u32,
}

impl TileGrid {
    /// Grid for an image; partial tiles at the right and bottom are dropped.
    pub fn for_image(image: &ImageData, tile_w: u32, tile_h: u32) -> Self {
        let (columns, rows) = if tile_w == 0 || tile_h == 0 {
            (0, 0)
        } else {
            (image.width / tile_w, image.height / tile_h)
        };
        Self {
            tile_w,
            tile_h,
            columns,
            rows,
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Source rectangle `(x, y, w, h)` of a tile, or `None` if out of range.
    pub fn tile_rect(&self, index: u32) -> Option<(i32, i32, i32, i32)> {
        if index >= self.tile_count() {
            return None;
        }
        let tile_x = index % self.columns;
        let tile_y = index / self.columns;
        Some((
            (tile_x * self.tile_w) as i32,
            (tile_y * self.tile_h) as i32,
            self.tile_w as i32,
            self.tile_h as i32,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct Font {
    name: String,
    image: Arc<ImageData>,
    grid: TileGrid,
    ascii_start: u32,
}

impl Font {
    pub fn new(name: impl Into<String>, image: Arc<ImageData>, tile_w: u32, tile_h: u32) -> Self {
        let grid = TileGrid::for_image(&image, tile_w, tile_h);
        Self {
            name: name.into(),
            image,
            grid,
            ascii_start: FONT_ASCII_START,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Arc<ImageData> {
        &self.image
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    pub fn ascii_start(&self) -> u32 {
        self.ascii_start
    }

    /// Glyph tile index for a character, or `None` if the sheet lacks it.
    pub fn glyph_index(&self, ch: char) -> Option<u32> {
        let index = (ch as u32).checked_sub(self.ascii_start)?;
        (index < self.grid.tile_count()).then_some(index)
    }
}

#[derive(Debug, Clone)]
pub struct Sprite {
    name: String,
    image: Arc<ImageData>,
    grid: TileGrid,
}

impl Sprite {
    pub fn new(name: impl Into<String>, image: Arc<ImageData>, tile_w: u32, tile_h: u32) -> Self {
        let grid = TileGrid::for_image(&image, tile_w, tile_h);
        Self {
            name: name.into(),
            image,
            grid,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Arc<ImageData> {
        &self.image
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Font,
    Sprite,
}

/// Components parsed from a sheet filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetName {
    pub kind: Option<SheetKind>,
    pub kind_name: String,
    pub name: String,
    pub tile_w: u32,
    pub tile_h: u32,
}

/// Parse `[type]_[name]_[w]x[h].bmp`. The type is kept even if unknown so the
/// loader can report it.
pub fn parse_sheet_filename(file_name: &str) -> Option<SheetName> {
    let stem = file_name.strip_suffix(".bmp")?;
    let mut parts = stem.splitn(3, '_');
    let kind_name = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    let dims = parts.next()?;
    let (w, h) = dims.split_once('x')?;
    let tile_w: u32 = w.parse().ok()?;
    let tile_h: u32 = h.parse().ok()?;
    if tile_w == 0 || tile_h == 0 {
        return None;
    }

    let kind = match kind_name {
        "font" => Some(SheetKind::Font),
        "sprite" => Some(SheetKind::Sprite),
        _ => None,
    };
    Some(SheetName {
        kind,
        kind_name: kind_name.to_string(),
        name: name.to_string(),
        tile_w,
        tile_h,
    })
}

/// Decode a bitmap file into RGBA.
pub fn load_image(path: &Path) -> Result<ImageData, AssetError> {
    let decoded = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageData::from_rgba(width, height, rgba.into_raw())
}

/// Loaded fonts and sprites, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SheetLibrary {
    fonts: BTreeMap<String, Font>,
    sprites: BTreeMap<String, Sprite>,
}

impl SheetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every sheet in `dir`. Files that do not follow the naming scheme,
    /// have an unknown type or fail to decode are skipped with a log line.
    pub fn load_dir(dir: &Path) -> Result<Self, AssetError> {
        if !dir.is_dir() {
            return Err(AssetError::MissingDirectory(dir.to_path_buf()));
        }
        let entries = fs::read_dir(dir).map_err(|source| AssetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut library = Self::new();
        for entry in entries {
            let entry = entry.map_err(|source| AssetError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !file_name.ends_with(".bmp") {
                continue;
            }
            let Some(sheet) = parse_sheet_filename(file_name) else {
                log::debug!("skipping {}: name is not type_name_WxH.bmp", file_name);
                continue;
            };
            let Some(kind) = sheet.kind else {
                log::warn!("unknown resource type '{}' in file {}", sheet.kind_name, file_name);
                continue;
            };

            let image = match load_image(&entry.path()) {
                Ok(image) => Arc::new(image),
                Err(err) => {
                    log::warn!("failed to load bitmap {}: {}", file_name, err);
                    continue;
                }
            };
            if image.width() % sheet.tile_w != 0 || image.height() % sheet.tile_h != 0 {
                let grid = TileGrid::for_image(&image, sheet.tile_w, sheet.tile_h);
                log::warn!(
                    "{} has partial tiles, truncating to {}x{} tiles",
                    file_name,
                    grid.columns,
                    grid.rows
                );
            }

            match kind {
                SheetKind::Font => {
                    library.insert_font(Font::new(sheet.name, image, sheet.tile_w, sheet.tile_h))
                }
                SheetKind::Sprite => {
                    library.insert_sprite(Sprite::new(sheet.name, image, sheet.tile_w, sheet.tile_h))
                }
            }
        }

        log::info!(
            "loaded {} fonts and {} sprites from {}",
            library.font_count(),
            library.sprite_count(),
            dir.display()
        );
        Ok(library)
    }

    pub fn insert_font(&mut self, font: Font) {
        self.fonts.insert(font.name.clone(), font);
    }

    pub fn insert_sprite(&mut self, sprite: Sprite) {
        self.sprites.insert(sprite.name.clone(), sprite);
    }

    pub fn font(&self, name: &str) -> Option<&Font> {
        self.fonts.get(name)
    }

    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.get(name)
    }

    /// The `acer` font if loaded, otherwise the first font by name.
    pub fn default_font(&self) -> Option<&Font> {
        self.fonts
            .get(DEFAULT_FONT_NAME)
            .or_else(|| self.fonts.values().next())
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn font_names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    pub fn sprite_names(&self) -> impl Iterator<Item = &str> {
        self.sprites.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> ImageData {
        let data = rgba.repeat((width * height) as usize);
        ImageData::from_rgba(width, height, data).unwrap()
    }

    fn write_bmp(dir: &Path, name: &str, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_parse_sheet_filename() {
        let parsed = parse_sheet_filename("font_acer_8x8.bmp").unwrap();
        assert_eq!(parsed.kind, Some(SheetKind::Font));
        assert_eq!(parsed.name, "acer");
        assert_eq!((parsed.tile_w, parsed.tile_h), (8, 8));

        let parsed = parse_sheet_filename("sprite_guy-run_16x24.bmp").unwrap();
        assert_eq!(parsed.kind, Some(SheetKind::Sprite));
        assert_eq!(parsed.name, "guy-run");
        assert_eq!((parsed.tile_w, parsed.tile_h), (16, 24));

        let parsed = parse_sheet_filename("tile_grass_8x8.bmp").unwrap();
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.kind_name, "tile");
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        assert!(parse_sheet_filename("font_acer.bmp").is_none());
        assert!(parse_sheet_filename("font_acer_8x8.png").is_none());
        assert!(parse_sheet_filename("font_acer_8by8.bmp").is_none());
        assert!(parse_sheet_filename("font_acer_0x8.bmp").is_none());
        assert!(parse_sheet_filename("_acer_8x8.bmp").is_none());
    }

    #[test]
    fn test_image_data_validates_length() {
        assert!(ImageData::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            ImageData::from_rgba(2, 2, vec![0; 15]),
            Err(AssetError::InvalidImageData { expected: 16, .. })
        ));
    }

    #[test]
    fn test_tile_grid_truncates_partial_tiles() {
        let image = solid_image(20, 17, [0, 0, 0, 255]);
        let grid = TileGrid::for_image(&image, 8, 8);
        assert_eq!((grid.columns, grid.rows), (2, 2));
        assert_eq!(grid.tile_rect(3), Some((8, 8, 8, 8)));
        assert_eq!(grid.tile_rect(4), None);
    }

    #[test]
    fn test_font_glyph_index() {
        let font = Font::new("test", Arc::new(solid_image(32, 16, [0; 4])), 8, 8);
        assert_eq!(font.glyph_index('!'), Some(0));
        assert_eq!(font.glyph_index('('), Some(7));
        assert_eq!(font.glyph_index(')'), None);
        assert_eq!(font.glyph_index(' '), None);
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        write_bmp(dir.path(), "font_acer_8x8.bmp", 64, 16);
        write_bmp(dir.path(), "sprite_guy_16x16.bmp", 32, 16);
        write_bmp(dir.path(), "tile_grass_8x8.bmp", 8, 8);
        write_bmp(dir.path(), "notes.bmp", 8, 8);
        fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let library = SheetLibrary::load_dir(dir.path()).unwrap();
        assert_eq!(library.font_count(), 1);
        assert_eq!(library.sprite_count(), 1);

        let font = library.font("acer").unwrap();
        assert_eq!(font.image().width(), 64);
        assert_eq!(font.grid().tile_count(), 16);
        assert_eq!(font.image().pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(library.default_font().unwrap().name(), "acer");

        let sprite = library.sprite("guy").unwrap();
        assert_eq!(sprite.grid().columns, 2);
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            SheetLibrary::load_dir(&missing),
            Err(AssetError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_default_font_falls_back_to_first() {
        let mut library = SheetLibrary::new();
        assert!(library.default_font().is_none());
        library.insert_font(Font::new("zeta", Arc::new(solid_image(8, 8, [0; 4])), 8, 8));
        library.insert_font(Font::new("beta", Arc::new(solid_image(8, 8, [0; 4])), 8, 8));
        assert_eq!(library.default_font().unwrap().name(), "beta");
    }
}
