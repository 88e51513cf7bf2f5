use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::graphics::coords::{is_valid_scale, DisplayMode, DisplayResolution, ResizeMode};
use crate::graphics::palette::{self, DEFAULT_CLEAR_COLOR};
use crate::graphics::renderer::RendererConfig;
use crate::logging::LogLevel;

/// Default directory scanned for font and sprite sheets
pub const DEFAULT_SHEET_DIR: &str = "assets/sheets/";

/// Application options that can be set via CLI
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub resolution: DisplayResolution,
    pub display_mode: DisplayMode,
    pub resize_mode: ResizeMode,
    pub scale: f32,
    pub fps: u32,
    pub verbosity: LogLevel,
    pub clear_color: u8,
    pub sheet_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            resolution: DisplayResolution::Vga,
            display_mode: DisplayMode::Windowed,
            resize_mode: ResizeMode::Fit,
            scale: 1.0,
            fps: 60,
            verbosity: LogLevel::User,
            clear_color: DEFAULT_CLEAR_COLOR,
            sheet_dir: PathBuf::from(DEFAULT_SHEET_DIR),
        }
    }
}

impl Options {
    /// Renderer startup settings derived from these options
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            resolution: self.resolution,
            resize_mode: self.resize_mode,
            display_mode: self.display_mode,
            scale: self.scale,
            clear_color: self.clear_color,
        }
    }
}

/// Parse a logical resolution name ("vga" or "fwvga", or "WIDTHxHEIGHT" of
/// one of those)
pub fn parse_resolution(s: &str) -> Result<DisplayResolution> {
    match s.to_lowercase().as_str() {
        "vga" | "640x480" => Ok(DisplayResolution::Vga),
        "fwvga" | "854x480" => Ok(DisplayResolution::Fwvga),
        _ => anyhow::bail!("Invalid resolution: {}. Valid options: vga, fwvga", s),
    }
}

pub fn parse_display_mode(s: &str) -> Result<DisplayMode> {
    match s.to_lowercase().as_str() {
        "windowed" | "window" => Ok(DisplayMode::Windowed),
        "borderless" => Ok(DisplayMode::Borderless),
        "fullscreen" => Ok(DisplayMode::Fullscreen),
        _ => anyhow::bail!(
            "Invalid display mode: {}. Valid options: windowed, borderless, fullscreen",
            s
        ),
    }
}

pub fn parse_resize_mode(s: &str) -> Result<ResizeMode> {
    match s.to_lowercase().as_str() {
        "fit" => Ok(ResizeMode::Fit),
        "fixed" => Ok(ResizeMode::Fixed),
        _ => anyhow::bail!("Invalid resize mode: {}. Valid options: fit, fixed", s),
    }
}

/// Parse a scale factor in the range 1 to 100
pub fn parse_scale(s: &str) -> Result<f32> {
    let scale: f32 = s.trim().parse().context("Invalid scale value")?;
    if !is_valid_scale(scale) {
        anyhow::bail!("Scale factor out of range (1.0 to 100.0)");
    }
    Ok(scale)
}

pub fn parse_fps(s: &str) -> Result<u32> {
    let fps: u32 = s.trim().parse().context("Invalid frame rate")?;
    if fps == 0 {
        anyhow::bail!("Frame rate must be positive");
    }
    Ok(fps)
}

pub fn parse_clear_color(s: &str) -> Result<u8> {
    let color: u8 = s.trim().parse().context("Invalid clear color")?;
    if !palette::is_valid_index(color) {
        anyhow::bail!(
            "Clear color {} out of range (0 to {})",
            color,
            palette::PALETTE_SIZE - 1
        );
    }
    Ok(color)
}
