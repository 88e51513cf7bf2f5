use crate::config::{
    parse_clear_color, parse_display_mode, parse_fps, parse_resize_mode, parse_resolution,
    parse_scale, Options,
};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// teaf - layered software renderer demo
#[derive(Parser, Debug, Default)]
#[command(name = "teaf")]
#[command(version)]
#[command(about = "Retro 2D layered renderer demo", long_about = None)]
pub struct Cli {
    /// Log verbosity (0 = nothing .. 6 = everything)
    #[arg(short, long, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Window scale factor (1-100), also used by the fixed resize mode
    #[arg(short, long, value_name = "FACTOR")]
    pub scale: Option<String>,

    /// Target frame rate
    #[arg(short, long, value_name = "FPS")]
    pub fps: Option<String>,

    /// Logical resolution (vga, fwvga)
    #[arg(long, value_name = "RES")]
    pub res: Option<String>,

    /// Display mode (windowed, borderless, fullscreen)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Resize mode (fit, fixed)
    #[arg(long, value_name = "MODE")]
    pub resize: Option<String>,

    /// Directory holding font and sprite sheets
    #[arg(long, value_name = "DIR")]
    pub sheets: Option<PathBuf>,

    /// Palette index used to clear the screen
    #[arg(long = "clear-color", value_name = "INDEX")]
    pub clear_color: Option<String>,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref level) = self.log {
            let level: i32 = level.trim().parse().context("Invalid log level")?;
            opts.verbosity = LogLevel::from_i32(level);
        }

        if let Some(ref scale) = self.scale {
            opts.scale = parse_scale(scale)?;
        }

        if let Some(ref fps) = self.fps {
            opts.fps = parse_fps(fps)?;
        }

        if let Some(ref res) = self.res {
            opts.resolution = parse_resolution(res)?;
        }

        if let Some(ref mode) = self.mode {
            opts.display_mode = parse_display_mode(mode)?;
        }

        if let Some(ref resize) = self.resize {
            opts.resize_mode = parse_resize_mode(resize)?;
        }

        if let Some(ref dir) = self.sheets {
            opts.sheet_dir = dir.clone();
        }

        if let Some(ref color) = self.clear_color {
            opts.clear_color = parse_clear_color(color)?;
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::coords::{DisplayMode, DisplayResolution, ResizeMode};

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            res: Some("fwvga".to_string()),
            mode: Some("borderless".to_string()),
            resize: Some("fixed".to_string()),
            scale: Some("2".to_string()),
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.resolution, DisplayResolution::Fwvga);
        assert_eq!(opts.display_mode, DisplayMode::Borderless);
        assert_eq!(opts.resize_mode, ResizeMode::Fixed);
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.fps, 60);
    }

    #[test]
    fn test_empty_cli_keeps_defaults() {
        let opts = Cli::default()
            .merge_into_options(Options::default())
            .unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_log_level_merges() {
        let cli = Cli {
            log: Some("5".to_string()),
            ..Default::default()
        };
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.verbosity, LogLevel::Debug);

        let cli = Cli {
            log: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        for cli in [
            Cli {
                scale: Some("0".to_string()),
                ..Default::default()
            },
            Cli {
                fps: Some("0".to_string()),
                ..Default::default()
            },
            Cli {
                clear_color: Some("99".to_string()),
                ..Default::default()
            },
            Cli {
                res: Some("invalid".to_string()),
                ..Default::default()
            },
        ] {
            assert!(cli.merge_into_options(Options::default()).is_err());
        }
    }

    #[test]
    fn test_parse_from_args() {
        let cli = Cli::try_parse_from([
            "teaf",
            "-l",
            "4",
            "-s",
            "1.5",
            "-f",
            "30",
            "--sheets",
            "data/sheets",
            "--clear-color",
            "0",
        ])
        .unwrap();
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.verbosity, LogLevel::Info);
        assert_eq!(opts.scale, 1.5);
        assert_eq!(opts.fps, 30);
        assert_eq!(opts.sheet_dir, PathBuf::from("data/sheets"));
        assert_eq!(opts.clear_color, 0);
    }
}
