//!
//! Display backends for the renderer.
//!
//! # Architecture
//!
//! The module is organized into submodules:
//! - `common`: Backend trait, error type, events and window configuration
//! - `sdl2`: SDL2 window backend (feature `sdl`)
//! - `null`: Headless backend used by tests and tooling

pub mod common;
pub mod null;
#[cfg(feature = "sdl")]
pub mod sdl2;

pub use common::{
    DisplayBackend, DriverConfig, DriverError, DriverResult, GraphicsEvent, Key,
};
pub use null::{NullBackend, NullRecorder, SharedRecorder};
#[cfg(feature = "sdl")]
pub use self::sdl2::SdlBackend;
