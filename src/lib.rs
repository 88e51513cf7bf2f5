// teaf: layered software renderer for a retro 2D runtime

pub mod cli;
pub mod config;
pub mod graphics;
pub mod input;
pub mod logging;
pub mod time;

pub use cli::Cli;
pub use config::Options;
pub use graphics::{Renderer, RendererConfig, Scene};
pub use input::{InputEvent, InputSystem};
pub use logging::LogLevel;
