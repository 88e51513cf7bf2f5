use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};

use teaf_rust::cli::Cli;
use teaf_rust::config::Options;
use teaf_rust::graphics::sdl::{GraphicsEvent, SdlBackend};
use teaf_rust::graphics::{LayerHandle, Rect, Renderer, Scene, SheetLibrary, SystemData};
use teaf_rust::input::{hold_progress, InputEvent, InputSystem, KEYBOARD_DEVICE};
use teaf_rust::logging;
use teaf_rust::time::FrameTimer;

/// Seconds quit must be held before the game exits.
const QUIT_HOLD_SECONDS: f32 = 1.0;

/// Demo content: a bordered panel at pixel size 2, a translucent overlay and
/// some text.
struct DemoScene {
    panel: LayerHandle,
    overlay: LayerHandle,
    text: LayerHandle,
    quit_held: u8,
    frame: u32,
}

impl DemoScene {
    fn new(renderer: &mut Renderer) -> Self {
        let panel = renderer.create_layer(false);
        renderer.set_layer_size(panel, 2);

        let overlay = renderer.create_layer(false);
        renderer.set_layer_opacity(overlay, 128);

        let text = renderer.create_layer(false);

        Self {
            panel,
            overlay,
            text,
            quit_held: 0,
            frame: 0,
        }
    }
}

impl Scene for DemoScene {
    fn render(&mut self, renderer: &mut Renderer) {
        self.frame = self.frame.wrapping_add(1);
        let (game_w, game_h) = renderer.game_size();
        let bg = renderer.background_layer();

        // Checker strip in the letterbox margins shows the draw-outside area.
        for x in (-64..game_w + 64).step_by(16) {
            renderer.draw_rect(bg, Rect::new(x, game_h - 8, 8, 8), 12);
        }

        // Panel coordinates are in 2x2 logical pixels.
        let (pw, ph) = (game_w / 4, game_h / 4);
        renderer.draw_rect(self.panel, Rect::new(pw / 4, ph / 4, pw, ph), 1);
        for x in 0..pw {
            renderer.draw_pixel(self.panel, pw / 4 + x, ph / 4, 0);
            renderer.draw_pixel(self.panel, pw / 4 + x, ph / 4 + ph - 1, 0);
        }
        for y in 0..ph {
            renderer.draw_pixel(self.panel, pw / 4, ph / 4 + y, 0);
            renderer.draw_pixel(self.panel, pw / 4 + pw - 1, ph / 4 + y, 0);
        }

        let sweep = (self.frame as i32 * 2) % (game_w + 80) - 80;
        renderer.draw_rect(self.overlay, Rect::new(sweep, game_h / 3, 80, game_h / 3), 9);

        if let Some(font) = renderer.default_font() {
            renderer.draw_string(self.text, &font, "teaf renderer", 16, game_h - 40, 0);
            renderer.draw_string(
                self.text,
                &font,
                "F3 fps  F9 res  F10 resize  F11 mode",
                16,
                game_h - 28,
                3,
            );
        }

        renderer.draw_system_quit(self.quit_held);
    }
}

fn run(options: &Options) -> Result<()> {
    let sheets = SheetLibrary::load_dir(&options.sheet_dir)
        .with_context(|| format!("Failed to load sheets from {}", options.sheet_dir.display()))?;
    if sheets.default_font().is_none() {
        warn!("no font sheets found, text will not be drawn");
    }

    let mut timer = FrameTimer::new(options.fps)?;
    let mut renderer = Renderer::new();
    renderer
        .init(Box::new(SdlBackend::new()), &options.renderer_config(), sheets)
        .context("Failed to initialize renderer")?;

    let mut scene = DemoScene::new(&mut renderer);
    let mut input = InputSystem::new();
    let mut last_update = Instant::now();
    let mut running = true;

    while running {
        timer.frame_start();

        for event in renderer.poll_events()? {
            if event == GraphicsEvent::Quit {
                running = false;
            }
            input.handle_event(&event);
        }

        let now = Instant::now();
        let delta = now.saturating_duration_since(last_update).as_secs_f32();
        last_update = now;

        for press in input.update(delta) {
            match press.event {
                InputEvent::ToggleFps => {
                    renderer.toggle_system_data(SystemData::CurrentFps);
                    renderer.toggle_system_data(SystemData::AverageFps);
                }
                InputEvent::ToggleResolution => {
                    let next = renderer.display_resolution().toggled();
                    renderer.set_display_resolution(next);
                }
                InputEvent::ToggleResizeMode => {
                    let next = renderer.resize_mode().toggled();
                    renderer.set_resize_mode(next);
                }
                InputEvent::CycleDisplayMode => {
                    let next = renderer.display_mode().next();
                    renderer.set_display_mode(next)?;
                }
                _ => {}
            }
        }

        let held = input.duration(InputEvent::Quit, KEYBOARD_DEVICE);
        if held >= QUIT_HOLD_SECONDS {
            info!("quit held, shutting down");
            running = false;
        }
        scene.quit_held = hold_progress(held, QUIT_HOLD_SECONDS);

        renderer.update_frame_stats(timer.current_fps(), timer.average_fps());
        renderer.present(&mut scene)?;

        timer.frame_end();
        if timer.should_limit_frame() {
            std::thread::sleep(timer.frame_shortfall());
        }
    }

    let perf = timer.performance();
    info!(
        "{} frames, average {:?}, {} over budget",
        timer.frame_count(),
        perf.average,
        perf.frames_over_budget
    );
    renderer.cleanup();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = match cli.merge_into_options(Options::default()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(options.verbosity);
    info!("teaf v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("options: {:?}", options);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
