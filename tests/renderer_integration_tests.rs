//! Headless integration tests for the renderer.
//!
//! Every test drives the real renderer against the null backend and inspects
//! the composite through the shared recorder.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use teaf_rust::graphics::coords::{DisplayMode, DisplayResolution, ResizeMode};
use teaf_rust::graphics::palette;
use teaf_rust::graphics::sdl::{GraphicsEvent, NullBackend, SharedRecorder};
use teaf_rust::graphics::{LayerHandle, Rect, Renderer, RendererConfig, SheetLibrary};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn opaque(index: u8) -> u32 {
    palette::argb(index).unwrap() | 0xFF00_0000
}

fn setup(config: RendererConfig) -> (Renderer, SharedRecorder) {
    let backend = NullBackend::new();
    let recorder = backend.recorder();
    let mut renderer = Renderer::new();
    renderer
        .init(Box::new(backend), &config, SheetLibrary::new())
        .unwrap();
    (renderer, recorder)
}

/// Present frames until the pending resize has been applied.
fn settle(renderer: &mut Renderer, now: Instant) -> Instant {
    let later = now + ms(200);
    renderer.present_at(&mut |_: &mut Renderer| {}, later).unwrap();
    later
}

#[cfg(test)]
mod layer_tests {
    use super::*;

    #[test]
    fn test_handles_stay_stable_after_destroy() {
        let (mut renderer, _recorder) = setup(RendererConfig::default());
        let a = renderer.create_layer(false);
        let b = renderer.create_layer(false);
        let c = renderer.create_layer(true);

        renderer.destroy_layer(b);
        assert!(renderer.layer(a).is_some());
        assert!(renderer.layer(b).is_none());
        assert!(renderer.layer(c).is_some());

        let d = renderer.create_layer(false);
        assert_ne!(d, b);
        assert!(renderer.layer(b).is_none());

        renderer.destroy_layer(b);
        renderer.destroy_layer(LayerHandle::INVALID);
        assert_eq!(renderer.layer_count(), 5);
    }

    #[test]
    fn test_seventeen_layers_double_capacity_once() {
        let (mut renderer, _recorder) = setup(RendererConfig::default());
        let mut handles: Vec<LayerHandle> = renderer.layer_handles();
        while handles.len() < 17 {
            let handle = renderer.create_layer(false);
            assert!(handle.is_valid());
            handles.push(handle);
        }

        assert_eq!(renderer.layer_count(), 17);
        assert_eq!(renderer.layer_capacity(), 32);
        assert_eq!(renderer.layer_growths(), 1);
        let unique: HashSet<_> = handles.iter().copied().collect();
        assert_eq!(unique.len(), 17);
        assert!(handles.iter().all(|&h| renderer.layer(h).is_some()));
    }

    #[test]
    fn test_setters_are_idempotent() {
        let (mut renderer, _recorder) = setup(RendererConfig::default());
        let layer = renderer.create_layer(false);

        renderer.set_layer_opacity(layer, 80);
        renderer.set_layer_opacity(layer, 80);
        assert_eq!(renderer.layer(layer).unwrap().opacity(), 80);

        renderer.set_layer_visible(layer, false);
        renderer.set_layer_visible(layer, false);
        assert!(!renderer.layer(layer).unwrap().is_visible());

        renderer.set_clear_color(7);
        renderer.set_clear_color(7);
        assert_eq!(renderer.clear_color(), 7);

        renderer.set_resize_mode(ResizeMode::Fit);
        renderer.set_display_resolution(DisplayResolution::Vga);
        renderer.set_scale(1.0);
        assert!(!renderer.is_resizing());
    }

    #[test]
    fn test_mutators_ignore_unknown_handles() {
        let (mut renderer, _recorder) = setup(RendererConfig::default());
        let layer = renderer.create_layer(false);
        renderer.destroy_layer(layer);

        renderer.set_layer_opacity(layer, 3);
        renderer.set_layer_size(layer, 4);
        renderer.draw_fill(layer, 1);
        assert!(renderer.layer(layer).is_none());
        assert_eq!(renderer.layer_count(), 2);
    }
}

#[cfg(test)]
mod composite_tests {
    use super::*;

    #[test]
    fn test_layers_composite_in_creation_order() {
        let (mut renderer, recorder) = setup(RendererConfig::default());
        // 854x480 window, 640x480 viewport at x = 107.
        assert_eq!(renderer.viewport(), Rect::new(107, 0, 640, 480));

        let mid = renderer.create_layer(false);
        renderer.set_layer_opacity(mid, 10);
        let bg = renderer.background_layer();
        let system = renderer.system_layer();
        renderer.set_system_data(teaf_rust::graphics::SystemData::LayerCount, true);

        let start = Instant::now();
        renderer
            .present_at(
                &mut |r: &mut Renderer| {
                    r.draw_rect(bg, Rect::new(0, 0, 40, 10), 2);
                    r.draw_rect(mid, Rect::new(0, 0, 20, 10), 1);
                    r.draw_rect(system, Rect::new(0, 0, 5, 5), 0);
                },
                start,
            )
            .unwrap();

        let recorder = recorder.lock();
        assert_eq!(recorder.presented, 1);
        // System layer wins even though it was created before `mid`.
        assert_eq!(recorder.frame_pixel(107, 0), Some(opaque(0)));
        // Background shows beyond the mid rect.
        assert_eq!(recorder.frame_pixel(107 + 30, 0), Some(opaque(2)));
        // The mid layer is blended over the background, never under it.
        let blended = recorder.frame_pixel(107 + 10, 0).unwrap();
        assert_ne!(blended, opaque(2));
        assert_ne!(blended, opaque(1));
        // Clear color everywhere else, margins included.
        assert_eq!(recorder.frame_pixel(0, 400), Some(opaque(palette::DEFAULT_CLEAR_COLOR)));
    }

    #[test]
    fn test_opaque_layer_covers_background() {
        let (mut renderer, recorder) = setup(RendererConfig::default());
        let mid = renderer.create_layer(false);
        renderer
            .present(&mut |r: &mut Renderer| r.draw_fill(mid, 9))
            .unwrap();

        let recorder = recorder.lock();
        assert_eq!(recorder.frame_pixel(107, 0), Some(opaque(9)));
        assert_eq!(recorder.frame_pixel(746, 479), Some(opaque(9)));
        // The mid layer only covers the viewport.
        assert_eq!(recorder.frame_pixel(106, 0), Some(opaque(palette::DEFAULT_CLEAR_COLOR)));
        assert_eq!(recorder.frame_pixel(747, 0), Some(opaque(palette::DEFAULT_CLEAR_COLOR)));
    }

    #[test]
    fn test_hidden_and_zero_opacity_layers_are_skipped() {
        let (mut renderer, recorder) = setup(RendererConfig::default());
        let hidden = renderer.create_layer(false);
        let clear = renderer.create_layer(false);
        renderer.set_layer_visible(hidden, false);
        renderer.set_layer_opacity(clear, 0);
        renderer
            .present(&mut |r: &mut Renderer| {
                r.draw_fill(hidden, 1);
                r.draw_fill(clear, 2);
            })
            .unwrap();

        let recorder = recorder.lock();
        assert_eq!(recorder.frame_pixel(300, 200), Some(opaque(palette::DEFAULT_CLEAR_COLOR)));
    }

    #[test]
    fn test_draw_outside_layer_reaches_margins() {
        let (mut renderer, recorder) = setup(RendererConfig::default());
        let outside = renderer.create_layer(true);
        renderer
            .present(&mut |r: &mut Renderer| r.draw_rect(outside, Rect::new(-107, 0, 10, 10), 5))
            .unwrap();

        let recorder = recorder.lock();
        assert_eq!(recorder.frame_pixel(0, 0), Some(opaque(5)));
        assert_eq!(recorder.frame_pixel(9, 9), Some(opaque(5)));
    }
}

#[cfg(test)]
mod resize_tests {
    use super::*;

    #[test]
    fn test_burst_of_resizes_recreates_once() {
        let (mut renderer, _recorder) = setup(RendererConfig::default());
        let start = Instant::now();
        let mut scene = |_: &mut Renderer| {};

        for i in 0..10u64 {
            let now = start + ms(i * 5);
            renderer.handle_resize_at(800 + i as i32 * 10, 600, now);
            renderer.present_at(&mut scene, now).unwrap();
        }
        for t in [60, 100, 150, 194] {
            renderer.present_at(&mut scene, start + ms(t)).unwrap();
        }
        assert_eq!(renderer.recreation_count(), 0);

        for t in [195, 250, 400] {
            renderer.present_at(&mut scene, start + ms(t)).unwrap();
        }
        assert_eq!(renderer.recreation_count(), 1);
        assert_eq!(renderer.window_size(), (890, 600));
    }

    #[test]
    fn test_single_resize_recreates_exactly_once() {
        let (mut renderer, _recorder) = setup(RendererConfig::default());
        let start = Instant::now();
        renderer.handle_resize_at(1280, 720, start);
        let later = settle(&mut renderer, start);
        renderer
            .present_at(&mut |_: &mut Renderer| {}, later + ms(500))
            .unwrap();
        assert_eq!(renderer.recreation_count(), 1);
    }

    #[test]
    fn test_wide_window_letterboxes_left_and_right() {
        let (mut renderer, recorder) = setup(RendererConfig::default());
        let start = Instant::now();
        renderer.handle_resize_at(1280, 720, start);
        settle(&mut renderer, start);

        assert_eq!(renderer.scale_factor(), 1.5);
        assert_eq!(renderer.viewport(), Rect::new(160, 0, 960, 720));
        assert_eq!(renderer.viewport_size(), (960, 720));
        assert!(renderer.is_in_viewport(160, 0));
        assert!(!renderer.is_in_viewport(159, 0));
        assert!(!renderer.is_in_viewport(1120, 0));

        let layer = renderer.create_layer(false);
        assert_eq!(renderer.layer_surface(layer).unwrap().width(), 960);
        let bg = renderer.background_layer();
        assert_eq!(renderer.layer_surface(bg).unwrap().width(), 1280);
        assert_eq!(recorder.lock().last_source_size, (1280, 720));
    }

    #[test]
    fn test_poll_events_routes_resizes() {
        let (mut renderer, recorder) = setup(RendererConfig::default());
        recorder.lock().resize_window(1000, 500);
        recorder.lock().push_event(GraphicsEvent::Quit);

        let events = renderer.poll_events().unwrap();
        assert_eq!(events, vec![GraphicsEvent::Resized(1000, 500), GraphicsEvent::Quit]);
        assert!(renderer.is_resizing());
    }

    #[test]
    fn test_large_fixed_scale_keeps_layers_window_sized() {
        let (mut renderer, recorder) = setup(RendererConfig {
            resize_mode: ResizeMode::Fixed,
            ..RendererConfig::default()
        });
        renderer.set_scale(20.0);
        settle(&mut renderer, Instant::now());
        assert_eq!(renderer.window_size(), (854, 480));
        assert_eq!(renderer.viewport_size(), (12800, 9600));

        let layer = renderer.create_layer(false);
        let surface = renderer.layer_surface(layer).unwrap();
        assert!(surface.width() <= 854);
        assert!(surface.height() <= 480);
        let bg = renderer.background_layer();
        assert_eq!(renderer.layer_surface(bg).unwrap().width(), 854);

        // The middle of the canvas still lands in the middle of the window.
        renderer
            .present(&mut |r: &mut Renderer| r.draw_rect(layer, Rect::new(320, 240, 1, 1), 6))
            .unwrap();
        let recorder = recorder.lock();
        assert_eq!(recorder.frame_pixel(427, 240), Some(opaque(6)));
        assert_eq!(recorder.frame_pixel(446, 259), Some(opaque(6)));
        assert_eq!(recorder.frame_pixel(447, 240), Some(opaque(palette::DEFAULT_CLEAR_COLOR)));
    }

    #[test]
    fn test_fullscreen_round_trip_restores_window() {
        let (mut renderer, recorder) = setup(RendererConfig {
            resize_mode: ResizeMode::Fixed,
            scale: 2.0,
            ..RendererConfig::default()
        });
        assert_eq!(renderer.viewport(), Rect::new(214, 0, 1280, 960));

        let start = Instant::now();
        renderer
            .set_display_mode_at(DisplayMode::Fullscreen, start)
            .unwrap();
        let now = settle(&mut renderer, start);
        assert_eq!(renderer.window_size(), (1920, 1080));
        assert_eq!(renderer.last_windowed_size(), (1708, 960));
        assert_eq!(renderer.effective_resize_mode(), ResizeMode::Fit);
        assert_eq!(renderer.scale_factor(), 2.25);

        renderer
            .set_display_mode_at(DisplayMode::Windowed, now)
            .unwrap();
        settle(&mut renderer, now);
        assert_eq!(renderer.window_size(), (1708, 960));
        assert_eq!(renderer.effective_resize_mode(), ResizeMode::Fixed);
        assert_eq!(renderer.scale_factor(), 2.0);

        let recorder = recorder.lock();
        assert_eq!(recorder.display_mode, DisplayMode::Windowed);
        assert_eq!(recorder.mode_changes.len(), 2);
    }
}
