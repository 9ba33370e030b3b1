use std::sync::Arc;

use blendplus_core::{Pixel, Rect, Surface};
use blendplus_io::{encode_png, ImageProvider, ImageSource, MemoryClipboard};
use blendplus_ops::{
    configure, render_surface, BlendMode, EffectSettings, FilterResampler, NeverCancel, Overlay,
    PlacementPolicy, RenderConfig, RenderStatus,
};

const RED: Pixel = Pixel::opaque(255, 0, 0);
const BLUE: Pixel = Pixel::opaque(0, 0, 255);

fn checker(w: u32, h: u32) -> Surface {
    let pixels = (0..h)
        .flat_map(|y| {
            (0..w).map(move |x| {
                if (x + y) % 2 == 0 {
                    Pixel::new(10, 200, 30, 255)
                } else {
                    Pixel::new(240, 5, 90, 128)
                }
            })
        })
        .collect();
    Surface::from_pixels(w, h, pixels).expect("checker")
}

#[test]
fn difference_red_blue() {
    let base = Surface::filled(4, 4, RED);
    let config = RenderConfig {
        blend_mode: BlendMode::Difference,
        overlay: Overlay::Placed(Surface::filled(4, 4, BLUE)),
        ..Default::default()
    };
    let mut dst = Surface::new(4, 4);
    let status = render_surface(&mut dst, &base, &config, base.bounds(), &NeverCancel).expect("render");
    assert_eq!(status, RenderStatus::Completed);
    assert!(dst.pixels().iter().all(|&p| p == Pixel::opaque(255, 0, 255)));
}

#[test]
fn missing_overlay_is_identity() {
    let base = checker(7, 5);
    let settings = EffectSettings {
        source: ImageSource::File("/nowhere/overlay.png".into()),
        blend_mode: BlendMode::Multiply,
        ..Default::default()
    };
    let config = configure(
        &settings,
        base.dimensions(),
        base.bounds(),
        &ImageProvider::new(),
        &FilterResampler::default(),
    );
    assert!(config.overlay.is_absent());

    let mut dst = Surface::new(7, 5);
    render_surface(&mut dst, &base, &config, base.bounds(), &NeverCancel).expect("render");
    assert_eq!(dst, base);
}

#[test]
fn clipboard_overlay_center_then_normal() {
    let clipboard = Arc::new(MemoryClipboard::new());
    clipboard.set_png(encode_png(&Surface::filled(2, 2, BLUE)).expect("encode"));
    let provider = ImageProvider::new().with_clipboard(clipboard);

    let base = Surface::filled(6, 4, RED);
    let settings = EffectSettings {
        source: ImageSource::Clipboard,
        placement: PlacementPolicy::Center,
        ..Default::default()
    };
    let config = configure(
        &settings,
        base.dimensions(),
        base.bounds(),
        &provider,
        &FilterResampler::default(),
    );

    let mut dst = Surface::new(6, 4);
    render_surface(&mut dst, &base, &config, base.bounds(), &NeverCancel).expect("render");

    let placed = Rect::new(2, 1, 2, 2);
    for (x, y) in dst.bounds().iter_coords() {
        let expected = if placed.contains(x, y) { BLUE } else { RED };
        assert_eq!(dst.pixel(x, y), expected, "({x}, {y})");
    }
}

#[test]
fn swapped_normal_shows_base_over_overlay() {
    let base = checker(4, 4);
    let config = RenderConfig {
        blend_mode: BlendMode::Normal,
        swap_layers: true,
        overlay: Overlay::Placed(Surface::filled(4, 4, BLUE)),
        ..Default::default()
    };
    let mut dst = Surface::new(4, 4);
    render_surface(&mut dst, &base, &config, base.bounds(), &NeverCancel).expect("render");

    // opaque base pixels win outright
    assert_eq!(dst.pixel(0, 0), base.pixel(0, 0));
    let half = dst.pixel(1, 0);
    assert_eq!(half.a, 255);
    assert!(half.r > 100 && half.b > 100);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_render_of_configured_effect() {
    use blendplus_ops::parallel::render_tiles;

    let clipboard = Arc::new(MemoryClipboard::new());
    clipboard.set_bitmap(checker(9, 3));
    let provider = ImageProvider::new().with_clipboard(clipboard);

    let base = checker(40, 30);
    let settings = EffectSettings {
        source: ImageSource::Clipboard,
        placement: PlacementPolicy::Fit,
        blend_mode: BlendMode::Overlay,
        swap_layers: false,
    };
    let selection = Rect::new(5, 5, 30, 20);
    let config = configure(&settings, base.dimensions(), selection, &provider, &FilterResampler::default());
    assert!(!config.overlay.is_absent());

    let mut serial = Surface::new(40, 30);
    render_surface(&mut serial, &base, &config, base.bounds(), &NeverCancel).expect("serial");
    let mut par = Surface::new(40, 30);
    render_tiles(&mut par, &base, &config, base.bounds(), 7, &NeverCancel).expect("parallel");
    assert_eq!(par, serial);
}
