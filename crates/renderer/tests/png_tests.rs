//! Tests for PNG encoding and band rendering.
//!
//! Encoded images are decoded again with the `image` crate to check that
//! the output is a valid PNG with the expected pixels.

use image::GenericImageView;
use renderer::png::{create_png_gray, create_png_rgba, create_transparent_png, is_png};
use renderer::render_band_png;
use test_utils::{create_constant_band, create_ramp_band, create_reflectance_band};

// ============================================================================
// Encoders
// ============================================================================

#[test]
fn test_gray_png_decodes_to_same_pixels() {
    let pixels: Vec<u8> = (0..=255).collect();
    let png = create_png_gray(&pixels, 16, 16).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (16, 16));
    assert_eq!(decoded.into_raw(), pixels);
}

#[test]
fn test_rgba_png_decodes_to_same_pixels() {
    let pixels = [
        255, 0, 0, 255, // red
        0, 255, 0, 128, // half-transparent green
        0, 0, 255, 0, // transparent blue
        10, 20, 30, 255,
    ];
    let png = create_png_rgba(&pixels, 2, 2).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.into_raw(), pixels.to_vec());
}

#[test]
fn test_transparent_png_every_pixel_clear() {
    let png = create_transparent_png(37, 19).unwrap();
    assert!(is_png(&png));

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.dimensions(), (37, 19));
    assert!(decoded.to_rgba8().pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

#[test]
fn test_is_png_rejects_other_bytes() {
    assert!(!is_png(b"GIF89a"));
    assert!(!is_png(&[]));
}

// ============================================================================
// Band rendering
// ============================================================================

#[test]
fn test_render_band_min_and_max_pixels() {
    let band = create_ramp_band(8, 4);
    let png = render_band_png(&band, 8, 4).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_luma8();
    assert_eq!(decoded.get_pixel(0, 0).0, [0]);
    assert_eq!(decoded.get_pixel(7, 3).0, [255]);
}

#[test]
fn test_render_constant_band_is_black() {
    let band = create_constant_band(5, 5, 0.25);
    let png = render_band_png(&band, 5, 5).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_luma8();
    assert!(decoded.pixels().all(|p| p.0 == [0]));
}

#[test]
fn test_render_reflectance_band_uses_full_range() {
    let band = create_reflectance_band(32, 32);
    let png = render_band_png(&band, 32, 32).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_luma8();
    let max = decoded.pixels().map(|p| p.0[0]).max().unwrap();
    let min = decoded.pixels().map(|p| p.0[0]).min().unwrap();
    assert_eq!(max, 255);
    assert_eq!(min, 0);
}
