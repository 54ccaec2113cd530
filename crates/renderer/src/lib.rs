//! Image rendering for raster previews.
//!
//! - Min-max stretch of band samples to 8 bits
//! - PNG encoding (grayscale and RGBA)
//! - Transparent placeholder images

pub mod error;
pub mod normalize;
pub mod png;

pub use error::{RenderError, RenderResult};

/// Render band samples as a grayscale PNG after a min-max stretch.
pub fn render_band_png(data: &[f32], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    let pixels = normalize::stretch_to_u8(data);
    png::create_png_gray(&pixels, width, height)
}
