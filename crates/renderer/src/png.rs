//! PNG encoding for 8-bit image data.
//!
//! Supports the two color types the service produces:
//! - **Grayscale (color type 0)**: band previews, one byte per pixel.
//! - **RGBA (color type 6)**: satellite placeholders and composites.
//!
//! Scanlines are fed to the deflate stream one at a time with filter type 0,
//! so encoding never builds a second full-size copy of the image.

use std::io::Write;

use crate::error::{RenderError, RenderResult};

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// PNG color types used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorType {
    Gray = 0,
    Rgba = 6,
}

impl ColorType {
    fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Gray => 1,
            ColorType::Rgba => 4,
        }
    }
}

/// Create an 8-bit grayscale PNG.
///
/// # Arguments
/// - `pixels`: one byte per pixel, row-major
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png_gray(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(pixels, width, height, ColorType::Gray)?;
    encode(ColorType::Gray, width, height, |y| {
        &pixels[y * width..(y + 1) * width]
    })
}

/// Create a PNG image from RGBA pixel data (color type 6).
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png_rgba(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(pixels, width, height, ColorType::Rgba)?;
    let stride = width * 4;
    encode(ColorType::Rgba, width, height, |y| {
        &pixels[y * stride..(y + 1) * stride]
    })
}

/// Create a fully transparent RGBA PNG without allocating the full image.
pub fn create_transparent_png(width: usize, height: usize) -> RenderResult<Vec<u8>> {
    let row = vec![0u8; width * 4];
    encode(ColorType::Rgba, width, height, |_| row.as_slice())
}

/// Check whether a byte buffer starts with the PNG signature.
pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

fn check_len(pixels: &[u8], width: usize, height: usize, color: ColorType) -> RenderResult<()> {
    let expected = width * height * color.bytes_per_pixel();
    if pixels.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

fn encode<'a, F>(color: ColorType, width: usize, height: usize, row: F) -> RenderResult<Vec<u8>>
where
    F: Fn(usize) -> &'a [u8],
{
    if width == 0 || height == 0 || width > u32::MAX as usize || height > u32::MAX as usize {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&PNG_SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color as u8);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat(height, row)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Deflate scanlines for the IDAT chunk.
fn deflate_idat<'a, F>(height: usize, row: F) -> RenderResult<Vec<u8>>
where
    F: Fn(usize) -> &'a [u8],
{
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    for y in 0..height {
        encoder.write_all(&[0])?; // filter type: none
        encoder.write_all(row(y))?;
    }
    Ok(encoder.finish()?)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    // CRC covers chunk type and data
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
