//! Synthetic band generators.
//!
//! These create predictable, verifiable sample patterns for reader and
//! renderer tests. All grids are row-major (row 0 first).

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// A band increasing left to right, top to bottom: `row * width + col`.
///
/// The minimum sits at the top-left pixel and the maximum at the
/// bottom-right one.
pub fn create_ramp_band(width: usize, height: usize) -> Vec<f32> {
    (0..width * height).map(|i| i as f32).collect()
}

/// A band with the same value everywhere.
pub fn create_constant_band(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Reflectance-like band (0.0 - 0.4) with a bright diagonal.
pub fn create_reflectance_band(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let on_diagonal = col * height / width.max(1) == row;
            data.push(if on_diagonal {
                0.4
            } else {
                0.05 + 0.2 * (col as f32 / width.max(1) as f32)
            });
        }
    }
    data
}

/// Interleave single-band grids into chunky (pixel-interleaved) order.
pub fn interleave<T: Copy>(bands: &[Vec<T>]) -> Vec<T> {
    let pixels = bands.first().map(Vec::len).unwrap_or(0);
    let mut out = Vec::with_capacity(pixels * bands.len());
    for i in 0..pixels {
        for band in bands {
            out.push(band[i]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_band_extremes() {
        let band = create_ramp_band(4, 3);
        assert_eq!(band[0], 0.0);
        assert_eq!(band[11], 11.0);
    }

    #[test]
    fn test_interleave() {
        let out = interleave(&[vec![1u8, 2], vec![10, 20], vec![100, 200]]);
        assert_eq!(out, vec![1, 10, 100, 2, 20, 200]);
    }

    #[test]
    fn test_reflectance_band_range() {
        let band = create_reflectance_band(16, 16);
        assert!(band.iter().all(|v| (0.0..=0.4).contains(v)));
    }
}
