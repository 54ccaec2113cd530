//! Test fixtures for the Silvia raster crates.
//!
//! `fixtures` encodes small GeoTIFFs through the `tiff` encoder (strips, GDAL
//! band descriptions, no-data). `layouts` hand-writes tiled and planar files
//! the encoder cannot produce. `generators` builds the band values both use.
//!
//! Used as a dev-dependency by `geotiff-reader` and `silvia-api`.

pub mod fixtures;
pub mod generators;
pub mod layouts;

pub use fixtures::*;
pub use generators::*;
pub use layouts::{ChunkShape, RawSample, RawTiff};

/// Assert two sample values agree within `epsilon`, comparing as f64.
///
/// Resampled band values pass through f32 bilinear weights, so exact
/// equality only holds at native size.
///
/// ```ignore
/// test_utils::assert_approx_eq!(raster.data[0], 5.0, 1e-5);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff.is_nan() || diff > epsilon {
            panic!(
                "assertion failed: {} ≈ {} (diff {} exceeds {})",
                left, right, diff, epsilon
            );
        }
    }};
}
