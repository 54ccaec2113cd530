//! Error types for GeoTIFF reading operations.

use thiserror::Error;

/// Result type for GeoTIFF reader operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Error types for GeoTIFF reading.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TIFF decoder rejected the file
    #[error("TIFF decode error: {0}")]
    Decode(#[from] tiff::TiffError),

    /// Requested band is not in `1..=count`
    #[error("Band index {band} out of range (file has {count} bands)")]
    BandOutOfRange { band: usize, count: usize },

    /// Chunk layout the reader cannot map to band samples
    #[error("Unsupported raster layout: {0}")]
    UnsupportedLayout(String),

    /// Malformed GDAL metadata tag
    #[error("Invalid GDAL metadata: {0}")]
    Metadata(String),

    #[error("Invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}
