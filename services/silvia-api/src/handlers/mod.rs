//! HTTP request handlers.
//!
//! - `geotiff`: upload, metadata and band preview endpoints
//! - `satellite`: Sentinel-2 composite proxy endpoint
//! - `api`: date/status endpoints, health and Prometheus metrics

pub mod api;
pub mod geotiff;
pub mod satellite;

pub use api::{health_handler, metrics_handler, status_handler, today_handler};
pub use geotiff::{band_handler, metadata_handler, upload_handler, UploadResponse};
pub use satellite::{satellite_image_handler, SatelliteParams};
