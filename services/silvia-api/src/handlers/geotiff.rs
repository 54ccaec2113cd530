//! GeoTIFF upload, metadata and band preview handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Multipart, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use geotiff_reader::{GeoTiff, GeoTiffError, RasterMetadata, PREVIEW_MAX_DIM};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the raster.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub detail: String,
}

/// POST /api/upload-geotiff
#[instrument(skip(state, multipart))]
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;

        let bytes = state.storage.store(&filename, field).await?;
        metrics::record_upload(bytes);
        info!(filename = %filename, bytes, "GeoTIFF uploaded");

        return Ok(Json(UploadResponse {
            filename,
            detail: "File uploaded successfully".to_string(),
        }));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// GET /api/geotiff-metadata/:filename
#[instrument(skip(state))]
pub async fn metadata_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<RasterMetadata>, ApiError> {
    let path = state.storage.resolve(&filename).await?;

    let metadata = tokio::task::spawn_blocking(move || {
        GeoTiff::open(&path).map(|tiff| tiff.metadata().clone())
    })
    .await
    .map_err(|e| ApiError::Processing(e.to_string()))?
    .map_err(|e| {
        error!(filename = %filename, error = %e, "Failed to read GeoTIFF metadata");
        ApiError::from(e)
    })?;

    Ok(Json(metadata))
}

/// GET /api/geotiff-band/:filename/:band_index
#[instrument(skip(state))]
pub async fn band_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((filename, band_index)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state.storage.resolve(&filename).await?;
    let band: usize = band_index
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid band index: {:?}", band_index)))?;

    let start = Instant::now();
    let png = tokio::task::spawn_blocking(move || render_band(&path, band))
        .await
        .map_err(|e| ApiError::Processing(e.to_string()))??;

    metrics::record_band_render(start.elapsed());
    info!(
        filename = %filename,
        band,
        bytes = png.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Rendered band preview"
    );

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// Open, resample to preview size, stretch and encode. Blocking.
fn render_band(path: &std::path::Path, band: usize) -> Result<Vec<u8>, ApiError> {
    let raster = GeoTiff::open(path)
        .and_then(|mut tiff| tiff.read_band_preview(band, PREVIEW_MAX_DIM))
        .map_err(|e| {
            match e {
                GeoTiffError::BandOutOfRange { .. } => warn!(error = %e, "Rejected band request"),
                _ => error!(path = %path.display(), error = %e, "Failed to read band"),
            }
            ApiError::from(e)
        })?;

    renderer::render_band_png(&raster.data, raster.width as usize, raster.height as usize)
        .map_err(|e| {
            error!(error = %e, "PNG encoding failed");
            ApiError::Processing(e.to_string())
        })
}
