//! Satellite composite proxy.
//!
//! Wraps an [`ImagerySource`] with the degrade policy: any failure becomes a
//! fully transparent PNG of the requested size so map clients always get an
//! image back.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use renderer::png::{create_transparent_png, is_png};
use renderer::{RenderError, RenderResult};
use sentinel_hub::{CompositeRequest, ImagerySource, SentinelHubError, SentinelHubResult};
use tracing::{instrument, warn};

use crate::metrics;

/// Raw composite query. Only the output size is validated by the caller.
#[derive(Debug, Clone, Default)]
pub struct SatelliteQuery {
    pub bbox: Option<String>,
    pub date: Option<String>,
    pub width: u32,
    pub height: u32,
    pub crs: Option<String>,
}

#[derive(Clone)]
pub struct SatelliteProxy {
    source: Arc<dyn ImagerySource>,
}

impl SatelliteProxy {
    pub fn new(source: Arc<dyn ImagerySource>) -> Self {
        Self { source }
    }

    /// Composite PNG for `query`, or a transparent placeholder.
    ///
    /// Only fails if the placeholder itself cannot be encoded.
    #[instrument(skip(self), fields(bbox = ?query.bbox, date = ?query.date))]
    pub async fn composite(&self, query: &SatelliteQuery) -> RenderResult<Bytes> {
        metrics::record_satellite_request();

        match self.try_composite(query).await {
            Ok(png) => Ok(png),
            Err(e) => {
                warn!(
                    reason = e.reason(),
                    error = %e,
                    "Satellite composite failed, returning transparent placeholder"
                );
                metrics::record_satellite_fallback(e.reason());
                placeholder(query.width, query.height).await
            }
        }
    }

    async fn try_composite(&self, query: &SatelliteQuery) -> SentinelHubResult<Bytes> {
        let request = CompositeRequest::parse(
            query.bbox.as_deref().unwrap_or_default(),
            query.date.as_deref(),
            query.width,
            query.height,
            query.crs.as_deref(),
            Utc::now().date_naive(),
        )?;

        let bytes = self.source.fetch_composite(&request).await?;
        if !is_png(&bytes) {
            return Err(SentinelHubError::UnexpectedBody(format!(
                "{} bytes without a PNG signature",
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

/// Transparent PNG of the requested size. Sizes are only bounded by what the
/// client asked for, so deflating runs on the blocking pool.
async fn placeholder(width: u32, height: u32) -> RenderResult<Bytes> {
    tokio::task::spawn_blocking(move || create_transparent_png(width as usize, height as usize))
        .await
        .map_err(|e| RenderError::Compression(std::io::Error::other(e)))?
        .map(Bytes::from)
}
