//! Application state and shared resources.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use sentinel_hub::{ImagerySource, SentinelHubClient};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::satellite::SatelliteProxy;
use crate::storage::UploadStorage;

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub storage: UploadStorage,
    /// `None` when Sentinel Hub is not configured
    pub satellite: Option<SatelliteProxy>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let storage = UploadStorage::new(&config.upload_dir).with_context(|| {
            format!(
                "Failed to create upload directory: {}",
                config.upload_dir.display()
            )
        })?;

        let satellite = match &config.sentinel_hub {
            Some(sh) => {
                let client = SentinelHubClient::new(sh.clone())
                    .context("Failed to build Sentinel Hub HTTP client")?;
                info!(base_url = %sh.base_url, "Satellite imagery enabled");
                Some(SatelliteProxy::new(Arc::new(client)))
            }
            None => {
                warn!("No Sentinel Hub credentials; /api/satellite-image will return 500");
                None
            }
        };

        Ok(Self {
            config,
            storage,
            satellite,
            prometheus: None,
        })
    }

    /// Replace the satellite backend.
    pub fn with_imagery_source(mut self, source: Arc<dyn ImagerySource>) -> Self {
        self.satellite = Some(SatelliteProxy::new(source));
        self
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
