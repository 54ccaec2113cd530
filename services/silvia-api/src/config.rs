//! Service configuration.
//!
//! [`AppConfig`] is assembled once at startup from CLI arguments and the
//! credentials file, then handed to [`crate::state::AppState`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sentinel_hub::SentinelHubConfig;
use serde::Deserialize;
use tracing::{info, warn};

/// Markers left in template credential files.
const PLACEHOLDER_MARKERS: [&str; 2] = ["AQUI", "YOUR_"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub frontend_dir: PathBuf,
    /// `None` when no usable credentials were found
    pub sentinel_hub: Option<SentinelHubConfig>,
}

impl AppConfig {
    pub fn new(upload_dir: impl Into<PathBuf>, frontend_dir: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            upload_dir: upload_dir.into(),
            frontend_dir: frontend_dir.into(),
            sentinel_hub: None,
        }
    }

    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    pub fn with_sentinel_hub(mut self, config: Option<SentinelHubConfig>) -> Self {
        self.sentinel_hub = config;
        self
    }
}

/// Contents of the credentials JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub sh_client_id: String,
    #[serde(default)]
    pub sh_client_secret: String,
}

impl Credentials {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", path.display()))
    }

    /// Both values present and neither is a template placeholder.
    pub fn is_usable(&self) -> bool {
        [&self.sh_client_id, &self.sh_client_secret]
            .iter()
            .all(|v| !v.trim().is_empty() && !is_placeholder(v))
    }
}

pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|m| value.contains(m))
}

/// Load credentials, returning `None` (with a warning) when the satellite
/// proxy must stay disabled.
pub fn load_credentials(path: &Path) -> Option<Credentials> {
    match Credentials::read(path) {
        Ok(creds) if creds.is_usable() => {
            info!(path = %path.display(), "Loaded Sentinel Hub credentials");
            Some(creds)
        }
        Ok(_) => {
            warn!(
                path = %path.display(),
                "Sentinel Hub credentials are empty or placeholders; satellite imagery disabled"
            );
            None
        }
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Satellite imagery disabled");
            None
        }
    }
}
