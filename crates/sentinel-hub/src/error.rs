//! Error types for the Sentinel Hub client.

use geo_common::{BboxParseError, CrsParseError, TimeParseError};
use thiserror::Error;

pub type SentinelHubResult<T> = Result<T, SentinelHubError>;

#[derive(Debug, Error)]
pub enum SentinelHubError {
    #[error("Invalid bounding box: {0}")]
    InvalidBbox(#[from] BboxParseError),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(#[from] CrsParseError),

    #[error("Invalid date: {0}")]
    InvalidDate(#[from] TimeParseError),

    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    #[error("Invalid output size {width}x{height} (maximum {max})")]
    InvalidSize { width: u32, height: u32, max: u32 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sentinel Hub returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),
}

impl SentinelHubError {
    /// Short, stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            SentinelHubError::InvalidBbox(_) => "invalid_bbox",
            SentinelHubError::InvalidCrs(_) => "invalid_crs",
            SentinelHubError::InvalidDate(_) => "invalid_date",
            SentinelHubError::MissingParameter(_) => "missing_parameter",
            SentinelHubError::InvalidSize { .. } => "invalid_size",
            SentinelHubError::Auth(_) => "auth",
            SentinelHubError::Request(_) => "network",
            SentinelHubError::RemoteStatus { .. } => "remote_status",
            SentinelHubError::UnexpectedBody(_) => "unexpected_body",
        }
    }
}
