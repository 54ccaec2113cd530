//! Sentinel Hub client for cloud-masked Sentinel-2 true colour composites.
//!
//! A request is validated into a [`CompositeRequest`], then
//! [`SentinelHubClient`] exchanges client credentials for a token and posts
//! it to the Process API, which answers with a PNG.

pub mod auth;
pub mod client;
pub mod error;
pub mod process;

pub use client::{
    ImagerySource, SentinelHubClient, SentinelHubConfig, DEFAULT_BASE_URL, DEFAULT_TOKEN_URL,
};
pub use error::{SentinelHubError, SentinelHubResult};
pub use process::{
    CompositeRequest, ProcessRequest, LOOKBACK_DAYS, MAX_OUTPUT_DIM,
    TRUE_COLOR_CLOUDLESS_EVALSCRIPT,
};
