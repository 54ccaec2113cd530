//! Satellite composite endpoint.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::satellite::SatelliteQuery;
use crate::state::AppState;

/// Query parameters, named as WMS clients send them.
#[derive(Debug, Default, Deserialize)]
pub struct SatelliteParams {
    #[serde(rename = "BBOX")]
    pub bbox: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "WIDTH")]
    pub width: Option<String>,
    #[serde(rename = "HEIGHT")]
    pub height: Option<String>,
    #[serde(rename = "CRS")]
    pub crs: Option<String>,
    #[serde(rename = "SRS")]
    pub srs: Option<String>,
}

impl SatelliteParams {
    /// Validate the output size; everything else is left to the proxy.
    pub fn into_query(self) -> Result<SatelliteQuery, ApiError> {
        let width = parse_dimension("WIDTH", self.width.as_deref())?;
        let height = parse_dimension("HEIGHT", self.height.as_deref())?;
        let crs = self
            .crs
            .filter(|c| !c.trim().is_empty())
            .or(self.srs.filter(|s| !s.trim().is_empty()));

        Ok(SatelliteQuery {
            bbox: self.bbox,
            date: self.date,
            width,
            height,
            crs,
        })
    }
}

fn parse_dimension(name: &str, value: Option<&str>) -> Result<u32, ApiError> {
    let value = value.ok_or_else(|| ApiError::BadRequest(format!("Missing {} parameter", name)))?;
    match value.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be a positive integer, got {:?}",
            name, value
        ))),
    }
}

/// GET /api/satellite-image?BBOX=..&date=..&WIDTH=..&HEIGHT=..&CRS=..
pub async fn satellite_image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SatelliteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let proxy = state.satellite.as_ref().ok_or_else(|| {
        ApiError::Configuration("Sentinel Hub configuration is not valid".to_string())
    })?;

    let query = params.into_query()?;
    let png = proxy
        .composite(&query)
        .await
        .map_err(|e| ApiError::Processing(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
