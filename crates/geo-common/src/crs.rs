//! Coordinate Reference System identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A CRS identifier as accepted on the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// An EPSG code (4326, 3857, 32630, ...)
    Epsg(u32),
    /// OGC CRS:84, WGS84 with lon/lat axis order
    Crs84,
}

impl CrsCode {
    /// Parse a CRS string from a request.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326" / "epsg:3857"
    /// - "CRS:84"
    /// - "urn:ogc:def:crs:EPSG::32630"
    /// - "http://www.opengis.net/def/crs/EPSG/0/3857"
    /// - a bare EPSG number, "4326"
    pub fn parse(s: &str) -> Result<Self, CrsParseError> {
        let trimmed = s.trim();
        let normalized = trimmed.to_uppercase();

        if normalized == "CRS:84" || normalized.ends_with("/CRS84") || normalized.ends_with(":CRS84")
        {
            return Ok(CrsCode::Crs84);
        }

        let code = if let Some(code) = normalized.strip_prefix("EPSG:") {
            code
        } else if let Some(code) = normalized.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // The version segment may be empty ("EPSG::4326") or present ("EPSG:9.6:4326")
            code.rsplit(':').next().unwrap_or_default()
        } else if normalized.contains("/DEF/CRS/EPSG/") {
            normalized.rsplit('/').next().unwrap_or_default()
        } else {
            normalized.as_str()
        };

        let code: u32 = code
            .parse()
            .map_err(|_| CrsParseError::UnsupportedCrs(trimmed.to_string()))?;

        match code {
            0 => Err(CrsParseError::UnsupportedCrs(trimmed.to_string())),
            // Legacy Google Mercator alias
            900913 => Ok(CrsCode::Epsg(3857)),
            code => Ok(CrsCode::Epsg(code)),
        }
    }

    /// The OGC definition URL, which is what the Process API expects in
    /// `bounds.properties.crs`.
    pub fn to_ogc_url(&self) -> String {
        match self {
            CrsCode::Epsg(code) => format!("http://www.opengis.net/def/crs/EPSG/0/{}", code),
            CrsCode::Crs84 => "http://www.opengis.net/def/crs/OGC/1.3/CRS84".to_string(),
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Epsg(code) => write!(f, "EPSG:{}", code),
            CrsCode::Crs84 => write!(f, "CRS:84"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
