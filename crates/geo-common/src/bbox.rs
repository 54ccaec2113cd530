//! Bounding box types and parsing.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// Coordinates are in the units of whatever CRS accompanies the box:
/// degrees for EPSG:4326, meters for EPSG:3857 and most UTM zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Parse a BBOX query parameter: "minx,miny,maxx,maxy".
    ///
    /// Surrounding whitespace on each coordinate is ignored.
    pub fn parse(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let coord = |part: &str| -> Result<f64, BboxParseError> {
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| BboxParseError::InvalidNumber(part.to_string()))
        };

        Ok(Self {
            min_x: coord(parts[0])?,
            min_y: coord(parts[1])?,
            max_x: coord(parts[2])?,
            max_y: coord(parts[3])?,
        })
    }

    /// Coordinates in the `[minx, miny, maxx, maxy]` order used by JSON APIs.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
