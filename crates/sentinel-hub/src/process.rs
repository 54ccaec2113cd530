//! Process API request model.
//!
//! See the Sentinel Hub Process API reference for the JSON layout. Only the
//! fields this service sends are modelled.

use chrono::NaiveDate;
use geo_common::{parse_date, BoundingBox, CrsCode, TimeWindow};
use serde::Serialize;

use crate::error::{SentinelHubError, SentinelHubResult};

/// Days of imagery considered before the requested date.
pub const LOOKBACK_DAYS: i64 = 90;

/// Largest output edge the Process API accepts.
pub const MAX_OUTPUT_DIM: u32 = 2500;

/// Sentinel-2 L2A collection identifier.
pub const SENTINEL2_L2A: &str = "sentinel-2-l2a";

/// Per-pixel program run by the remote service.
///
/// Pixels without data, or whose scene classification is no-data (0),
/// saturated/defective (1), cloud shadow (3), cloud medium/high probability
/// (8, 9), thin cirrus (10) or snow (11), are fully transparent. The rest are
/// a true colour stretch of B04/B03/B02 with a 2.5 gain.
pub const TRUE_COLOR_CLOUDLESS_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: [{ bands: ["B04", "B03", "B02", "SCL", "dataMask"] }],
    output: { bands: 4, sampleType: "UINT8" }
  };
}

const INVALID_SCL = [0, 1, 3, 8, 9, 10, 11];
const GAIN = 2.5;

function evaluatePixel(sample) {
  if (sample.dataMask === 0 || INVALID_SCL.includes(sample.SCL)) {
    return [0, 0, 0, 0];
  }
  return [
    GAIN * sample.B04 * 255,
    GAIN * sample.B03 * 255,
    GAIN * sample.B02 * 255,
    255
  ];
}
"#;

/// A validated composite request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRequest {
    pub bbox: BoundingBox,
    pub crs: CrsCode,
    pub window: TimeWindow,
    pub width: u32,
    pub height: u32,
}

impl CompositeRequest {
    /// Validate raw query values.
    ///
    /// `date` defaults to `today`. A missing `crs` is an error: the bbox
    /// coordinates cannot be interpreted without it.
    pub fn parse(
        bbox: &str,
        date: Option<&str>,
        width: u32,
        height: u32,
        crs: Option<&str>,
        today: NaiveDate,
    ) -> SentinelHubResult<Self> {
        let end = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => parse_date(date)?,
            None => today,
        };
        let crs = match crs.map(str::trim).filter(|c| !c.is_empty()) {
            Some(crs) => CrsCode::parse(crs)?,
            None => return Err(SentinelHubError::MissingParameter("CRS")),
        };
        let bbox = BoundingBox::parse(bbox)?;

        if width == 0 || height == 0 || width > MAX_OUTPUT_DIM || height > MAX_OUTPUT_DIM {
            return Err(SentinelHubError::InvalidSize {
                width,
                height,
                max: MAX_OUTPUT_DIM,
            });
        }

        Ok(Self {
            bbox,
            crs,
            window: TimeWindow::lookback(end, LOOKBACK_DAYS),
            width,
            height,
        })
    }

    /// Build the JSON body for `POST /api/v1/process`.
    pub fn to_process_body(&self) -> ProcessRequest {
        let (from, to) = self.window.rfc3339_bounds();
        ProcessRequest {
            input: ProcessInput {
                bounds: Bounds {
                    bbox: self.bbox.to_array(),
                    properties: BoundsProperties {
                        crs: self.crs.to_ogc_url(),
                    },
                },
                data: vec![InputData {
                    data_type: SENTINEL2_L2A.to_string(),
                    data_filter: DataFilter {
                        time_range: TimeRange { from, to },
                        mosaicking_order: "leastCC".to_string(),
                    },
                }],
            },
            output: ProcessOutput {
                width: self.width,
                height: self.height,
                responses: vec![OutputResponse {
                    identifier: "default".to_string(),
                    format: OutputFormat {
                        format_type: "image/png".to_string(),
                    },
                }],
            },
            evalscript: TRUE_COLOR_CLOUDLESS_EVALSCRIPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub input: ProcessInput,
    pub output: ProcessOutput,
    pub evalscript: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessInput {
    pub bounds: Bounds,
    pub data: Vec<InputData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bounds {
    pub bbox: [f64; 4],
    pub properties: BoundsProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundsProperties {
    pub crs: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputData {
    #[serde(rename = "type")]
    pub data_type: String,
    pub data_filter: DataFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilter {
    pub time_range: TimeRange,
    pub mosaicking_order: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutput {
    pub width: u32,
    pub height: u32,
    pub responses: Vec<OutputResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputResponse {
    pub identifier: String,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}
