//! Raster metadata: band count, band labels and pixel dimensions.
//!
//! Band descriptions are not part of baseline TIFF. GDAL stores them in the
//! private `GDAL_METADATA` tag as a small XML document:
//!
//! ```xml
//! <GDALMetadata>
//!   <Item name="DESCRIPTION" sample="0" role="description">Red</Item>
//! </GDALMetadata>
//! ```

use std::io::{Read, Seek};

use serde::{Deserialize, Serialize};
use tiff::decoder::Decoder;
use tiff::tags::Tag;

use crate::error::{GeoTiffError, GeoTiffResult};

/// GDAL private tag holding per-dataset and per-band metadata XML. The
/// `tiff` crate has no named variant for it, unlike GDAL_NODATA (42113).
pub const GDAL_METADATA_TAG: u16 = 42112;

/// Summary of a raster file as reported by the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    /// Number of bands (TIFF samples per pixel)
    pub bands: usize,
    /// One label per band, `"Band N"` when the file carries none
    pub descriptions: Vec<String>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct GdalMetadata {
    #[serde(rename = "Item", default)]
    items: Vec<GdalItem>,
}

#[derive(Debug, Deserialize)]
struct GdalItem {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@sample")]
    sample: Option<usize>,
    #[serde(rename = "@role")]
    role: Option<String>,
    #[serde(rename = "$text", default)]
    value: String,
}

/// Default label for a band without a stored description (1-based).
pub fn default_band_label(index: usize) -> String {
    format!("Band {}", index + 1)
}

/// Extract per-band descriptions from GDAL metadata XML.
///
/// The result always has `bands` entries; bands not described in the XML get
/// the default label.
pub fn parse_band_descriptions(xml: &str, bands: usize) -> GeoTiffResult<Vec<String>> {
    let xml = xml.trim_matches(char::from(0)).trim();
    let metadata: GdalMetadata =
        quick_xml::de::from_str(xml).map_err(|e| GeoTiffError::Metadata(e.to_string()))?;

    let mut descriptions: Vec<String> = (0..bands).map(default_band_label).collect();

    for item in metadata.items {
        let is_description = item.role.as_deref() == Some("description")
            || item.name.eq_ignore_ascii_case("DESCRIPTION");
        let value = item.value.trim();
        match item.sample {
            Some(sample) if is_description && sample < bands && !value.is_empty() => {
                descriptions[sample] = value.to_string();
            }
            _ => {}
        }
    }

    Ok(descriptions)
}

/// Read the band descriptions of the current image, falling back to default
/// labels when the GDAL metadata tag is absent or unreadable.
pub(crate) fn read_band_descriptions<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    bands: usize,
) -> GeoTiffResult<Vec<String>> {
    let xml = decoder
        .find_tag(Tag::Unknown(GDAL_METADATA_TAG))?
        .map(|value| value.into_string())
        .transpose()?;

    match xml {
        Some(xml) => match parse_band_descriptions(&xml, bands) {
            Ok(descriptions) => Ok(descriptions),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable GDAL metadata");
                Ok((0..bands).map(default_band_label).collect())
            }
        },
        None => Ok((0..bands).map(default_band_label).collect()),
    }
}

/// Parse a GDAL no-data string ("-9999", "nan", "0\0").
pub fn parse_nodata(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_matches(char::from(0)).trim();
    if trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

pub(crate) fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> GeoTiffResult<Option<f64>> {
    let raw = decoder
        .find_tag(Tag::GdalNodata)?
        .map(|value| value.into_string())
        .transpose()?;
    Ok(raw.as_deref().and_then(parse_nodata))
}
