//! GeoTIFF fixtures for reader and service tests.
//!
//! Fixtures are encoded in memory with the `tiff` encoder and optionally
//! carry the GDAL private tags the reader understands.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tiff::encoder::{colortype, colortype::ColorType, TiffEncoder, TiffValue};
use tiff::tags::{PhotometricInterpretation, SampleFormat, Tag};

/// GDAL_METADATA private tag.
pub const GDAL_METADATA_TAG: u16 = 42112;

/// Four 16-bit BlackIsZero samples per pixel, the usual layout of RGB+NIR
/// exports. The `tiff` encoder ships no multiband color type.
pub struct Gray16x4;

impl ColorType for Gray16x4 {
    type Inner = u16;
    const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::BlackIsZero;
    const BITS_PER_SAMPLE: &'static [u16] = &[16, 16, 16, 16];
    const SAMPLE_FORMAT: &'static [SampleFormat] = &[
        SampleFormat::Uint,
        SampleFormat::Uint,
        SampleFormat::Uint,
        SampleFormat::Uint,
    ];

    fn horizontal_predict(row: &[u16], result: &mut Vec<u16>) {
        let samples = Self::SAMPLE_FORMAT.len().min(row.len());
        result.extend_from_slice(&row[..samples]);
        result.extend(
            row.iter()
                .zip(&row[samples..])
                .map(|(prev, current)| current.wrapping_sub(*prev)),
        );
    }
}

/// Optional extras written alongside the image data.
#[derive(Debug, Clone, Default)]
pub struct FixtureOptions {
    /// Rows per strip; `None` leaves the encoder default
    pub rows_per_strip: Option<u32>,
    /// Band descriptions written as GDAL metadata
    pub descriptions: Vec<String>,
    /// GDAL no-data value
    pub nodata: Option<String>,
}

impl FixtureOptions {
    pub fn with_rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = Some(rows);
        self
    }

    pub fn with_descriptions(mut self, descriptions: &[&str]) -> Self {
        self.descriptions = descriptions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_nodata(mut self, nodata: &str) -> Self {
        self.nodata = Some(nodata.to_string());
        self
    }
}

/// Build the GDAL metadata XML for a list of band descriptions.
pub fn gdal_metadata_xml(descriptions: &[String]) -> String {
    let mut xml = String::from("<GDALMetadata>\n");
    for (i, description) in descriptions.iter().enumerate() {
        xml.push_str(&format!(
            "  <Item name=\"DESCRIPTION\" sample=\"{}\" role=\"description\">{}</Item>\n",
            i, description
        ));
    }
    xml.push_str("</GDALMetadata>");
    xml
}

fn encode<C: ColorType>(
    width: u32,
    height: u32,
    data: &[C::Inner],
    options: &FixtureOptions,
) -> Vec<u8>
where
    [C::Inner]: TiffValue,
{
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buffer).expect("create TIFF encoder");
        let mut image = encoder
            .new_image::<C>(width, height)
            .expect("create TIFF image");

        if let Some(rows) = options.rows_per_strip {
            image.rows_per_strip(rows).expect("set rows per strip");
        }
        if !options.descriptions.is_empty() {
            let xml = gdal_metadata_xml(&options.descriptions);
            image
                .encoder()
                .write_tag(Tag::Unknown(GDAL_METADATA_TAG), xml.as_str())
                .expect("write GDAL metadata");
        }
        if let Some(nodata) = &options.nodata {
            image
                .encoder()
                .write_tag(Tag::GdalNodata, nodata.as_str())
                .expect("write GDAL nodata");
        }

        image.write_data(data).expect("write TIFF data");
    }
    buffer.into_inner()
}

/// Single-band float32 GeoTIFF.
pub fn encode_gray_f32(width: u32, height: u32, data: &[f32], options: &FixtureOptions) -> Vec<u8> {
    encode::<colortype::Gray32Float>(width, height, data, options)
}

/// Single-band 16-bit GeoTIFF.
pub fn encode_gray_u16(width: u32, height: u32, data: &[u16], options: &FixtureOptions) -> Vec<u8> {
    encode::<colortype::Gray16>(width, height, data, options)
}

/// Four-band 16-bit BlackIsZero GeoTIFF; `data` is pixel-interleaved.
pub fn encode_multiband_u16(
    width: u32,
    height: u32,
    data: &[u16],
    options: &FixtureOptions,
) -> Vec<u8> {
    encode::<Gray16x4>(width, height, data, options)
}

/// Three-band 8-bit GeoTIFF; `data` is pixel-interleaved.
pub fn encode_rgb_u8(width: u32, height: u32, data: &[u8], options: &FixtureOptions) -> Vec<u8> {
    encode::<colortype::RGB8>(width, height, data, options)
}

/// Write fixture bytes into `dir` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture file");
    path
}
