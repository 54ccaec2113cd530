//! Tiled and band-sequential (planar) GeoTIFFs.
//!
//! `ImageEncoder` only writes pixel-interleaved strips, so these files are
//! assembled with the low-level `DirectoryEncoder`: chunk data first, then the
//! tags pointing at it. Data is uncompressed and edge tiles are zero padded
//! to the full tile size, as the format requires.

use std::io::Cursor;

use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// Sample types the layout writer can store.
pub trait RawSample: Copy + Default {
    const BITS: u16;
    /// TIFF SampleFormat value (1 = unsigned, 3 = IEEE float)
    const FORMAT: u16;

    fn extend_le(self, out: &mut Vec<u8>);
}

impl RawSample for u16 {
    const BITS: u16 = 16;
    const FORMAT: u16 = 1;

    fn extend_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl RawSample for f32 {
    const BITS: u16 = 32;
    const FORMAT: u16 = 3;

    fn extend_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// How pixel data is split into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkShape {
    Strips { rows_per_strip: u32 },
    Tiles { width: u32, height: u32 },
}

/// Builder for a tiled or planar TIFF.
#[derive(Debug, Clone)]
pub struct RawTiff {
    width: u32,
    height: u32,
    chunks: ChunkShape,
    planar: bool,
    nodata: Option<String>,
}

impl RawTiff {
    /// Pixel-interleaved image stored as one strip.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            chunks: ChunkShape::Strips {
                rows_per_strip: height,
            },
            planar: false,
            nodata: None,
        }
    }

    pub fn tiled(mut self, tile_width: u32, tile_height: u32) -> Self {
        self.chunks = ChunkShape::Tiles {
            width: tile_width,
            height: tile_height,
        };
        self
    }

    pub fn strips(mut self, rows_per_strip: u32) -> Self {
        self.chunks = ChunkShape::Strips { rows_per_strip };
        self
    }

    /// Store each band in its own set of chunks (PlanarConfiguration = 2).
    pub fn planar(mut self) -> Self {
        self.planar = true;
        self
    }

    pub fn with_nodata(mut self, nodata: &str) -> Self {
        self.nodata = Some(nodata.to_string());
        self
    }

    /// Chunk payloads in file order: plane, then chunk row, then chunk column.
    fn chunk_payloads<S: RawSample>(&self, bands: &[Vec<S>]) -> Vec<Vec<u8>> {
        let (width, height) = (self.width as usize, self.height as usize);
        let (chunk_width, chunk_height, tiled) = match self.chunks {
            ChunkShape::Strips { rows_per_strip } => (width, rows_per_strip as usize, false),
            ChunkShape::Tiles { width, height } => (width as usize, height as usize, true),
        };

        let planes: Vec<Vec<usize>> = if self.planar {
            (0..bands.len()).map(|b| vec![b]).collect()
        } else {
            vec![(0..bands.len()).collect()]
        };

        let mut payloads = Vec::new();
        for plane in &planes {
            for chunk_row in 0..height.div_ceil(chunk_height) {
                for chunk_col in 0..width.div_ceil(chunk_width) {
                    // Only the last strip may be short; tiles are always full
                    let rows = if tiled {
                        chunk_height
                    } else {
                        chunk_height.min(height - chunk_row * chunk_height)
                    };

                    let mut payload = Vec::new();
                    for r in 0..rows {
                        let y = chunk_row * chunk_height + r;
                        for c in 0..chunk_width {
                            let x = chunk_col * chunk_width + c;
                            for &band in plane {
                                let value = if x < width && y < height {
                                    bands[band][y * width + x]
                                } else {
                                    S::default()
                                };
                                value.extend_le(&mut payload);
                            }
                        }
                    }
                    payloads.push(payload);
                }
            }
        }
        payloads
    }

    /// Encode `bands`, each a row-major `width * height` plane.
    pub fn encode<S: RawSample>(&self, bands: &[Vec<S>]) -> Vec<u8> {
        assert!(!bands.is_empty(), "at least one band is required");
        assert!(
            bands
                .iter()
                .all(|b| b.len() == self.width as usize * self.height as usize),
            "every band must hold width * height samples"
        );

        let payloads = self.chunk_payloads(bands);
        let samples = bands.len();

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).expect("create TIFF encoder");
            let mut dir = encoder.image_directory().expect("create image directory");

            let mut offsets = Vec::with_capacity(payloads.len());
            let mut byte_counts = Vec::with_capacity(payloads.len());
            for payload in &payloads {
                let offset = dir.write_data(payload.as_slice()).expect("write chunk");
                offsets.push(u32::try_from(offset).expect("fixture fits a classic TIFF"));
                byte_counts.push(payload.len() as u32);
            }

            dir.write_tag(Tag::ImageWidth, self.width).unwrap();
            dir.write_tag(Tag::ImageLength, self.height).unwrap();
            dir.write_tag(Tag::BitsPerSample, vec![S::BITS; samples].as_slice())
                .unwrap();
            dir.write_tag(Tag::Compression, 1u16).unwrap();
            dir.write_tag(Tag::PhotometricInterpretation, 1u16).unwrap();
            dir.write_tag(Tag::SamplesPerPixel, samples as u16).unwrap();
            dir.write_tag(Tag::SampleFormat, vec![S::FORMAT; samples].as_slice())
                .unwrap();
            dir.write_tag(Tag::PlanarConfiguration, if self.planar { 2u16 } else { 1u16 })
                .unwrap();
            if samples > 1 {
                dir.write_tag(Tag::ExtraSamples, vec![0u16; samples - 1].as_slice())
                    .unwrap();
            }

            match self.chunks {
                ChunkShape::Strips { rows_per_strip } => {
                    dir.write_tag(Tag::RowsPerStrip, rows_per_strip).unwrap();
                    dir.write_tag(Tag::StripOffsets, offsets.as_slice()).unwrap();
                    dir.write_tag(Tag::StripByteCounts, byte_counts.as_slice())
                        .unwrap();
                }
                ChunkShape::Tiles { width, height } => {
                    dir.write_tag(Tag::TileWidth, width).unwrap();
                    dir.write_tag(Tag::TileLength, height).unwrap();
                    dir.write_tag(Tag::TileOffsets, offsets.as_slice()).unwrap();
                    dir.write_tag(Tag::TileByteCounts, byte_counts.as_slice())
                        .unwrap();
                }
            }

            if let Some(nodata) = &self.nodata {
                dir.write_tag(Tag::GdalNodata, nodata.as_str()).unwrap();
            }

            dir.finish().expect("finish image directory");
        }
        buffer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::decoder::Decoder;

    #[test]
    fn test_tiled_layout_pads_edge_tiles() {
        let layout = RawTiff::new(5, 3).tiled(4, 2);
        let payloads = layout.chunk_payloads(&[vec![1.0f32; 15]]);

        // 2x2 tiles, each a full 4x2 block of f32
        assert_eq!(payloads.len(), 4);
        assert!(payloads.iter().all(|p| p.len() == 4 * 2 * 4));
        // Right edge tile: one image column, three padding columns
        assert_eq!(&payloads[1][..4], &1.0f32.to_le_bytes());
        assert_eq!(&payloads[1][4..8], &0.0f32.to_le_bytes());

        let mut decoder = Decoder::new(Cursor::new(layout.encode(&[vec![1.0f32; 15]]))).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (5, 3));
        assert_eq!(decoder.chunk_dimensions(), (4, 2));
    }

    #[test]
    fn test_planar_layout_tags() {
        let bands = vec![vec![0u16; 6], vec![1u16; 6]];
        let layout = RawTiff::new(3, 2).strips(1).planar().with_nodata("0");
        assert_eq!(layout.chunk_payloads(&bands).len(), 4);

        let mut decoder = Decoder::new(Cursor::new(layout.encode(&bands))).unwrap();
        assert_eq!(
            decoder
                .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)
                .unwrap(),
            Some(2)
        );
        assert_eq!(
            decoder.find_tag(Tag::GdalNodata).unwrap().unwrap().into_string().unwrap(),
            "0"
        );
    }
}
