//! Streaming band reader.
//!
//! A TIFF image is stored as independently compressed chunks (strips or
//! tiles). The reader decodes one chunk row at a time, keeps only the samples
//! of the requested band, and hands rows to the resampler in increasing
//! order. Chunk rows that no output row touches are never decoded, so a
//! downsampled preview of a large multi-band file never holds the full image.

use std::io::{Read, Seek};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::{GeoTiffError, GeoTiffResult};
use crate::resample::{axis_samples, interpolate_row};

/// Resampled samples of a single band, row-major. Missing data is NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct BandRaster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl BandRaster {
    /// Value at (x, y), if inside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Geometry of the chunk grid of the current TIFF image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkLayout {
    pub width: usize,
    pub height: usize,
    /// Bands (samples per pixel)
    pub samples: usize,
    /// PlanarConfiguration = 2: each band stored in its own set of chunks
    pub planar: bool,
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub chunks_across: usize,
    pub chunks_down: usize,
}

impl ChunkLayout {
    pub fn from_decoder<R: Read + Seek>(decoder: &mut Decoder<R>) -> GeoTiffResult<Self> {
        let (width, height) = decoder.dimensions()?;
        let samples = decoder
            .find_tag_unsigned::<u16>(Tag::SamplesPerPixel)?
            .unwrap_or(1) as usize;
        let planar = decoder
            .find_tag_unsigned::<u16>(Tag::PlanarConfiguration)?
            .unwrap_or(1)
            == 2;
        let (chunk_width, chunk_height) = decoder.chunk_dimensions();

        if width == 0 || height == 0 || samples == 0 || chunk_width == 0 || chunk_height == 0 {
            return Err(GeoTiffError::UnsupportedLayout(format!(
                "{}x{} image, {} samples, {}x{} chunks",
                width, height, samples, chunk_width, chunk_height
            )));
        }

        let (width, height) = (width as usize, height as usize);
        let (chunk_width, chunk_height) = (chunk_width as usize, chunk_height as usize);

        Ok(Self {
            width,
            height,
            samples,
            planar,
            chunk_width,
            chunk_height,
            chunks_across: width.div_ceil(chunk_width),
            chunks_down: height.div_ceil(chunk_height),
        })
    }

    /// Index of the chunk holding `band` (0-based) at a chunk grid position.
    pub fn chunk_index(&self, band: usize, chunk_row: usize, chunk_col: usize) -> u32 {
        let plane = if self.planar {
            band * self.chunks_across * self.chunks_down
        } else {
            0
        };
        (plane + chunk_row * self.chunks_across + chunk_col) as u32
    }

    /// Interleaved samples per pixel inside one decoded chunk.
    pub fn samples_per_chunk_pixel(&self) -> usize {
        if self.planar {
            1
        } else {
            self.samples
        }
    }
}

/// Convert decoded chunk samples of any TIFF sample format to f32.
pub(crate) fn samples_to_f32(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::U8(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F16(data) => data.into_iter().map(|x| x.to_f32()).collect(),
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|x| x as f32).collect(),
    }
}

/// Sequential access to the rows of one band.
pub(crate) struct BandRows<'a, R: Read + Seek> {
    decoder: &'a mut Decoder<R>,
    layout: ChunkLayout,
    /// 0-based band
    band: usize,
    nodata: Option<f32>,
    block_start: usize,
    block_rows: usize,
    block: Vec<f32>,
    /// Last row of the previously loaded block, kept for interpolation
    /// across the block boundary
    carried: Option<(usize, Vec<f32>)>,
    pub blocks_decoded: usize,
}

impl<'a, R: Read + Seek> BandRows<'a, R> {
    pub fn new(
        decoder: &'a mut Decoder<R>,
        layout: ChunkLayout,
        band: usize,
        nodata: Option<f64>,
    ) -> Self {
        Self {
            decoder,
            layout,
            band,
            nodata: nodata.map(|v| v as f32),
            block_start: 0,
            block_rows: 0,
            block: Vec::new(),
            carried: None,
            blocks_decoded: 0,
        }
    }

    /// Copy source row `y` into `out` (length = image width).
    pub fn copy_row(&mut self, y: usize, out: &mut [f32]) -> GeoTiffResult<()> {
        let width = self.layout.width;

        if !(self.block_start..self.block_start + self.block_rows).contains(&y) {
            if let Some((carried_y, row)) = &self.carried {
                if *carried_y == y {
                    out.copy_from_slice(row);
                    return Ok(());
                }
            }
            self.load_block(y / self.layout.chunk_height)?;
        }

        let offset = (y - self.block_start) * width;
        out.copy_from_slice(&self.block[offset..offset + width]);
        Ok(())
    }

    fn load_block(&mut self, chunk_row: usize) -> GeoTiffResult<()> {
        let layout = self.layout;
        let width = layout.width;

        if self.block_rows > 0 {
            let last = (self.block_rows - 1) * width;
            self.carried = Some((
                self.block_start + self.block_rows - 1,
                self.block[last..last + width].to_vec(),
            ));
        }

        let block_start = chunk_row * layout.chunk_height;
        let block_rows = layout.chunk_height.min(layout.height - block_start);
        let mut block = vec![f32::NAN; block_rows * width];

        let stride = layout.samples_per_chunk_pixel();
        let sample = if layout.planar { 0 } else { self.band };

        for chunk_col in 0..layout.chunks_across {
            let index = layout.chunk_index(self.band, chunk_row, chunk_col);
            let values = samples_to_f32(self.decoder.read_chunk(index)?);

            let x0 = chunk_col * layout.chunk_width;
            let cols = layout.chunk_width.min(width - x0);
            let Some(pitch) = chunk_pitch(values.len(), cols, block_rows, layout, stride) else {
                return Err(GeoTiffError::UnsupportedLayout(format!(
                    "chunk {} decoded to {} samples, expected {}x{}x{}",
                    index,
                    values.len(),
                    cols,
                    block_rows,
                    stride
                )));
            };

            for r in 0..block_rows {
                let src_row = r * pitch;
                let dst_row = r * width + x0;
                for c in 0..cols {
                    block[dst_row + c] = self.mask(values[(src_row + c) * stride + sample]);
                }
            }
        }

        self.block_start = block_start;
        self.block_rows = block_rows;
        self.block = block;
        self.blocks_decoded += 1;
        Ok(())
    }

    #[inline]
    fn mask(&self, value: f32) -> f32 {
        match self.nodata {
            Some(nodata) if value == nodata || (nodata.is_nan() && value.is_nan()) => f32::NAN,
            _ => value,
        }
    }
}

/// Row pitch (in pixels) of a decoded chunk holding `cols` x `rows` pixels of
/// image data.
///
/// Edge tiles normally come back clipped to the image. The decoder only
/// works out the bottom padding for the first plane of a planar image, so
/// bottom tiles of later planes arrive with full tile height, and fully
/// padded tiles are accepted as well.
fn chunk_pitch(
    len: usize,
    cols: usize,
    rows: usize,
    layout: ChunkLayout,
    stride: usize,
) -> Option<usize> {
    if len == cols * rows * stride || len == cols * layout.chunk_height * stride {
        Some(cols)
    } else if len == layout.chunk_width * layout.chunk_height * stride {
        Some(layout.chunk_width)
    } else {
        None
    }
}

/// Read `band` (0-based) resampled to `out_width` x `out_height` with
/// bilinear interpolation. Returns the raster and the number of chunk rows
/// that were decoded.
pub(crate) fn read_resampled<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    layout: ChunkLayout,
    band: usize,
    nodata: Option<f64>,
    out_width: u32,
    out_height: u32,
) -> GeoTiffResult<(BandRaster, usize)> {
    if out_width == 0 || out_height == 0 {
        return Err(GeoTiffError::InvalidSize {
            width: out_width,
            height: out_height,
        });
    }

    let columns = axis_samples(layout.width, out_width as usize);
    let rows = axis_samples(layout.height, out_height as usize);

    let mut reader = BandRows::new(decoder, layout, band, nodata);
    let mut upper = vec![0.0f32; layout.width];
    let mut lower = vec![0.0f32; layout.width];
    let mut data = vec![0.0f32; out_width as usize * out_height as usize];

    let mut loaded: Option<(usize, usize)> = None;
    for (out_row, row) in data.chunks_exact_mut(out_width as usize).zip(&rows) {
        if loaded != Some((row.i0, row.i1)) {
            reader.copy_row(row.i0, &mut upper)?;
            reader.copy_row(row.i1, &mut lower)?;
            loaded = Some((row.i0, row.i1));
        }
        interpolate_row(&upper, &lower, &columns, row.frac, out_row);
    }

    let blocks = reader.blocks_decoded;
    Ok((
        BandRaster {
            width: out_width,
            height: out_height,
            data,
        },
        blocks,
    ))
}
