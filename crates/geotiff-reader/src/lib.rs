//! GeoTIFF reader for band previews.
//!
//! Wraps the `tiff` decoder with the two operations the preview service
//! needs:
//! - [`GeoTiff::metadata`]: band count, band labels and pixel size
//! - [`GeoTiff::read_band`]: one band, bilinearly resampled to a target size,
//!   decoded chunk row by chunk row
//!
//! Only the first image (IFD) of a file is read; overviews and masks stored
//! as further IFDs are ignored.

mod band;
pub mod error;
pub mod metadata;
pub mod resample;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::decoder::Decoder;
use tracing::debug;

pub use band::BandRaster;
pub use error::{GeoTiffError, GeoTiffResult};
pub use metadata::RasterMetadata;
pub use resample::{preview_size, PREVIEW_MAX_DIM};

use band::ChunkLayout;

/// An open GeoTIFF file.
pub struct GeoTiff<R: Read + Seek> {
    decoder: Decoder<R>,
    layout: ChunkLayout,
    metadata: RasterMetadata,
    nodata: Option<f64>,
}

impl GeoTiff<BufReader<File>> {
    /// Open a GeoTIFF from disk.
    pub fn open(path: impl AsRef<Path>) -> GeoTiffResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> GeoTiff<R> {
    /// Parse the TIFF header and first image directory.
    pub fn from_reader(reader: R) -> GeoTiffResult<Self> {
        let mut decoder = Decoder::new(reader)?;
        let layout = ChunkLayout::from_decoder(&mut decoder)?;
        let descriptions = metadata::read_band_descriptions(&mut decoder, layout.samples)?;
        let nodata = metadata::read_nodata(&mut decoder)?;

        let metadata = RasterMetadata {
            bands: layout.samples,
            descriptions,
            width: layout.width as u32,
            height: layout.height as u32,
        };

        debug!(
            width = metadata.width,
            height = metadata.height,
            bands = metadata.bands,
            planar = layout.planar,
            chunk_width = layout.chunk_width,
            chunk_height = layout.chunk_height,
            "Opened GeoTIFF"
        );

        Ok(Self {
            decoder,
            layout,
            metadata,
            nodata,
        })
    }

    pub fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    /// Declared no-data value, if the file carries the GDAL no-data tag.
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Read band `band` (1-based) resampled to `out_width` x `out_height`.
    pub fn read_band(
        &mut self,
        band: usize,
        out_width: u32,
        out_height: u32,
    ) -> GeoTiffResult<BandRaster> {
        self.read_band_counting_blocks(band, out_width, out_height)
            .map(|(raster, _)| raster)
    }

    /// Read band `band` (1-based) at preview size: longer side `max_dim`.
    pub fn read_band_preview(&mut self, band: usize, max_dim: u32) -> GeoTiffResult<BandRaster> {
        let (out_width, out_height) =
            preview_size(self.metadata.width, self.metadata.height, max_dim);
        self.read_band(band, out_width, out_height)
    }

    /// Like [`GeoTiff::read_band`], also returning how many chunk rows were
    /// decoded.
    pub fn read_band_counting_blocks(
        &mut self,
        band: usize,
        out_width: u32,
        out_height: u32,
    ) -> GeoTiffResult<(BandRaster, usize)> {
        self.check_band(band)?;
        let (raster, blocks) = band::read_resampled(
            &mut self.decoder,
            self.layout,
            band - 1,
            self.nodata,
            out_width,
            out_height,
        )?;

        debug!(
            band,
            out_width,
            out_height,
            blocks_decoded = blocks,
            blocks_total = self.layout.chunks_down,
            "Read resampled band"
        );
        Ok((raster, blocks))
    }

    fn check_band(&self, band: usize) -> GeoTiffResult<()> {
        if band == 0 || band > self.metadata.bands {
            return Err(GeoTiffError::BandOutOfRange {
                band,
                count: self.metadata.bands,
            });
        }
        Ok(())
    }
}
