use crate::api::{MammogramExtractor, MammogramMetadata};
use crate::error::{MammareaError, Result};
use crate::types::{Dims, RawImage};
use dicom_dictionary_std::tags::PIXEL_DATA;
use dicom_object::{open_file, OpenFileOptions};
use dicom_pixeldata::PixelDecoder;
use log::debug;
use std::path::Path;

/// A decoded single-frame mammogram with its metadata
#[derive(Debug, Clone)]
pub struct DecodedMammogram {
    pub metadata: MammogramMetadata,
    pub pixels: RawImage,
}

/// Source of medical images
///
/// The engine only needs two operations: a cheap header read used to
/// classify files during a scan, and a full decode of the pixel data.
pub trait ImageReader {
    /// Reads metadata only, without materializing pixel data
    fn read_header(&self, path: &Path) -> Result<MammogramMetadata>;

    /// Reads metadata and decodes the first (only) frame
    fn read_image(&self, path: &Path) -> Result<DecodedMammogram>;
}

/// [`ImageReader`] backed by dicom-rs
#[derive(Debug, Clone, Copy, Default)]
pub struct DicomReader;

impl ImageReader for DicomReader {
    fn read_header(&self, path: &Path) -> Result<MammogramMetadata> {
        let dcm = OpenFileOptions::new()
            .read_until(PIXEL_DATA)
            .open_file(path)?;
        MammogramExtractor::extract(&dcm)
    }

    fn read_image(&self, path: &Path) -> Result<DecodedMammogram> {
        let dcm = open_file(path)?;
        let metadata = MammogramExtractor::extract(&dcm)?;

        if metadata.number_of_frames > 1 {
            return Err(MammareaError::UnsupportedImage(format!(
                "{} frames; only 2-D projections are supported",
                metadata.number_of_frames
            )));
        }

        let decoded = dcm.decode_pixel_data()?;
        if decoded.samples_per_pixel() != 1 {
            return Err(MammareaError::UnsupportedImage(format!(
                "{} samples per pixel; expected grayscale",
                decoded.samples_per_pixel()
            )));
        }

        let dims = Dims::new(decoded.rows() as usize, decoded.columns() as usize);
        if dims.is_empty() {
            return Err(MammareaError::UnsupportedImage(
                "pixel data has no rows or columns".to_string(),
            ));
        }

        let samples = decoded.to_vec_frame::<f32>(0)?;
        debug!("Decoded {} ({})", path.display(), dims);

        Ok(DecodedMammogram {
            metadata,
            pixels: RawImage::new(dims, samples)?,
        })
    }
}
