use crate::error::{MammareaError, Result};
use crate::types::{Dims, PixelSpacing, RasterImage, RawImage};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};

/// A decoded pixel array together with its physical pixel spacing
///
/// Produces 8-bit displayable rasters at any target resolution.
#[derive(Debug, Clone)]
pub struct ImageSource {
    raw: RawImage,
    spacing: Option<PixelSpacing>,
}

impl ImageSource {
    pub fn new(raw: RawImage, spacing: Option<PixelSpacing>) -> Self {
        Self { raw, spacing }
    }

    pub fn raw(&self) -> &RawImage {
        &self.raw
    }

    pub fn spacing(&self) -> Option<PixelSpacing> {
        self.spacing
    }

    /// Dimensions of the decoded pixel array
    pub fn dims(&self) -> Dims {
        self.raw.dims()
    }

    /// Resamples to `target` and min-max normalizes to 0..=255
    ///
    /// # Errors
    ///
    /// - `UnsupportedImage` if the source or target has no pixels
    /// - `DegenerateImage` if the resampled image has a single intensity
    pub fn load(&self, target: Dims) -> Result<RasterImage> {
        let resampled = resample(&self.raw, target)?;
        normalize(&resampled)
    }

    /// [`ImageSource::load`] at the native resolution
    pub fn load_native(&self) -> Result<RasterImage> {
        normalize(&self.raw)
    }
}

/// Anti-aliased resampling of raw samples
///
/// Uses a triangle (bilinear) filter whose support widens with the
/// downscale factor. Matching dimensions return the input unchanged.
pub fn resample(raw: &RawImage, target: Dims) -> Result<RawImage> {
    if raw.dims().is_empty() || target.is_empty() {
        return Err(MammareaError::UnsupportedImage(format!(
            "cannot resample {} to {}",
            raw.dims(),
            target
        )));
    }
    if raw.dims() == target {
        return Ok(raw.clone());
    }

    let src = raw.dims();
    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(src.cols as u32, src.rows as u32, raw.samples().to_vec())
            .ok_or_else(|| MammareaError::DimensionMismatch {
                expected: src.to_string(),
                actual: format!("{} samples", raw.samples().len()),
            })?;

    let resized = imageops::resize(
        &buffer,
        target.cols as u32,
        target.rows as u32,
        FilterType::Triangle,
    );
    RawImage::new(target, resized.into_raw())
}

/// Min-max normalization to the full 8-bit range
///
/// `out = round((in - min) / (max - min) * 255)`
pub fn normalize(raw: &RawImage) -> Result<RasterImage> {
    let (min, max) = raw.min_max().ok_or_else(|| {
        MammareaError::UnsupportedImage("pixel data has no samples".to_string())
    })?;
    if max <= min {
        return Err(MammareaError::DegenerateImage(raw.samples().len()));
    }

    let range = (max - min) as f64;
    let pixels = raw
        .samples()
        .iter()
        .map(|&v| {
            let scaled = (v - min) as f64 / range * 255.0;
            scaled.round().clamp(0.0, 255.0) as u8
        })
        .collect();

    Ok(RasterImage::from_pixels(raw.dims(), pixels))
}
