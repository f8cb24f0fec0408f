//! Mask and result serialization
//!
//! Masks are written as 8-bit rasters (PNG and the other enabled `image`
//! formats) or as NIfTI volumes; batch results go to a spreadsheet.

mod nifti;
mod table;

pub use self::nifti::{NiftiWriter, VolumetricSink};
pub use table::{TableSink, XlsxTableWriter, TABLE_HEADER};

use crate::error::{MammareaError, Result};
use crate::processing::AreaMeasurement;
use crate::scratch::write_atomically;
use crate::types::{Dims, MaskRaster, MaskValue, PixelSpacing};
use image::{GrayImage, ImageFormat};
use log::info;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// How a mask file is encoded, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskFormat {
    Raster(ImageFormat),
    Volumetric,
}

impl MaskFormat {
    /// Detects the format of `path`
    ///
    /// `.nii` and `.nii.gz` are volumetric; PNG, JPEG, BMP and TIFF are
    /// rasters. Anything else is `UnsupportedFormat`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if is_nifti_name(path) {
            return Ok(MaskFormat::Volumetric);
        }
        match ImageFormat::from_path(path) {
            Ok(
                format @ (ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Bmp
                | ImageFormat::Tiff),
            ) => Ok(MaskFormat::Raster(format)),
            _ => Err(MammareaError::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }

    /// Extension written by default for this format
    pub fn extension(&self) -> &'static str {
        match self {
            MaskFormat::Raster(format) => format.extensions_str().first().copied().unwrap_or("png"),
            MaskFormat::Volumetric => "nii.gz",
        }
    }
}

fn is_nifti_name(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}

/// Volumetric outputs are always gzip-compressed: `mask.nii` becomes `mask.nii.gz`
pub fn volumetric_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.to_ascii_lowercase().ends_with(".nii") {
        path.with_file_name(format!("{}.gz", name))
    } else {
        path.to_path_buf()
    }
}

/// `mask_<truncated area>mm2.<ext>`
///
/// # Example
///
/// ```
/// use mammarea_core::{default_filename, AreaCalculator, Dims, MaskRaster, MaskValue, PixelSpacing};
///
/// let mask = MaskRaster::from_fn(Dims::new(10, 10), |_, _| MaskValue::Foreground);
/// let spacing = PixelSpacing::try_new(0.5, 0.5).unwrap();
/// let area = AreaCalculator::area(&mask, Some(spacing)).unwrap();
///
/// assert_eq!(default_filename(&area, "png"), "mask_25mm2.png");
/// ```
pub fn default_filename(area: &AreaMeasurement, extension: &str) -> String {
    format!("mask_{}mm2.{}", area.truncated_mm2, extension)
}

/// Writes masks to disk in raster or volumetric form
#[derive(Debug, Clone, Default)]
pub struct MaskExporter<V = NiftiWriter> {
    volumetric: V,
}

impl MaskExporter<NiftiWriter> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 8-bit single-channel image with values {0, 255}
    pub fn to_image(mask: &MaskRaster) -> Result<GrayImage> {
        let dims = mask.dims();
        GrayImage::from_raw(dims.cols as u32, dims.rows as u32, mask.to_intensities()).ok_or_else(
            || MammareaError::ExportError(format!("cannot build a {} image", dims)),
        )
    }

    /// PNG-encoded mask
    pub fn encode_png(mask: &MaskRaster) -> Result<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        Self::to_image(mask)?.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Reads a mask image back; any nonzero sample is foreground
    pub fn decode(bytes: &[u8]) -> Result<MaskRaster> {
        let image = image::load_from_memory(bytes)?.to_luma8();
        let dims = Dims::new(image.height() as usize, image.width() as usize);
        Ok(MaskRaster::from_fn(dims, |row, col| {
            MaskValue::from(image.get_pixel(col as u32, row as u32).0[0] != 0)
        }))
    }

    /// Writes the mask as a raster image in `format`
    pub fn write_image(mask: &MaskRaster, path: &Path, format: ImageFormat) -> Result<()> {
        let image = Self::to_image(mask)?;
        let suffix = format!(".{}", MaskFormat::Raster(format).extension());
        write_atomically(path, &suffix, |tmp| {
            image.save_with_format(tmp, format)?;
            Ok(())
        })
    }
}

impl<V: VolumetricSink> MaskExporter<V> {
    /// Exporter with a custom volumetric backend
    pub fn with_volumetric(volumetric: V) -> Self {
        Self { volumetric }
    }

    /// Writes the mask as a NIfTI volume, returning the path actually written
    pub fn to_volumetric(
        &self,
        mask: &MaskRaster,
        spacing: PixelSpacing,
        path: &Path,
    ) -> Result<PathBuf> {
        let path = volumetric_path(path);
        write_atomically(&path, ".nii.gz", |tmp| {
            self.volumetric.write_volume(mask, spacing, tmp)
        })?;
        Ok(path)
    }

    /// Writes the mask in the format implied by `path`
    ///
    /// Returns the path actually written, which differs from `path` when a
    /// `.nii` name is promoted to `.nii.gz`.
    pub fn save(&self, mask: &MaskRaster, spacing: PixelSpacing, path: &Path) -> Result<PathBuf> {
        let written = match MaskFormat::from_path(path)? {
            MaskFormat::Volumetric => self.to_volumetric(mask, spacing, path)?,
            MaskFormat::Raster(format) => {
                MaskExporter::write_image(mask, path, format)?;
                path.to_path_buf()
            }
        };
        info!("Saved mask to {}", written.display());
        Ok(written)
    }
}
