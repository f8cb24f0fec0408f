use crate::error::Result;
use crate::types::{MaskRaster, PixelSpacing};
use ndarray::Array3;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;
use std::path::Path;

/// Destination for a mask written as a 3-D volume
pub trait VolumetricSink {
    /// Writes `mask` to `path`, which already carries its final extension
    fn write_volume(&self, mask: &MaskRaster, spacing: PixelSpacing, path: &Path) -> Result<()>;
}

/// NIfTI-1 writer
///
/// The volume has shape `(cols, rows, 1)` so voxel `(i, j, 0)` is pixel
/// `(row j, col i)`. Spacing goes into `pixdim` and a diagonal affine.
/// Both qform and sform codes stay 0 (unknown space): the affine only
/// carries the pixel size and does not place the image in scanner space.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiWriter;

impl NiftiWriter {
    fn header(spacing: PixelSpacing) -> NiftiHeader {
        let (col, row) = (spacing.col() as f32, spacing.row() as f32);
        NiftiHeader {
            pixdim: [1.0, col, row, 1.0, 0.0, 0.0, 0.0, 0.0],
            srow_x: [col, 0.0, 0.0, 0.0],
            srow_y: [0.0, row, 0.0, 0.0],
            srow_z: [0.0, 0.0, 1.0, 0.0],
            sform_code: 0,
            qform_code: 0,
            ..NiftiHeader::default()
        }
    }

    /// Mask values as a `(cols, rows, 1)` array of 0/255
    pub fn volume(mask: &MaskRaster) -> Array3<u8> {
        let dims = mask.dims();
        Array3::from_shape_fn((dims.cols, dims.rows, 1), |(x, y, _)| {
            mask.get(y, x).map(|v| v.intensity()).unwrap_or(0)
        })
    }
}

impl VolumetricSink for NiftiWriter {
    fn write_volume(&self, mask: &MaskRaster, spacing: PixelSpacing, path: &Path) -> Result<()> {
        let header = Self::header(spacing);
        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(&Self::volume(mask))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dims, MaskValue};
    use nifti::{InMemNiftiObject, NiftiObject, ReaderOptions};
    use tempfile::TempDir;

    #[test]
    fn test_volume_layout() {
        let mask =
            MaskRaster::from_fn(Dims::new(2, 3), |row, col| MaskValue::from(row == 1 && col == 2));
        let volume = NiftiWriter::volume(&mask);
        assert_eq!(volume.shape(), &[3, 2, 1]);
        assert_eq!(volume[[2, 1, 0]], 255);
        assert_eq!(volume[[1, 1, 0]], 0);
        assert_eq!(volume.iter().filter(|&&v| v == 255).count(), 1);
    }

    #[test]
    fn test_header_carries_spacing() {
        let spacing = PixelSpacing::try_new(0.1, 0.2).unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.nii.gz");
        let mask = MaskRaster::from_fn(Dims::new(4, 5), |row, _| MaskValue::from(row < 2));

        NiftiWriter.write_volume(&mask, spacing, &path).unwrap();

        let obj: InMemNiftiObject = ReaderOptions::new().read_file(&path).unwrap();
        let header = obj.header();
        assert_eq!(header.dim[..4], [3u16, 5, 4, 1]);
        assert!((header.pixdim[1] - 0.2).abs() < 1e-6);
        assert!((header.pixdim[2] - 0.1).abs() < 1e-6);
        assert!((header.srow_x[0] - 0.2).abs() < 1e-6);
        assert!((header.srow_y[1] - 0.1).abs() < 1e-6);
        assert_eq!(header.sform_code, 0);
        assert_eq!(header.qform_code, 0);
    }
}
