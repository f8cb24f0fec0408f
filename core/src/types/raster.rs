use super::{Dims, ImagePoint, MaskValue};
use crate::error::{MammareaError, Result};

/// Decoded intensity samples of a single 2-D frame, row-major
///
/// Samples keep the dynamic range of the source (after the reader's
/// modality rescale), so 12/14/16-bit mammograms stay untouched until
/// they are normalized for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    dims: Dims,
    samples: Vec<f32>,
}

impl RawImage {
    /// Wraps row-major samples
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `samples.len()` is not `rows * cols`
    pub fn new(dims: Dims, samples: Vec<f32>) -> Result<Self> {
        if samples.len() != dims.len() {
            return Err(MammareaError::DimensionMismatch {
                expected: format!("{} samples for {}", dims.len(), dims),
                actual: format!("{} samples", samples.len()),
            });
        }
        Ok(Self { dims, samples })
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Smallest and largest sample, or `None` for an empty image
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.samples.iter().copied().fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }

    /// Returns whether every sample is a whole number
    pub fn is_integral(&self) -> bool {
        self.samples.iter().all(|v| v.fract() == 0.0)
    }
}

/// 8-bit displayable raster produced by [`crate::ImageSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    dims: Dims,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub(crate) fn from_pixels(dims: Dims, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(dims.len(), pixels.len());
        Self { dims, pixels }
    }

    /// All-black raster, used when the source image is flat
    pub fn blank(dims: Dims) -> Self {
        Self {
            dims,
            pixels: vec![0; dims.len()],
        }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Row-major 8-bit samples
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.dims.index(row, col).map(|i| self.pixels[i])
    }
}

/// Binary region-of-interest raster
///
/// Cells can only change through [`MaskRaster::stamp`], which keeps every
/// write inside the raster bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRaster {
    dims: Dims,
    cells: Vec<bool>,
}

impl MaskRaster {
    /// All-background mask
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            cells: vec![false; dims.len()],
        }
    }

    /// Builds a mask by evaluating `f(row, col)` for every cell
    pub fn from_fn<F>(dims: Dims, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> MaskValue,
    {
        let mut cells = Vec::with_capacity(dims.len());
        for row in 0..dims.rows {
            for col in 0..dims.cols {
                cells.push(f(row, col).is_foreground());
            }
        }
        Self { dims, cells }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn get(&self, row: usize, col: usize) -> Option<MaskValue> {
        self.dims
            .index(row, col)
            .map(|i| MaskValue::from(self.cells[i]))
    }

    /// Number of foreground cells
    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Row-major iterator over cell values
    pub fn values(&self) -> impl Iterator<Item = MaskValue> + '_ {
        self.cells.iter().map(|&c| MaskValue::from(c))
    }

    /// Row-major 8-bit rendering with foreground at 255
    pub fn to_intensities(&self) -> Vec<u8> {
        self.values().map(|v| v.intensity()).collect()
    }

    /// Sets every cell whose center lies within `radius` of `center` to `value`
    ///
    /// Returns the number of cells that actually changed. Stamping the same
    /// disk twice changes nothing the second time.
    pub fn stamp(&mut self, center: ImagePoint, radius: f64, value: MaskValue) -> usize {
        if self.dims.is_empty() || !(radius >= 0.0) {
            return 0;
        }

        let target = value.is_foreground();
        let r2 = radius * radius;

        let col_lo = (center.x - radius - 0.5).floor().max(0.0) as usize;
        let row_lo = (center.y - radius - 0.5).floor().max(0.0) as usize;
        let col_hi = (center.x + radius - 0.5).ceil();
        let row_hi = (center.y + radius - 0.5).ceil();
        if col_hi < 0.0 || row_hi < 0.0 {
            return 0;
        }
        let col_hi = (col_hi as usize).min(self.dims.cols - 1);
        let row_hi = (row_hi as usize).min(self.dims.rows - 1);

        let mut changed = 0;
        for row in row_lo..=row_hi {
            let dy = row as f64 + 0.5 - center.y;
            for col in col_lo..=col_hi {
                let dx = col as f64 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    let cell = &mut self.cells[row * self.dims.cols + col];
                    if *cell != target {
                        *cell = target;
                        changed += 1;
                    }
                }
            }
        }
        changed
    }
}
