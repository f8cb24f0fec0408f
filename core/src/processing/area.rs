use crate::error::{MammareaError, Result};
use crate::types::{MaskRaster, PixelSpacing};
use std::fmt;

/// Physical area of a mask's foreground
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct AreaMeasurement {
    /// Number of foreground cells
    pub pixels: usize,
    /// Unrounded area in mm²
    pub raw_mm2: f64,
    /// Area rounded half-up to two decimals, for display and tables
    pub rounded_mm2: f64,
    /// Integer part of the area, for file names
    pub truncated_mm2: u64,
}

impl AreaMeasurement {
    fn from_count(pixels: usize, spacing: PixelSpacing) -> Self {
        let raw_mm2 = pixels as f64 * spacing.pixel_area();
        Self {
            pixels,
            raw_mm2,
            rounded_mm2: round_half_up(raw_mm2, 2),
            truncated_mm2: raw_mm2.trunc() as u64,
        }
    }

    /// Label shown beneath the editor
    pub fn label(&self) -> String {
        format!("Segmented area: {} ㎟", self)
    }
}

impl fmt::Display for AreaMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded_mm2)
    }
}

/// Converts foreground cell counts into physical areas
///
/// # Example
///
/// ```
/// use mammarea_core::{AreaCalculator, Dims, MaskRaster, MaskValue, PixelSpacing};
///
/// let mask = MaskRaster::from_fn(Dims::new(2, 2), |row, col| MaskValue::from(row + col > 0));
/// let spacing = PixelSpacing::try_new(0.1, 0.2).unwrap();
///
/// let area = AreaCalculator::area(&mask, Some(spacing)).unwrap();
/// assert_eq!(area.pixels, 3);
/// assert_eq!(area.rounded_mm2, 0.06);
/// assert_eq!(area.truncated_mm2, 0);
/// ```
pub struct AreaCalculator;

impl AreaCalculator {
    /// `count(foreground) * row_spacing * col_spacing`
    ///
    /// # Errors
    ///
    /// Returns `MissingSpacing` when no spacing is known
    pub fn area(mask: &MaskRaster, spacing: Option<PixelSpacing>) -> Result<AreaMeasurement> {
        let spacing = spacing.ok_or(MammareaError::MissingSpacing)?;
        Ok(AreaMeasurement::from_count(mask.foreground_count(), spacing))
    }
}

fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    // Nudge values sitting on a .5 boundary that binary floats represent
    // just below it (0.125 * 100 = 12.499999...)
    let scaled = value * factor;
    let nudged = scaled + scaled.abs() * f64::EPSILON * 4.0;
    (nudged + 0.5).floor() / factor
}
