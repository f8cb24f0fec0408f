use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Pixel spacing in millimeters (row, column)
///
/// Represents the physical spacing between adjacent pixels
/// in the detector/imager, measured in mm. Both components are
/// strictly positive and finite; construction goes through
/// [`PixelSpacing::try_new`] or [`PixelSpacing::parse`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PixelSpacing {
    row: f64,
    col: f64,
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    ///
    /// # Errors
    ///
    /// Returns an error if either component is zero, negative or not finite
    pub fn try_new(row: f64, col: f64) -> Result<Self, String> {
        if !(row.is_finite() && row > 0.0) {
            return Err(format!("Row spacing must be positive, got {}", row));
        }
        if !(col.is_finite() && col > 0.0) {
            return Err(format!("Column spacing must be positive, got {}", col));
        }
        Ok(Self { row, col })
    }

    /// Spacing between rows (vertical step), in mm
    pub fn row(&self) -> f64 {
        self.row
    }

    /// Spacing between columns (horizontal step), in mm
    pub fn col(&self) -> f64 {
        self.col
    }

    /// Physical area covered by a single pixel, in mm²
    pub fn pixel_area(&self) -> f64 {
        self.row * self.col
    }

    /// Parses pixel spacing from string
    ///
    /// Accepts formats like:
    /// - "0.1\\0.1"
    /// - "0.1 0.1"
    /// - "[0.1, 0.1]"
    /// - Exponential notation: "1.5e-4 1.5e-4"
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed or a value is not positive
    pub fn parse(s: &str) -> Result<Self, String> {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| {
            Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
        });

        let mut numbers = re.find_iter(s).map(|m| m.as_str());
        let row_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;
        let col_str = numbers
            .next()
            .ok_or_else(|| format!("Failed to parse PixelSpacing from '{}'", s))?;

        let row: f64 = row_str
            .parse()
            .map_err(|e| format!("Failed to parse row value: {}", e))?;

        let col: f64 = col_str
            .parse()
            .map_err(|e| format!("Failed to parse col value: {}", e))?;

        Self::try_new(row, col)
    }
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} mm", self.row, self.col)
    }
}
