/// Configuration for a batch scan and run
///
/// # Example
///
/// ```
/// use mammarea_core::BatchConfig;
///
/// let config = BatchConfig::default()
///     .persist_masks(true)
///     .with_extensions(["dcm", "dicom"]);
///
/// assert!(config.persist_masks);
/// assert!(config.accepts_extension("DICOM"));
/// assert_eq!(config.modality, "MG");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchConfig {
    /// File extensions considered during discovery (case-insensitive, no dot)
    pub extensions: Vec<String>,

    /// Modality code a file must carry to be eligible
    pub modality: String,

    /// Write a PNG and a NIfTI copy of every mask into the results
    pub persist_masks: bool,

    /// Histogram bin count for the automatic threshold; `None` selects
    /// one bin per intensity level
    pub histogram_bins: Option<usize>,

    /// File name of the results table inside the results directory
    pub table_name: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["dcm".to_string()],
            modality: "MG".to_string(),
            persist_masks: false,
            histogram_bins: None,
            table_name: "areas.xlsx".to_string(),
        }
    }
}

impl BatchConfig {
    /// Builder: Replace the accepted file extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: Persist masks next to the results table
    pub fn persist_masks(mut self, persist: bool) -> Self {
        self.persist_masks = persist;
        self
    }

    /// Builder: Fix the histogram bin count used for thresholding
    ///
    /// # Example
    ///
    /// ```
    /// use mammarea_core::BatchConfig;
    ///
    /// let config = BatchConfig::default().with_histogram_bins(256);
    /// assert_eq!(config.histogram_bins, Some(256));
    /// ```
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Returns whether a file extension passes the discovery filter
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Returns whether a modality code makes a file eligible
    pub fn accepts_modality(&self, modality: &str) -> bool {
        modality.trim().eq_ignore_ascii_case(&self.modality)
    }
}

/// Brush limits and defaults for interactive editing
///
/// Radii are in display pixels.
///
/// # Example
///
/// ```
/// use mammarea_core::BrushConfig;
///
/// let config = BrushConfig::default();
/// assert_eq!(config.clamp_radius(1000.0), 300.0);
/// assert_eq!(config.clamp_radius(0.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct BrushConfig {
    pub min_radius: f64,
    pub max_radius: f64,
    pub default_radius: f64,
    /// Wheel angle delta that corresponds to one radius step
    pub wheel_step: i32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            min_radius: 1.0,
            max_radius: 300.0,
            default_radius: 30.0,
            wheel_step: 50,
        }
    }
}

impl BrushConfig {
    /// Clamps a radius into `[min_radius, max_radius]`
    pub fn clamp_radius(&self, radius: f64) -> f64 {
        radius.clamp(self.min_radius, self.max_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_config() {
        let config = BatchConfig::default();
        assert!(config.accepts_extension("dcm"));
        assert!(config.accepts_extension("DCM"));
        assert!(!config.accepts_extension("dicom"));
        assert!(config.accepts_modality("MG"));
        assert!(config.accepts_modality(" mg "));
        assert!(!config.accepts_modality("CT"));
        assert!(!config.persist_masks);
        assert_eq!(config.histogram_bins, None);
    }

    #[test]
    fn test_brush_config_clamp() {
        let config = BrushConfig::default();
        assert_eq!(config.clamp_radius(30.0), 30.0);
        assert_eq!(config.clamp_radius(-5.0), 1.0);
    }
}
