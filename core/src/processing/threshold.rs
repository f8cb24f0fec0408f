use crate::types::{MaskRaster, MaskValue, RawImage};
use log::debug;

/// Upper bound for one-bin-per-level histograms
const MAX_LEVEL_BINS: usize = 1 << 16;

/// Bin count used for non-integral data when none is configured
const DEFAULT_FLOAT_BINS: usize = 256;

/// Result of Otsu's threshold computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtsuLevel {
    /// Threshold in sample units; samples strictly above it are foreground
    pub value: f64,
    /// Between-class variance at the threshold, normalized by total²
    pub variance: f64,
}

/// Threshold value plus the mask it produces
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdResult {
    pub value: f64,
    pub mask: MaskRaster,
}

/// Global histogram threshold (Otsu's method)
///
/// # Example
///
/// ```
/// use mammarea_core::{AutoThresholder, Dims, RawImage};
///
/// let raw = RawImage::new(Dims::new(1, 4), vec![10.0, 10.0, 200.0, 200.0]).unwrap();
/// let result = AutoThresholder::default().threshold(&raw);
///
/// assert!(result.value > 10.0 && result.value < 200.0);
/// assert_eq!(result.mask.foreground_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoThresholder {
    bins: Option<usize>,
}

impl AutoThresholder {
    /// Thresholder with a fixed histogram bin count
    pub fn with_bins(bins: usize) -> Self {
        Self {
            bins: Some(bins.max(2)),
        }
    }

    /// Thresholder with an optional bin count; `None` selects one bin per level
    pub fn new(bins: Option<usize>) -> Self {
        bins.map(Self::with_bins).unwrap_or_default()
    }

    /// Computes the threshold and the binary mask `sample > value`
    ///
    /// A flat image never fails: its threshold is its only intensity and
    /// the mask is all background.
    pub fn threshold(&self, raw: &RawImage) -> ThresholdResult {
        let level = otsu_level(raw, self.bins);
        let samples = raw.samples();
        let cols = raw.dims().cols;
        let mask = MaskRaster::from_fn(raw.dims(), |row, col| {
            MaskValue::from(samples[row * cols + col] as f64 > level.value)
        });
        debug!(
            "Otsu threshold {:.3} ({} foreground cells)",
            level.value,
            mask.foreground_count()
        );
        ThresholdResult {
            value: level.value,
            mask,
        }
    }
}

/// Histogram layout over `[min, max]`
struct Binning {
    min: f64,
    width: f64,
    count: usize,
    /// One bin per integer level, centered on the level itself
    per_level: bool,
}

impl Binning {
    fn choose(raw: &RawImage, min: f64, max: f64, bins: Option<usize>) -> Self {
        match bins {
            None if raw.is_integral() && (max - min) < MAX_LEVEL_BINS as f64 => Self {
                min,
                width: 1.0,
                count: (max - min) as usize + 1,
                per_level: true,
            },
            _ => {
                let count = bins.unwrap_or(DEFAULT_FLOAT_BINS);
                Self {
                    min,
                    width: (max - min) / count as f64,
                    count,
                    per_level: false,
                }
            }
        }
    }

    fn index(&self, value: f64) -> usize {
        (((value - self.min) / self.width) as usize).min(self.count - 1)
    }

    fn center(&self, index: usize) -> f64 {
        if self.per_level {
            self.min + index as f64
        } else {
            self.min + (index as f64 + 0.5) * self.width
        }
    }
}

/// Otsu's method over the image's own histogram
///
/// When several split points share the maximal between-class variance
/// (every split between two isolated levels does), the threshold sits
/// halfway between the first optimal bin and the bin following the last
/// optimal one.
pub fn otsu_level(raw: &RawImage, bins: Option<usize>) -> OtsuLevel {
    let (min, max) = match raw.min_max() {
        Some((min, max)) => (min as f64, max as f64),
        None => {
            return OtsuLevel {
                value: 0.0,
                variance: 0.0,
            }
        }
    };
    if max <= min {
        return OtsuLevel {
            value: max,
            variance: 0.0,
        };
    }

    let binning = Binning::choose(raw, min, max, bins);
    let mut histogram = vec![0u64; binning.count];
    for &v in raw.samples() {
        histogram[binning.index(v as f64)] += 1;
    }

    let total = raw.samples().len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| c as f64 * binning.center(i))
        .sum();

    let mut w0 = 0.0;
    let mut sum0 = 0.0;
    let mut best: Option<(f64, usize, usize)> = None;

    for t in 0..binning.count - 1 {
        w0 += histogram[t] as f64;
        sum0 += histogram[t] as f64 * binning.center(t);
        let w1 = total - w0;
        if w0 == 0.0 || w1 == 0.0 {
            continue;
        }

        let mu0 = sum0 / w0;
        let mu1 = (total_sum - sum0) / w1;
        let variance = w0 * w1 * (mu0 - mu1) * (mu0 - mu1) / (total * total);

        best = match best {
            None => Some((variance, t, t)),
            Some((v, first, _)) if (variance - v).abs() <= v * 1e-12 => Some((v, first, t)),
            Some((v, _, _)) if variance > v => Some((variance, t, t)),
            keep => keep,
        };
    }

    match best {
        Some((variance, first, last)) => OtsuLevel {
            value: (binning.center(first) + binning.center(last + 1)) / 2.0,
            variance,
        },
        None => OtsuLevel {
            value: max,
            variance: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dims;

    fn raw(rows: usize, cols: usize, samples: Vec<f32>) -> RawImage {
        RawImage::new(Dims::new(rows, cols), samples).unwrap()
    }

    #[test]
    fn test_two_level_image_separates_exactly() {
        let samples: Vec<f32> = (0..64)
            .map(|i| if (i / 8 + i % 8) % 3 == 0 { 200.0 } else { 10.0 })
            .collect();
        let image = raw(8, 8, samples.clone());

        let result = AutoThresholder::default().threshold(&image);
        assert!(
            result.value > 10.0 && result.value < 200.0,
            "threshold {} not strictly between levels",
            result.value
        );
        for (i, value) in result.mask.values().enumerate() {
            assert_eq!(value.is_foreground(), samples[i] == 200.0);
        }
    }

    #[test]
    fn test_two_level_image_with_fixed_bins() {
        let image = raw(1, 6, vec![10.0, 10.0, 10.0, 200.0, 200.0, 200.0]);
        let result = AutoThresholder::with_bins(256).threshold(&image);
        assert!(result.value > 10.0 && result.value < 200.0);
        assert_eq!(result.mask.foreground_count(), 3);
    }

    #[test]
    fn test_flat_image_gives_empty_mask() {
        let image = raw(4, 4, vec![42.0; 16]);
        let result = AutoThresholder::default().threshold(&image);
        assert_eq!(result.value, 42.0);
        assert_eq!(result.mask.foreground_count(), 0);
        assert_eq!(result.mask.dims(), Dims::new(4, 4));
    }

    #[test]
    fn test_trimodal_splits_between_groups() {
        // Dark background, two bright tissue levels
        let mut samples = vec![0.0f32; 60];
        samples.extend(vec![900.0; 20]);
        samples.extend(vec![1000.0; 20]);
        let image = raw(10, 10, samples);

        let level = otsu_level(&image, None);
        assert!(level.value > 0.0 && level.value < 900.0);
        assert!(level.variance > 0.0);
    }

    #[test]
    fn test_non_integral_samples_use_float_bins() {
        let mut samples = vec![0.1f32; 50];
        samples.extend(vec![0.9; 50]);
        let image = raw(10, 10, samples);

        let result = AutoThresholder::default().threshold(&image);
        assert!(result.value > 0.1 && result.value < 0.9);
        assert_eq!(result.mask.foreground_count(), 50);
    }

    #[test]
    fn test_unit_width_float_bins_keep_center_offset() {
        // 256 float bins over a range of 256 are exactly 1.0 wide
        let raw = RawImage::new(Dims::new(1, 2), vec![0.5, 256.5]).unwrap();
        let binning = Binning::choose(&raw, 0.5, 256.5, None);
        assert!(!binning.per_level);
        assert_eq!(binning.width, 1.0);
        assert_eq!(binning.center(0), 1.0);

        let raw = RawImage::new(Dims::new(1, 2), vec![0.0, 255.0]).unwrap();
        let binning = Binning::choose(&raw, 0.0, 255.0, None);
        assert!(binning.per_level);
        assert_eq!(binning.center(3), 3.0);
    }

    #[test]
    fn test_deterministic() {
        let samples: Vec<f32> = (0..100).map(|i| ((i * 37) % 251) as f32).collect();
        let image = raw(10, 10, samples);
        let a = AutoThresholder::default().threshold(&image);
        let b = AutoThresholder::default().threshold(&image);
        assert_eq!(a, b);
    }
}
