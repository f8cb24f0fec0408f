//! Automatic segmentation and physical area measurement

mod area;
mod threshold;

pub use area::{AreaCalculator, AreaMeasurement};
pub use threshold::{otsu_level, AutoThresholder, OtsuLevel, ThresholdResult};
