pub mod report;

use crate::types::{BrushMode, ViewportPoint};
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

/// Command-line arguments for mammarea
#[derive(Parser, Debug)]
#[command(name = "mammarea")]
#[command(about = "Segment a mammogram and measure the region of interest in mm²")]
#[command(version)]
pub struct Cli {
    /// Path to DICOM file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Save the mask to this path (.nii, .nii.gz, .png, .jpg, .bmp, .tiff)
    #[arg(short, long, value_name = "PATH", conflicts_with = "save_dir")]
    pub save: Option<PathBuf>,

    /// Save the mask into this directory as mask_<area>mm2.<ext>
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// File type used with --save-dir
    #[arg(long, default_value = "nii")]
    pub mask_format: MaskFormatArg,

    /// Brush mode for strokes without an explicit mode
    #[arg(long, default_value = "erase")]
    pub brush_mode: BrushModeArg,

    /// Brush radius in pixels (1-300)
    #[arg(long, default_value_t = 30.0)]
    pub brush_radius: f64,

    /// Edit the automatic mask before measuring, e.g. "paint:120,340;135,352"
    #[arg(long, value_name = "STROKE")]
    pub stroke: Vec<StrokeArg>,

    /// Fixed histogram bin count for the automatic threshold
    #[arg(long)]
    pub bins: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Mask file types selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MaskFormatArg {
    /// Gzipped NIfTI volume
    Nii,
    /// 8-bit PNG
    Png,
}

impl From<MaskFormatArg> for crate::export::MaskFormat {
    fn from(arg: MaskFormatArg) -> Self {
        match arg {
            MaskFormatArg::Nii => crate::export::MaskFormat::Volumetric,
            MaskFormatArg::Png => crate::export::MaskFormat::Raster(image::ImageFormat::Png),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BrushModeArg {
    /// Add to the region
    Paint,
    /// Remove from the region
    Erase,
}

impl From<BrushModeArg> for BrushMode {
    fn from(arg: BrushModeArg) -> Self {
        match arg {
            BrushModeArg::Paint => BrushMode::Paint,
            BrushModeArg::Erase => BrushMode::Erase,
        }
    }
}

/// A scripted stroke: optional mode and a polyline in image pixels
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeArg {
    pub mode: Option<BrushMode>,
    pub points: Vec<ViewportPoint>,
}

impl FromStr for StrokeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, rest) = match s.split_once(':') {
            Some((mode, rest)) => {
                let mode = match mode.trim().to_ascii_lowercase().as_str() {
                    "paint" | "brush" => BrushMode::Paint,
                    "erase" | "rubber" => BrushMode::Erase,
                    other => return Err(format!("unknown brush mode '{}'", other)),
                };
                (Some(mode), rest)
            }
            None => (None, s),
        };

        static POINT: OnceLock<Regex> = OnceLock::new();
        let re = POINT.get_or_init(|| {
            Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$")
                .expect("Failed to compile regex")
        });
        let points = rest
            .split(';')
            .map(|pair| {
                let caps = re
                    .captures(pair)
                    .ok_or_else(|| format!("expected X,Y but got '{}'", pair.trim()))?;
                let x: f64 = caps[1].parse().map_err(|e| format!("{}", e))?;
                let y: f64 = caps[2].parse().map_err(|e| format!("{}", e))?;
                Ok(ViewportPoint::new(x, y))
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(Self { mode, points })
    }
}

/// Initializes env_logger at Debug or Info
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
