use std::path::PathBuf;
use thiserror::Error;

/// Result type for mammarea operations
pub type Result<T> = std::result::Result<T, MammareaError>;

/// Error types for mammarea operations
#[derive(Error, Debug)]
pub enum MammareaError {
    /// DICOM reading or decoding error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Tag not found in DICOM file
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// File is a DICOM object but not a mammogram
    #[error("Not a MG modality image (modality: {0})")]
    NotMammography(String),

    /// Image shape the engine does not handle (multi-frame, colour, empty)
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Pixel spacing is absent, so no physical area can be computed
    #[error("Pixel spacing is missing; refusing to compute an area without it")]
    MissingSpacing,

    /// Pixel data has a single intensity and cannot be normalized
    #[error("Degenerate image: all {0} samples share one intensity")]
    DegenerateImage(usize),

    /// Two rasters that must match in shape do not
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Requested output extension has no writer
    #[error("Extension not supported: {0}")]
    UnsupportedFormat(String),

    /// Mask, table or volume serialization failed
    #[error("Export error: {0}")]
    ExportError(String),

    /// Moving a finished batch out of the staging area failed
    #[error("Could not relocate results from {staging} to {destination}: {reason}")]
    RelocationFailed {
        staging: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MammareaError {
    /// Returns whether the error comes from the input file itself rather than
    /// from the environment (disk, permissions)
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MammareaError::DicomError(_)
                | MammareaError::TagNotFound(_)
                | MammareaError::InvalidValue(_)
                | MammareaError::NotMammography(_)
                | MammareaError::UnsupportedImage(_)
                | MammareaError::MissingSpacing
        )
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for MammareaError {
    fn from(e: dicom_object::ReadError) -> Self {
        MammareaError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for MammareaError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        MammareaError::InvalidValue(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for MammareaError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        MammareaError::DicomError(format!("failed to decode pixel data: {}", e))
    }
}

impl From<image::ImageError> for MammareaError {
    fn from(e: image::ImageError) -> Self {
        MammareaError::ExportError(format!("{}", e))
    }
}

impl From<nifti::NiftiError> for MammareaError {
    fn from(e: nifti::NiftiError) -> Self {
        MammareaError::ExportError(format!("{}", e))
    }
}

impl From<rust_xlsxwriter::XlsxError> for MammareaError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        MammareaError::ExportError(format!("{}", e))
    }
}

impl From<walkdir::Error> for MammareaError {
    fn from(e: walkdir::Error) -> Self {
        MammareaError::IoError(e.into())
    }
}
