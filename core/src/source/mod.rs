//! Image input: decoding medical images and preparing them for display

mod image_source;
mod reader;

pub use image_source::{normalize, resample, ImageSource};
pub use reader::{DecodedMammogram, DicomReader, ImageReader};

#[cfg(test)]
pub(crate) use reader::tests::write_test_dicom;
