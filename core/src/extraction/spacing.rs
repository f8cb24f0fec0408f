use crate::error::{MammareaError, Result};
use crate::types::PixelSpacing;
use dicom_object::InMemDicomObject;

use super::tags::{get_string_value, IMAGER_PIXEL_SPACING, PIXEL_SPACING};

/// Extracts the physical pixel spacing
///
/// Mammography detectors report ImagerPixelSpacing; PixelSpacing is used
/// only when the former is absent. A missing attribute yields `Ok(None)`
/// so callers decide whether that is fatal. A present but unparsable or
/// non-positive value is an error.
pub fn extract_pixel_spacing(dcm: &InMemDicomObject) -> Result<Option<PixelSpacing>> {
    let raw = match get_string_value(dcm, IMAGER_PIXEL_SPACING)
        .or_else(|| get_string_value(dcm, PIXEL_SPACING))
    {
        Some(raw) => raw,
        None => return Ok(None),
    };

    PixelSpacing::parse(&raw)
        .map(Some)
        .map_err(MammareaError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::value::PrimitiveValue;
    use dicom_core::{DataElement, VR};

    #[test]
    fn test_imager_spacing_preferred() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            IMAGER_PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::from("0.1\\0.2"),
        ));
        dcm.put(DataElement::new(
            PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::from("0.5\\0.5"),
        ));
        let spacing = extract_pixel_spacing(&dcm).unwrap().unwrap();
        assert_eq!(spacing.row(), 0.1);
        assert_eq!(spacing.col(), 0.2);
    }

    #[test]
    fn test_pixel_spacing_fallback() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::from("0.07\\0.07"),
        ));
        let spacing = extract_pixel_spacing(&dcm).unwrap().unwrap();
        assert_eq!(spacing.row(), 0.07);
    }

    #[test]
    fn test_missing_spacing_is_none() {
        let dcm = InMemDicomObject::new_empty();
        assert!(extract_pixel_spacing(&dcm).unwrap().is_none());
    }

    #[test]
    fn test_invalid_spacing_is_error() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            IMAGER_PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::from("0\\0.1"),
        ));
        assert!(matches!(
            extract_pixel_spacing(&dcm),
            Err(MammareaError::InvalidValue(_))
        ));
    }
}
