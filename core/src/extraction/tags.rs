use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Core Image Tags
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);

// Image Geometry Tags
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
pub const IMAGER_PIXEL_SPACING: Tag = Tag(0x0018, 0x1164);

// View Position Tags
pub const VIEW_POSITION: Tag = Tag(0x0018, 0x5101);
pub const VIEW_CODE_SEQUENCE: Tag = Tag(0x0054, 0x0220);
pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
pub const FRAME_LATERALITY: Tag = Tag(0x0020, 0x9072);
pub const FRAME_ANATOMY_SEQUENCE: Tag = Tag(0x0020, 0x9071);

// Laterality Tags
pub const LATERALITY: Tag = Tag(0x0020, 0x0060);
pub const IMAGE_LATERALITY: Tag = Tag(0x0020, 0x0062);
pub const SHARED_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9229);

// Identification Tags
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);

// GE private projection label, e.g. "RCC"
pub const GE_PROJECTION: Tag = Tag(0x0045, 0x101B);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present, cannot be converted to string,
/// or is blank after trimming
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Helper to get a value as text straight from its bytes
///
/// Private tags read under implicit VR arrive as `UN`, which `to_str`
/// renders as a list of numbers. Decoding the raw bytes recovers the text.
pub fn get_text_bytes(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    let elem = dcm.element(tag).ok()?;
    let bytes = elem.to_bytes().ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!text.is_empty()).then(|| text.to_string())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::value::PrimitiveValue;
    use dicom_core::{DataElement, VR};

    #[test]
    fn test_tag_values() {
        assert_eq!(MODALITY, Tag(0x0008, 0x0060));
        assert_eq!(IMAGER_PIXEL_SPACING, Tag(0x0018, 0x1164));
        assert_eq!(GE_PROJECTION, Tag(0x0045, 0x101B));
    }

    #[test]
    fn test_blank_string_is_none() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from("  ")));
        assert_eq!(get_string_value(&dcm, PATIENT_ID), None);
    }

    #[test]
    fn test_text_from_unknown_vr_bytes() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            GE_PROJECTION,
            VR::UN,
            PrimitiveValue::from(b"RMLO\0".to_vec()),
        ));
        assert_eq!(get_text_bytes(&dcm, GE_PROJECTION).as_deref(), Some("RMLO"));
    }
}
