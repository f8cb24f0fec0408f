use crate::types::Laterality;
use dicom_object::InMemDicomObject;

use super::tags::{
    get_string_value, FRAME_ANATOMY_SEQUENCE, FRAME_LATERALITY, IMAGE_LATERALITY,
    LATERALITY as LATERALITY_TAG, SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
};

/// Extracts laterality from a DICOM object
///
/// Tries ImageLaterality, then Laterality, then the FrameLaterality nested in
/// SharedFunctionalGroupsSequence. The first non-empty value wins.
pub fn extract_laterality(dcm: &InMemDicomObject) -> Laterality {
    get_string_value(dcm, IMAGE_LATERALITY)
        .or_else(|| get_string_value(dcm, LATERALITY_TAG))
        .or_else(|| extract_frame_laterality(dcm))
        .map(|s| parse_laterality(&s))
        .unwrap_or(Laterality::Unknown)
}

/// SharedFunctionalGroupsSequence[0] → FrameAnatomySequence[0] → FrameLaterality
fn extract_frame_laterality(dcm: &InMemDicomObject) -> Option<String> {
    dcm.element(SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
        .ok()
        .and_then(|shared_seq| shared_seq.items())
        .and_then(|items| items.first())
        .and_then(|first_item| first_item.element(FRAME_ANATOMY_SEQUENCE).ok())
        .and_then(|frame_anatomy_seq| frame_anatomy_seq.items())
        .and_then(|items| items.first())
        .and_then(|first_item| get_string_value(first_item, FRAME_LATERALITY))
}

/// Parses the DICOM laterality code ("L", "R", "B")
fn parse_laterality(s: &str) -> Laterality {
    match s.trim().to_uppercase().as_str() {
        "L" => Laterality::Left,
        "R" => Laterality::Right,
        "B" => Laterality::Bilateral,
        _ => Laterality::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::value::{DataSetSequence, PrimitiveValue};
    use dicom_core::{DataElement, VR};

    #[test]
    fn test_parse_laterality() {
        assert_eq!(parse_laterality("L"), Laterality::Left);
        assert_eq!(parse_laterality(" r "), Laterality::Right);
        assert_eq!(parse_laterality("B"), Laterality::Bilateral);
        assert_eq!(parse_laterality("UNKNOWN"), Laterality::Unknown);
    }

    #[test]
    fn test_image_laterality_preferred() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(IMAGE_LATERALITY, VR::CS, PrimitiveValue::from("R")));
        dcm.put(DataElement::new(LATERALITY_TAG, VR::CS, PrimitiveValue::from("L")));
        assert_eq!(extract_laterality(&dcm), Laterality::Right);
    }

    #[test]
    fn test_frame_laterality_fallback() {
        let frame_anatomy_item = InMemDicomObject::from_element_iter([DataElement::new(
            FRAME_LATERALITY,
            VR::CS,
            PrimitiveValue::from("L"),
        )]);
        let shared_item = InMemDicomObject::from_element_iter([DataElement::new(
            FRAME_ANATOMY_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![frame_anatomy_item]),
        )]);

        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![shared_item]),
        ));

        assert_eq!(extract_laterality(&dcm), Laterality::Left);
    }

    #[test]
    fn test_missing_laterality() {
        let dcm = InMemDicomObject::new_empty();
        assert_eq!(extract_laterality(&dcm), Laterality::Unknown);
    }
}
