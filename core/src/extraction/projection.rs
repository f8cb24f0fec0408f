use crate::types::MammogramView;
use dicom_object::InMemDicomObject;

use super::laterality::extract_laterality;
use super::tags::{get_text_bytes, GE_PROJECTION};
use super::view_position::extract_view_position;

/// Extracts the projection label used to name results
///
/// Vendor projection text (GE private tag 0045,101B) is used verbatim when
/// present. Otherwise the label is composed from laterality and view
/// position, e.g. "LCC". Returns `None` when neither source is available.
pub fn extract_projection(dcm: &InMemDicomObject) -> Option<String> {
    if let Some(label) = get_text_bytes(dcm, GE_PROJECTION) {
        return Some(label);
    }

    MammogramView::new(extract_laterality(dcm), extract_view_position(dcm)).projection_label()
}
