use crate::types::ViewPosition;
use dicom_object::InMemDicomObject;

use super::tags::{get_string_value, CODE_MEANING, VIEW_CODE_SEQUENCE, VIEW_POSITION};

// Checked in order: exaggerated and oblique views before the plain
// views whose names they contain.
const VIEW_PATTERNS: &[(ViewPosition, &[&str])] = &[
    (ViewPosition::Xccl, &["xccl", "exaggerated laterally"]),
    (ViewPosition::Xccm, &["xccm", "exaggerated medially"]),
    (
        ViewPosition::Lmo,
        &["lmo", "latero-medial oblique", "lateral-medial oblique"],
    ),
    (
        ViewPosition::Mlo,
        &["mlo", "medio-lateral oblique", "medial-lateral oblique"],
    ),
    (ViewPosition::Lm, &["lm", "latero-medial", "lateral-medial"]),
    (ViewPosition::Ml, &["ml", "medio-lateral", "medial-lateral"]),
    (ViewPosition::Cc, &["cc", "cranio-caudal", "caudal-cranial"]),
    (ViewPosition::At, &["at", "axillary tail"]),
    (ViewPosition::Cv, &["cv", "cleavage view", "valley-view"]),
];

/// Extracts view position from a DICOM object
///
/// The ViewPosition attribute is read first; when it is absent or
/// unrecognized, the CodeMeaning items of ViewCodeSequence are tried.
pub fn extract_view_position(dcm: &InMemDicomObject) -> ViewPosition {
    let from_tag = get_string_value(dcm, VIEW_POSITION)
        .map(|vp| parse_view_position(&vp))
        .filter(|vp| !vp.is_unknown());

    from_tag
        .or_else(|| extract_from_view_code_sequence(dcm))
        .unwrap_or(ViewPosition::Unknown)
}

fn extract_from_view_code_sequence(dcm: &InMemDicomObject) -> Option<ViewPosition> {
    let seq = dcm.element(VIEW_CODE_SEQUENCE).ok()?;
    seq.items()?
        .iter()
        .filter_map(|item| get_string_value(item, CODE_MEANING))
        .map(|meaning| parse_view_position(&meaning))
        .find(|vp| !vp.is_unknown())
}

/// Parses a view position from an abbreviation or a coded meaning
pub fn parse_view_position(s: &str) -> ViewPosition {
    let s = s.trim().to_lowercase();
    VIEW_PATTERNS
        .iter()
        .find(|(_, patterns)| {
            patterns.iter().any(|&p| {
                // Two and three letter codes must match exactly; longer
                // descriptions may be embedded in a free-text meaning.
                if p.len() <= 4 {
                    s == p
                } else {
                    s.contains(p)
                }
            })
        })
        .map(|(vp, _)| *vp)
        .unwrap_or(ViewPosition::Unknown)
}
