use crate::error::{MammareaError, Result};
use crate::extraction::tags::{
    get_int_value, get_string_value, get_u16_value, ACCESSION_NUMBER, COLUMNS, MODALITY,
    NUMBER_OF_FRAMES, PATIENT_ID, ROWS,
};
use crate::extraction::{
    extract_laterality, extract_pixel_spacing, extract_projection, extract_view_position,
};
use crate::types::{MammogramView, PixelSpacing};
use dicom_object::InMemDicomObject;
use log::warn;

/// Extractor for the metadata needed to label and measure a mammogram
///
/// Reads identifiers, projection and pixel spacing from a DICOM object
/// without touching pixel data, so it works on header-only reads.
///
/// # Example
///
/// ```
/// use mammarea_core::MammogramExtractor;
/// use dicom_object::InMemDicomObject;
/// use dicom_core::{DataElement, PrimitiveValue, VR, Tag};
///
/// let mut dcm = InMemDicomObject::new_empty();
/// dcm.put(DataElement::new(Tag(0x0008, 0x0060), VR::CS, PrimitiveValue::from("MG")));
/// dcm.put(DataElement::new(Tag(0x0010, 0x0020), VR::LO, PrimitiveValue::from("P001")));
/// dcm.put(DataElement::new(Tag(0x0020, 0x0062), VR::CS, PrimitiveValue::from("L")));
/// dcm.put(DataElement::new(Tag(0x0018, 0x5101), VR::CS, PrimitiveValue::from("CC")));
/// dcm.put(DataElement::new(Tag(0x0018, 0x1164), VR::DS, PrimitiveValue::from("0.1\\0.1")));
///
/// let metadata = MammogramExtractor::extract(&dcm).unwrap();
///
/// assert!(metadata.is_mammography());
/// assert_eq!(metadata.patient_id.as_deref(), Some("P001"));
/// assert_eq!(metadata.projection.as_deref(), Some("LCC"));
/// assert_eq!(metadata.require_spacing().unwrap().row(), 0.1);
/// ```
pub struct MammogramExtractor;

impl MammogramExtractor {
    /// Extracts all labelling and measurement metadata
    ///
    /// Missing attributes are reported as `None` fields. A present but
    /// malformed pixel spacing does not fail the extraction: the reason is
    /// kept in `spacing_error` and surfaces from [`MammogramMetadata::require_spacing`],
    /// so header-only classification depends on the modality alone.
    pub fn extract(dcm: &InMemDicomObject) -> Result<MammogramMetadata> {
        let (pixel_spacing, spacing_error) = match extract_pixel_spacing(dcm) {
            Ok(spacing) => (spacing, None),
            Err(MammareaError::InvalidValue(reason)) => {
                warn!("Unusable pixel spacing: {}", reason);
                (None, Some(reason))
            }
            Err(e) => return Err(e),
        };

        Ok(MammogramMetadata {
            patient_id: get_string_value(dcm, PATIENT_ID),
            accession_number: get_string_value(dcm, ACCESSION_NUMBER),
            modality: get_string_value(dcm, MODALITY),
            projection: extract_projection(dcm),
            view: MammogramView::new(extract_laterality(dcm), extract_view_position(dcm)),
            pixel_spacing,
            spacing_error,
            rows: get_u16_value(dcm, ROWS),
            columns: get_u16_value(dcm, COLUMNS),
            number_of_frames: get_int_value(dcm, NUMBER_OF_FRAMES).unwrap_or(1),
        })
    }
}

/// Metadata of a single mammogram
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct MammogramMetadata {
    /// Patient identifier (shown as "ID PACS")
    pub patient_id: Option<String>,

    /// Accession number of the study
    pub accession_number: Option<String>,

    /// Modality code, "MG" for mammography
    pub modality: Option<String>,

    /// Projection label such as "RCC" or "LMLO"
    pub projection: Option<String>,

    /// Laterality and view position
    #[cfg_attr(feature = "json", serde(skip))]
    pub view: MammogramView,

    /// Physical pixel spacing
    pub pixel_spacing: Option<PixelSpacing>,

    /// Why a present pixel spacing attribute could not be used
    pub spacing_error: Option<String>,

    /// Number of rows in image
    pub rows: Option<u16>,

    /// Number of columns in image
    pub columns: Option<u16>,

    /// Number of frames; only single-frame images are measured
    pub number_of_frames: i32,
}

impl MammogramMetadata {
    /// Returns whether the modality is MG
    pub fn is_mammography(&self) -> bool {
        self.modality
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("MG"))
    }

    /// Fails with `NotMammography` unless the modality is MG
    pub fn ensure_mammography(&self) -> Result<()> {
        if self.is_mammography() {
            Ok(())
        } else {
            Err(MammareaError::NotMammography(
                self.modality.clone().unwrap_or_else(|| "missing".to_string()),
            ))
        }
    }

    /// Returns the pixel spacing
    ///
    /// Fails with `InvalidValue` when the attribute was present but unusable
    /// and with `MissingSpacing` when it was absent.
    pub fn require_spacing(&self) -> Result<PixelSpacing> {
        match (self.pixel_spacing, &self.spacing_error) {
            (Some(spacing), _) => Ok(spacing),
            (None, Some(reason)) => Err(MammareaError::InvalidValue(reason.clone())),
            (None, None) => Err(MammareaError::MissingSpacing),
        }
    }

    /// Patient id for display and directory names
    pub fn patient_label(&self) -> &str {
        self.patient_id.as_deref().unwrap_or("unknown")
    }

    /// Accession number for display and directory names
    pub fn accession_label(&self) -> &str {
        self.accession_number.as_deref().unwrap_or("unknown")
    }

    /// Projection for display and file names
    pub fn projection_label(&self) -> &str {
        self.projection.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Laterality, ViewPosition};
    use dicom_core::value::PrimitiveValue;
    use dicom_core::{DataElement, VR};
    use rstest::rstest;

    fn metadata(modality: Option<&str>, spacing: Option<PixelSpacing>) -> MammogramMetadata {
        MammogramMetadata {
            patient_id: Some("P1".to_string()),
            accession_number: Some("A1".to_string()),
            modality: modality.map(str::to_string),
            projection: None,
            view: MammogramView::new(Laterality::Left, ViewPosition::Cc),
            pixel_spacing: spacing,
            spacing_error: None,
            rows: Some(2),
            columns: Some(2),
            number_of_frames: 1,
        }
    }

    #[test]
    fn test_ensure_mammography() {
        assert!(metadata(Some("MG"), None).ensure_mammography().is_ok());
        assert!(matches!(
            metadata(Some("CT"), None).ensure_mammography(),
            Err(MammareaError::NotMammography(m)) if m == "CT"
        ));
        assert!(metadata(None, None).ensure_mammography().is_err());
    }

    #[test]
    fn test_require_spacing() {
        assert!(matches!(
            metadata(Some("MG"), None).require_spacing(),
            Err(MammareaError::MissingSpacing)
        ));
        let spacing = PixelSpacing::try_new(0.1, 0.2).unwrap();
        assert_eq!(
            metadata(Some("MG"), Some(spacing)).require_spacing().unwrap(),
            spacing
        );
    }

    #[test]
    fn test_labels_default_to_unknown() {
        let mut md = metadata(Some("MG"), None);
        md.patient_id = None;
        assert_eq!(md.patient_label(), "unknown");
        assert_eq!(md.accession_label(), "A1");
        assert_eq!(md.projection_label(), "unknown");
    }

    #[test]
    fn test_extract_empty_object() {
        let dcm = InMemDicomObject::new_empty();
        let md = MammogramExtractor::extract(&dcm).unwrap();
        assert!(!md.is_mammography());
        assert!(md.pixel_spacing.is_none());
        assert_eq!(md.number_of_frames, 1);
    }

    #[rstest]
    #[case("abc")]
    #[case("0\\0.1")]
    fn test_extract_unusable_spacing_is_deferred(#[case] raw: &str) {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            crate::extraction::tags::MODALITY,
            VR::CS,
            PrimitiveValue::from("MG"),
        ));
        dcm.put(DataElement::new(
            crate::extraction::tags::IMAGER_PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::from(raw),
        ));

        let md = MammogramExtractor::extract(&dcm).unwrap();
        assert!(md.ensure_mammography().is_ok());
        assert!(md.pixel_spacing.is_none());
        assert!(md.spacing_error.is_some());
        assert!(matches!(
            md.require_spacing(),
            Err(MammareaError::InvalidValue(_))
        ));
    }
}
