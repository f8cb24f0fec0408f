use crate::batch::BatchResultRow;
use crate::error::Result;
use log::info;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Column headers of the results table
pub const TABLE_HEADER: [&str; 4] = ["PatientID", "AccessionNumber", "Projection", "Area"];

/// Destination for the aggregated batch results
pub trait TableSink {
    fn write_rows(&self, rows: &[BatchResultRow], path: &Path) -> Result<()>;
}

/// Single-sheet spreadsheet with one row per measured image
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxTableWriter;

impl TableSink for XlsxTableWriter {
    fn write_rows(&self, rows: &[BatchResultRow], path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (col, title) in TABLE_HEADER.iter().enumerate() {
            sheet.write_string(0, col as u16, *title)?;
        }
        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, row.patient_id.as_str())?;
            sheet.write_string(r, 1, row.accession_number.as_str())?;
            sheet.write_string(r, 2, row.projection.as_deref().unwrap_or(""))?;
            sheet.write_number(r, 3, row.area.rounded_mm2)?;
        }

        workbook.save(path)?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::AreaCalculator;
    use crate::types::{Dims, MaskRaster, PixelSpacing};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_writes_workbook() {
        let spacing = PixelSpacing::try_new(0.1, 0.1).unwrap();
        let area = AreaCalculator::area(&MaskRaster::new(Dims::new(2, 2)), Some(spacing)).unwrap();
        let rows = vec![BatchResultRow {
            source: PathBuf::from("a.dcm"),
            patient_id: "P1".to_string(),
            accession_number: "A1".to_string(),
            projection: None,
            area,
        }];

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("areas.xlsx");
        XlsxTableWriter.write_rows(&rows, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx is a zip container");
    }
}
