use crate::batch::{BatchRun, ScanSummary};
use crate::editor::AnnotationSession;
use std::fmt;
use std::path::Path;

/// Text report for an open annotation session
pub struct SessionReport<'a> {
    session: &'a AnnotationSession,
}

impl<'a> SessionReport<'a> {
    /// Creates a new text report
    pub fn new(session: &'a AnnotationSession) -> Self {
        Self { session }
    }
}

impl<'a> fmt::Display for SessionReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metadata = self.session.metadata();
        let area = self.session.area();

        writeln!(f, "{}", self.session.header_text())?;
        writeln!(f)?;
        writeln!(f, "Mammogram")?;
        writeln!(f, "---------")?;
        writeln!(f, "Laterality:     {}", metadata.view.laterality)?;
        writeln!(f, "View Position:  {}", metadata.view.view)?;
        writeln!(f, "Pixel Spacing:  {}", self.session.spacing())?;
        writeln!(f, "Dimensions:     {}", self.session.mask().dims())?;
        writeln!(f, "Threshold:      {:.2}", self.session.threshold())?;
        writeln!(f, "Foreground:     {} px", area.pixels)?;
        writeln!(f)?;
        write!(f, "{}", area.label())
    }
}

/// Text report of a header-only scan
pub struct ScanReport<'a> {
    summary: &'a ScanSummary,
}

impl<'a> ScanReport<'a> {
    pub fn new(summary: &'a ScanSummary) -> Self {
        Self { summary }
    }
}

impl<'a> fmt::Display for ScanReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Read\t{} images", self.summary.eligible.len())?;
        writeln!(f, "\t{} IDs", self.summary.patients)?;
        write!(f, "\t{} Accession Numbers", self.summary.accessions)?;
        if !self.summary.skipped.is_empty() {
            write!(f, "\n\t{} files skipped", self.summary.skipped.len())?;
        }
        Ok(())
    }
}

/// Text report of a finished batch run
pub struct BatchReport<'a> {
    run: &'a BatchRun,
    results: Option<&'a Path>,
}

impl<'a> BatchReport<'a> {
    pub fn new(run: &'a BatchRun, results: Option<&'a Path>) -> Self {
        Self { run, results }
    }
}

impl<'a> fmt::Display for BatchReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Results")?;
        writeln!(f, "=============")?;
        writeln!(f)?;
        writeln!(
            f,
            "Measured {} of {} images",
            self.run.rows.len(),
            self.run.total
        )?;

        for row in &self.run.rows {
            writeln!(
                f,
                "  {:<12} {:<14} {:<6} {:>10} mm²",
                row.patient_id,
                row.accession_number,
                row.projection.as_deref().unwrap_or("-"),
                row.area
            )?;
        }

        if !self.run.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failures")?;
            writeln!(f, "--------")?;
            for failure in &self.run.failures {
                writeln!(f, "  {}: {}", failure.path.display(), failure.reason)?;
            }
        }

        writeln!(f)?;
        match self.results {
            Some(dir) => write!(f, "Data saved to {}", dir.display()),
            None => write!(f, "Results table at {}", self.run.table.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchFailure, BatchResultRow};
    use crate::processing::AreaCalculator;
    use crate::types::{Dims, MaskRaster, MaskValue, PixelSpacing};
    use std::path::PathBuf;

    #[test]
    fn test_scan_report_format() {
        let summary = ScanSummary {
            eligible: vec![PathBuf::from("a.dcm"), PathBuf::from("b.dcm")],
            patients: 1,
            accessions: 2,
            skipped: vec![],
        };
        let output = ScanReport::new(&summary).to_string();
        assert_eq!(output, "Read\t2 images\n\t1 IDs\n\t2 Accession Numbers");
    }

    #[test]
    fn test_batch_report_format() {
        let mask = MaskRaster::from_fn(Dims::new(2, 2), |row, col| MaskValue::from(row + col > 0));
        let spacing = PixelSpacing::try_new(0.1, 0.2).unwrap();
        let run = BatchRun {
            total: 2,
            rows: vec![BatchResultRow {
                source: PathBuf::from("a.dcm"),
                patient_id: "P001".to_string(),
                accession_number: "ACC1".to_string(),
                projection: Some("LCC".to_string()),
                area: AreaCalculator::area(&mask, Some(spacing)).unwrap(),
            }],
            failures: vec![BatchFailure {
                path: PathBuf::from("b.dcm"),
                reason: "Pixel spacing is missing".to_string(),
            }],
            table: PathBuf::from("/staging/areas.xlsx"),
        };

        let output = BatchReport::new(&run, Some(Path::new("/out/results_1"))).to_string();
        assert!(output.contains("Measured 1 of 2 images"));
        assert!(output.contains("P001"));
        assert!(output.contains("0.06 mm²"));
        assert!(output.contains("b.dcm: Pixel spacing is missing"));
        assert!(output.ends_with("Data saved to /out/results_1"));
    }
}
