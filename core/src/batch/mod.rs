//! Batch measurement over a directory tree
//!
//! A batch has three phases. [`BatchProcessor::scan`] discovers files and
//! classifies them from their headers alone. [`BatchProcessor::run`] then
//! measures every eligible image into a staging directory, and
//! [`relocate`] moves the finished staging directory to its destination.

mod discover;
mod relocate;

pub use discover::discover;
pub use relocate::{next_results_dir, relocate};

use crate::api::MammogramMetadata;
use crate::error::{MammareaError, Result};
use crate::export::{MaskExporter, TableSink, XlsxTableWriter};
use crate::processing::{AreaCalculator, AreaMeasurement, AutoThresholder};
use crate::source::{DicomReader, ImageReader};
use crate::types::{BatchConfig, MaskRaster, PixelSpacing};
use image::ImageFormat;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One measured image
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BatchResultRow {
    pub source: PathBuf,
    pub patient_id: String,
    pub accession_number: String,
    pub projection: Option<String>,
    pub area: AreaMeasurement,
}

/// A file that was skipped or failed, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BatchFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of the header-only scan
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ScanSummary {
    /// Eligible files in discovery order
    pub eligible: Vec<PathBuf>,
    /// Number of distinct patient ids among eligible files
    pub patients: usize,
    /// Number of distinct accession numbers among eligible files
    pub accessions: usize,
    /// Discovered files that were not eligible
    pub skipped: Vec<BatchFailure>,
}

impl ScanSummary {
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }
}

/// Outcome of a run over the eligible files
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BatchRun {
    /// Number of files the run was asked to process
    pub total: usize,
    /// Successful measurements, in processing order
    pub rows: Vec<BatchResultRow>,
    /// Per-file failures; none of them stopped the run
    pub failures: Vec<BatchFailure>,
    /// Location of the results table inside staging
    pub table: PathBuf,
}

/// Scans a directory tree and measures every mammogram found
///
/// # Example
///
/// ```no_run
/// use mammarea_core::{relocate, BatchConfig, BatchProcessor, DicomReader, ScratchDir};
/// use std::path::Path;
///
/// let processor = BatchProcessor::new(DicomReader, BatchConfig::default().persist_masks(true));
/// let scan = processor.scan(Path::new("/data/screening")).unwrap();
///
/// let scratch = ScratchDir::new().unwrap();
/// let staging = scratch.unique_dir("staging").unwrap();
/// let run = processor
///     .run(&scan.eligible, &staging, |done, total| println!("{done}/{total}"))
///     .unwrap();
///
/// let results = relocate(&staging, Path::new("/data/out")).unwrap();
/// println!("{} rows in {}", run.rows.len(), results.display());
/// ```
pub struct BatchProcessor<R = DicomReader, T = XlsxTableWriter> {
    reader: R,
    table: T,
    exporter: MaskExporter,
    config: BatchConfig,
}

impl<R: ImageReader> BatchProcessor<R, XlsxTableWriter> {
    pub fn new(reader: R, config: BatchConfig) -> Self {
        Self {
            reader,
            table: XlsxTableWriter,
            exporter: MaskExporter::new(),
            config,
        }
    }
}

impl<R: ImageReader, T: TableSink> BatchProcessor<R, T> {
    /// Builder: Replace the results table writer
    pub fn with_table<U: TableSink>(self, table: U) -> BatchProcessor<R, U> {
        BatchProcessor {
            reader: self.reader,
            table,
            exporter: self.exporter,
            config: self.config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Reads only the header of `path` and checks its modality
    pub fn classify(&self, path: &Path) -> Result<MammogramMetadata> {
        let metadata = self.reader.read_header(path)?;
        self.ensure_eligible(&metadata)?;
        Ok(metadata)
    }

    fn ensure_eligible(&self, metadata: &MammogramMetadata) -> Result<()> {
        match metadata.modality.as_deref() {
            Some(m) if self.config.accepts_modality(m) => Ok(()),
            other => Err(MammareaError::NotMammography(
                other.unwrap_or("missing").to_string(),
            )),
        }
    }

    /// Discovers and classifies files under `root`
    pub fn scan(&self, root: &Path) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        let mut patients = BTreeSet::new();
        let mut accessions = BTreeSet::new();

        for path in discover(root, &self.config)? {
            match self.classify(&path) {
                Ok(metadata) => {
                    patients.insert(metadata.patient_id);
                    accessions.insert(metadata.accession_number);
                    summary.eligible.push(path);
                }
                Err(e) => {
                    debug!("Not eligible {}: {}", path.display(), e);
                    summary.skipped.push(BatchFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        summary.patients = patients.len();
        summary.accessions = accessions.len();
        info!(
            "Scan found {} eligible images ({} patients, {} accessions)",
            summary.eligible.len(),
            summary.patients,
            summary.accessions
        );
        Ok(summary)
    }

    /// Measures `eligible` in order, writing outputs into `staging`
    ///
    /// A failing file is recorded and the run moves on. `progress` is
    /// called with `(completed, total)` after every file. The table is
    /// written once at the end; failing to write it fails the run but
    /// leaves everything already written in `staging` in place.
    pub fn run<F>(&self, eligible: &[PathBuf], staging: &Path, mut progress: F) -> Result<BatchRun>
    where
        F: FnMut(usize, usize),
    {
        fs::create_dir_all(staging)?;
        let total = eligible.len();
        let mut run = BatchRun {
            total,
            table: staging.join(&self.config.table_name),
            ..BatchRun::default()
        };

        for (i, path) in eligible.iter().enumerate() {
            match self.measure(path, staging) {
                Ok(row) => {
                    debug!("{}: {} mm²", path.display(), row.area);
                    run.rows.push(row);
                }
                Err(e) => {
                    warn!("Failed {}: {}", path.display(), e);
                    run.failures.push(BatchFailure {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            progress(i + 1, total);
        }

        if let Err(e) = self.table.write_rows(&run.rows, &run.table) {
            error!(
                "Could not write {} ({} measured, {} failed): {}",
                run.table.display(),
                run.rows.len(),
                run.failures.len(),
                e
            );
            return Err(e);
        }
        info!(
            "Batch finished: {} measured, {} failed",
            run.rows.len(),
            run.failures.len()
        );
        Ok(run)
    }

    fn measure(&self, path: &Path, staging: &Path) -> Result<BatchResultRow> {
        let decoded = self.reader.read_image(path)?;
        let metadata = decoded.metadata;
        self.ensure_eligible(&metadata)?;
        let spacing = metadata.require_spacing()?;

        let thresholded =
            AutoThresholder::new(self.config.histogram_bins).threshold(&decoded.pixels);
        let area = AreaCalculator::area(&thresholded.mask, Some(spacing))?;

        if self.config.persist_masks {
            self.persist(staging, &metadata, &thresholded.mask, spacing, &area)?;
        }

        Ok(BatchResultRow {
            source: path.to_path_buf(),
            patient_id: metadata.patient_label().to_string(),
            accession_number: metadata.accession_label().to_string(),
            projection: metadata.projection,
            area,
        })
    }

    /// Writes `<patient>/<accession>/<projection>_<area>mm2.{png,nii.gz}`
    fn persist(
        &self,
        staging: &Path,
        metadata: &MammogramMetadata,
        mask: &MaskRaster,
        spacing: PixelSpacing,
        area: &AreaMeasurement,
    ) -> Result<()> {
        let dir = staging
            .join(path_component(metadata.patient_label()))
            .join(path_component(metadata.accession_label()));
        fs::create_dir_all(&dir)?;

        let stem = format!(
            "{}_{}mm2",
            path_component(metadata.projection_label()),
            area.truncated_mm2
        );
        let png = dir.join(format!("{}.png", stem));
        MaskExporter::write_image(mask, &png, ImageFormat::Png)?;
        if let Err(e) = self
            .exporter
            .to_volumetric(mask, spacing, &dir.join(format!("{}.nii.gz", stem)))
        {
            // A failed item leaves no half-written pair behind
            if let Err(cleanup) = fs::remove_file(&png) {
                warn!("Could not remove {}: {}", png.display(), cleanup);
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Makes an identifier safe to use as a single path component
fn path_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "unknown".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{write_test_dicom, DecodedMammogram};
    use crate::types::{Dims, Laterality, MammogramView, RawImage, ViewPosition};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Serves synthetic two-level images; paths containing "corrupt" fail
    struct FakeReader;

    fn fake_metadata(path: &Path) -> MammogramMetadata {
        let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
        MammogramMetadata {
            patient_id: Some(format!("P-{}", stem)),
            accession_number: Some("ACC".to_string()),
            modality: Some("MG".to_string()),
            projection: Some("LCC".to_string()),
            view: MammogramView::new(Laterality::Left, ViewPosition::Cc),
            pixel_spacing: Some(PixelSpacing::try_new(0.5, 0.5).unwrap()),
            spacing_error: None,
            rows: Some(4),
            columns: Some(4),
            number_of_frames: 1,
        }
    }

    impl ImageReader for FakeReader {
        fn read_header(&self, path: &Path) -> Result<MammogramMetadata> {
            Ok(fake_metadata(path))
        }

        fn read_image(&self, path: &Path) -> Result<DecodedMammogram> {
            if path.to_string_lossy().contains("corrupt") {
                return Err(MammareaError::DicomError("truncated pixel data".to_string()));
            }
            // 6 bright cells out of 16
            let samples = (0..16).map(|i| if i < 6 { 900.0 } else { 20.0 }).collect();
            Ok(DecodedMammogram {
                metadata: fake_metadata(path),
                pixels: RawImage::new(Dims::new(4, 4), samples)?,
            })
        }
    }

    /// Records every written table instead of touching the disk
    #[derive(Default)]
    struct MemoryTable {
        writes: RefCell<Vec<Vec<BatchResultRow>>>,
    }

    impl TableSink for &MemoryTable {
        fn write_rows(&self, rows: &[BatchResultRow], _path: &Path) -> Result<()> {
            self.writes.borrow_mut().push(rows.to_vec());
            Ok(())
        }
    }

    struct FailingTable;

    impl TableSink for FailingTable {
        fn write_rows(&self, _rows: &[BatchResultRow], _path: &Path) -> Result<()> {
            Err(MammareaError::ExportError("disk full".to_string()))
        }
    }

    fn inputs(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("/in/{}.dcm", n))).collect()
    }

    #[test]
    fn test_corrupted_file_is_recorded_not_fatal() {
        let table = MemoryTable::default();
        let processor = BatchProcessor::new(FakeReader, BatchConfig::default()).with_table(&table);
        let staging = TempDir::new().unwrap();
        let files = inputs(&["f1", "f2", "f3-corrupt", "f4", "f5"]);

        let mut ticks = Vec::new();
        let run = processor
            .run(&files, staging.path(), |done, total| ticks.push((done, total)))
            .unwrap();

        assert_eq!(run.rows.len(), 4);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].path, files[2]);
        assert!(run.failures[0].reason.contains("truncated"));
        assert_eq!(ticks, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);

        let sources: Vec<_> = run.rows.iter().map(|r| r.source.clone()).collect();
        let expected: Vec<_> = [0, 1, 3, 4].iter().map(|&i| files[i].clone()).collect();
        assert_eq!(sources, expected);

        // 6 cells at 0.25 mm²
        assert!(run.rows.iter().all(|r| r.area.rounded_mm2 == 1.5));

        let writes = table.writes.borrow();
        assert_eq!(writes.len(), 1, "table is written exactly once");
        assert_eq!(writes[0], run.rows);
    }

    #[test]
    fn test_persisted_mask_layout() {
        let processor =
            BatchProcessor::new(FakeReader, BatchConfig::default().persist_masks(true));
        let staging = TempDir::new().unwrap();
        let run = processor
            .run(&inputs(&["img"]), staging.path(), |_, _| {})
            .unwrap();
        assert!(run.failures.is_empty());

        let dir = staging.path().join("P-img").join("ACC");
        let png = dir.join("LCC_1mm2.png");
        assert!(png.is_file());
        assert!(dir.join("LCC_1mm2.nii.gz").is_file());
        assert!(staging.path().join("areas.xlsx").is_file());

        let mask = MaskExporter::decode(&fs::read(png).unwrap()).unwrap();
        assert_eq!(mask.foreground_count(), 6);
    }

    #[test]
    fn test_table_failure_keeps_staged_masks() {
        let processor = BatchProcessor::new(FakeReader, BatchConfig::default().persist_masks(true))
            .with_table(FailingTable);
        let staging = TempDir::new().unwrap();

        let result = processor.run(&inputs(&["img"]), staging.path(), |_, _| {});

        assert!(matches!(result, Err(MammareaError::ExportError(_))));
        let dir = staging.path().join("P-img").join("ACC");
        assert!(dir.join("LCC_1mm2.png").is_file());
        assert!(dir.join("LCC_1mm2.nii.gz").is_file());
    }

    #[test]
    fn test_volume_failure_removes_png() {
        let processor =
            BatchProcessor::new(FakeReader, BatchConfig::default().persist_masks(true));
        let staging = TempDir::new().unwrap();
        let dir = staging.path().join("P-img").join("ACC");
        // A directory in the way of the volume makes its write fail
        fs::create_dir_all(dir.join("LCC_1mm2.nii.gz")).unwrap();

        let run = processor
            .run(&inputs(&["img"]), staging.path(), |_, _| {})
            .unwrap();

        assert!(run.rows.is_empty());
        assert_eq!(run.failures.len(), 1);
        assert!(!dir.join("LCC_1mm2.png").exists());
    }

    #[test]
    fn test_unusable_spacing_is_eligible_then_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("in");
        fs::create_dir_all(&root).unwrap();
        let pixels = vec![10, 10, 10, 200, 200, 200];
        write_test_dicom(&root.join("a.dcm"), "MG", Some("0.1\\0.2"), 2, 3, pixels.clone());
        write_test_dicom(&root.join("b.dcm"), "MG", Some("0\\0.1"), 2, 3, pixels);

        let processor = BatchProcessor::new(DicomReader, BatchConfig::default());
        let scan = processor.scan(&root).unwrap();
        assert_eq!(scan.eligible.len(), 2);
        assert!(scan.skipped.is_empty());

        let run = processor
            .run(&scan.eligible, &dir.path().join("staging"), |_, _| {})
            .unwrap();
        assert_eq!(run.rows.len(), 1);
        assert_eq!(run.failures.len(), 1);
        assert!(run.failures[0].path.ends_with("b.dcm"));
        assert!(run.failures[0].reason.contains("Invalid tag value"));
    }

    #[test]
    fn test_scan_counts_and_skips() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let pixels = vec![0, 10, 20, 300, 400, 500];
        write_test_dicom(&root.join("a.dcm"), "MG", Some("0.1\\0.1"), 2, 3, pixels.clone());
        write_test_dicom(&root.join("b.dcm"), "CT", Some("0.1\\0.1"), 2, 3, pixels.clone());
        fs::create_dir_all(root.join("sub")).unwrap();
        write_test_dicom(&root.join("sub/c.dcm"), "MG", Some("0.1\\0.1"), 2, 3, pixels);
        fs::write(root.join("sub/junk.dcm"), b"garbage").unwrap();

        let processor = BatchProcessor::new(DicomReader, BatchConfig::default());
        let scan = processor.scan(root).unwrap();

        assert_eq!(scan.eligible, vec![root.join("a.dcm"), root.join("sub/c.dcm")]);
        assert_eq!(scan.patients, 1);
        assert_eq!(scan.accessions, 1);
        assert_eq!(scan.skipped.len(), 2);
        assert!(!scan.is_empty());
    }

    #[test]
    fn test_end_to_end_with_dicom_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("in");
        fs::create_dir_all(&root).unwrap();
        write_test_dicom(
            &root.join("a.dcm"),
            "MG",
            Some("0.1\\0.2"),
            2,
            3,
            vec![10, 10, 10, 200, 200, 200],
        );
        write_test_dicom(&root.join("b.dcm"), "MG", None, 2, 3, vec![1, 2, 3, 4, 5, 6]);

        let processor = BatchProcessor::new(DicomReader, BatchConfig::default());
        let scan = processor.scan(&root).unwrap();
        let staging = dir.path().join("staging");
        let run = processor.run(&scan.eligible, &staging, |_, _| {}).unwrap();

        assert_eq!(run.rows.len(), 1);
        assert!((run.rows[0].area.raw_mm2 - 0.06).abs() < 1e-9);
        assert_eq!(run.failures.len(), 1);
        assert!(run.failures[0].path.ends_with("b.dcm"));

        let results = relocate(&staging, &dir.path().join("out")).unwrap();
        assert!(results.ends_with("results_1"));
        assert!(results.join("areas.xlsx").is_file());
        assert!(!staging.exists());
    }

    #[test]
    fn test_path_component() {
        assert_eq!(path_component("12/34"), "12_34");
        assert_eq!(path_component(" .. "), "unknown");
        assert_eq!(path_component("RMLO"), "RMLO");
    }
}
