pub mod api;
pub mod batch;
pub mod cli;
pub mod editor;
pub mod error;
pub mod export;
pub mod extraction;
pub mod processing;
pub mod scratch;
pub mod source;
pub mod types;

pub use api::{MammogramExtractor, MammogramMetadata};
pub use batch::{
    discover, relocate, BatchFailure, BatchProcessor, BatchResultRow, BatchRun, ScanSummary,
};
pub use cli::report::{BatchReport, ScanReport, SessionReport};
pub use editor::{
    route_pointer, AnnotationSession, Brush, BrushCursor, CoordinateMapper, MappedPoint,
    MaskEditor, PointerAction, PointerEvent, SessionOptions, StrokeState, Transform,
};
pub use error::{MammareaError, Result};
pub use export::{
    default_filename, MaskExporter, MaskFormat, NiftiWriter, TableSink, VolumetricSink,
    XlsxTableWriter,
};
pub use processing::{AreaCalculator, AreaMeasurement, AutoThresholder, ThresholdResult};
pub use scratch::ScratchDir;
pub use source::{DecodedMammogram, DicomReader, ImageReader, ImageSource};
pub use types::*;
