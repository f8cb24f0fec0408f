use super::mask_editor::{Brush, BrushCursor, EditEvent, MaskEditor, PointerEvent, StrokeState};
use super::viewport::{CoordinateMapper, Transform};
use crate::api::MammogramMetadata;
use crate::error::{MammareaError, Result};
use crate::export::{default_filename, MaskExporter, MaskFormat};
use crate::processing::{AreaCalculator, AreaMeasurement, AutoThresholder};
use crate::source::{DecodedMammogram, ImageReader, ImageSource};
use crate::types::{BrushConfig, BrushMode, Dims, MaskRaster, PixelSpacing, RasterImage, Size};
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Callback invoked with the new area after every finished stroke
pub type AreaListener = Box<dyn FnMut(&AreaMeasurement)>;

/// Options applied when a session is opened
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionOptions {
    pub brush: BrushConfig,
    pub thresholder: AutoThresholder,
}

/// One open image being annotated
///
/// Validation happens up front: a session only exists for single-frame
/// MG images with a known pixel spacing. The mask starts as the automatic
/// threshold and is then refined through pointer events.
pub struct AnnotationSession {
    metadata: MammogramMetadata,
    spacing: PixelSpacing,
    source: ImageSource,
    display: RasterImage,
    threshold: f64,
    editor: MaskEditor,
    mapper: CoordinateMapper,
    area: AreaMeasurement,
    listeners: Vec<AreaListener>,
}

impl fmt::Debug for AnnotationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationSession")
            .field("patient_id", &self.metadata.patient_id)
            .field("projection", &self.metadata.projection)
            .field("dims", &self.display.dims())
            .field("area", &self.area)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AnnotationSession {
    /// Reads and validates `path`, then builds the initial mask
    pub fn open<R: ImageReader + ?Sized>(
        reader: &R,
        path: &Path,
        viewport: Size,
        options: SessionOptions,
    ) -> Result<Self> {
        info!("Opening {}", path.display());
        Self::from_decoded(reader.read_image(path)?, viewport, options)
    }

    /// Builds a session from an already decoded image
    ///
    /// # Errors
    ///
    /// - `NotMammography` unless the modality is MG
    /// - `UnsupportedImage` for multi-frame images
    /// - `MissingSpacing` when no pixel spacing is recorded
    pub fn from_decoded(
        decoded: DecodedMammogram,
        viewport: Size,
        options: SessionOptions,
    ) -> Result<Self> {
        let DecodedMammogram { metadata, pixels } = decoded;

        metadata.ensure_mammography()?;
        if metadata.number_of_frames > 1 {
            return Err(MammareaError::UnsupportedImage(format!(
                "{} frames; only 2-D projections are supported",
                metadata.number_of_frames
            )));
        }
        let spacing = metadata.require_spacing()?;
        if metadata.projection.is_none() {
            warn!("No projection recorded for {}", metadata.patient_label());
        }

        let dims = pixels.dims();
        let source = ImageSource::new(pixels, Some(spacing));
        let display = match source.load_native() {
            Ok(raster) => raster,
            Err(MammareaError::DegenerateImage(n)) => {
                warn!("All {} samples share one intensity; showing a black image", n);
                RasterImage::blank(dims)
            }
            Err(e) => return Err(e),
        };

        let thresholded = options.thresholder.threshold(source.raw());
        let area = AreaCalculator::area(&thresholded.mask, Some(spacing))?;
        debug!(
            "Initial threshold {:.2}, area {} mm²",
            thresholded.value, area
        );

        Ok(Self {
            metadata,
            spacing,
            source,
            display,
            threshold: thresholded.value,
            editor: MaskEditor::new(thresholded.mask, Brush::new(options.brush)),
            mapper: CoordinateMapper::new(dims.as_size(), viewport),
            area,
            listeners: Vec::new(),
        })
    }

    pub fn metadata(&self) -> &MammogramMetadata {
        &self.metadata
    }

    pub fn spacing(&self) -> PixelSpacing {
        self.spacing
    }

    /// Full-resolution 8-bit image
    pub fn display(&self) -> &RasterImage {
        &self.display
    }

    /// Image resampled to `target`, e.g. the displayed size
    pub fn render(&self, target: Dims) -> Result<RasterImage> {
        match self.source.load(target) {
            Err(MammareaError::DegenerateImage(_)) => Ok(RasterImage::blank(target)),
            other => other,
        }
    }

    pub fn mask(&self) -> &MaskRaster {
        self.editor.mask()
    }

    /// Automatic threshold the initial mask was built with
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Area as of the last finished stroke
    pub fn area(&self) -> AreaMeasurement {
        self.area
    }

    pub fn stroke_state(&self) -> StrokeState {
        self.editor.state()
    }

    pub fn brush_cursor(&self) -> Option<BrushCursor> {
        self.editor.cursor()
    }

    pub fn brush(&self) -> &Brush {
        self.editor.brush()
    }

    /// Current placement of the image in the viewport
    pub fn transform(&self) -> Option<Transform> {
        self.mapper.transform()
    }

    pub fn viewport(&self) -> Size {
        self.mapper.viewport()
    }

    /// Registers a callback for area changes
    pub fn on_area_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&AreaMeasurement) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn resize(&mut self, viewport: Size) {
        debug!("Viewport resized to {}", viewport);
        self.mapper.resize(viewport);
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.editor.brush_mut().set_mode(mode);
    }

    pub fn set_brush_radius(&mut self, radius: f64) -> f64 {
        self.editor.brush_mut().set_radius(radius)
    }

    /// Adjusts the brush radius from a wheel rotation
    pub fn wheel(&mut self, angle_delta: i32) -> f64 {
        self.editor.brush_mut().wheel(angle_delta)
    }

    /// Returns the new area when the event finished a stroke
    pub fn pointer_down(&mut self, event: PointerEvent) -> Option<AreaMeasurement> {
        let outcome = self.editor.pointer_down(&self.mapper, event);
        self.settle(outcome)
    }

    /// Returns the new area when the pointer left the image mid-stroke
    pub fn pointer_move(&mut self, event: PointerEvent) -> Option<AreaMeasurement> {
        let outcome = self.editor.pointer_move(&self.mapper, event);
        self.settle(outcome)
    }

    pub fn pointer_up(&mut self) -> Option<AreaMeasurement> {
        let outcome = self.editor.pointer_up();
        self.settle(outcome)
    }

    pub fn pointer_left(&mut self) {
        self.editor.pointer_left();
    }

    /// Replaces the mask with the automatic threshold again
    pub fn reset_mask(&mut self, thresholder: AutoThresholder) -> Result<AreaMeasurement> {
        let thresholded = thresholder.threshold(self.source.raw());
        self.threshold = thresholded.value;
        self.editor.replace_mask(thresholded.mask);
        self.recompute()
    }

    fn settle(&mut self, outcome: EditEvent) -> Option<AreaMeasurement> {
        if outcome != EditEvent::StrokeEnded {
            return None;
        }
        match self.recompute() {
            Ok(area) => Some(area),
            Err(e) => {
                warn!("Area not updated: {}", e);
                None
            }
        }
    }

    fn recompute(&mut self) -> Result<AreaMeasurement> {
        self.area = AreaCalculator::area(self.editor.mask(), Some(self.spacing))?;
        debug!("Area now {} mm²", self.area);
        for listener in self.listeners.iter_mut() {
            listener(&self.area);
        }
        Ok(self.area)
    }

    /// Identifier block shown above the image
    pub fn header_text(&self) -> String {
        format!(
            "ID PACS: {}\nAccession Number: {}\nProjection: {}",
            self.metadata.patient_id.as_deref().unwrap_or(""),
            self.metadata.accession_number.as_deref().unwrap_or(""),
            self.metadata.projection.as_deref().unwrap_or("")
        )
    }

    /// `Segmented area: <area> ㎟`
    pub fn area_label(&self) -> String {
        self.area.label()
    }

    /// Saves the mask to `path`; the extension picks the format
    pub fn export_mask(&self, path: &Path) -> Result<PathBuf> {
        MaskExporter::new().save(self.editor.mask(), self.spacing, path)
    }

    /// Saves the mask into `dir` under its default name
    pub fn export_mask_to_dir(&self, dir: &Path, format: MaskFormat) -> Result<PathBuf> {
        let name = default_filename(&self.area, format.extension());
        self.export_mask(&dir.join(name))
    }
}

/// Which pointer event is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
}

/// Delivers a pointer event to the active session, if there is one
///
/// Returns the new area when the event finished a stroke.
pub fn route_pointer(
    session: Option<&mut AnnotationSession>,
    action: PointerAction,
    event: PointerEvent,
) -> Option<AreaMeasurement> {
    let session = session?;
    match action {
        PointerAction::Down => session.pointer_down(event),
        PointerAction::Move => session.pointer_move(event),
        PointerAction::Up => session.pointer_up(),
    }
}
