use super::viewport::{CoordinateMapper, MappedPoint};
use crate::types::{BrushConfig, BrushMode, ImagePoint, MaskRaster, Size, ViewportPoint};
use log::debug;

/// Whether a stroke is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing,
}

/// A pointer sample together with the viewport size it was captured in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: ViewportPoint,
    pub viewport: Size,
}

impl PointerEvent {
    pub fn new(position: ViewportPoint, viewport: Size) -> Self {
        Self { position, viewport }
    }
}

/// Brush outline to draw over the image, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushCursor {
    pub center: ViewportPoint,
    /// Radius in display pixels
    pub radius: f64,
    pub mode: BrushMode,
}

/// What a pointer event did to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    /// Stale sample or a release without a stroke; nothing changed
    Ignored,
    /// Pointer moved without touching the mask
    Moved,
    /// A stamp was applied, changing this many cells
    Stamped(usize),
    /// The stroke is over and the mask is final until the next one
    StrokeEnded,
}

/// Brush mode and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    mode: BrushMode,
    radius: f64,
    config: BrushConfig,
}

impl Brush {
    pub fn new(config: BrushConfig) -> Self {
        Self {
            mode: BrushMode::default(),
            radius: config.clamp_radius(config.default_radius),
            config,
        }
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }

    /// Radius in display pixels
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sets the radius, clamped to the configured range
    pub fn set_radius(&mut self, radius: f64) -> f64 {
        self.radius = self.config.clamp_radius(radius);
        self.radius
    }

    /// Applies a mouse wheel rotation; one step per `wheel_step` units
    pub fn wheel(&mut self, angle_delta: i32) -> f64 {
        let steps = angle_delta / self.config.wheel_step.max(1);
        self.set_radius(self.radius + steps as f64)
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(BrushConfig::default())
    }
}

/// Stroke state machine over a single mask
///
/// Each event is checked against the mapper's current viewport first.
/// Samples captured before a resize are dropped without touching the
/// stroke state, and the next valid sample is mapped with the new
/// transform.
#[derive(Debug, Clone)]
pub struct MaskEditor {
    mask: MaskRaster,
    state: StrokeState,
    brush: Brush,
    cursor: Option<BrushCursor>,
}

impl MaskEditor {
    pub fn new(mask: MaskRaster, brush: Brush) -> Self {
        Self {
            mask,
            state: StrokeState::Idle,
            brush,
            cursor: None,
        }
    }

    pub fn mask(&self) -> &MaskRaster {
        &self.mask
    }

    /// Replaces the mask and ends any stroke in progress
    pub fn replace_mask(&mut self, mask: MaskRaster) {
        self.mask = mask;
        self.state = StrokeState::Idle;
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut Brush {
        &mut self.brush
    }

    /// Visible brush outline, if the pointer hovers over the image
    pub fn cursor(&self) -> Option<BrushCursor> {
        self.cursor.map(|c| BrushCursor {
            radius: self.brush.radius,
            mode: self.brush.mode,
            ..c
        })
    }

    pub fn pointer_down(&mut self, mapper: &CoordinateMapper, event: PointerEvent) -> EditEvent {
        if !mapper.is_current(event.viewport) {
            debug!("Dropping stale press captured at {}", event.viewport);
            return EditEvent::Ignored;
        }
        self.state = StrokeState::Drawing;
        match self.track(mapper, event.position) {
            MappedPoint::Inside(center) => EditEvent::Stamped(self.stamp_at(mapper, center)),
            MappedPoint::OutOfBounds => EditEvent::Stamped(0),
        }
    }

    pub fn pointer_move(&mut self, mapper: &CoordinateMapper, event: PointerEvent) -> EditEvent {
        if !mapper.is_current(event.viewport) {
            debug!("Dropping stale move captured at {}", event.viewport);
            return EditEvent::Ignored;
        }
        let mapped = self.track(mapper, event.position);
        match (self.state, mapped) {
            (StrokeState::Idle, _) => EditEvent::Moved,
            (StrokeState::Drawing, MappedPoint::Inside(center)) => {
                EditEvent::Stamped(self.stamp_at(mapper, center))
            }
            (StrokeState::Drawing, MappedPoint::OutOfBounds) => {
                self.state = StrokeState::Idle;
                EditEvent::StrokeEnded
            }
        }
    }

    /// Ends the stroke; the release position itself is never stamped
    pub fn pointer_up(&mut self) -> EditEvent {
        match self.state {
            StrokeState::Drawing => {
                self.state = StrokeState::Idle;
                EditEvent::StrokeEnded
            }
            StrokeState::Idle => EditEvent::Ignored,
        }
    }

    /// Hides the cursor, as when the pointer leaves the surface
    pub fn pointer_left(&mut self) {
        self.cursor = None;
    }

    fn track(&mut self, mapper: &CoordinateMapper, position: ViewportPoint) -> MappedPoint {
        let mapped = mapper.to_image_space(position);
        self.cursor = match mapped {
            MappedPoint::Inside(_) => Some(BrushCursor {
                center: position,
                radius: self.brush.radius,
                mode: self.brush.mode,
            }),
            MappedPoint::OutOfBounds => None,
        };
        mapped
    }

    fn stamp_at(&mut self, mapper: &CoordinateMapper, center: ImagePoint) -> usize {
        let Some(transform) = mapper.transform() else {
            return 0;
        };
        let radius = self.brush.radius * transform.scale;
        self.mask.stamp(center, radius, self.brush.mode.value())
    }
}
