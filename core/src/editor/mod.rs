//! Interactive mask editing
//!
//! [`CoordinateMapper`] turns pointer positions into image coordinates,
//! [`MaskEditor`] runs the stroke state machine over the mask, and
//! [`AnnotationSession`] ties one opened image to both.

mod mask_editor;
mod session;
mod viewport;

pub use mask_editor::{Brush, BrushCursor, EditEvent, MaskEditor, PointerEvent, StrokeState};
pub use session::{route_pointer, AnnotationSession, AreaListener, PointerAction, SessionOptions};
pub use viewport::{compute_transform, to_image_space, CoordinateMapper, MappedPoint, Transform};
