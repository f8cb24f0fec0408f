use crate::types::{ImagePoint, Size, ViewportPoint};

/// Placement of an image inside a viewport
///
/// The image is fitted with its aspect ratio preserved and centered with
/// integer offsets. `scale` converts display pixels to image pixels and is
/// at least 1 because images are never shown above their native size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub offset_x: u32,
    pub offset_y: u32,
    pub scale: f64,
    pub displayed: Size,
}

impl Transform {
    /// Returns whether a viewport point lies on the displayed image
    pub fn contains(&self, point: ViewportPoint) -> bool {
        let (x0, y0) = (self.offset_x as f64, self.offset_y as f64);
        point.x >= x0
            && point.y >= y0
            && point.x < x0 + self.displayed.width as f64
            && point.y < y0 + self.displayed.height as f64
    }
}

/// Result of mapping a pointer position into image space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappedPoint {
    Inside(ImagePoint),
    OutOfBounds,
}

impl MappedPoint {
    pub fn inside(self) -> Option<ImagePoint> {
        match self {
            MappedPoint::Inside(point) => Some(point),
            MappedPoint::OutOfBounds => None,
        }
    }
}

/// Largest integer display size that fits `viewport` without upscaling
///
/// Returns `None` when either size is empty.
pub fn compute_transform(viewport: Size, image: Size) -> Option<Transform> {
    if viewport.is_empty() || image.is_empty() {
        return None;
    }

    let (vw, vh) = (viewport.width as u64, viewport.height as u64);
    let (iw, ih) = (image.width as u64, image.height as u64);

    let (dw, dh) = if iw <= vw && ih <= vh {
        (iw, ih)
    } else if iw * vh >= ih * vw {
        // Width is the limiting side
        (vw, (ih * vw / iw).max(1))
    } else {
        ((iw * vh / ih).max(1), vh)
    };

    Some(Transform {
        offset_x: ((vw - dw) / 2) as u32,
        offset_y: ((vh - dh) / 2) as u32,
        scale: iw as f64 / dw as f64,
        displayed: Size::new(dw as u32, dh as u32),
    })
}

/// Maps a viewport point into image space with a given transform
pub fn to_image_space(point: ViewportPoint, transform: &Transform, image: Size) -> MappedPoint {
    if !transform.contains(point) {
        return MappedPoint::OutOfBounds;
    }

    let x = (point.x - transform.offset_x as f64) * transform.scale;
    let y = (point.y - transform.offset_y as f64) * transform.scale;
    if x.floor() >= image.width as f64 || y.floor() >= image.height as f64 {
        return MappedPoint::OutOfBounds;
    }
    MappedPoint::Inside(ImagePoint::new(x, y))
}

/// Converts pointer positions between a resizable viewport and an image
///
/// Holds only the two sizes. The transform is derived again for every
/// query so a resize takes effect on the very next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    image: Size,
    viewport: Size,
}

impl CoordinateMapper {
    pub fn new(image: Size, viewport: Size) -> Self {
        Self { image, viewport }
    }

    pub fn image(&self) -> Size {
        self.image
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Replaces the viewport size
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Returns whether a sample captured against `viewport` is still valid
    pub fn is_current(&self, viewport: Size) -> bool {
        self.viewport == viewport
    }

    pub fn transform(&self) -> Option<Transform> {
        compute_transform(self.viewport, self.image)
    }

    pub fn to_image_space(&self, point: ViewportPoint) -> MappedPoint {
        match self.transform() {
            Some(transform) => to_image_space(point, &transform, self.image),
            None => MappedPoint::OutOfBounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_small_image_is_not_upscaled() {
        let t = compute_transform(Size::new(800, 600), Size::new(200, 100)).unwrap();
        assert_eq!(t.displayed, Size::new(200, 100));
        assert_eq!(t.scale, 1.0);
        assert_eq!((t.offset_x, t.offset_y), (300, 250));
    }

    #[test]
    fn test_tall_image_fits_height() {
        // 3328 x 4096 mammogram into a 1000 x 800 viewport
        let t = compute_transform(Size::new(1000, 800), Size::new(3328, 4096)).unwrap();
        assert_eq!(t.displayed.height, 800);
        assert_eq!(t.displayed.width, 650);
        assert_eq!(t.offset_x, 175);
        assert_eq!(t.offset_y, 0);
        assert!((t.scale - 3328.0 / 650.0).abs() < 1e-12);
    }

    #[test]
    fn test_wide_image_fits_width() {
        let t = compute_transform(Size::new(100, 100), Size::new(400, 200)).unwrap();
        assert_eq!(t.displayed, Size::new(100, 50));
        assert_eq!((t.offset_x, t.offset_y), (0, 25));
        assert_eq!(t.scale, 4.0);
    }

    #[test]
    fn test_empty_viewport_has_no_transform() {
        assert!(compute_transform(Size::new(0, 100), Size::new(10, 10)).is_none());
    }

    #[rstest]
    #[case(0.0, 25.0, Some((0.0, 0.0)))]
    #[case(99.9, 74.9, Some((399.6, 199.6)))]
    #[case(50.0, 50.0, Some((200.0, 100.0)))]
    #[case(50.0, 24.9, None)]
    #[case(50.0, 75.0, None)]
    #[case(100.0, 50.0, None)]
    #[case(-0.1, 50.0, None)]
    fn test_to_image_space_bounds(
        #[case] x: f64,
        #[case] y: f64,
        #[case] expected: Option<(f64, f64)>,
    ) {
        let mapper = CoordinateMapper::new(Size::new(400, 200), Size::new(100, 100));
        let mapped = mapper.to_image_space(ViewportPoint::new(x, y)).inside();
        match (mapped, expected) {
            (Some(p), Some((ex, ey))) => {
                assert!((p.x - ex).abs() < 1e-9 && (p.y - ey).abs() < 1e-9);
                assert!(p.x < 400.0 && p.y < 200.0);
            }
            (None, None) => {}
            other => panic!("unexpected mapping {:?}", other),
        }
    }

    #[test]
    fn test_resize_changes_mapping() {
        let mut mapper = CoordinateMapper::new(Size::new(400, 200), Size::new(100, 100));
        let point = ViewportPoint::new(10.0, 30.0);
        let before = mapper.to_image_space(point).inside().unwrap();

        mapper.resize(Size::new(200, 200));
        assert!(!mapper.is_current(Size::new(100, 100)));
        let after = mapper.to_image_space(point);
        // Displayed rectangle is now 200x100 at y offset 50
        assert_eq!(after, MappedPoint::OutOfBounds);

        let inside = mapper.to_image_space(ViewportPoint::new(10.0, 55.0)).inside().unwrap();
        assert_ne!(before, inside);
        assert!((inside.x - 20.0).abs() < 1e-9 && (inside.y - 10.0).abs() < 1e-9);
    }
}
