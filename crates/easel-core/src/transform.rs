//! Pure conversions between document-space transforms and scene-space
//! node geometry.
//!
//! Both sync directions go through these functions, so the rounding and
//! scale-normalization rules live in exactly one place. Image elements
//! resize through scale factors (target size ÷ intrinsic asset size);
//! every other kind rewrites its box size and settles back to scale 1.

use crate::model::{Dimensions, ElementKind, Transform};

/// Scene-space placement for a node: where the box sits, how it is
/// rotated, and which scale factors the render layer applies to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePlacement {
    pub left: f32,
    pub top: f32,
    /// Degrees.
    pub angle: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// The node's unscaled box size.
    pub box_width: f32,
    pub box_height: f32,
}

/// Live geometry read back from a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeometry {
    pub left: f32,
    pub top: f32,
    /// Unscaled box size.
    pub width: f32,
    pub height: f32,
    /// Degrees.
    pub angle: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Convert a document transform into the node placement that renders it.
///
/// For image kinds with a known intrinsic size, the node keeps the asset's
/// native box and the scale factors carry the target size. Before the
/// asset has loaded (`intrinsic` is `None`) the stored scale passes
/// through unchanged.
pub fn to_scene_transform(
    transform: &Transform,
    kind: &ElementKind,
    intrinsic: Option<Dimensions>,
) -> ScenePlacement {
    let (scale_x, scale_y, box_width, box_height) = match kind {
        ElementKind::Image(_) => match intrinsic {
            Some(size) if size.width > 0.0 && size.height > 0.0 => (
                transform.width / size.width,
                transform.height / size.height,
                size.width,
                size.height,
            ),
            _ => (
                transform.scale_x,
                transform.scale_y,
                transform.width,
                transform.height,
            ),
        },
        ElementKind::Text(_)
        | ElementKind::Shape(_)
        | ElementKind::Video(_)
        | ElementKind::Audio(_) => (1.0, 1.0, transform.width, transform.height),
    };

    ScenePlacement {
        left: transform.x,
        top: transform.y,
        angle: transform.rotation,
        scale_x,
        scale_y,
        box_width,
        box_height,
    }
}

/// Convert live node geometry back into a document transform.
///
/// Position, rotation, and the rendered size are rounded to whole
/// document units. Non-image kinds absorb the scale delta into
/// width/height and emit unit scale; image kinds pass scale through.
pub fn from_scene_geometry(geometry: &NodeGeometry, kind: &ElementKind) -> Transform {
    let width = (geometry.width * geometry.scale_x).round();
    let height = (geometry.height * geometry.scale_y).round();
    let (scale_x, scale_y) = match kind {
        ElementKind::Image(_) => (geometry.scale_x, geometry.scale_y),
        ElementKind::Text(_)
        | ElementKind::Shape(_)
        | ElementKind::Video(_)
        | ElementKind::Audio(_) => (1.0, 1.0),
    };

    Transform {
        x: geometry.left.round(),
        y: geometry.top.round(),
        width,
        height,
        rotation: geometry.angle.round(),
        scale_x,
        scale_y,
    }
}

/// Component-wise inequality on the five rounded components. Used by both
/// sync directions to early-exit on unchanged values — the comparison that
/// breaks oscillation. Inputs are expected pre-rounded (as emitted by
/// [`from_scene_geometry`]), so strict equality is safe.
pub fn changed(a: &Transform, b: &Transform) -> bool {
    a.x != b.x || a.y != b.y || a.width != b.width || a.height != b.height || a.rotation != b.rotation
}

/// One dimension of an aspect-locked resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockedEdit {
    Width(f32),
    Height(f32),
}

/// Compute the (width, height) pair for an aspect-locked edit.
///
/// `ratio` is width ÷ height, captured when the lock was engaged. It must
/// be finite and positive — guaranteed upstream by input validation.
pub fn aspect_locked_size(edit: LockedEdit, ratio: f32) -> (f32, f32) {
    debug_assert!(ratio.is_finite() && ratio > 0.0, "invalid aspect ratio {ratio}");
    match edit {
        LockedEdit::Width(width) => (width, width / ratio),
        LockedEdit::Height(height) => (height * ratio, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageFilters, ImageProps, ShapeKind, ShapeProps};
    use crate::model::Color;
    use pretty_assertions::assert_eq;

    fn shape_kind() -> ElementKind {
        ElementKind::Shape(ShapeProps {
            shape_type: ShapeKind::Rectangle,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: 0.0,
            corner_radius: None,
            points: None,
        })
    }

    fn image_kind() -> ElementKind {
        ElementKind::Image(ImageProps {
            src: "photo.jpg".into(),
            original_src: "photo.jpg".into(),
            filters: ImageFilters::default(),
            crop_area: None,
            aspect_locked: true,
        })
    }

    #[test]
    fn shape_placement_is_boxed() {
        let t = Transform::from_frame(100.0, 100.0, 80.0, 80.0);
        let p = to_scene_transform(&t, &shape_kind(), None);
        assert_eq!(p.scale_x, 1.0);
        assert_eq!(p.scale_y, 1.0);
        assert_eq!(p.box_width, 80.0);
        assert_eq!(p.box_height, 80.0);
    }

    #[test]
    fn image_placement_scales_against_intrinsic() {
        let t = Transform::from_frame(0.0, 0.0, 400.0, 300.0);
        let p = to_scene_transform(
            &t,
            &image_kind(),
            Some(Dimensions {
                width: 800.0,
                height: 600.0,
            }),
        );
        assert_eq!(p.scale_x, 0.5);
        assert_eq!(p.scale_y, 0.5);
        assert_eq!(p.box_width, 800.0);
        assert_eq!(p.box_height, 600.0);
    }

    #[test]
    fn image_placement_without_intrinsic_passes_scale_through() {
        let mut t = Transform::from_frame(0.0, 0.0, 400.0, 300.0);
        t.scale_x = 2.0;
        t.scale_y = 2.0;
        let p = to_scene_transform(&t, &image_kind(), None);
        assert_eq!(p.scale_x, 2.0);
        assert_eq!(p.box_width, 400.0);
    }

    #[test]
    fn geometry_readback_normalizes_shape_scale() {
        // A rect dragged out to 2x width: node box 80 wide, scale_x 2.
        let geom = NodeGeometry {
            left: 100.2,
            top: 99.8,
            width: 80.0,
            height: 80.0,
            angle: 0.0,
            scale_x: 2.0,
            scale_y: 1.0,
        };
        let t = from_scene_geometry(&geom, &shape_kind());
        assert_eq!(t.width, 160.0);
        assert_eq!(t.height, 80.0);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.x, 100.0);
        assert_eq!(t.y, 100.0);
    }

    #[test]
    fn geometry_readback_keeps_image_scale() {
        let geom = NodeGeometry {
            left: 0.0,
            top: 0.0,
            width: 800.0,
            height: 600.0,
            angle: 15.4,
            scale_x: 0.25,
            scale_y: 0.25,
        };
        let t = from_scene_geometry(&geom, &image_kind());
        assert_eq!(t.width, 200.0);
        assert_eq!(t.height, 150.0);
        assert_eq!(t.scale_x, 0.25);
        assert_eq!(t.rotation, 15.0);
    }

    #[test]
    fn changed_ignores_equal_transforms() {
        let a = Transform::from_frame(10.0, 20.0, 30.0, 40.0);
        let b = a;
        assert!(!changed(&a, &b));

        let mut c = a;
        c.rotation = 90.0;
        assert!(changed(&a, &c));
    }

    #[test]
    fn aspect_lock_pairs_dimensions() {
        // 200x100 → ratio 2.0
        let ratio = 200.0 / 100.0;
        assert_eq!(aspect_locked_size(LockedEdit::Width(300.0), ratio), (300.0, 150.0));
        assert_eq!(aspect_locked_size(LockedEdit::Height(50.0), ratio), (100.0, 50.0));
    }
}
