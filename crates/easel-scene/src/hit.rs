//! Hit testing: point → node and marquee rect → nodes.
//!
//! Walks nodes front-to-back (last painted = topmost). Point tests map the
//! canvas point through the node's inverse affine, so rotation and scale
//! are honored; marquee tests use the transformed bounding box.

use crate::canvas::Canvas;
use crate::node::SceneNode;
use easel_core::ElementId;
use kurbo::{Point, Rect};

/// Find the topmost interactive node at (x, y). Locked and hidden nodes
/// are transparent to the pointer; `None` means the background.
pub fn hit_test(canvas: &Canvas, x: f32, y: f32) -> Option<ElementId> {
    let point = Point::new(x as f64, y as f64);
    canvas
        .nodes_top_down()
        .find(|node| node.visible && node.selectable && contains(node, point))
        .map(|node| node.element)
}

/// All interactive nodes whose bounds intersect the marquee rectangle,
/// bottom→top. Used for rubber-band selection.
pub fn hit_test_rect(canvas: &Canvas, x: f32, y: f32, w: f32, h: f32) -> Vec<ElementId> {
    let marquee = Rect::new(x as f64, y as f64, (x + w) as f64, (y + h) as f64);
    canvas
        .nodes_bottom_up()
        .filter(|node| node.visible && node.selectable && overlaps(node, marquee))
        .map(|node| node.element)
        .collect()
}

fn contains(node: &SceneNode, point: Point) -> bool {
    if node.scale_x == 0.0 || node.scale_y == 0.0 {
        return false;
    }
    let local = node.affine().inverse() * point;
    local.x >= 0.0
        && local.x <= node.width as f64
        && local.y >= 0.0
        && local.y <= node.height as f64
}

fn overlaps(node: &SceneNode, marquee: Rect) -> bool {
    let local = Rect::new(0.0, 0.0, node.width as f64, node.height as f64);
    let bbox = node.affine().transform_rect_bbox(local);
    bbox.x0 < marquee.x1 && bbox.x1 > marquee.x0 && bbox.y0 < marquee.y1 && bbox.y1 > marquee.y0
}
