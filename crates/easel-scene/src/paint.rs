//! Scene → display-list boundary.
//!
//! Flattens the retained scene into canvas-space paint items the export
//! collaborator consumes. Vector shapes carry their filled/stroked
//! outlines; image and media nodes contribute placement boxes whose pixels
//! the consumer substitutes. Text shaping needs a font context and happens
//! downstream of this boundary.

use crate::canvas::Canvas;
use crate::node::NodeVisual;
use easel_core::model::Color;
use easel_core::ElementId;
use kurbo::{BezPath, Rect, Shape as _};

/// One canvas-space paint operation.
pub struct PaintItem {
    pub element: ElementId,
    pub path: BezPath,
    pub fill: Option<peniko::Color>,
    pub stroke: Option<(peniko::Color, f64)>,
    pub opacity: f32,
}

pub fn to_peniko(color: Color) -> peniko::Color {
    peniko::Color::from_rgba8(
        (color.r * 255.0).round() as u8,
        (color.g * 255.0).round() as u8,
        (color.b * 255.0).round() as u8,
        (color.a * 255.0).round() as u8,
    )
}

/// Flatten the scene bottom→top, workboard first.
pub fn display_list(canvas: &Canvas) -> Vec<PaintItem> {
    let mut items = Vec::with_capacity(canvas.node_count() + 1);

    let board = canvas.workboard_node();
    if let NodeVisual::Workboard { fill } = board.visual {
        items.push(PaintItem {
            element: board.element,
            path: Rect::new(0.0, 0.0, board.width as f64, board.height as f64).to_path(0.1),
            fill: Some(to_peniko(fill)),
            stroke: None,
            opacity: 1.0,
        });
    }

    for node in canvas.nodes_bottom_up() {
        if !node.visible {
            continue;
        }
        let affine = node.affine();
        let box_path = || {
            let mut p =
                Rect::new(0.0, 0.0, node.width as f64, node.height as f64).to_path(0.1);
            p.apply_affine(affine);
            p
        };
        let item = match &node.visual {
            NodeVisual::Workboard { .. } => continue,
            NodeVisual::Shape { props, path } => {
                let mut outline = path.clone();
                outline.apply_affine(affine);
                PaintItem {
                    element: node.element,
                    path: outline,
                    fill: Some(to_peniko(props.fill)),
                    stroke: (props.stroke_width > 0.0)
                        .then(|| (to_peniko(props.stroke), props.stroke_width as f64)),
                    opacity: node.opacity,
                }
            }
            NodeVisual::Text(props) => {
                log::trace!("text node {} {:?} awaits shaping", node.element, props.content);
                PaintItem {
                    element: node.element,
                    path: box_path(),
                    fill: None,
                    stroke: None,
                    opacity: node.opacity,
                }
            }
            NodeVisual::Image { .. } | NodeVisual::Media { .. } => PaintItem {
                element: node.element,
                path: box_path(),
                fill: None,
                stroke: None,
                opacity: node.opacity,
            },
        };
        items.push(item);
    }

    items
}
