//! Retained scene nodes.
//!
//! A node is a transient, rebuildable render object owned by the canvas.
//! It carries a back-reference to its document element (`element`), the
//! live geometry the render layer draws from, and a kind-specific visual.
//! Nodes are mutated in place on property changes — never destroyed and
//! recreated — so selection and in-flight gestures survive re-renders.

use easel_core::model::{
    Color, CropArea, Dimensions, ElementKind, ImageFilters, ShapeKind, ShapeProps, TextProps,
};
use easel_core::transform::{NodeGeometry, ScenePlacement};
use easel_core::ElementId;
use kurbo::{BezPath, Circle, Point, Rect, Shape as _};

/// Kind-specific render data attached to a node.
#[derive(Debug, Clone)]
pub enum NodeVisual {
    /// The always-bottom background layer. Never selectable, never owned
    /// by a document element.
    Workboard { fill: Color },
    Text(TextProps),
    Shape {
        props: ShapeProps,
        /// Outline in node-local coordinates, derived from `props` and the
        /// node box; rebuilt whenever either changes.
        path: BezPath,
    },
    Image {
        src: String,
        /// Native pixel size, known once the asset has loaded.
        intrinsic: Dimensions,
        filters: ImageFilters,
        crop: Option<CropArea>,
    },
    /// Video and audio placeholders; actual playback lives outside the
    /// scene core.
    Media { src: String, audio_only: bool },
}

/// One retained node in the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Back-reference to the owning document element.
    pub element: ElementId,
    pub left: f32,
    pub top: f32,
    /// Degrees.
    pub angle: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Unscaled box size. For images this is the intrinsic asset size.
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
    pub visible: bool,
    /// False for locked elements — blocks interactive manipulation only.
    pub selectable: bool,
    pub visual: NodeVisual,
}

impl SceneNode {
    pub fn new(element: ElementId, placement: ScenePlacement, visual: NodeVisual) -> Self {
        Self {
            element,
            left: placement.left,
            top: placement.top,
            angle: placement.angle,
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
            width: placement.box_width,
            height: placement.box_height,
            opacity: 1.0,
            visible: true,
            selectable: true,
            visual,
        }
    }

    /// Snapshot the live geometry for transform math.
    pub fn geometry(&self) -> NodeGeometry {
        NodeGeometry {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
            angle: self.angle,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }

    pub fn set_geometry(&mut self, geometry: NodeGeometry) {
        self.left = geometry.left;
        self.top = geometry.top;
        self.width = geometry.width;
        self.height = geometry.height;
        self.angle = geometry.angle;
        self.scale_x = geometry.scale_x;
        self.scale_y = geometry.scale_y;
    }

    /// Node-local → canvas-space transform: translate, then rotate about
    /// the top-left origin, then scale.
    pub fn affine(&self) -> kurbo::Affine {
        kurbo::Affine::translate((self.left as f64, self.top as f64))
            * kurbo::Affine::rotate((self.angle as f64).to_radians())
            * kurbo::Affine::scale_non_uniform(self.scale_x as f64, self.scale_y as f64)
    }
}

/// Build the local-space outline for a shape inside a `width` × `height`
/// box.
pub fn shape_path(props: &ShapeProps, width: f32, height: f32) -> BezPath {
    let w = width as f64;
    let h = height as f64;
    match props.shape_type {
        ShapeKind::Rectangle => {
            let rect = Rect::new(0.0, 0.0, w, h);
            match props.corner_radius {
                Some(r) if r > 0.0 => rect.to_rounded_rect(r as f64).to_path(0.1),
                _ => rect.to_path(0.1),
            }
        }
        ShapeKind::Circle => {
            // Inscribed in the shorter box dimension, centered.
            let radius = w.min(h) / 2.0;
            Circle::new(Point::new(w / 2.0, h / 2.0), radius).to_path(0.1)
        }
        ShapeKind::Triangle => {
            let mut path = BezPath::new();
            path.move_to((w / 2.0, 0.0));
            path.line_to((w, h));
            path.line_to((0.0, h));
            path.close_path();
            path
        }
        ShapeKind::Line => {
            let mut path = BezPath::new();
            path.move_to((0.0, 0.0));
            path.line_to((w, 0.0));
            path
        }
        ShapeKind::Polygon => {
            let sides = props.points.unwrap_or(6).max(3);
            let radius = w.min(h) / 2.0;
            let (cx, cy) = (w / 2.0, h / 2.0);
            let mut path = BezPath::new();
            for i in 0..sides {
                let theta = std::f64::consts::TAU * i as f64 / sides as f64
                    - std::f64::consts::FRAC_PI_2;
                let p = (cx + radius * theta.cos(), cy + radius * theta.sin());
                if i == 0 {
                    path.move_to(p);
                } else {
                    path.line_to(p);
                }
            }
            path.close_path();
            path
        }
        ShapeKind::Star => {
            let points = props.points.unwrap_or(5).max(3);
            let outer = w.min(h) / 2.0;
            let inner = outer / 2.0;
            let (cx, cy) = (w / 2.0, h / 2.0);
            let mut path = BezPath::new();
            for i in 0..points * 2 {
                let radius = if i % 2 == 0 { outer } else { inner };
                let theta = std::f64::consts::PI * i as f64 / points as f64
                    - std::f64::consts::FRAC_PI_2;
                let p = (cx + radius * theta.cos(), cy + radius * theta.sin());
                if i == 0 {
                    path.move_to(p);
                } else {
                    path.line_to(p);
                }
            }
            path.close_path();
            path
        }
    }
}

/// Build the visual for a freshly created node. Image kinds are handled by
/// the asset completion path instead, since they need an intrinsic size.
pub fn build_visual(kind: &ElementKind, width: f32, height: f32) -> NodeVisual {
    match kind {
        ElementKind::Text(props) => NodeVisual::Text(props.clone()),
        ElementKind::Shape(props) => NodeVisual::Shape {
            props: props.clone(),
            path: shape_path(props, width, height),
        },
        ElementKind::Image(props) => NodeVisual::Image {
            src: props.src.clone(),
            intrinsic: Dimensions {
                width,
                height,
            },
            filters: props.filters,
            crop: props.crop_area,
        },
        ElementKind::Video(props) => NodeVisual::Media {
            src: props.src.clone(),
            audio_only: false,
        },
        ElementKind::Audio(props) => NodeVisual::Media {
            src: props.src.clone(),
            audio_only: true,
        },
    }
}
