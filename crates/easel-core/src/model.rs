//! Canonical document model for Easel projects.
//!
//! A project is an ordered list of typed canvas elements plus canvas
//! dimensions and background. The element order carries no meaning on its
//! own — z-order is the explicit `z_index` field, kept dense and equal to
//! array position after every structural mutation. The model has no
//! rendering knowledge; the scene crate derives everything from it.

use crate::id::ElementId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], serialized as a hex string
/// (`#rrggbb` or `#rrggbbaa`) to keep the interchange JSON shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let wide = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
        };
        let narrow = |c: u8| -> Option<f32> { Some((hex_val(c)? * 17) as f32 / 255.0) };

        match bytes.len() {
            3 => Some(Self::rgba(
                narrow(bytes[0])?,
                narrow(bytes[1])?,
                narrow(bytes[2])?,
                1.0,
            )),
            4 => Some(Self::rgba(
                narrow(bytes[0])?,
                narrow(bytes[1])?,
                narrow(bytes[2])?,
                narrow(bytes[3])?,
            )),
            6 => Some(Self::rgba(
                wide(bytes[0], bytes[1])?,
                wide(bytes[2], bytes[3])?,
                wide(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                wide(bytes[0], bytes[1])?,
                wide(bytes[2], bytes[3])?,
                wide(bytes[4], bytes[5])?,
                wide(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Emit as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Project ─────────────────────────────────────────────────────────────

/// The kind of project being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Design,
    Photo,
    Video,
}

/// Canvas (or asset) pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

/// The root aggregate: canvas dimensions, background, and the ordered
/// element list. Mutated only through the methods below, each of which
/// stamps `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    /// Immutable after creation.
    pub dimensions: Dimensions,
    pub background_color: Color,
    pub elements: Vec<CanvasElement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Transform ───────────────────────────────────────────────────────────

/// Document-space placement of an element.
///
/// `width`/`height` are the target box size; `scale_x`/`scale_y` are the
/// multiplicative factors the rendering layer applies on top. Non-image
/// kinds converge to scale 1 after every interactive resize (the size
/// delta is folded into width/height); image kinds keep scale =
/// target size ÷ intrinsic asset size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    pub fn from_frame(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Whether every component is a finite number. The model only ever
    /// accepts finite transforms; validation happens at entry boundaries.
    pub fn is_finite(&self) -> bool {
        [
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation,
            self.scale_x,
            self.scale_y,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

// ─── Element variants ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    /// 100..900.
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub color: Color,
    pub line_height: f32,
    pub letter_spacing: f32,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_family: "Inter".into(),
            font_size: 24.0,
            font_weight: 400,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Left,
            color: Color::BLACK,
            line_height: 1.2,
            letter_spacing: 0.0,
        }
    }
}

/// Image adjustment parameters. 100 is the neutral value for
/// brightness/contrast/saturation; 0 for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFilters {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub blur: f32,
    pub grayscale: f32,
    pub sepia: f32,
    pub hue_rotate: f32,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            blur: 0.0,
            grayscale: 0.0,
            sepia: 0.0,
            hue_rotate: 0.0,
        }
    }
}

/// A partial filter override (preset or panel edit). Only `Some` fields
/// replace the base value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPatch {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub blur: Option<f32>,
    pub grayscale: Option<f32>,
    pub sepia: Option<f32>,
    pub hue_rotate: Option<f32>,
}

impl ImageFilters {
    /// Merge a patch over these filters, returning the combined record.
    pub fn merged(&self, patch: &FilterPatch) -> ImageFilters {
        ImageFilters {
            brightness: patch.brightness.unwrap_or(self.brightness),
            contrast: patch.contrast.unwrap_or(self.contrast),
            saturation: patch.saturation.unwrap_or(self.saturation),
            blur: patch.blur.unwrap_or(self.blur),
            grayscale: patch.grayscale.unwrap_or(self.grayscale),
            sepia: patch.sepia.unwrap_or(self.sepia),
            hue_rotate: patch.hue_rotate.unwrap_or(self.hue_rotate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    pub src: String,
    pub original_src: String,
    #[serde(default)]
    pub filters: ImageFilters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_area: Option<CropArea>,
    /// When set, paired width/height edits preserve the ratio captured
    /// at lock time.
    #[serde(default)]
    pub aspect_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Polygon,
    Star,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    pub shape_type: ShapeKind,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    /// Point count for polygon/star kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProps {
    pub src: String,
    pub duration: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub volume: f32,
    pub muted: bool,
    #[serde(rename = "loop")]
    pub looped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioProps {
    pub src: String,
    pub duration: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub volume: f32,
    pub fade_in: f32,
    pub fade_out: f32,
}

/// The closed set of element kinds. Every branch on kind is an exhaustive
/// match, so adding a variant surfaces each site needing an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeProps),
    Video(VideoProps),
    Audio(AudioProps),
}

impl ElementKind {
    /// Short lowercase kind name, for logs and default element names.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
            ElementKind::Video(_) => "video",
            ElementKind::Audio(_) => "audio",
        }
    }

    /// Image kinds resize by scale factors relative to the intrinsic asset
    /// size; every other kind rewrites width/height and normalizes scale
    /// back to 1.
    pub fn resizes_by_scale(&self) -> bool {
        match self {
            ElementKind::Image(_) => true,
            ElementKind::Text(_)
            | ElementKind::Shape(_)
            | ElementKind::Video(_)
            | ElementKind::Audio(_) => false,
        }
    }
}

// ─── Canvas element ──────────────────────────────────────────────────────

/// One visual element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    /// Stable, assigned at creation, never reused.
    pub id: ElementId,
    pub name: String,
    pub transform: Transform,
    /// [0.0, 1.0].
    pub opacity: f32,
    pub visible: bool,
    /// Blocks interactive manipulation but not programmatic edits.
    pub locked: bool,
    /// Dense, equal to the element's array position.
    pub z_index: usize,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl CanvasElement {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: ElementId::fresh(),
            name: name.into(),
            transform: Transform::default(),
            opacity: 1.0,
            visible: true,
            locked: false,
            z_index: 0,
            kind,
        }
    }

    pub fn with_frame(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.transform = Transform {
            x,
            y,
            width,
            height,
            ..self.transform
        };
        self
    }
}

// ─── Project operations ──────────────────────────────────────────────────

impl Project {
    pub fn new(name: impl Into<String>, project_type: ProjectType, dimensions: Dimensions) -> Self {
        let now = Utc::now();
        Self {
            id: ElementId::with_prefix("proj").as_str().to_string(),
            name: name.into(),
            project_type,
            dimensions,
            background_color: Color::WHITE,
            elements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|el| el.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(|el| el.id)
    }

    /// Append an element, assigning it the next z position.
    pub fn add_element(&mut self, mut element: CanvasElement) -> ElementId {
        element.z_index = self.elements.len();
        let id = element.id;
        self.elements.push(element);
        self.touch();
        id
    }

    /// Apply an in-place edit to one element. Returns false when the ID
    /// no longer exists (a no-op, not an error).
    pub fn update_element(&mut self, id: ElementId, edit: impl FnOnce(&mut CanvasElement)) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        edit(&mut self.elements[idx]);
        self.touch();
        true
    }

    /// Replace an element's transform wholesale.
    pub fn set_transform(&mut self, id: ElementId, transform: Transform) -> bool {
        self.update_element(id, |el| el.transform = transform)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<CanvasElement> {
        let idx = self.index_of(id)?;
        let removed = self.elements.remove(idx);
        self.renumber_z();
        self.touch();
        Some(removed)
    }

    /// Clone an element 20px down-right with a fresh ID, appended on top.
    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        let source = self.element(id)?;
        let mut copy = source.clone();
        copy.id = ElementId::fresh();
        copy.name = format!("{} (copy)", source.name);
        copy.transform.x += 20.0;
        copy.transform.y += 20.0;
        Some(self.add_element(copy))
    }

    // ─── Z-order ─────────────────────────────────────────────────────────
    //
    // Z is always re-derived from array position after a structural move,
    // never trusted from stored values.

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == self.elements.len() - 1 {
            return false;
        }
        let el = self.elements.remove(idx);
        self.elements.push(el);
        self.renumber_z();
        self.touch();
        true
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == 0 {
            return false;
        }
        let el = self.elements.remove(idx);
        self.elements.insert(0, el);
        self.renumber_z();
        self.touch();
        true
    }

    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == self.elements.len() - 1 {
            return false;
        }
        self.elements.swap(idx, idx + 1);
        self.renumber_z();
        self.touch();
        true
    }

    pub fn send_backward(&mut self, id: ElementId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx == 0 {
            return false;
        }
        self.elements.swap(idx, idx - 1);
        self.renumber_z();
        self.touch();
        true
    }

    /// Rewrite every `z_index` to its array position.
    pub(crate) fn renumber_z(&mut self) {
        for (i, el) in self.elements.iter_mut().enumerate() {
            el.z_index = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect(name: &str) -> CanvasElement {
        CanvasElement::new(
            name,
            ElementKind::Shape(ShapeProps {
                shape_type: ShapeKind::Rectangle,
                fill: Color::from_hex("#6c5ce7").unwrap(),
                stroke: Color::BLACK,
                stroke_width: 0.0,
                corner_radius: None,
                points: None,
            }),
        )
        .with_frame(10.0, 10.0, 100.0, 50.0)
    }

    fn sample_project() -> Project {
        Project::new(
            "Test",
            ProjectType::Design,
            Dimensions {
                width: 1080.0,
                height: 1080.0,
            },
        )
    }

    fn assert_dense_z(project: &Project) {
        for (i, el) in project.elements.iter().enumerate() {
            assert_eq!(el.z_index, i, "z_index desynced at position {i}");
        }
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#6C5CE7").unwrap();
        assert_eq!(c.to_hex(), "#6c5ce7");

        let c2 = Color::from_hex("#ff000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9);

        let short = Color::from_hex("fff").unwrap();
        assert_eq!(short.to_hex(), "#ffffff");

        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#gggggg").is_none());
    }

    #[test]
    fn add_assigns_dense_z() {
        let mut p = sample_project();
        p.add_element(rect("a"));
        p.add_element(rect("b"));
        p.add_element(rect("c"));
        assert_dense_z(&p);
    }

    #[test]
    fn z_order_ops_keep_invariant() {
        let mut p = sample_project();
        let a = p.add_element(rect("a"));
        let b = p.add_element(rect("b"));
        let c = p.add_element(rect("c"));

        assert!(p.bring_to_front(a));
        assert_dense_z(&p);
        assert_eq!(p.elements.last().unwrap().id, a);

        assert!(p.send_to_back(c));
        assert_dense_z(&p);
        assert_eq!(p.elements[0].id, c);

        assert!(p.bring_forward(b));
        assert_dense_z(&p);

        assert!(p.send_backward(a));
        assert_dense_z(&p);

        p.remove_element(b);
        assert_dense_z(&p);

        // Edges: topmost can't go further up, bottom can't go further down
        let top = p.elements.last().unwrap().id;
        assert!(!p.bring_to_front(top));
        assert!(!p.bring_forward(top));
        let bottom = p.elements[0].id;
        assert!(!p.send_to_back(bottom));
        assert!(!p.send_backward(bottom));
    }

    #[test]
    fn duplicate_offsets_and_fresh_id() {
        let mut p = sample_project();
        let orig = p.add_element(rect("box").with_frame(50.0, 50.0, 80.0, 80.0));
        let copy = p.duplicate_element(orig).unwrap();

        assert_ne!(orig, copy);
        let original = p.element(orig).unwrap();
        let duplicated = p.element(copy).unwrap();
        assert_eq!(original.transform.x, 50.0);
        assert_eq!(original.transform.y, 50.0);
        assert_eq!(duplicated.transform.x, 70.0);
        assert_eq!(duplicated.transform.y, 70.0);
        assert_eq!(duplicated.name, "box (copy)");
        assert_dense_z(&p);
    }

    #[test]
    fn update_missing_element_is_noop() {
        let mut p = sample_project();
        let before = p.updated_at;
        assert!(!p.update_element(ElementId::intern("ghost"), |el| el.opacity = 0.5));
        assert_eq!(p.updated_at, before);
    }

    #[test]
    fn mutations_stamp_updated_at() {
        let mut p = sample_project();
        let before = p.updated_at;
        let id = p.add_element(rect("a"));
        assert!(p.updated_at >= before);
        let mid = p.updated_at;
        p.set_transform(id, Transform::from_frame(0.0, 0.0, 10.0, 10.0));
        assert!(p.updated_at >= mid);
    }

    #[test]
    fn filter_patch_merge() {
        let base = ImageFilters::default();
        let vivid = base.merged(&FilterPatch {
            saturation: Some(140.0),
            contrast: Some(115.0),
            ..Default::default()
        });
        assert_eq!(vivid.saturation, 140.0);
        assert_eq!(vivid.contrast, 115.0);
        assert_eq!(vivid.brightness, 100.0);
        assert_eq!(vivid.blur, 0.0);
    }

    #[test]
    fn element_json_shape_is_tagged() {
        let el = rect("box");
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "shape");
        assert_eq!(json["shapeType"], "rectangle");
        assert_eq!(json["zIndex"], 0);
        assert_eq!(json["transform"]["scaleX"], 1.0);

        let back: CanvasElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn kind_scale_routing() {
        let shape = rect("s");
        assert!(!shape.kind.resizes_by_scale());
        let img = CanvasElement::new(
            "img",
            ElementKind::Image(ImageProps {
                src: "a.png".into(),
                original_src: "a.png".into(),
                filters: ImageFilters::default(),
                crop_area: None,
                aspect_locked: false,
            }),
        );
        assert!(img.kind.resizes_by_scale());
    }
}
