//! Viewport zoom/pan state and gesture recognition.
//!
//! The combined transform is a kurbo affine of the form
//! `[zoom, 0, 0, zoom, offset_x, offset_y]` — what the rendering surface
//! multiplies into every paint pass. Zoom is clamped to [0.1, 5.0].
//!
//! A pointer session is exactly one of: panning, pinch-zooming, or
//! manipulating an object — decided at pointer-down by whether the
//! hit-test found an interactive node. Wheel zoom anchors the cursor;
//! pinch zoom is damped to half sensitivity and pans by the centroid
//! delta.

use crate::input::{InputEvent, Modifiers};
use easel_core::model::Dimensions;
use easel_core::ElementId;
use kurbo::{Affine, Point, Vec2};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;

/// Wheel delta → zoom factor base, matching a natural scroll feel.
const WHEEL_ZOOM_BASE: f32 = 0.999;
/// Pinch sensitivity damping.
const PINCH_DAMPING: f32 = 0.5;

/// What the current pointer interaction is doing. Sessions are mutually
/// exclusive per pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSession {
    Idle,
    Panning { last: (f32, f32) },
    Pinching {
        last_distance: f32,
        last_center: (f32, f32),
    },
    /// The pointer is manipulating a scene object; the viewport stays put.
    Manipulating,
}

pub struct ViewportController {
    zoom: f32,
    offset: Vec2,
    session: PointerSession,
    pan_mode: bool,
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
            session: PointerSession::Idle,
            pan_mode: false,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn session(&self) -> PointerSession {
        self.session
    }

    pub fn set_pan_mode(&mut self, on: bool) {
        self.pan_mode = on;
    }

    /// The combined viewport transform consumed by overlays and painting.
    pub fn transform(&self) -> Affine {
        Affine::new([
            self.zoom as f64,
            0.0,
            0.0,
            self.zoom as f64,
            self.offset.x,
            self.offset.y,
        ])
    }

    /// Map a screen position into canvas coordinates (for hit testing).
    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self.transform().inverse() * Point::new(x as f64, y as f64);
        (p.x as f32, p.y as f32)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom by `factor`, keeping the screen point `at` visually fixed.
    pub fn zoom_at(&mut self, at: (f32, f32), factor: f32) {
        let old = self.zoom;
        let new = (old * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if new == old {
            return;
        }
        let ratio = (new / old) as f64;
        let anchor = Vec2::new(at.0 as f64, at.1 as f64);
        self.offset = anchor - (anchor - self.offset) * ratio;
        self.zoom = new;
    }

    /// Wheel zoom at the cursor.
    pub fn wheel_zoom(&mut self, at: (f32, f32), delta_y: f32) {
        self.zoom_at(at, WHEEL_ZOOM_BASE.powf(delta_y));
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx as f64, dy as f64);
    }

    /// Fit content into a container with padding, centered. Used on load
    /// and on "reset view".
    pub fn fit_to_container(&mut self, content: Dimensions, container: Dimensions, padding: f32) {
        let fit_x = (container.width - padding * 2.0) / content.width;
        let fit_y = (container.height - padding * 2.0) / content.height;
        let zoom = fit_x.min(fit_y).min(1.0).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom = zoom;
        self.offset = Vec2::new(
            ((container.width - content.width * zoom) / 2.0) as f64,
            ((container.height - content.height * zoom) / 2.0) as f64,
        );
    }

    // ─── Gesture recognition ─────────────────────────────────────────────

    /// Pointer-down decides the session. Returns true when the viewport
    /// claims the pointer (panning); an object hit leaves manipulation to
    /// the selection/drag machinery, and empty space without a pan
    /// trigger belongs to marquee selection.
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        modifiers: Modifiers,
        hit: Option<ElementId>,
    ) -> bool {
        if hit.is_some() && !self.pan_mode {
            self.session = PointerSession::Manipulating;
            return false;
        }
        if modifiers.alt || self.pan_mode {
            self.session = PointerSession::Panning { last: (x, y) };
            return true;
        }
        self.session = PointerSession::Idle;
        false
    }

    /// Returns true when the move was consumed by a pan.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        match self.session {
            PointerSession::Panning { last } => {
                self.pan(x - last.0, y - last.1);
                self.session = PointerSession::Panning { last: (x, y) };
                true
            }
            PointerSession::Idle | PointerSession::Pinching { .. } | PointerSession::Manipulating => {
                false
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.session = PointerSession::Idle;
    }

    /// Two-finger contact starts a pinch session, displacing any other.
    pub fn touch_start(&mut self, points: &[(f32, f32)]) {
        if let [a, b] = points {
            self.session = PointerSession::Pinching {
                last_distance: distance(*a, *b),
                last_center: centroid(*a, *b),
            };
        }
    }

    /// Pinch: distance ratio drives damped zoom at the centroid, centroid
    /// delta drives pan.
    pub fn touch_move(&mut self, points: &[(f32, f32)]) {
        let PointerSession::Pinching {
            last_distance,
            last_center,
        } = self.session
        else {
            return;
        };
        let [a, b] = points else {
            return;
        };
        let dist = distance(*a, *b);
        let center = centroid(*a, *b);
        if last_distance > 0.0 {
            let factor = 1.0 + (dist / last_distance - 1.0) * PINCH_DAMPING;
            self.zoom_at(center, factor);
            self.pan(center.0 - last_center.0, center.1 - last_center.1);
        }
        self.session = PointerSession::Pinching {
            last_distance: dist,
            last_center: center,
        };
    }

    pub fn touch_end(&mut self) {
        self.session = PointerSession::Idle;
    }

    /// Route a normalized input event. `hit` is the hit-test result for
    /// pointer-down positions (in canvas space). Returns true when the
    /// viewport consumed the event.
    pub fn handle(&mut self, event: &InputEvent, hit: Option<ElementId>) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(*x, *y, *modifiers, hit)
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { .. } => {
                self.pointer_up();
                false
            }
            InputEvent::Wheel { x, y, delta_y } => {
                self.wheel_zoom((*x, *y), *delta_y);
                true
            }
            InputEvent::TouchStart { points } => {
                self.touch_start(points);
                matches!(self.session, PointerSession::Pinching { .. })
            }
            InputEvent::TouchMove { points } => {
                let pinching = matches!(self.session, PointerSession::Pinching { .. });
                self.touch_move(points);
                pinching
            }
            InputEvent::TouchEnd => {
                self.touch_end();
                false
            }
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

fn centroid(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}
