//! The retained scene and its reconciliation surface.
//!
//! `Canvas` owns the mapping from element IDs to live node handles and
//! exposes the four operations the sync engine drives: `ensure_node`,
//! `apply_document_state` (minimal-diff property push), `remove_stale`,
//! and `reorder`. It is never the source of truth — the whole node set can
//! be rebuilt from the document at any time.
//!
//! Nodes are stored in a stable graph so handles survive removals; painter
//! order is an explicit index list with the workboard background pinned
//! beneath every element (z-position = `z_index` + 1).

use crate::event::{Origin, SceneEvent};
use crate::node::{build_visual, shape_path, NodeVisual, SceneNode};
use easel_core::model::{CanvasElement, Color, Dimensions, ElementKind};
use easel_core::transform::{to_scene_transform, NodeGeometry, ScenePlacement};
use easel_core::ElementId;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// Result of `ensure_node` for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// A live node already exists.
    Exists,
    /// A node was created synchronously.
    Created,
    /// Asset-backed kind; creation is deferred until the load completes.
    Loading,
}

pub struct Canvas {
    graph: StableDiGraph<SceneNode, ()>,
    workboard: NodeIndex,
    id_index: HashMap<ElementId, NodeIndex>,
    /// Element nodes bottom→top. The workboard paints beneath `order[0]`.
    order: Vec<NodeIndex>,
    /// IDs forming the current active object / active selection.
    active: Vec<ElementId>,
    events: VecDeque<SceneEvent>,
    /// Asset loads in flight: element → source reference.
    pending: HashMap<ElementId, String>,
}

impl Canvas {
    pub fn new(dimensions: Dimensions, background: Color) -> Self {
        let mut graph = StableDiGraph::new();
        let mut board = SceneNode::new(
            ElementId::intern("workboard"),
            ScenePlacement {
                left: 0.0,
                top: 0.0,
                angle: 0.0,
                scale_x: 1.0,
                scale_y: 1.0,
                box_width: dimensions.width,
                box_height: dimensions.height,
            },
            NodeVisual::Workboard { fill: background },
        );
        board.selectable = false;
        let workboard = graph.add_node(board);

        Self {
            graph,
            workboard,
            id_index: HashMap::new(),
            order: Vec::new(),
            active: Vec::new(),
            events: VecDeque::new(),
            pending: HashMap::new(),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: ElementId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn geometry(&self, id: ElementId) -> Option<NodeGeometry> {
        self.node(id).map(SceneNode::geometry)
    }

    /// Number of live element nodes (the workboard is not counted).
    pub fn node_count(&self) -> usize {
        self.id_index.len()
    }

    pub fn workboard_node(&self) -> &SceneNode {
        &self.graph[self.workboard]
    }

    /// Element IDs bottom→top in painter order. The workboard always sits
    /// beneath the first entry.
    pub fn painter_order(&self) -> Vec<ElementId> {
        self.order
            .iter()
            .map(|&idx| self.graph[idx].element)
            .collect()
    }

    /// Paint position of an element's node: its slot above the workboard.
    pub fn z_position(&self, id: ElementId) -> Option<usize> {
        let idx = *self.id_index.get(&id)?;
        self.order.iter().position(|&i| i == idx).map(|p| p + 1)
    }

    /// Nodes front-to-back (topmost first), for hit testing.
    pub fn nodes_top_down(&self) -> impl Iterator<Item = &SceneNode> {
        self.order.iter().rev().map(|&idx| &self.graph[idx])
    }

    /// Nodes back-to-front (paint order), workboard excluded.
    pub fn nodes_bottom_up(&self) -> impl Iterator<Item = &SceneNode> {
        self.order.iter().map(|&idx| &self.graph[idx])
    }

    pub fn active(&self) -> &[ElementId] {
        &self.active
    }

    pub fn is_pending(&self, id: ElementId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Loads currently in flight, for the engine's asset pump.
    pub fn pending_loads(&self) -> Vec<(ElementId, String)> {
        self.pending
            .iter()
            .map(|(&id, src)| (id, src.clone()))
            .collect()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain(..).collect()
    }

    pub fn background(&self) -> Color {
        match self.graph[self.workboard].visual {
            NodeVisual::Workboard { fill } => fill,
            _ => Color::WHITE,
        }
    }

    pub fn set_background(&mut self, color: Color) {
        if let NodeVisual::Workboard { fill } = &mut self.graph[self.workboard].visual
            && *fill != color
        {
            *fill = color;
        }
    }

    // ─── Document → scene ────────────────────────────────────────────────

    /// Make sure a node exists for `element`, creating one if needed.
    /// Asset-backed kinds are queued until their intrinsic size is known.
    pub fn ensure_node(&mut self, element: &CanvasElement) -> NodeStatus {
        if self.id_index.contains_key(&element.id) {
            return NodeStatus::Exists;
        }
        match &element.kind {
            ElementKind::Image(props) => {
                self.pending
                    .entry(element.id)
                    .or_insert_with(|| props.src.clone());
                NodeStatus::Loading
            }
            ElementKind::Text(_)
            | ElementKind::Shape(_)
            | ElementKind::Video(_)
            | ElementKind::Audio(_) => {
                let placement = to_scene_transform(&element.transform, &element.kind, None);
                self.insert_node(element, placement, None);
                NodeStatus::Created
            }
        }
    }

    fn insert_node(
        &mut self,
        element: &CanvasElement,
        placement: ScenePlacement,
        intrinsic: Option<Dimensions>,
    ) -> NodeIndex {
        let visual = match (&element.kind, intrinsic) {
            (ElementKind::Image(props), Some(intrinsic)) => NodeVisual::Image {
                src: props.src.clone(),
                intrinsic,
                filters: props.filters,
                crop: props.crop_area,
            },
            (kind, _) => build_visual(kind, placement.box_width, placement.box_height),
        };
        let mut node = SceneNode::new(element.id, placement, visual);
        node.opacity = element.opacity;
        node.visible = element.visible;
        node.selectable = !element.locked;

        let idx = self.graph.add_node(node);
        self.graph.add_edge(self.workboard, idx, ());
        self.id_index.insert(element.id, idx);
        self.order.push(idx);
        idx
    }

    /// One-shot node insertion after an asset load. Also refreshes an
    /// existing node whose source was swapped. The caller has already
    /// verified the element still exists.
    pub fn complete_load(&mut self, element: &CanvasElement, intrinsic: Dimensions) {
        self.pending.remove(&element.id);
        let ElementKind::Image(props) = &element.kind else {
            // Kind changed while the load was in flight — drop it.
            return;
        };
        let placement = to_scene_transform(&element.transform, &element.kind, Some(intrinsic));
        match self.id_index.get(&element.id) {
            Some(&idx) => {
                let node = &mut self.graph[idx];
                node.set_geometry(placement_geometry(placement));
                node.visual = NodeVisual::Image {
                    src: props.src.clone(),
                    intrinsic,
                    filters: props.filters,
                    crop: props.crop_area,
                };
            }
            None => {
                self.insert_node(element, placement, Some(intrinsic));
            }
        }
    }

    /// Record a failed asset load. The element stays in the document; the
    /// failure surfaces as a recoverable event.
    pub fn fail_load(&mut self, id: ElementId, reason: impl Into<String>) {
        if let Some(src) = self.pending.remove(&id) {
            let reason = reason.into();
            log::warn!("asset load failed for {id} ({src}): {reason}");
            self.events.push_back(SceneEvent::AssetFailed { id, src, reason });
        }
    }

    /// Forget an in-flight load whose element is gone.
    pub fn drop_pending(&mut self, id: ElementId) {
        self.pending.remove(&id);
    }

    /// Push document state onto an element's node, writing only fields
    /// whose value actually differs. Returns the number of property
    /// writes — zero means the node already matched the document.
    ///
    /// Geometry writes queue a `NodeModified` event tagged with
    /// `generation` so the reverse direction can recognize the echo.
    pub fn apply_document_state(&mut self, element: &CanvasElement, generation: u64) -> usize {
        let Some(&idx) = self.id_index.get(&element.id) else {
            return 0;
        };
        let intrinsic = match &self.graph[idx].visual {
            NodeVisual::Image { intrinsic, .. } => Some(*intrinsic),
            _ => None,
        };
        let placement = to_scene_transform(&element.transform, &element.kind, intrinsic);

        let node = &mut self.graph[idx];
        let mut writes = 0usize;
        let mut geometry_changed = false;
        let mut box_changed = false;

        if node.left != placement.left {
            node.left = placement.left;
            writes += 1;
            geometry_changed = true;
        }
        if node.top != placement.top {
            node.top = placement.top;
            writes += 1;
            geometry_changed = true;
        }
        if node.angle != placement.angle {
            node.angle = placement.angle;
            writes += 1;
            geometry_changed = true;
        }
        if node.scale_x != placement.scale_x {
            node.scale_x = placement.scale_x;
            writes += 1;
            geometry_changed = true;
        }
        if node.scale_y != placement.scale_y {
            node.scale_y = placement.scale_y;
            writes += 1;
            geometry_changed = true;
        }
        if node.width != placement.box_width {
            node.width = placement.box_width;
            writes += 1;
            box_changed = true;
        }
        if node.height != placement.box_height {
            node.height = placement.box_height;
            writes += 1;
            box_changed = true;
        }
        geometry_changed |= box_changed;

        if node.opacity != element.opacity {
            node.opacity = element.opacity;
            writes += 1;
        }
        if node.visible != element.visible {
            node.visible = element.visible;
            writes += 1;
        }
        let selectable = !element.locked;
        if node.selectable != selectable {
            node.selectable = selectable;
            writes += 1;
        }

        let (box_w, box_h) = (node.width, node.height);
        let mut reload: Option<String> = None;
        match &element.kind {
            ElementKind::Text(props) => {
                if let NodeVisual::Text(current) = &mut node.visual {
                    if current != props {
                        *current = props.clone();
                        writes += 1;
                    }
                } else {
                    node.visual = build_visual(&element.kind, box_w, box_h);
                    writes += 1;
                }
            }
            ElementKind::Shape(props) => {
                if let NodeVisual::Shape { props: current, path } = &mut node.visual {
                    if current != props || box_changed {
                        *current = props.clone();
                        *path = shape_path(props, box_w, box_h);
                        writes += 1;
                    }
                } else {
                    node.visual = build_visual(&element.kind, box_w, box_h);
                    writes += 1;
                }
            }
            ElementKind::Image(props) => {
                if let NodeVisual::Image {
                    src,
                    filters,
                    crop,
                    ..
                } = &mut node.visual
                {
                    if *src != props.src {
                        *src = props.src.clone();
                        reload = Some(props.src.clone());
                        writes += 1;
                    }
                    if *filters != props.filters {
                        *filters = props.filters;
                        writes += 1;
                    }
                    if *crop != props.crop_area {
                        *crop = props.crop_area;
                        writes += 1;
                    }
                } else {
                    node.visual = build_visual(&element.kind, box_w, box_h);
                    writes += 1;
                }
            }
            ElementKind::Video(props) => {
                if let NodeVisual::Media { src, .. } = &mut node.visual {
                    if *src != props.src {
                        *src = props.src.clone();
                        writes += 1;
                    }
                } else {
                    node.visual = build_visual(&element.kind, box_w, box_h);
                    writes += 1;
                }
            }
            ElementKind::Audio(props) => {
                if let NodeVisual::Media { src, .. } = &mut node.visual {
                    if *src != props.src {
                        *src = props.src.clone();
                        writes += 1;
                    }
                } else {
                    node.visual = build_visual(&element.kind, box_w, box_h);
                    writes += 1;
                }
            }
        }

        if geometry_changed {
            let geometry = self.graph[idx].geometry();
            self.events.push_back(SceneEvent::NodeModified {
                id: element.id,
                geometry,
                origin: Origin::Programmatic { generation },
            });
        }
        if let Some(src) = reload {
            // Source swap: keep the node on screen, fetch the new pixels.
            self.pending.insert(element.id, src);
        }
        writes
    }

    /// Destroy nodes whose element is gone from the document. Also drops
    /// their pending loads and active-selection entries.
    pub fn remove_stale(&mut self, live: &HashSet<ElementId>) -> usize {
        let stale: Vec<ElementId> = self
            .id_index
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in &stale {
            if let Some(idx) = self.id_index.remove(id) {
                self.graph.remove_node(idx);
                self.order.retain(|&i| i != idx);
            }
        }
        self.active.retain(|id| live.contains(id));
        self.pending.retain(|id, _| live.contains(id));
        stale.len()
    }

    /// Rebuild painter order so each node sits at z-position
    /// `z_index` + 1. Nodes still loading are simply absent.
    pub fn reorder(&mut self, elements: &[CanvasElement]) {
        let mut by_z: Vec<&CanvasElement> = elements.iter().collect();
        by_z.sort_by_key(|el| el.z_index);
        self.order.clear();
        for el in by_z {
            if let Some(&idx) = self.id_index.get(&el.id) {
                self.order.push(idx);
            }
        }
    }

    /// Programmatic selection push from the document side. No-ops when the
    /// active set already matches, which is what stops the selection loop.
    pub fn set_active(&mut self, ids: &[ElementId], generation: u64) {
        if same_id_set(&self.active, ids) {
            return;
        }
        self.active = ids.to_vec();
        self.events.push_back(SceneEvent::SelectionChanged {
            ids: ids.to_vec(),
            origin: Origin::Programmatic { generation },
        });
    }

    // ─── Scene → document (user interaction surface) ─────────────────────

    /// A user gesture (drag/scale/rotate) settled new geometry on a node.
    /// Locked elements reject interactive manipulation.
    pub fn user_set_geometry(&mut self, id: ElementId, geometry: NodeGeometry) -> bool {
        let Some(&idx) = self.id_index.get(&id) else {
            return false;
        };
        let node = &mut self.graph[idx];
        if !node.selectable {
            return false;
        }
        let box_changed = node.width != geometry.width || node.height != geometry.height;
        node.set_geometry(geometry);
        if box_changed
            && let NodeVisual::Shape { props, path } = &mut node.visual
        {
            *path = shape_path(props, geometry.width, geometry.height);
        }
        self.events.push_back(SceneEvent::NodeModified {
            id,
            geometry,
            origin: Origin::User,
        });
        true
    }

    /// Convenience: drag by a delta.
    pub fn user_translate(&mut self, id: ElementId, dx: f32, dy: f32) -> bool {
        let Some(mut geometry) = self.geometry(id) else {
            return false;
        };
        geometry.left += dx;
        geometry.top += dy;
        self.user_set_geometry(id, geometry)
    }

    /// Convenience: corner-handle scale, multiplying the current factors.
    pub fn user_scale(&mut self, id: ElementId, sx: f32, sy: f32) -> bool {
        let Some(mut geometry) = self.geometry(id) else {
            return false;
        };
        geometry.scale_x *= sx;
        geometry.scale_y *= sy;
        self.user_set_geometry(id, geometry)
    }

    /// Convenience: rotation handle.
    pub fn user_rotate(&mut self, id: ElementId, angle: f32) -> bool {
        let Some(mut geometry) = self.geometry(id) else {
            return false;
        };
        geometry.angle = angle;
        self.user_set_geometry(id, geometry)
    }

    /// Inline text editing changed a text node's content.
    pub fn user_edit_text(&mut self, id: ElementId, content: &str) -> bool {
        let Some(&idx) = self.id_index.get(&id) else {
            return false;
        };
        let node = &mut self.graph[idx];
        if let NodeVisual::Text(props) = &mut node.visual {
            props.content = content.to_string();
            self.events.push_back(SceneEvent::TextEdited {
                id,
                content: content.to_string(),
                origin: Origin::User,
            });
            true
        } else {
            false
        }
    }

    /// User clicked a node or drew a marquee.
    pub fn user_select(&mut self, ids: &[ElementId]) {
        self.active = ids.to_vec();
        self.events.push_back(SceneEvent::SelectionChanged {
            ids: ids.to_vec(),
            origin: Origin::User,
        });
    }
}

fn placement_geometry(p: ScenePlacement) -> NodeGeometry {
    NodeGeometry {
        left: p.left,
        top: p.top,
        width: p.box_width,
        height: p.box_height,
        angle: p.angle,
        scale_x: p.scale_x,
        scale_y: p.scale_y,
    }
}

fn same_id_set(a: &[ElementId], b: &[ElementId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let set: HashSet<ElementId> = a.iter().copied().collect();
    b.iter().all(|id| set.contains(id))
}
