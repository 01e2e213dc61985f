//! Bidirectional sync engine: document model ↔ retained scene.
//!
//! Two directions, never looping into each other:
//!
//! - **Document → scene** (`reconcile`): a declarative diff-and-patch pass.
//!   For every element: ensure a node exists, push changed properties;
//!   then destroy nodes whose element is gone and rebuild painter order.
//!   Idempotent — running it twice without a document change performs zero
//!   node writes on the second run.
//!
//! - **Scene → document** (`pump_events`): event-driven. Each user gesture
//!   event is converted back to a document transform and written only when
//!   it actually differs from the current value.
//!
//! Loop suppression uses generation counters instead of timers: every
//! programmatic push carries a fresh generation, the scene tags the
//! resulting events with it, and `pump_events` drops those echoes. User
//! events are never suppressed, so a gesture starting while a push is
//! still settling is processed normally. In the reverse direction no
//! guard is needed at all — after a scene→document write the next
//! reconcile finds the node already matching and writes nothing, so no
//! echo event exists to bounce.

use crate::selection::SelectionCoordinator;
use crate::store::EditorStore;
use easel_core::transform::{changed, from_scene_geometry};
use easel_core::{ElementId, ElementKind};
use easel_scene::{AssetSource, Canvas, NodeStatus, SceneEvent};
use std::collections::HashSet;

/// Counters from one document→scene pass, for observability and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub nodes_created: usize,
    pub nodes_removed: usize,
    /// Individual node property writes across the pass.
    pub property_writes: usize,
    /// Asset loads still in flight after the pass.
    pub assets_pending: usize,
}

pub struct SyncEngine {
    selection: SelectionCoordinator,
    /// Monotonic generation stamped on programmatic pushes.
    generation: u64,
    /// Store revision at the end of the last reconcile pass.
    last_revision: Option<u64>,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self {
            selection: SelectionCoordinator::new(),
            generation: 0,
            last_revision: None,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Whether the document changed since the last reconcile pass.
    pub fn needs_reconcile(&self, store: &EditorStore) -> bool {
        self.last_revision != Some(store.revision())
    }

    /// Document → scene: the declarative reconciliation pass.
    ///
    /// Ordering within the pass: asset completions and node creation
    /// first, then property application, then stale removal, then
    /// reordering, then selection. Property application reflects the
    /// document state at the moment the pass started — nothing here
    /// re-enters the store.
    pub fn reconcile(
        &mut self,
        store: &mut EditorStore,
        canvas: &mut Canvas,
        assets: &mut dyn AssetSource,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        // Pump in-flight asset loads. A completion whose element has been
        // deleted in the meantime is dropped silently.
        for (id, src) in canvas.pending_loads() {
            match store.project().element(id) {
                None => canvas.drop_pending(id),
                Some(element) => match assets.poll(&src) {
                    None => stats.assets_pending += 1,
                    Some(Ok(intrinsic)) => {
                        let element = element.clone();
                        canvas.complete_load(&element, intrinsic);
                        stats.nodes_created += 1;
                    }
                    Some(Err(reason)) => canvas.fail_load(id, reason),
                },
            }
        }

        let generation = self.next_generation();
        for element in &store.project().elements {
            match canvas.ensure_node(element) {
                NodeStatus::Created => stats.nodes_created += 1,
                NodeStatus::Exists | NodeStatus::Loading => {}
            }
            stats.property_writes += canvas.apply_document_state(element, generation);
        }
        canvas.set_background(store.project().background_color);

        let live: HashSet<ElementId> = store.project().element_ids().collect();
        stats.nodes_removed += canvas.remove_stale(&live);
        canvas.reorder(&store.project().elements);

        let selection_generation = self.next_generation();
        self.selection
            .reconcile(store, canvas, selection_generation);

        self.last_revision = Some(store.revision());
        stats
    }

    /// Scene → document: drain the scene's event queue into the store.
    /// Returns the number of document writes performed.
    pub fn pump_events(&mut self, store: &mut EditorStore, canvas: &mut Canvas) -> usize {
        let mut writes = 0;
        for event in canvas.drain_events() {
            match event {
                SceneEvent::NodeModified {
                    id,
                    geometry,
                    origin,
                } => {
                    if origin.is_programmatic() {
                        // Echo of our own push — already in the document.
                        continue;
                    }
                    let Some(element) = store.project().element(id) else {
                        continue;
                    };
                    let next = from_scene_geometry(&geometry, &element.kind);
                    if !changed(&element.transform, &next) {
                        continue;
                    }
                    if store.set_transform(id, next) {
                        writes += 1;
                    }
                }
                SceneEvent::TextEdited {
                    id,
                    content,
                    origin,
                } => {
                    if origin.is_programmatic() {
                        continue;
                    }
                    let applied = store.update_element(id, |el| match &mut el.kind {
                        ElementKind::Text(props) => props.content = content,
                        ElementKind::Image(_)
                        | ElementKind::Shape(_)
                        | ElementKind::Video(_)
                        | ElementKind::Audio(_) => {
                            log::warn!("text edit event for non-text element {id}");
                        }
                    });
                    if applied {
                        writes += 1;
                    }
                }
                SceneEvent::SelectionChanged { ids, origin } => {
                    if origin.is_programmatic() {
                        continue;
                    }
                    self.selection.apply_scene_selection(store, &ids);
                }
                SceneEvent::AssetFailed { id, src, reason } => {
                    // Recoverable: surfaced to the UI layer, engine keeps going.
                    log::warn!("asset failed for {id} ({src}): {reason}");
                }
            }
        }
        writes
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}
