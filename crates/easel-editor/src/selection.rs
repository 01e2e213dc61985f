//! Selection coordination between the document and the scene.
//!
//! The document-level selection set lives in the store; the scene has its
//! own active-object state. This module keeps the two consistent in both
//! directions without echo loops: document→scene pushes are generation-
//! tagged and skipped when the active set already matches, scene→document
//! writes converge on the next reconcile pass.

use crate::store::EditorStore;
use easel_core::ElementId;
use easel_scene::Canvas;

#[derive(Debug, Default)]
pub struct SelectionCoordinator;

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self
    }

    /// Document → scene direction, run on every reconciliation pass.
    /// Prunes stale IDs first, then mirrors the set into the scene's
    /// active-object state: zero IDs clears it, one makes a single active
    /// object, several form a multi-selection.
    pub fn reconcile(&mut self, store: &mut EditorStore, canvas: &mut Canvas, generation: u64) {
        if store.prune_selection() {
            log::debug!("dropped stale selection entries");
        }
        match store.selected() {
            [] => canvas.set_active(&[], generation),
            [single] => canvas.set_active(&[*single], generation),
            many => canvas.set_active(many, generation),
        }
    }

    /// Scene → document direction: the user clicked a node or drew a
    /// marquee. IDs without a document element are dropped rather than
    /// stored.
    pub fn apply_scene_selection(&mut self, store: &mut EditorStore, ids: &[ElementId]) {
        let live: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| store.project().contains(*id))
            .collect();
        store.select_many(&live);
    }
}
