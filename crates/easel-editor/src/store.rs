//! The injected editor state container.
//!
//! Owns the project, its history, the document-level selection set, and
//! the editor mode. Every consumer — panels, tools, the sync engine —
//! receives an explicit `&mut EditorStore`; there is no ambient global.
//! A monotonic revision counter lets the engine detect document changes
//! without subscribing to anything.
//!
//! History granularity follows the interactive model: structural edits
//! (add/delete/duplicate/z-order) commit a snapshot immediately, while
//! per-frame gesture updates accumulate until `save_history` is called at
//! gesture end.

use easel_core::history::History;
use easel_core::model::{CanvasElement, Color, Dimensions, Project, ProjectType, Transform};
use easel_core::transform::{aspect_locked_size, LockedEdit};
use easel_core::{ElementId, ElementKind};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Select,
    Text,
    Shape,
    Draw,
    Pan,
}

pub struct EditorStore {
    project: Project,
    history: History,
    selected: SmallVec<[ElementId; 4]>,
    mode: EditorMode,
    revision: u64,
}

impl EditorStore {
    pub fn new(project: Project) -> Self {
        let mut history = History::default();
        history.reset(&project);
        Self {
            project,
            history,
            selected: SmallVec::new(),
            mode: EditorMode::Select,
            revision: 0,
        }
    }

    pub fn create(name: impl Into<String>, project_type: ProjectType, dimensions: Dimensions) -> Self {
        Self::new(Project::new(name, project_type, dimensions))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Bumped on every document or selection change; the sync engine
    /// compares it against the value it last reconciled.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
    }

    // ─── Elements ────────────────────────────────────────────────────────

    pub fn add_element(&mut self, element: CanvasElement) -> ElementId {
        let id = self.project.add_element(element);
        self.save_history();
        self.bump();
        id
    }

    /// Per-frame edit; history is committed separately at gesture end.
    pub fn update_element(&mut self, id: ElementId, edit: impl FnOnce(&mut CanvasElement)) -> bool {
        let hit = self.project.update_element(id, edit);
        if hit {
            self.bump();
        }
        hit
    }

    /// Replace a transform wholesale. Non-finite values are rejected here,
    /// at the entry boundary, so the engine only ever sees finite math.
    pub fn set_transform(&mut self, id: ElementId, transform: Transform) -> bool {
        if !transform.is_finite() {
            log::warn!("rejecting non-finite transform for {id}");
            return false;
        }
        let hit = self.project.set_transform(id, transform);
        if hit {
            self.bump();
        }
        hit
    }

    /// Resize one dimension from the property panel, pairing the other
    /// when the element is aspect-locked.
    pub fn set_element_size(&mut self, id: ElementId, edit: LockedEdit) -> bool {
        let Some(element) = self.project.element(id) else {
            return false;
        };
        let value = match edit {
            LockedEdit::Width(v) | LockedEdit::Height(v) => v,
        };
        if !value.is_finite() || value <= 0.0 {
            log::warn!("rejecting invalid size {value} for {id}");
            return false;
        }

        let locked = match &element.kind {
            ElementKind::Image(props) => props.aspect_locked,
            ElementKind::Text(_)
            | ElementKind::Shape(_)
            | ElementKind::Video(_)
            | ElementKind::Audio(_) => false,
        };
        let t = element.transform;
        let (width, height) = if locked && t.height > 0.0 {
            aspect_locked_size(edit, t.width / t.height)
        } else {
            match edit {
                LockedEdit::Width(w) => (w, t.height),
                LockedEdit::Height(h) => (t.width, h),
            }
        };
        self.update_element(id, |el| {
            el.transform.width = width;
            el.transform.height = height;
        })
    }

    pub fn delete_element(&mut self, id: ElementId) -> bool {
        if self.project.remove_element(id).is_none() {
            return false;
        }
        self.selected.retain(|sel| *sel != id);
        self.save_history();
        self.bump();
        true
    }

    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        let copy = self.project.duplicate_element(id)?;
        self.save_history();
        self.bump();
        Some(copy)
    }

    pub fn set_background(&mut self, color: Color) {
        if self.project.background_color != color {
            self.project.background_color = color;
            self.save_history();
            self.bump();
        }
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.structural(|p| p.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.structural(|p| p.send_to_back(id))
    }

    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        self.structural(|p| p.bring_forward(id))
    }

    pub fn send_backward(&mut self, id: ElementId) -> bool {
        self.structural(|p| p.send_backward(id))
    }

    fn structural(&mut self, op: impl FnOnce(&mut Project) -> bool) -> bool {
        if op(&mut self.project) {
            self.save_history();
            self.bump();
            true
        } else {
            false
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected(&self) -> &[ElementId] {
        &self.selected
    }

    /// Click-select. With `additive`, toggles membership instead of
    /// replacing the set.
    pub fn select(&mut self, id: ElementId, additive: bool) {
        if additive {
            if let Some(pos) = self.selected.iter().position(|sel| *sel == id) {
                self.selected.remove(pos);
            } else {
                self.selected.push(id);
            }
        } else {
            self.selected.clear();
            self.selected.push(id);
        }
        self.bump();
    }

    pub fn select_many(&mut self, ids: &[ElementId]) {
        self.selected = ids.iter().copied().collect();
        self.bump();
    }

    pub fn deselect_all(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.bump();
        }
    }

    /// Drop selection entries whose element no longer exists. Returns
    /// true when anything was removed.
    pub fn prune_selection(&mut self) -> bool {
        let before = self.selected.len();
        let project = &self.project;
        self.selected.retain(|id| project.contains(*id));
        let pruned = self.selected.len() != before;
        if pruned {
            self.bump();
        }
        pruned
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Commit the current state as one undo step (e.g. at gesture end).
    pub fn save_history(&mut self) {
        self.history.push(&self.project);
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.project = snapshot;
        self.prune_selection();
        self.bump();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.project = snapshot;
        self.prune_selection();
        self.bump();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
