//! Events emitted by the retained scene.
//!
//! The scene notifies listeners of every mutation — including the ones the
//! sync engine itself caused. Each event therefore carries an [`Origin`]:
//! programmatic writes are tagged with the monotonic push generation so
//! the opposite-direction handler can drop the echo, while user events are
//! never suppressed. Only geometry and selection mutations produce events;
//! style-only writes are silent.

use easel_core::transform::NodeGeometry;
use easel_core::ElementId;

/// Where a scene mutation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Direct user interaction (drag, scale, rotate, marquee, typing).
    User,
    /// A push from the document side, stamped with its generation.
    Programmatic { generation: u64 },
}

impl Origin {
    pub fn is_programmatic(&self) -> bool {
        matches!(self, Origin::Programmatic { .. })
    }
}

/// A notification drained from the scene's event queue.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// A node's geometry changed (move, scale, rotate).
    NodeModified {
        id: ElementId,
        geometry: NodeGeometry,
        origin: Origin,
    },
    /// Inline text editing changed a text node's content.
    TextEdited {
        id: ElementId,
        content: String,
        origin: Origin,
    },
    /// The active selection changed (click, marquee, or programmatic).
    SelectionChanged { ids: Vec<ElementId>, origin: Origin },
    /// An asset-backed node failed to load. Recoverable: the element stays
    /// in the document and the load may be retried.
    AssetFailed {
        id: ElementId,
        src: String,
        reason: String,
    },
}
