pub mod input;
pub mod selection;
pub mod store;
pub mod sync;
pub mod viewport;

pub use input::{InputEvent, Modifiers};
pub use selection::SelectionCoordinator;
pub use store::{EditorMode, EditorStore};
pub use sync::{ReconcileStats, SyncEngine};
pub use viewport::{PointerSession, ViewportController, MAX_ZOOM, MIN_ZOOM};
