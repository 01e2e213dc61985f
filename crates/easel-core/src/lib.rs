pub mod error;
pub mod history;
pub mod id;
pub mod model;
pub mod persist;
pub mod transform;

pub use error::{CoreError, CoreResult};
pub use history::History;
pub use id::ElementId;
pub use model::*;
pub use persist::{load_project, save_project};
pub use transform::{
    LockedEdit, NodeGeometry, ScenePlacement, aspect_locked_size, changed, from_scene_geometry,
    to_scene_transform,
};
