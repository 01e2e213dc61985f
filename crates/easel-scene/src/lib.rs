pub mod assets;
pub mod canvas;
pub mod event;
pub mod hit;
pub mod node;
pub mod paint;

pub use assets::{AssetPoll, AssetSource, DeferredAssets, StaticAssets};
pub use canvas::{Canvas, NodeStatus};
pub use event::{Origin, SceneEvent};
pub use hit::{hit_test, hit_test_rect};
pub use node::{NodeVisual, SceneNode};
pub use paint::{display_list, PaintItem};
