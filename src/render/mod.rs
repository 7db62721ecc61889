//! Rendering interfaces and GPU resources

pub mod renderer;
pub mod filter;
pub mod gpu;

pub use renderer::{RecordingRenderer, RenderCall, VisibilityRenderer};
pub use filter::{should_draw_render_object, CollisionProperties, CollisionType, RenderObject, RenderObjectKind};
pub use gpu::{ControlPointUniform, CUBEMAP_SIZE};
