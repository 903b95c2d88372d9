//! Presentation layer
//!
//! The presenter draws onto a `Surface`; `ShapeBatch` tessellates it into
//! triangles that the wgpu pipeline uploads each frame. Text goes to a
//! separate 2D layer owned by the host.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::Presenter;
pub use surface::{ShapeBatch, Surface, TextAlign, TextCommand};
pub use vertex::Vertex;
