//! # Rendering
//!
//! Pipeline construction, the shader wire protocol and the frame loop.

pub mod pipeline;
pub mod renderer;
pub mod uniforms;
pub mod vertex;

pub use pipeline::{ShaderLibrary, ShaderVariant};
pub use renderer::{GpuContext, RenderCtx, Renderer};
pub use vertex::Vertex;
