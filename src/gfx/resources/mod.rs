//! GPU resource management: textures and the depth buffer.

pub mod texture;

pub use texture::{DepthTexture, Texture};
