//! # Firth Prelude
//!
//! One-stop imports for typical applications:
//!
//! ```no_run
//! use firth::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let app = firth::app(Box::new(ToonScene::new()));
//!     app.run()
//! }
//! ```

// Core application types
pub use crate::app::FirthApp;
pub use crate::error::RenderError;

// Scene graph and orchestration
pub use crate::gfx::scene::{
    Instance, Joystick, Material, Model, Node, NodeKind, Primitive, Scene, SceneController,
    SceneInput, ShadingParams,
};

// Camera and lighting
pub use crate::gfx::camera::Camera;
pub use crate::gfx::lighting::{Attenuation, BaseLight, DirectionalLight, PointLight, SpotLight};

// Rendering entry points
pub use crate::gfx::rendering::{GpuContext, Renderer, ShaderVariant};

// Procedural geometry
pub use crate::gfx::geometry::{
    generate_cube, generate_plane, generate_pyramid, generate_sphere, MeshData,
};

// Demo scenes
pub use crate::scenes::{FireballScene, InstanceScene, LightsScene, ToonScene};

// Common math re-exports
pub use cgmath::{Deg, InnerSpace, Rad, Vector3, Vector4, Zero};
