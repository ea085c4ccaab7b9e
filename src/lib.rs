// src/lib.rs
//! Firth
//!
//! A scene-graph forward renderer built on wgpu and winit: a transform
//! hierarchy of group/primitive/model/instance nodes, a free-look camera,
//! a directional/point/spot lighting model and a per-frame render protocol
//! that uploads uniforms and submits draws in one forward pass.

pub mod app;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod scenes;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::FirthApp;
pub use error::RenderError;

use crate::gfx::scene::scene::SceneController;

/// Creates an application instance driving the given scene content.
pub fn app(controller: Box<dyn SceneController>) -> FirthApp {
    FirthApp::new(controller)
}
