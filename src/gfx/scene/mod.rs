//! # Scene Graph
//!
//! The node tree and its renderable payloads, plus the [`Scene`]
//! orchestrator that drives them each frame.

pub mod instance;
pub mod model;
pub mod node;
pub mod primitive;
pub mod scene;

pub use instance::{Instance, InstanceSet};
pub use model::{BoundingBox, Model};
pub use node::{Material, Node, NodeKind, Renderable};
pub use primitive::Primitive;
pub use scene::{Joystick, Scene, SceneController, SceneInput, ShadingParams};
