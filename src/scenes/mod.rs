//! # Demo Scenes
//!
//! Ready-made [`SceneController`](crate::gfx::scene::SceneController)
//! implementations exercising the engine: the lighting showcase, GPU
//! instancing, toon shading and the fireball.

pub mod fireball;
pub mod instances;
pub mod lights;
pub mod toon;

pub use fireball::FireballScene;
pub use instances::InstanceScene;
pub use lights::LightsScene;
pub use toon::ToonScene;
