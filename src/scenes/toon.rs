//! Toon shading showcase: a magenta sphere under a cinematic orbit.

use cgmath::{Vector3, Vector4};

use crate::error::RenderError;
use crate::gfx::geometry::generate_sphere;
use crate::gfx::rendering::pipeline::ShaderVariant;
use crate::gfx::rendering::renderer::GpuContext;
use crate::gfx::scene::node::{Node, NodeKind};
use crate::gfx::scene::primitive::Primitive;
use crate::gfx::scene::scene::{Scene, SceneController, SceneInput};

pub struct ToonScene {
    camera_rotation: f32,
}

impl ToonScene {
    pub fn new() -> Self {
        Self {
            camera_rotation: 0.0,
        }
    }
}

impl Default for ToonScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneController for ToonScene {
    fn setup(&mut self, scene: &mut Scene, gpu: &mut GpuContext) -> Result<(), RenderError> {
        scene.root.name = "Toon scene".to_string();

        let primitive = Primitive::new(gpu, &generate_sphere(50, 50), ShaderVariant::Toon)?;
        let mut sphere = Node::with_kind("sphere", NodeKind::Primitive(primitive));
        sphere.material.color = Vector4::new(1.0, 0.0, 1.0, 1.0);
        sphere.scale = Vector3::new(5.0, 5.0, 5.0);
        scene.add_child(sphere);

        scene.shading.toon_edge = 0.2;

        scene.camera.set(
            Vector3::new(0.0, 10.0, -20.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );

        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, _input: &SceneInput, delta_time: f32) {
        self.camera_rotation += delta_time * 20.0;
        scene.camera.rotate_around_point(
            50.0,
            Vector3::new(0.0, 0.0, 0.0),
            self.camera_rotation,
            20.0,
        );
    }

    fn slider_changed(&mut self, scene: &mut Scene, index: usize, value: f32) {
        if index == 0 {
            scene.shading.toon_edge = value;
        }
    }
}
