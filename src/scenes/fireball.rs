//! Fireball showcase: a displaced, texture-churned sphere whose explosion
//! amplitude and frequency hang off the shell's sliders.

use cgmath::{Vector3, Vector4};

use crate::error::RenderError;
use crate::gfx::geometry::generate_sphere;
use crate::gfx::rendering::pipeline::ShaderVariant;
use crate::gfx::rendering::renderer::GpuContext;
use crate::gfx::scene::node::{Node, NodeKind};
use crate::gfx::scene::primitive::Primitive;
use crate::gfx::scene::scene::{Scene, SceneController, SceneInput};

pub struct FireballScene {
    texture_path: String,
    /// Root-child index of the sphere, captured at setup.
    sphere_index: Option<usize>,
}

impl FireballScene {
    /// `texture_path` names the explosion image; when it cannot be loaded
    /// the sphere falls back to its flat material color.
    pub fn new(texture_path: impl Into<String>) -> Self {
        Self {
            texture_path: texture_path.into(),
            sphere_index: None,
        }
    }
}

impl SceneController for FireballScene {
    fn setup(&mut self, scene: &mut Scene, gpu: &mut GpuContext) -> Result<(), RenderError> {
        scene.root.name = "Fireball scene".to_string();

        let primitive = Primitive::with_texture(
            gpu,
            &generate_sphere(50, 50),
            ShaderVariant::Fireball,
            &self.texture_path,
        )?;
        let mut sphere = Node::with_kind("sphere", NodeKind::Primitive(primitive));
        sphere.material.color = Vector4::new(0.0, 1.0, 0.0, 1.0);
        sphere.material.use_texture = true;
        sphere.material.shininess = 32.0;
        self.sphere_index = Some(scene.add_child(sphere));

        scene.shading.fireball_frequency = 1.0;
        scene.shading.fireball_explosion = 0.2;

        scene.camera.set(
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
        );

        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, input: &SceneInput, delta_time: f32) {
        scene
            .camera
            .update_rotation(input.left_stick.angle, input.left_stick.displacement);
        scene.camera.update_movement(
            delta_time,
            input.right_stick.angle,
            input.right_stick.displacement,
        );

        // slow spin, via the handle captured at setup
        if let Some(index) = self.sphere_index {
            if let Some(sphere) = scene.root.children.get_mut(index) {
                sphere.rotation.y = -scene.time;
            }
        }
    }

    fn slider_changed(&mut self, scene: &mut Scene, index: usize, value: f32) {
        match index {
            0 => scene.shading.fireball_explosion = value,
            1 => scene.shading.fireball_frequency = value,
            _ => {}
        }
    }
}
