//! Instancing showcase: many copies of one loaded model scattered with
//! random positions, colors and a joystick-driven camera.

use cgmath::{Vector3, Vector4};
use rand::Rng;

use crate::error::RenderError;
use crate::gfx::rendering::renderer::GpuContext;
use crate::gfx::scene::instance::Instance;
use crate::gfx::scene::model::Model;
use crate::gfx::scene::node::{Node, NodeKind};
use crate::gfx::scene::scene::{Scene, SceneController, SceneInput};

pub struct InstanceScene {
    model_path: String,
    count: usize,
}

impl InstanceScene {
    /// `model_path` names the OBJ asset every instance shares.
    pub fn new(model_path: impl Into<String>, count: usize) -> Self {
        Self {
            model_path: model_path.into(),
            count,
        }
    }
}

impl SceneController for InstanceScene {
    fn setup(&mut self, scene: &mut Scene, gpu: &mut GpuContext) -> Result<(), RenderError> {
        scene.root.name = "Instance scene".to_string();

        let model = Model::load(gpu, &self.model_path)?;
        let mut instance = Instance::new(gpu, model, self.count)?;

        let mut rng = rand::rng();
        for node in instance.nodes_mut() {
            node.position.x = rng.random_range(-2.0..4.0);
            node.position.z = rng.random_range(-3.0..3.0);
            node.scale = Vector3::new(0.5, 0.5, 0.5);
            node.material.color = Vector4::new(
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                1.0,
            );
            node.material.use_texture = false;
        }

        scene.add_child(Node::with_kind("instances", NodeKind::Instance(instance)));

        scene.camera.set(
            Vector3::new(0.0, 4.0, -15.0),
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
    }
}
