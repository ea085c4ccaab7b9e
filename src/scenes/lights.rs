//! Lighting showcase: one sun, five colored point lights with marker
//! cubes, and a spot light riding the camera. Sliders tune the spot cone,
//! intensity and shininess.

use cgmath::{Vector3, Vector4};

use crate::error::RenderError;
use crate::gfx::geometry::generate_cube;
use crate::gfx::lighting::{DirectionalLight, PointLight, SpotLight};
use crate::gfx::rendering::pipeline::ShaderVariant;
use crate::gfx::rendering::renderer::GpuContext;
use crate::gfx::scene::node::{Node, NodeKind};
use crate::gfx::scene::primitive::Primitive;
use crate::gfx::scene::scene::{Scene, SceneController, SceneInput};

const SUN_DIRECTION: Vector3<f32> = Vector3::new(-0.2, -1.0, -0.3);

const POINT_LIGHT_POSITIONS: [Vector3<f32>; 5] = [
    Vector3::new(-4.0, 2.0, -12.0),
    Vector3::new(-5.7, 6.2, 2.0),
    Vector3::new(1.0, 3.0, -2.0),
    Vector3::new(2.3, -3.3, -4.0),
    Vector3::new(10.0, 0.0, -3.0),
];

const POINT_LIGHT_COLORS: [Vector3<f32>; 5] = [
    Vector3::new(0.6, 0.1, 0.25),
    Vector3::new(0.2, 0.7, 0.9),
    Vector3::new(1.0, 0.9, 0.0),
    Vector3::new(0.05, 0.1, 0.9),
    Vector3::new(0.34, 0.75, 0.2),
];

pub struct LightsScene {
    light_cutoff: f32,
    light_outer_cutoff: f32,
    light_intensity: f32,
    /// Root-child indices of the marker cubes, captured at setup so the
    /// update step never searches the tree by name.
    marker_indices: Vec<usize>,
}

impl LightsScene {
    pub fn new() -> Self {
        Self {
            light_cutoff: 1.0,
            light_outer_cutoff: 10.0,
            light_intensity: 10.0,
            marker_indices: Vec::new(),
        }
    }
}

impl Default for LightsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneController for LightsScene {
    fn setup(&mut self, scene: &mut Scene, gpu: &mut GpuContext) -> Result<(), RenderError> {
        scene.root.name = "Lights scene".to_string();

        scene
            .directional_lights
            .push(DirectionalLight::new(Vector3::new(1.0, 1.0, 1.0), SUN_DIRECTION));

        let cube = generate_cube();
        for (i, (&position, &color)) in POINT_LIGHT_POSITIONS
            .iter()
            .zip(POINT_LIGHT_COLORS.iter())
            .enumerate()
        {
            // a small unlit cube marks each light's position
            let primitive = Primitive::new(gpu, &cube, ShaderVariant::Color)?;
            let mut marker = Node::with_kind(format!("point light {i}"), NodeKind::Primitive(primitive));
            marker.position = position;
            marker.scale = Vector3::new(0.2, 0.2, 0.2);
            marker.material.color = Vector4::new(color.x, color.y, color.z, 1.0);
            self.marker_indices.push(scene.add_child(marker));

            scene
                .point_lights
                .push(PointLight::new(color, position, self.light_intensity));
        }

        scene.spot_lights.push(SpotLight::new(
            Vector3::new(1.0, 1.0, 1.0),
            scene.camera.position,
            Vector3::new(-2.0, 0.0, 0.0),
            self.light_cutoff,
            self.light_outer_cutoff,
        ));

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

        // breathe the point light colors and keep the markers in sync
        let time = scene.time;
        let breathing = Vector3::new(
            (time * 0.1).sin().abs(),
            (time * 0.06).sin().abs(),
            (time * 0.03).sin().abs(),
        );
        for (light, &marker) in scene.point_lights.iter_mut().zip(&self.marker_indices) {
            light.base.intensity = self.light_intensity;
            let color = Vector3::new(
                light.base.color.x.max(0.05) * (0.5 + 0.5 * breathing.x),
                light.base.color.y.max(0.05) * (0.5 + 0.5 * breathing.y),
                light.base.color.z.max(0.05) * (0.5 + 0.5 * breathing.z),
            );
            if let Some(node) = scene.root.children.get_mut(marker) {
                node.material.color = Vector4::new(color.x, color.y, color.z, 1.0);
            }
        }

        // the spot light follows the camera like a head lamp
        if let Some(spot) = scene.spot_lights.first_mut() {
            spot.point.position = scene.camera.position;
            spot.direction = scene.camera.front;
            spot.set_cutoff(self.light_cutoff, self.light_outer_cutoff);
        }
    }

    fn slider_changed(&mut self, scene: &mut Scene, index: usize, value: f32) {
        match index {
            2 => self.light_cutoff = value,
            3 => self.light_outer_cutoff = value,
            4 => self.light_intensity = value,
            5 => {
                for marker in &self.marker_indices {
                    if let Some(node) = scene.root.children.get_mut(*marker) {
                        node.material.shininess = value;
                    }
                }
            }
            _ => {}
        }
    }
}
