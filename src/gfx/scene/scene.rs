//! # Scene — per-frame orchestrator
//!
//! A [`Scene`] owns the node tree, the camera, the light collections and
//! the per-frame scalars. Its render step runs the controller hook,
//! uploads the global frame data (time, shading parameters, camera info,
//! light arrays) and then walks the tree from the root with the identity
//! parent transform.
//!
//! Scene *content* lives behind the [`SceneController`] seam: the outer
//! shell forwards touch and slider input into controller hooks that
//! default to no-ops, so the core never depends on UI types.

use cgmath::{Matrix4, SquareMatrix};

use crate::error::RenderError;
use crate::gfx::camera::free_camera::Camera;
use crate::gfx::lighting::{DirectionalLight, PointLight, SpotLight};
use crate::gfx::rendering::renderer::{FrameBindings, GpuContext, RenderCtx};
use crate::gfx::rendering::uniforms::{
    FrameConstants, LightsBlock, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};
use crate::gfx::scene::node::Node;

/// Per-frame shading tunables, uploaded with the frame constants.
///
/// An explicit struct rather than ad-hoc fields so the data flow from an
/// input event to a visual change stays traceable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadingParams {
    /// Silhouette threshold for the toon variant.
    pub toon_edge: f32,
    /// Displacement frequency for the fireball variant.
    pub fireball_frequency: f32,
    /// Displacement amplitude for the fireball variant.
    pub fireball_explosion: f32,
}

/// One virtual joystick reading: direction in degrees and displacement
/// from the stick centre in 0..1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Joystick {
    pub angle: f32,
    pub displacement: f32,
}

/// Input state the shell hands the controller every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneInput {
    /// Look stick, usually fed into `Camera::update_rotation`.
    pub left_stick: Joystick,
    /// Move stick, usually fed into `Camera::update_movement`.
    pub right_stick: Joystick,
    /// Raw slider values as last reported by the shell.
    pub sliders: [f32; 6],
}

/// Root container for one view's worth of renderable content.
pub struct Scene {
    pub root: Node,
    pub camera: Camera,
    pub directional_lights: Vec<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub spot_lights: Vec<SpotLight>,
    /// Elapsed scene time, accumulated from frame deltas.
    pub time: f32,
    pub shading: ShadingParams,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            root: Node::group("root"),
            camera,
            directional_lights: Vec::new(),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            time: 0.0,
            shading: ShadingParams::default(),
        }
    }

    /// Adds a top-level node. Returns its index under the root so
    /// controllers can keep a direct handle instead of re-searching the
    /// tree by name every frame.
    pub fn add_child(&mut self, node: Node) -> usize {
        self.root.add_child(node);
        self.root.children.len() - 1
    }

    /// Depth-first lookup by name, for ad-hoc access. Prefer the index
    /// returned by [`Scene::add_child`] in per-frame code.
    pub fn node_named(&self, name: &str) -> Option<&Node> {
        if self.root.name == name {
            Some(&self.root)
        } else {
            self.root.child_named(name)
        }
    }

    pub fn node_named_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.root.name == name {
            Some(&mut self.root)
        } else {
            self.root.child_named_mut(name)
        }
    }

    /// Forwards a surface resize to the camera projections.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Encodes one frame of this scene: accumulate time, upload frame
    /// constants and light arrays, then render the tree.
    pub(crate) fn render(
        &mut self,
        ctx: &mut RenderCtx,
        frame: &mut FrameBindings,
        delta_time: f32,
    ) -> Result<(), RenderError> {
        self.time += delta_time;

        let constants = self.frame_constants();
        let lights = self.lights_block()?;
        frame.upload(ctx.queue, constants, lights);
        frame.bind(&mut ctx.pass);

        let scene_origin = Matrix4::identity();
        self.root.render(ctx, scene_origin, &self.camera)
    }

    pub(crate) fn frame_constants(&self) -> FrameConstants {
        FrameConstants {
            camera_position: self.camera.position.into(),
            time: self.time,
            camera_front: self.camera.front.into(),
            toon_edge: self.shading.toon_edge,
            fireball_frequency: self.shading.fireball_frequency,
            fireball_explosion: self.shading.fireball_explosion,
            _padding: [0.0; 2],
        }
    }

    /// Packs the light collections into the fixed-capacity GPU block.
    /// Exceeding a shader-side array is an explicit error rather than a
    /// silent visual corruption.
    pub(crate) fn lights_block(&self) -> Result<LightsBlock, RenderError> {
        if self.directional_lights.len() > MAX_DIRECTIONAL_LIGHTS {
            return Err(RenderError::TooManyLights {
                kind: "directional",
                count: self.directional_lights.len(),
                capacity: MAX_DIRECTIONAL_LIGHTS,
            });
        }
        if self.point_lights.len() > MAX_POINT_LIGHTS {
            return Err(RenderError::TooManyLights {
                kind: "point",
                count: self.point_lights.len(),
                capacity: MAX_POINT_LIGHTS,
            });
        }
        if self.spot_lights.len() > MAX_SPOT_LIGHTS {
            return Err(RenderError::TooManyLights {
                kind: "spot",
                count: self.spot_lights.len(),
                capacity: MAX_SPOT_LIGHTS,
            });
        }

        let mut block = LightsBlock::default();
        for (slot, light) in block.directional.iter_mut().zip(&self.directional_lights) {
            *slot = light.to_gpu();
        }
        for (slot, light) in block.point.iter_mut().zip(&self.point_lights) {
            *slot = light.to_gpu();
        }
        for (slot, light) in block.spot.iter_mut().zip(&self.spot_lights) {
            *slot = light.to_gpu();
        }
        block.counts = [
            self.directional_lights.len() as u32,
            self.point_lights.len() as u32,
            self.spot_lights.len() as u32,
            0,
        ];
        Ok(block)
    }
}

/// Scene content hook: one-time construction plus per-frame reaction.
///
/// Touch and slider hooks default to no-ops; the application shell calls
/// them without knowing what, if anything, a scene does with input.
#[allow(unused_variables)]
pub trait SceneController {
    /// One-time construction of the node tree, lights and camera
    /// placement. Resource failures here are setup failures.
    fn setup(&mut self, scene: &mut Scene, gpu: &mut GpuContext) -> Result<(), RenderError>;

    /// Per-frame animation and input reaction, run before any upload.
    fn update(&mut self, scene: &mut Scene, input: &SceneInput, delta_time: f32) {}

    fn touch_began(&mut self, scene: &mut Scene, x: f32, y: f32) {}
    fn touch_moved(&mut self, scene: &mut Scene, x: f32, y: f32) {}
    fn touch_ended(&mut self, scene: &mut Scene, x: f32, y: f32) {}
    fn touch_cancelled(&mut self, scene: &mut Scene) {}

    /// A shell slider changed. `index` matches `SceneInput::sliders`.
    fn slider_changed(&mut self, scene: &mut Scene, index: usize, value: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn test_scene() -> Scene {
        Scene::new(Camera::new(45.0, 800.0, 600.0, 0.1, 1000.0))
    }

    #[test]
    fn test_lights_block_counts() {
        let mut scene = test_scene();
        scene.directional_lights.push(DirectionalLight::default());
        for i in 0..3 {
            scene.point_lights.push(PointLight::new(
                Vector3::new(1.0, 1.0, 1.0),
                Vector3::new(i as f32, 0.0, 0.0),
                1.0,
            ));
        }

        let block = scene.lights_block().unwrap();
        assert_eq!(block.counts, [1, 3, 0, 0]);
        assert_eq!(block.point[2].position, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_too_many_lights_is_an_error() {
        let mut scene = test_scene();
        for _ in 0..(MAX_POINT_LIGHTS + 1) {
            scene.point_lights.push(PointLight::default());
        }
        assert!(matches!(
            scene.lights_block(),
            Err(RenderError::TooManyLights { kind: "point", .. })
        ));
    }

    #[test]
    fn test_add_child_returns_stable_index() {
        let mut scene = test_scene();
        let a = scene.add_child(Node::group("a"));
        let b = scene.add_child(Node::group("b"));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(scene.root.children[b].name, "b");
    }

    #[test]
    fn test_node_lookup_reaches_grandchildren() {
        let mut scene = test_scene();
        let mut parent = Node::group("parent");
        parent.add_child(Node::group("inner"));
        scene.add_child(parent);

        assert!(scene.node_named("inner").is_some());
        assert!(scene.node_named("root").is_some());
        assert!(scene.node_named("nope").is_none());
    }

    #[test]
    fn test_frame_constants_mirror_scene_state() {
        let mut scene = test_scene();
        scene.time = 2.5;
        scene.shading.toon_edge = 0.3;
        scene.camera.set(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(1.0, 2.0, 4.0),
            Vector3::new(0.0, 1.0, 0.0),
        );

        let constants = scene.frame_constants();
        assert_eq!(constants.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(constants.time, 2.5);
        assert_eq!(constants.toon_edge, 0.3);
        assert!((constants.camera_front[2] - 1.0).abs() < 1e-5);
    }
}
