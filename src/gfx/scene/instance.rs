//! # GPU Instancing
//!
//! An [`Instance`] renders one shared [`Model`] many times in a single
//! draw call. Each instance is a lightweight [`Node`] with its own
//! transform and material; every frame the per-instance uniform blocks are
//! repacked and uploaded into one storage buffer indexed by
//! `instance_index` on the GPU.
//!
//! Invariant: the instance node list, the CPU-side block list and the
//! GPU buffer element count stay in lock-step through every add/remove.

use cgmath::Matrix4;
use std::sync::Arc;

use crate::error::RenderError;
use crate::gfx::camera::free_camera::Camera;
use crate::gfx::rendering::pipeline::ShaderVariant;
use crate::gfx::rendering::renderer::{GpuContext, RenderCtx};
use crate::gfx::rendering::uniforms::{
    DrawUniforms, InstanceUniforms, DRAW_GROUP, MATERIAL_GROUP, TEXTURE_GROUP,
};
use crate::gfx::scene::model::Model;
use crate::gfx::scene::node::{Material, Node, Renderable};
use crate::wgpu_utils::binding_builder::BindGroupBuilder;
use crate::wgpu_utils::uniform_buffer::ArrayBuffer;

/// The CPU side of the instancing contract: instance nodes and their
/// uniform blocks, kept the same length at all times.
pub struct InstanceSet {
    nodes: Vec<Node>,
    blocks: Vec<InstanceUniforms>,
}

impl InstanceSet {
    pub fn new(count: usize) -> Self {
        let nodes = (0..count)
            .map(|i| Node::group(format!("instance {i}")))
            .collect();
        Self {
            nodes,
            blocks: vec![InstanceUniforms::default(); count],
        }
    }

    /// Appends one instance node.
    pub fn push(&mut self) {
        let index = self.nodes.len();
        self.nodes.push(Node::group(format!("instance {index}")));
        self.blocks.push(InstanceUniforms::default());
    }

    /// Removes the instance at `index`, shifting the rest down.
    pub fn remove(&mut self, index: usize) -> Result<(), RenderError> {
        if index >= self.nodes.len() {
            return Err(RenderError::InstanceIndex {
                index,
                count: self.nodes.len(),
            });
        }
        self.nodes.remove(index);
        self.blocks.remove(index);
        Ok(())
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.nodes.len(), self.blocks.len());
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Recomputes every instance's world matrix under `parent_matrix` and
    /// packs the per-instance blocks. Returns the packed slice for upload.
    pub(crate) fn write_blocks(
        &mut self,
        parent_matrix: Matrix4<f32>,
        camera: &Camera,
    ) -> &[InstanceUniforms] {
        for (node, block) in self.nodes.iter_mut().zip(self.blocks.iter_mut()) {
            node.model_matrix = node.local_matrix();
            let world_matrix = parent_matrix * node.model_matrix;
            block.uniforms = DrawUniforms::new(
                camera,
                world_matrix,
                Camera::normal_matrix_model(world_matrix),
            );
            block.material = node.material.to_gpu();
        }
        &self.blocks
    }
}

/// A node payload drawing a shared model with per-instance transforms in
/// one instanced draw call.
pub struct Instance {
    model: Model,
    set: InstanceSet,
    buffer: ArrayBuffer<InstanceUniforms>,
    bind_group: wgpu::BindGroup,
    pipeline: Arc<wgpu::RenderPipeline>,
}

impl Instance {
    /// Wraps `model` with `count` instance nodes. The instanced shader
    /// variant follows the model's texture state.
    pub fn new(gpu: &mut GpuContext, model: Model, count: usize) -> Result<Self, RenderError> {
        let shader = if model.has_texture() {
            ShaderVariant::InstancedTextured
        } else {
            ShaderVariant::Instanced
        };
        let pipeline = gpu.pipeline(shader)?;
        let set = InstanceSet::new(count);
        let (buffer, bind_group) = build_instance_buffer(gpu, count);

        Ok(Self {
            model,
            set,
            buffer,
            bind_group,
            pipeline,
        })
    }

    /// Appends one instance and rebuilds the GPU block buffer at the new
    /// size, keeping buffer length and node count in lock-step.
    pub fn add_instance(&mut self, gpu: &GpuContext) -> &mut Node {
        self.set.push();
        self.rebuild_buffer(gpu);
        self.set
            .nodes_mut()
            .last_mut()
            .expect("instance set cannot be empty after push")
    }

    /// Removes the instance at `index` and rebuilds the GPU block buffer.
    /// O(n) in the instance count; the block array is rewritten every
    /// frame anyway.
    pub fn remove_instance(&mut self, gpu: &GpuContext, index: usize) -> Result<(), RenderError> {
        self.set.remove(index)?;
        self.rebuild_buffer(gpu);
        Ok(())
    }

    fn rebuild_buffer(&mut self, gpu: &GpuContext) {
        let (buffer, bind_group) = build_instance_buffer(gpu, self.set.len());
        self.buffer = buffer;
        self.bind_group = bind_group;
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        self.set.nodes()
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        self.set.nodes_mut()
    }

    /// GPU-side element capacity, equal to the node count by invariant.
    pub fn buffer_element_count(&self) -> usize {
        self.buffer.capacity()
    }
}

fn build_instance_buffer(
    gpu: &GpuContext,
    count: usize,
) -> (ArrayBuffer<InstanceUniforms>, wgpu::BindGroup) {
    let buffer = ArrayBuffer::new(&gpu.device, count);
    let bind_group = BindGroupBuilder::new(&gpu.layouts.instances)
        .resource(buffer.binding_resource())
        .create(&gpu.device, "Instance Block Bind Group");
    (buffer, bind_group)
}

impl Renderable for Instance {
    fn draw(
        &mut self,
        ctx: &mut RenderCtx,
        model_matrix: Matrix4<f32>,
        camera: &Camera,
        material: &Material,
    ) -> Result<(), RenderError> {
        if self.set.is_empty() {
            return Ok(());
        }
        debug_assert_eq!(self.set.len(), self.buffer.capacity());

        let blocks = self.set.write_blocks(model_matrix, camera);
        self.buffer.update_data(ctx.queue, blocks);

        ctx.pass.set_pipeline(&self.pipeline);
        ctx.pass.set_bind_group(DRAW_GROUP, &self.bind_group, &[]);

        let material_offset = ctx.transient.push(ctx.queue, &material.to_gpu())?;
        ctx.pass
            .set_bind_group(MATERIAL_GROUP, ctx.transient.bind_group(), &[material_offset]);

        if let Some(bindings) = self.model.texture_bindings() {
            ctx.pass.set_bind_group(TEXTURE_GROUP, bindings, &[]);
        }

        let instance_count = self.set.len() as u32;
        for mesh in self.model.meshes() {
            ctx.pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            for submesh in &mesh.submeshes {
                ctx.pass
                    .set_index_buffer(submesh.index_buffer.slice(..), submesh.format);
                ctx.pass
                    .draw_indexed(0..submesh.index_count, 0, 0..instance_count);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn test_set_starts_in_lock_step() {
        let set = InstanceSet::new(40);
        assert_eq!(set.len(), 40);
        assert_eq!(set.nodes().len(), set.block_count());
    }

    #[test]
    fn test_set_stays_in_lock_step_through_mutations() {
        let mut set = InstanceSet::new(3);
        set.push();
        set.push();
        assert_eq!(set.nodes().len(), set.block_count());

        set.remove(0).unwrap();
        set.remove(2).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.nodes().len(), set.block_count());

        // arbitrary interleaving
        for i in 0..10 {
            if i % 3 == 0 && !set.is_empty() {
                set.remove(0).unwrap();
            } else {
                set.push();
            }
            assert_eq!(set.nodes().len(), set.block_count());
        }
    }

    #[test]
    fn test_remove_out_of_range_is_an_error() {
        let mut set = InstanceSet::new(2);
        assert!(matches!(
            set.remove(2),
            Err(RenderError::InstanceIndex { index: 2, count: 2 })
        ));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_blocks_compose_parent_and_local_transforms() {
        let mut set = InstanceSet::new(1);
        set.nodes_mut()[0].position = Vector3::new(0.0, 0.0, 3.0);

        let camera = Camera::new(45.0, 800.0, 600.0, 0.1, 1000.0);
        let parent = Matrix4::from_translation(Vector3::new(1.0, 2.0, 0.0));
        let blocks = set.write_blocks(parent, &camera);

        // world translation lands in the last column of the model matrix
        let model = blocks[0].uniforms.model;
        assert!((model[3][0] - 1.0).abs() < 1e-5);
        assert!((model[3][1] - 2.0).abs() < 1e-5);
        assert!((model[3][2] - 3.0).abs() < 1e-5);

        // identity parent keeps the local translation only
        let blocks = set.write_blocks(Matrix4::identity(), &camera);
        let model = blocks[0].uniforms.model;
        assert!((model[3][0]).abs() < 1e-5);
        assert!((model[3][2] - 3.0).abs() < 1e-5);
    }
}
