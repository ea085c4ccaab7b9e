//! # Primitive Renderables
//!
//! A [`Primitive`] owns GPU geometry authored procedurally (see
//! `gfx::geometry`), its pipeline and sampler, and optional color/mask
//! textures. Whether the draw is indexed is decided once from the mesh
//! data and never changes afterwards.

use std::sync::Arc;

use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::gfx::camera::free_camera::Camera;
use crate::gfx::geometry::MeshData;
use crate::gfx::rendering::pipeline::{build_sampler_state, ShaderVariant, TextureSlots};
use crate::gfx::rendering::renderer::{GpuContext, RenderCtx};
use crate::gfx::rendering::uniforms::{DrawUniforms, DRAW_GROUP, MATERIAL_GROUP, TEXTURE_GROUP};
use crate::gfx::resources::texture::{texture_bind_group, Texture};
use crate::gfx::scene::node::{Material, Renderable};

/// The draw call a renderable resolved to for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawCommand {
    /// Indexed draw over this many indices.
    Indexed(u32),
    /// Non-indexed draw over this many vertices.
    NonIndexed(u32),
}

/// Resolves the indexed/non-indexed choice into a concrete draw call.
///
/// An indexed primitive without index data is an error, not a silent
/// no-draw.
pub(crate) fn select_draw_command(
    use_indices: bool,
    vertex_count: u32,
    index_count: Option<u32>,
) -> Result<DrawCommand, RenderError> {
    if use_indices {
        match index_count {
            Some(count) if count > 0 => Ok(DrawCommand::Indexed(count)),
            _ => Err(RenderError::MissingIndices),
        }
    } else {
        Ok(DrawCommand::NonIndexed(vertex_count))
    }
}

/// A node payload with procedurally authored geometry.
pub struct Primitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
    use_indices: bool,
    shader: ShaderVariant,
    pipeline: Arc<wgpu::RenderPipeline>,
    #[allow(dead_code)]
    sampler: wgpu::Sampler,
    texture_bindings: Option<wgpu::BindGroup>,
}

impl Primitive {
    /// Builds an untextured primitive from mesh data.
    pub fn new(
        gpu: &mut GpuContext,
        mesh: &MeshData,
        shader: ShaderVariant,
    ) -> Result<Self, RenderError> {
        Self::build(gpu, mesh, shader, None, None)
    }

    /// Builds a primitive with a color texture loaded from `image_path`.
    /// If the image cannot be loaded the shader falls back to its
    /// untextured variant and the draw proceeds with flat material color.
    pub fn with_texture(
        gpu: &mut GpuContext,
        mesh: &MeshData,
        shader: ShaderVariant,
        image_path: &str,
    ) -> Result<Self, RenderError> {
        Self::build(gpu, mesh, shader, Some(image_path), None)
    }

    /// Builds a primitive with color and mask textures.
    pub fn with_mask(
        gpu: &mut GpuContext,
        mesh: &MeshData,
        image_path: &str,
        mask_path: &str,
    ) -> Result<Self, RenderError> {
        Self::build(
            gpu,
            mesh,
            ShaderVariant::PhongMask,
            Some(image_path),
            Some(mask_path),
        )
    }

    fn build(
        gpu: &mut GpuContext,
        mesh: &MeshData,
        requested: ShaderVariant,
        image_path: Option<&str>,
        mask_path: Option<&str>,
    ) -> Result<Self, RenderError> {
        let use_indices = mesh.is_indexed();

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Primitive Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = if use_indices {
            Some(
                gpu.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Primitive Index Buffer"),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
            )
        } else {
            None
        };

        let sampler = build_sampler_state(&gpu.device);

        let color = image_path.and_then(|path| Texture::load(&gpu.device, &gpu.queue, path));
        let mask = mask_path.and_then(|path| Texture::load(&gpu.device, &gpu.queue, path));

        let (shader, texture_bindings) = resolve_textures(gpu, requested, color, mask, &sampler);
        let pipeline = gpu.pipeline(shader)?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.index_count() as u32,
            use_indices,
            shader,
            pipeline,
            sampler,
            texture_bindings,
        })
    }

    /// The shader variant actually in use after texture resolution.
    pub fn shader(&self) -> ShaderVariant {
        self.shader
    }

    pub fn has_texture(&self) -> bool {
        self.texture_bindings.is_some()
    }

    pub(crate) fn draw_command(&self) -> Result<DrawCommand, RenderError> {
        select_draw_command(
            self.use_indices,
            self.vertex_count,
            self.index_buffer.as_ref().map(|_| self.index_count),
        )
    }
}

/// Picks the effective shader variant from the textures that actually
/// loaded and builds the texture bind group for it.
pub(crate) fn resolve_textures(
    gpu: &GpuContext,
    requested: ShaderVariant,
    color: Option<Texture>,
    mask: Option<Texture>,
    sampler: &wgpu::Sampler,
) -> (ShaderVariant, Option<wgpu::BindGroup>) {
    match requested.texture_slots() {
        TextureSlots::None => (requested, None),
        TextureSlots::Color => match color {
            Some(color) => {
                let group = texture_bind_group(
                    &gpu.device,
                    &gpu.layouts.color_texture,
                    &color,
                    None,
                    sampler,
                );
                (requested, Some(group))
            }
            None => (requested.untextured_fallback(), None),
        },
        TextureSlots::ColorAndMask => match (color, mask) {
            (Some(color), Some(mask)) => {
                let group = texture_bind_group(
                    &gpu.device,
                    &gpu.layouts.mask_texture,
                    &color,
                    Some(&mask),
                    sampler,
                );
                (requested, Some(group))
            }
            (Some(color), None) => {
                // keep the color map, drop the mask stage
                let group = texture_bind_group(
                    &gpu.device,
                    &gpu.layouts.color_texture,
                    &color,
                    None,
                    sampler,
                );
                (ShaderVariant::PhongTextured, Some(group))
            }
            (None, _) => (requested.untextured_fallback(), None),
        },
    }
}

impl Renderable for Primitive {
    fn draw(
        &mut self,
        ctx: &mut RenderCtx,
        model_matrix: Matrix4<f32>,
        camera: &Camera,
        material: &Material,
    ) -> Result<(), RenderError> {
        let command = self.draw_command()?;

        ctx.pass.set_pipeline(&self.pipeline);

        // model-space normal matrix on this path
        let uniforms = DrawUniforms::new(
            camera,
            model_matrix,
            Camera::normal_matrix_model(model_matrix),
        );
        let uniforms_offset = ctx.transient.push(ctx.queue, &uniforms)?;
        ctx.pass
            .set_bind_group(DRAW_GROUP, ctx.transient.bind_group(), &[uniforms_offset]);

        let material_offset = ctx.transient.push(ctx.queue, &material.to_gpu())?;
        ctx.pass
            .set_bind_group(MATERIAL_GROUP, ctx.transient.bind_group(), &[material_offset]);

        if let Some(bindings) = &self.texture_bindings {
            ctx.pass.set_bind_group(TEXTURE_GROUP, bindings, &[]);
        }

        ctx.pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        match command {
            DrawCommand::Indexed(count) => {
                // draw_command already proved the buffer exists
                let index_buffer = self.index_buffer.as_ref().ok_or(RenderError::MissingIndices)?;
                ctx.pass
                    .set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                ctx.pass.draw_indexed(0..count, 0, 0..1);
            }
            DrawCommand::NonIndexed(count) => {
                ctx.pass.draw(0..count, 0..1);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_indexed_draw_covers_vertex_array() {
        let command = select_draw_command(false, 36, None).unwrap();
        assert_eq!(command, DrawCommand::NonIndexed(36));
        // a stray index count changes nothing for non-indexed primitives
        let command = select_draw_command(false, 36, Some(12)).unwrap();
        assert_eq!(command, DrawCommand::NonIndexed(36));
    }

    #[test]
    fn test_indexed_draw_covers_index_array() {
        let command = select_draw_command(true, 24, Some(36)).unwrap();
        assert_eq!(command, DrawCommand::Indexed(36));
    }

    #[test]
    fn test_indexed_draw_without_indices_is_an_error() {
        assert!(matches!(
            select_draw_command(true, 24, None),
            Err(RenderError::MissingIndices)
        ));
        assert!(matches!(
            select_draw_command(true, 24, Some(0)),
            Err(RenderError::MissingIndices)
        ));
    }
}
