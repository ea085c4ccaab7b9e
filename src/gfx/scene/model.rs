//! # Loaded Model Renderables
//!
//! A [`Model`] owns geometry loaded from an external OBJ asset: one vertex
//! buffer per mesh and one index buffer per submesh, each submesh drawn
//! with its own index range and format. A missing or unparsable asset is a
//! setup-time failure; a missing texture is not.

use std::sync::Arc;

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::gfx::camera::free_camera::Camera;
use crate::gfx::geometry::MeshData;
use crate::gfx::rendering::pipeline::{build_sampler_state, ShaderVariant};
use crate::gfx::rendering::renderer::{GpuContext, RenderCtx};
use crate::gfx::rendering::uniforms::{DrawUniforms, DRAW_GROUP, MATERIAL_GROUP, TEXTURE_GROUP};
use crate::gfx::rendering::vertex::Vertex;
use crate::gfx::resources::texture::Texture;
use crate::gfx::scene::node::{Material, Renderable};
use crate::gfx::scene::primitive::resolve_textures;

/// Axis-aligned bounds of a loaded asset.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    /// Computes bounds over a flat `[x, y, z, x, y, z, ..]` position list.
    pub fn from_positions(positions: &[f32]) -> Self {
        let mut min = Vector3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vector3::new(f32::MIN, f32::MIN, f32::MIN);
        for point in positions.chunks_exact(3) {
            min.x = min.x.min(point[0]);
            min.y = min.y.min(point[1]);
            min.z = min.z.min(point[2]);
            max.x = max.x.max(point[0]);
            max.y = max.y.max(point[1]);
            max.z = max.z.max(point[2]);
        }
        if positions.is_empty() {
            return Self::zero();
        }
        Self { min, max }
    }

    pub fn zero() -> Self {
        Self {
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    fn merge(&mut self, other: &BoundingBox) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.min.z = self.min.z.min(other.min.z);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
        self.max.z = self.max.z.max(other.max.z);
    }
}

/// One index range within a mesh, drawn as its own sub-draw.
pub(crate) struct Submesh {
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub format: wgpu::IndexFormat,
}

/// One vertex buffer and the submeshes indexing into it.
pub(crate) struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub submeshes: Vec<Submesh>,
}

/// A node payload with geometry loaded from a named mesh asset.
pub struct Model {
    meshes: Vec<MeshBuffers>,
    shader: ShaderVariant,
    pipeline: Arc<wgpu::RenderPipeline>,
    #[allow(dead_code)]
    sampler: wgpu::Sampler,
    texture_bindings: Option<wgpu::BindGroup>,
    pub bounds: BoundingBox,
}

impl Model {
    /// Loads an OBJ asset with flat forward lighting.
    pub fn load(gpu: &mut GpuContext, path: &str) -> Result<Self, RenderError> {
        Self::load_with_shader(gpu, path, ShaderVariant::Phong, None)
    }

    /// Loads an OBJ asset with a color texture.
    pub fn load_with_texture(
        gpu: &mut GpuContext,
        path: &str,
        image_path: &str,
    ) -> Result<Self, RenderError> {
        Self::load_with_shader(gpu, path, ShaderVariant::PhongTextured, Some(image_path))
    }

    /// Loads an OBJ asset with an explicit shader variant.
    pub fn load_with_shader(
        gpu: &mut GpuContext,
        path: &str,
        shader: ShaderVariant,
        image_path: Option<&str>,
    ) -> Result<Self, RenderError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| RenderError::AssetLoad {
            path: path.to_string(),
            source,
        })?;

        if models.is_empty() {
            return Err(RenderError::EmptyAsset(path.to_string()));
        }

        let mut meshes = Vec::with_capacity(models.len());
        let mut bounds = BoundingBox::zero();
        let mut first = true;

        for model in &models {
            let mesh = &model.mesh;

            let normals = if mesh.normals.len() == mesh.positions.len() && !mesh.normals.is_empty()
            {
                mesh.normals.clone()
            } else {
                compute_vertex_normals(&mesh.positions, &mesh.indices)
            };

            let vertex_count = mesh.positions.len() / 3;
            let mut vertices = Vec::with_capacity(vertex_count);
            for i in 0..vertex_count {
                let texcoord = if mesh.texcoords.len() >= (i + 1) * 2 {
                    [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                };
                let color = if mesh.vertex_color.len() >= (i + 1) * 3 {
                    [
                        mesh.vertex_color[i * 3],
                        mesh.vertex_color[i * 3 + 1],
                        mesh.vertex_color[i * 3 + 2],
                        1.0,
                    ]
                } else {
                    [1.0, 1.0, 1.0, 1.0]
                };
                vertices.push(Vertex::new(
                    [
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    ],
                    texcoord,
                    color,
                    [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                ));
            }

            let mesh_bounds = BoundingBox::from_positions(&mesh.positions);
            if first {
                bounds = mesh_bounds;
                first = false;
            } else {
                bounds.merge(&mesh_bounds);
            }

            let vertex_buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

            let index_buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Model Index Buffer"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

            meshes.push(MeshBuffers {
                vertex_buffer,
                submeshes: vec![Submesh {
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    format: wgpu::IndexFormat::Uint32,
                }],
            });
        }

        Self::finish(gpu, meshes, bounds, shader, image_path)
    }

    /// Builds a model from in-memory mesh data, reusing the procedural
    /// generators as an instancing mesh source.
    pub fn from_mesh_data(
        gpu: &mut GpuContext,
        mesh: &MeshData,
        shader: ShaderVariant,
        image_path: Option<&str>,
    ) -> Result<Self, RenderError> {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        // non-indexed mesh data gets an identity index list so the draw
        // loop stays uniform across submeshes
        let indices: Vec<u16> = if mesh.is_indexed() {
            mesh.indices.clone()
        } else {
            (0..mesh.vertex_count() as u16).collect()
        };

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let positions: Vec<f32> = mesh
            .vertices
            .iter()
            .flat_map(|v| v.position.into_iter())
            .collect();

        let meshes = vec![MeshBuffers {
            vertex_buffer,
            submeshes: vec![Submesh {
                index_buffer,
                index_count: indices.len() as u32,
                format: wgpu::IndexFormat::Uint16,
            }],
        }];

        Self::finish(
            gpu,
            meshes,
            BoundingBox::from_positions(&positions),
            shader,
            image_path,
        )
    }

    fn finish(
        gpu: &mut GpuContext,
        meshes: Vec<MeshBuffers>,
        bounds: BoundingBox,
        requested: ShaderVariant,
        image_path: Option<&str>,
    ) -> Result<Self, RenderError> {
        let sampler = build_sampler_state(&gpu.device);
        let color = image_path.and_then(|path| Texture::load(&gpu.device, &gpu.queue, path));
        let (shader, texture_bindings) = resolve_textures(gpu, requested, color, None, &sampler);
        let pipeline = gpu.pipeline(shader)?;

        Ok(Self {
            meshes,
            shader,
            pipeline,
            sampler,
            texture_bindings,
            bounds,
        })
    }

    pub fn shader(&self) -> ShaderVariant {
        self.shader
    }

    pub fn has_texture(&self) -> bool {
        self.texture_bindings.is_some()
    }

    pub(crate) fn meshes(&self) -> &[MeshBuffers] {
        &self.meshes
    }

    pub(crate) fn texture_bindings(&self) -> Option<&wgpu::BindGroup> {
        self.texture_bindings.as_ref()
    }
}

impl Renderable for Model {
    fn draw(
        &mut self,
        ctx: &mut RenderCtx,
        model_matrix: Matrix4<f32>,
        camera: &Camera,
        material: &Material,
    ) -> Result<(), RenderError> {
        if self.meshes.is_empty() {
            return Ok(());
        }

        ctx.pass.set_pipeline(&self.pipeline);

        // view-space normal matrix on this path, unlike Primitive
        let uniforms = DrawUniforms::new(
            camera,
            model_matrix,
            camera.normal_matrix_view(model_matrix),
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

        for mesh in &self.meshes {
            ctx.pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            for submesh in &mesh.submeshes {
                ctx.pass
                    .set_index_buffer(submesh.index_buffer.slice(..), submesh.format);
                ctx.pass.draw_indexed(0..submesh.index_count, 0, 0..1);
            }
        }

        Ok(())
    }
}

/// Averages face normals onto vertices for assets that ship without
/// normals. Positions are a flat `[x, y, z, ..]` list.
pub(crate) fn compute_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut normals = vec![0.0f32; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let i0 = triangle[0] as usize;
        let i1 = triangle[1] as usize;
        let i2 = triangle[2] as usize;

        let v0 = Vector3::new(positions[i0 * 3], positions[i0 * 3 + 1], positions[i0 * 3 + 2]);
        let v1 = Vector3::new(positions[i1 * 3], positions[i1 * 3 + 1], positions[i1 * 3 + 2]);
        let v2 = Vector3::new(positions[i2 * 3], positions[i2 * 3 + 1], positions[i2 * 3 + 2]);

        let face_normal = (v1 - v0).cross(v2 - v0);

        for &index in &[i0, i1, i2] {
            normals[index * 3] += face_normal.x;
            normals[index * 3 + 1] += face_normal.y;
            normals[index * 3 + 2] += face_normal.z;
        }
    }

    for i in 0..vertex_count {
        let n = Vector3::new(normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]);
        let length = cgmath::InnerSpace::magnitude(n);
        if length > 0.0 {
            normals[i * 3] = n.x / length;
            normals[i * 3 + 1] = n.y / length;
            normals[i * 3 + 2] = n.z / length;
        }
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_from_positions() {
        let positions = [
            -1.0, 0.0, 2.0, //
            3.0, -4.0, 0.5, //
            0.0, 1.0, -2.0,
        ];
        let bounds = BoundingBox::from_positions(&positions);
        assert_eq!(bounds.min, Vector3::new(-1.0, -4.0, -2.0));
        assert_eq!(bounds.max, Vector3::new(3.0, 1.0, 2.0));
        assert!((bounds.width() - 4.0).abs() < f32::EPSILON);
        assert!((bounds.height() - 5.0).abs() < f32::EPSILON);
        assert!((bounds.depth() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_computed_normals_for_flat_triangle() {
        // a triangle in the XY plane, counter-clockwise: normal is +Z
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2];
        let normals = compute_vertex_normals(&positions, &indices);
        for vertex in normals.chunks_exact(3) {
            assert!((vertex[0] - 0.0).abs() < 1e-6);
            assert!((vertex[1] - 0.0).abs() < 1e-6);
            assert!((vertex[2] - 1.0).abs() < 1e-6);
        }
    }
}
