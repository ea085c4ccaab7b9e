//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by every renderable in the engine.
//! The attribute order and offsets here are part of the wire protocol with
//! the WGSL shaders and must match the `VertexInput` struct they declare.

/// A single mesh vertex: position, texture coordinates, color and normal.
///
/// `#[repr(C)]` guarantees a C-compatible layout so the struct can be
/// uploaded to GPU buffers byte-for-byte. Total stride is 48 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// 3D position [x, y, z]
    pub position: [f32; 3],
    /// Texture coordinates [u, v]
    pub texcoord: [f32; 2],
    /// Per-vertex RGBA color
    pub color: [f32; 4],
    /// Normal vector for lighting
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], texcoord: [f32; 2], color: [f32; 4], normal: [f32; 3]) -> Self {
        Self {
            position,
            texcoord,
            color,
            normal,
        }
    }

    /// Vertex buffer layout matching the shader-side `VertexInput`:
    ///
    /// - location 0: position (Float32x3, offset 0)
    /// - location 1: texcoord (Float32x2, offset 12)
    /// - location 2: color (Float32x4, offset 20)
    /// - location 3: normal (Float32x3, offset 36)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 9]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride() {
        // 12 floats, no implicit padding
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
    }

    #[test]
    fn test_attribute_offsets() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 48);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20, 36]);
    }
}
