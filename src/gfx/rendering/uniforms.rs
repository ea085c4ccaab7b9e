//! GPU uniform block definitions and binding slot assignments
//!
//! Everything in this file is half of a bit-exact contract with the WGSL
//! sources in `src/shaders/` — struct layouts, paddings, array capacities
//! and group/binding indices must stay in sync with the shader side and are
//! versioned together with it.
//!
//! Layout notes follow WGSL uniform-address-space rules: `vec3` aligns to
//! 16 bytes, nested structs and array strides round up to 16.

use cgmath::{Matrix3, Matrix4};

use crate::gfx::camera::free_camera::Camera;

/// Bind group slot for per-frame constants and light arrays.
pub const FRAME_GROUP: u32 = 0;
/// Bind group slot for the per-draw uniform block, or for the per-instance
/// block array on instanced pipelines.
pub const DRAW_GROUP: u32 = 1;
/// Bind group slot for the per-draw material block.
pub const MATERIAL_GROUP: u32 = 2;
/// Bind group slot for color/mask textures and their sampler.
pub const TEXTURE_GROUP: u32 = 3;

/// Shader-side light array capacities. The live counts ride along in
/// [`LightsBlock::counts`] so the fragment loop never reads stale slots.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 1;
pub const MAX_POINT_LIGHTS: usize = 5;
pub const MAX_SPOT_LIGHTS: usize = 1;

/// Converts a cgmath matrix into the column-major array form the GPU expects.
pub fn matrix4_to_array(matrix: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix.into()
}

/// Packs a 3x3 matrix into three 16-byte columns, matching the WGSL
/// `mat3x3<f32>` layout.
pub fn matrix3_to_padded_array(matrix: Matrix3<f32>) -> [[f32; 4]; 3] {
    [
        [matrix.x.x, matrix.x.y, matrix.x.z, 0.0],
        [matrix.y.x, matrix.y.y, matrix.y.z, 0.0],
        [matrix.z.x, matrix.z.y, matrix.z.z, 0.0],
    ]
}

/// Per-draw transform block: projection, model and view matrices plus the
/// normal matrix used by the lighting stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
}
// Total: 64 * 3 + 48 = 240 bytes

impl DrawUniforms {
    /// Assembles the block from camera state, a world matrix and a normal
    /// matrix. The normal matrix convention (model-space vs view-space)
    /// is chosen by the caller; see `Camera::normal_matrix_model` and
    /// `Camera::normal_matrix_view`.
    pub fn new(camera: &Camera, model: Matrix4<f32>, normal: Matrix3<f32>) -> Self {
        Self {
            projection: matrix4_to_array(camera.perspective_projection),
            model: matrix4_to_array(model),
            view: matrix4_to_array(camera.view_matrix),
            normal: matrix3_to_padded_array(normal),
        }
    }
}

impl Default for DrawUniforms {
    fn default() -> Self {
        use cgmath::SquareMatrix;
        Self {
            projection: matrix4_to_array(Matrix4::identity()),
            model: matrix4_to_array(Matrix4::identity()),
            view: matrix4_to_array(Matrix4::identity()),
            normal: matrix3_to_padded_array(Matrix3::identity()),
        }
    }
}

/// Per-draw surface appearance block.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialInfo {
    pub color: [f32; 4],
    /// Specular exponent, typically 1..128.
    pub shininess: f32,
    /// Boolean flag (0 or 1); bool has no GPU-stable layout.
    pub use_texture: u32,
    pub _padding: [f32; 2],
}
// Total: 32 bytes

impl Default for MaterialInfo {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            shininess: 32.0,
            use_texture: 0,
            _padding: [0.0; 2],
        }
    }
}

/// One slot of the per-instance block array: a full transform block plus
/// that instance's material.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniforms {
    pub uniforms: DrawUniforms,
    pub material: MaterialInfo,
}
// Total: 272 bytes (storage array stride)

impl Default for InstanceUniforms {
    fn default() -> Self {
        Self {
            uniforms: DrawUniforms::default(),
            material: MaterialInfo::default(),
        }
    }
}

/// Per-frame constants: camera info, elapsed time and the shading tunables
/// consumed by the toon and fireball variants.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameConstants {
    pub camera_position: [f32; 3],
    pub time: f32,
    pub camera_front: [f32; 3],
    pub toon_edge: f32,
    pub fireball_frequency: f32,
    pub fireball_explosion: f32,
    pub _padding: [f32; 2],
}
// Total: 48 bytes

/// Shared light attributes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuBaseLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub _padding: f32,
}
// Total: 32 bytes

/// Distance falloff coefficients.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuAttenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
    pub _padding: f32,
}
// Total: 16 bytes

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuDirectionalLight {
    pub base: GpuBaseLight,
    pub direction: [f32; 3],
    pub _padding: f32,
}
// Total: 48 bytes

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuPointLight {
    pub base: GpuBaseLight,
    pub attenuation: GpuAttenuation,
    pub position: [f32; 3],
    pub _padding: f32,
}
// Total: 64 bytes

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuSpotLight {
    pub point: GpuPointLight,
    pub direction: [f32; 3],
    /// Cosine of the inner cone angle.
    pub cut_off: f32,
    /// Cosine of the outer cone angle.
    pub outer_cut_off: f32,
    pub _padding: [f32; 3],
}
// Total: 96 bytes

/// Fixed-stride light arrays uploaded once per frame. `counts` holds the
/// live (directional, point, spot) counts in xyz.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsBlock {
    pub directional: [GpuDirectionalLight; MAX_DIRECTIONAL_LIGHTS],
    pub point: [GpuPointLight; MAX_POINT_LIGHTS],
    pub spot: [GpuSpotLight; MAX_SPOT_LIGHTS],
    pub counts: [u32; 4],
}
// Total: 48 + 320 + 96 + 16 = 480 bytes

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    // The shader side assumes these exact sizes; a drifted padding here
    // corrupts every draw silently, so pin them down.
    #[test]
    fn test_uniform_block_sizes() {
        assert_eq!(size_of::<DrawUniforms>(), 240);
        assert_eq!(size_of::<MaterialInfo>(), 32);
        assert_eq!(size_of::<InstanceUniforms>(), 272);
        assert_eq!(size_of::<FrameConstants>(), 48);
    }

    #[test]
    fn test_light_block_sizes() {
        assert_eq!(size_of::<GpuBaseLight>(), 32);
        assert_eq!(size_of::<GpuAttenuation>(), 16);
        assert_eq!(size_of::<GpuDirectionalLight>(), 48);
        assert_eq!(size_of::<GpuPointLight>(), 64);
        assert_eq!(size_of::<GpuSpotLight>(), 96);
        assert_eq!(size_of::<LightsBlock>(), 480);
    }

    #[test]
    fn test_instance_stride_is_16_byte_aligned() {
        assert_eq!(size_of::<InstanceUniforms>() % 16, 0);
    }

    #[test]
    fn test_normal_matrix_packing() {
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let packed = matrix3_to_padded_array(m);
        // cgmath constructor arguments are column-major
        assert_eq!(packed[0], [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(packed[1], [4.0, 5.0, 6.0, 0.0]);
        assert_eq!(packed[2], [7.0, 8.0, 9.0, 0.0]);
    }
}
