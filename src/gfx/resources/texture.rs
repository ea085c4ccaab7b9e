//! Texture loading and depth buffer creation
//!
//! Image textures are a recoverable absence: a file that cannot be read or
//! decoded yields `None` and a warning, and the caller renders with the
//! flat material color instead. Nothing here is fatal.

use crate::gfx::rendering::pipeline::DEPTH_FORMAT;
use crate::wgpu_utils::binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc};

/// A 2D color texture and its shader view.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Attempts to load an image file and upload it as an sRGB texture.
    ///
    /// Returns `None` when the file is missing or undecodable; the draw
    /// path must treat that as a valid state.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &str) -> Option<Texture> {
        let image = match image::open(path) {
            Ok(image) => image,
            Err(error) => {
                log::warn!("texture `{path}` not loaded: {error}");
                return None;
            }
        };

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Some(Self::from_rgba8(device, queue, &rgba, width, height, path))
    }

    /// Uploads raw RGBA8 pixel data as an sRGB texture.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Texture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Texture { texture, view }
    }
}

/// Builds the texture bind group for a renderable: color texture, optional
/// mask texture, and the node's sampler, in binding order.
pub fn texture_bind_group(
    device: &wgpu::Device,
    layout: &BindGroupLayoutWithDesc,
    color: &Texture,
    mask: Option<&Texture>,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let builder = BindGroupBuilder::new(layout).texture(&color.view);
    let builder = match mask {
        Some(mask) => builder.texture(&mask.view),
        None => builder,
    };
    builder.sampler(sampler).create(device, "Texture Bind Group")
}

/// Depth buffer matching the render surface.
pub struct DepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    /// Creates a depth texture sized to the surface.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}
