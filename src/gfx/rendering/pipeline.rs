//! Render pipeline construction for the draw contract
//!
//! Shaders are referenced by name: every renderable names a shader variant,
//! the library resolves it to a compiled WGSL module, and the factory turns
//! it into a cached render pipeline. A missing module is a setup-time
//! error; nothing here is recoverable per frame.
//!
//! All pipelines share the same fixed-function state: counter-clockwise
//! front faces, back-face culling, less-than depth compare with writes
//! enabled, and the engine vertex layout.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RenderError;
use crate::gfx::rendering::vertex::Vertex;
use crate::wgpu_utils::{
    binding_builder::{BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
};

/// Depth buffer format used throughout the engine.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// How many texture bindings a shader variant consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlots {
    None,
    Color,
    ColorAndMask,
}

/// The shader variants the engine ships, referenced by name.
///
/// Each maps to one WGSL module in `src/shaders/` with `vs_main`/`fs_main`
/// entry points. Textured variants have an untextured fallback used when
/// the named image cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVariant {
    /// Unlit flat material color.
    Color,
    /// Forward-lit, flat material color.
    Phong,
    /// Forward-lit with a color texture.
    PhongTextured,
    /// Forward-lit with color and mask textures.
    PhongMask,
    /// Banded toon shading with a silhouette edge.
    Toon,
    /// Time-displaced fireball with a scrolling color texture.
    Fireball,
    /// Instanced forward-lit, per-instance material color.
    Instanced,
    /// Instanced forward-lit with the shared model's color texture.
    InstancedTextured,
}

impl ShaderVariant {
    /// The WGSL module name this variant resolves to.
    pub fn module(self) -> &'static str {
        match self {
            ShaderVariant::Color => "color",
            ShaderVariant::Phong => "phong",
            ShaderVariant::PhongTextured => "phong_textured",
            ShaderVariant::PhongMask => "phong_mask",
            ShaderVariant::Toon => "toon",
            ShaderVariant::Fireball => "fireball",
            ShaderVariant::Instanced => "instanced",
            ShaderVariant::InstancedTextured => "instanced_textured",
        }
    }

    pub fn texture_slots(self) -> TextureSlots {
        match self {
            ShaderVariant::PhongTextured | ShaderVariant::Fireball | ShaderVariant::InstancedTextured => {
                TextureSlots::Color
            }
            ShaderVariant::PhongMask => TextureSlots::ColorAndMask,
            _ => TextureSlots::None,
        }
    }

    pub fn is_instanced(self) -> bool {
        matches!(self, ShaderVariant::Instanced | ShaderVariant::InstancedTextured)
    }

    /// The variant to fall back to when a required texture is absent.
    /// The fireball displacement pairs with its texture, so it degrades
    /// all the way to flat color.
    pub fn untextured_fallback(self) -> ShaderVariant {
        match self {
            ShaderVariant::PhongTextured | ShaderVariant::PhongMask => ShaderVariant::Phong,
            ShaderVariant::Fireball => ShaderVariant::Color,
            ShaderVariant::InstancedTextured => ShaderVariant::Instanced,
            other => other,
        }
    }
}

const COMMON_WGSL: &str = include_str!("../../shaders/common.wgsl");

/// Compiled WGSL modules, keyed by name.
///
/// Each registered source is prefixed with the shared declaration block
/// (uniform structs, frame bindings, lighting functions) so the variants
/// stay small and the wire protocol is defined once.
pub struct ShaderLibrary {
    modules: HashMap<String, wgpu::ShaderModule>,
}

impl ShaderLibrary {
    /// Compiles every built-in shader module.
    pub fn with_builtin_shaders(device: &wgpu::Device) -> Self {
        let mut library = Self {
            modules: HashMap::new(),
        };
        library.register(device, "color", include_str!("../../shaders/color.wgsl"));
        library.register(device, "phong", include_str!("../../shaders/phong.wgsl"));
        library.register(
            device,
            "phong_textured",
            include_str!("../../shaders/phong_textured.wgsl"),
        );
        library.register(
            device,
            "phong_mask",
            include_str!("../../shaders/phong_mask.wgsl"),
        );
        library.register(device, "toon", include_str!("../../shaders/toon.wgsl"));
        library.register(
            device,
            "fireball",
            include_str!("../../shaders/fireball.wgsl"),
        );
        library.register(
            device,
            "instanced",
            include_str!("../../shaders/instanced.wgsl"),
        );
        library.register(
            device,
            "instanced_textured",
            include_str!("../../shaders/instanced_textured.wgsl"),
        );
        library
    }

    /// Compiles and registers a module under `name`, replacing any
    /// previous registration.
    pub fn register(&mut self, device: &wgpu::Device, name: &str, source: &str) {
        let source = format!("{COMMON_WGSL}\n{source}");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.modules.insert(name.to_string(), module);
    }

    pub fn get(&self, name: &str) -> Result<&wgpu::ShaderModule, RenderError> {
        self.modules
            .get(name)
            .ok_or_else(|| RenderError::UnknownShader(name.to_string()))
    }
}

/// Bind group layouts shared by every pipeline, created once per device.
pub struct SharedLayouts {
    /// Group 0: frame constants + light arrays.
    pub frame: BindGroupLayoutWithDesc,
    /// Groups 1 and 2: a dynamic-offset view into the transient uniform
    /// arena. One layout serves both slots so the arena's single bind
    /// group can be bound at either, which requires it to be visible to
    /// both stages.
    pub transient: BindGroupLayoutWithDesc,
    /// Group 1 (instanced): per-instance block array.
    pub instances: BindGroupLayoutWithDesc,
    /// Group 3: color texture + sampler.
    pub color_texture: BindGroupLayoutWithDesc,
    /// Group 3: color texture + mask texture + sampler.
    pub mask_texture: BindGroupLayoutWithDesc,
}

impl SharedLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Frame Bind Group Layout");

        let transient = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform_dynamic())
            .create(device, "Transient Uniforms Bind Group Layout");

        let instances = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::storage_buffer_read_only())
            .create(device, "Instance Blocks Bind Group Layout");

        let color_texture = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Color Texture Bind Group Layout");

        let mask_texture = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Mask Texture Bind Group Layout");

        Self {
            frame,
            transient,
            instances,
            color_texture,
            mask_texture,
        }
    }
}

/// Creates and caches one render pipeline per shader variant.
pub struct PipelineFactory {
    cache: HashMap<ShaderVariant, Arc<wgpu::RenderPipeline>>,
}

impl PipelineFactory {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Returns the pipeline for `variant`, building it on first request.
    pub fn pipeline(
        &mut self,
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        layouts: &SharedLayouts,
        color_format: wgpu::TextureFormat,
        variant: ShaderVariant,
    ) -> Result<Arc<wgpu::RenderPipeline>, RenderError> {
        if let Some(pipeline) = self.cache.get(&variant) {
            return Ok(pipeline.clone());
        }

        let module = shaders.get(variant.module())?;

        let mut group_layouts: Vec<&wgpu::BindGroupLayout> = vec![&layouts.frame.layout];
        if variant.is_instanced() {
            group_layouts.push(&layouts.instances.layout);
        } else {
            group_layouts.push(&layouts.transient.layout);
        }
        group_layouts.push(&layouts.transient.layout);
        match variant.texture_slots() {
            TextureSlots::None => {}
            TextureSlots::Color => group_layouts.push(&layouts.color_texture.layout),
            TextureSlots::ColorAndMask => group_layouts.push(&layouts.mask_texture.layout),
        }

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", variant.module())),
            bind_group_layouts: &group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", variant.module())),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let pipeline = Arc::new(pipeline);
        self.cache.insert(variant, pipeline.clone());
        Ok(pipeline)
    }
}

impl Default for PipelineFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Default sampler for every renderable: linear filtering, clamp-to-edge
/// addressing. Built once per node and immutable for its lifetime.
pub fn build_sampler_state(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Node Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_slots_per_variant() {
        assert_eq!(ShaderVariant::Phong.texture_slots(), TextureSlots::None);
        assert_eq!(ShaderVariant::PhongTextured.texture_slots(), TextureSlots::Color);
        assert_eq!(
            ShaderVariant::PhongMask.texture_slots(),
            TextureSlots::ColorAndMask
        );
    }

    #[test]
    fn test_untextured_fallbacks() {
        assert_eq!(
            ShaderVariant::PhongTextured.untextured_fallback(),
            ShaderVariant::Phong
        );
        assert_eq!(
            ShaderVariant::InstancedTextured.untextured_fallback(),
            ShaderVariant::Instanced
        );
        // untextured variants are their own fallback
        assert_eq!(ShaderVariant::Toon.untextured_fallback(), ShaderVariant::Toon);
        // the fallback never needs a texture itself
        for variant in [
            ShaderVariant::PhongTextured,
            ShaderVariant::PhongMask,
            ShaderVariant::Fireball,
            ShaderVariant::InstancedTextured,
        ] {
            assert_eq!(
                variant.untextured_fallback().texture_slots(),
                TextureSlots::None
            );
        }
    }

    #[test]
    fn test_instanced_flags() {
        assert!(ShaderVariant::Instanced.is_instanced());
        assert!(ShaderVariant::InstancedTextured.is_instanced());
        assert!(!ShaderVariant::Phong.is_instanced());
    }
}
