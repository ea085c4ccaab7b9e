//! WGPU-based renderer: device ownership and the frame loop
//!
//! The [`Renderer`] owns the surface, device, queue, depth buffer and the
//! shared GPU context (shader library, bind group layouts, pipeline
//! cache). Each frame it acquires a drawable, opens one forward pass,
//! delegates encoding to the scene and submits — submit-and-forget, on a
//! single thread.

use std::sync::Arc;

use crate::error::RenderError;
use crate::gfx::rendering::pipeline::{PipelineFactory, ShaderLibrary, ShaderVariant, SharedLayouts};
use crate::gfx::rendering::uniforms::{FrameConstants, LightsBlock, FRAME_GROUP};
use crate::gfx::resources::texture::DepthTexture;
use crate::gfx::scene::scene::{Scene, SceneController, SceneInput};
use crate::wgpu_utils::{
    binding_builder::BindGroupBuilder, transient::TransientUniforms, uniform_buffer::UniformBuffer,
};

/// Shared GPU handles and setup-time factories.
///
/// Passed mutably into `SceneController::setup` so scene content can build
/// renderables; the pipeline cache only grows during setup.
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub color_format: wgpu::TextureFormat,
    pub shaders: ShaderLibrary,
    pub layouts: SharedLayouts,
    pipelines: PipelineFactory,
}

impl GpuContext {
    pub(crate) fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shaders = ShaderLibrary::with_builtin_shaders(&device);
        let layouts = SharedLayouts::new(&device);
        Self {
            device,
            queue,
            color_format,
            shaders,
            layouts,
            pipelines: PipelineFactory::new(),
        }
    }

    /// The cached pipeline for a shader variant, built on first request.
    pub fn pipeline(
        &mut self,
        variant: ShaderVariant,
    ) -> Result<Arc<wgpu::RenderPipeline>, RenderError> {
        self.pipelines.pipeline(
            &self.device,
            &self.shaders,
            &self.layouts,
            self.color_format,
            variant,
        )
    }
}

/// Everything a renderable needs to encode its draw: the open pass, the
/// queue for buffer writes, and the per-frame transient uniform arena.
pub struct RenderCtx<'frame> {
    pub pass: wgpu::RenderPass<'frame>,
    pub queue: &'frame wgpu::Queue,
    pub transient: &'frame mut TransientUniforms,
}

/// Frame-global uniform buffers (constants + lights) and their bind group.
pub struct FrameBindings {
    constants: UniformBuffer<FrameConstants>,
    lights: UniformBuffer<LightsBlock>,
    bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    fn new(device: &wgpu::Device, layouts: &SharedLayouts) -> Self {
        let constants = UniformBuffer::<FrameConstants>::new(device);
        let lights = UniformBuffer::<LightsBlock>::new(device);
        let bind_group = BindGroupBuilder::new(&layouts.frame)
            .resource(constants.binding_resource())
            .resource(lights.binding_resource())
            .create(device, "Frame Bind Group");
        Self {
            constants,
            lights,
            bind_group,
        }
    }

    pub(crate) fn upload(
        &mut self,
        queue: &wgpu::Queue,
        constants: FrameConstants,
        lights: LightsBlock,
    ) {
        self.constants.update_content(queue, constants);
        self.lights.update_content(queue, lights);
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass) {
        pass.set_bind_group(FRAME_GROUP, &self.bind_group, &[]);
    }
}

/// Core renderer driving the per-frame loop.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    pub gpu: GpuContext,
    transient: TransientUniforms,
    frame_bindings: FrameBindings,
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Creates the renderer for a window surface.
    ///
    /// # Panics
    /// Panics when no adapter or device is available. A machine that
    /// cannot produce a GPU device cannot run the engine at all, so this
    /// is a deliberate hard startup error.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Renderer {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .expect("Failed to create render surface!");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("Failed to request a device!");

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, config.width, config.height);

        let gpu = GpuContext::new(device, queue, format);
        let transient = TransientUniforms::new(
            &gpu.device,
            &gpu.layouts.transient,
            TransientUniforms::DEFAULT_CAPACITY,
        );
        let frame_bindings = FrameBindings::new(&gpu.device, &gpu.layouts);

        log::info!(
            "renderer up: {format:?} surface, {}x{}",
            config.width,
            config.height
        );

        Renderer {
            surface,
            config,
            depth_texture,
            gpu,
            transient,
            frame_bindings,
            clear_color: wgpu::Color {
                r: 0.01,
                g: 0.01,
                b: 0.02,
                a: 1.0,
            },
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.gpu.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.gpu.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reconfigures the surface and depth buffer for a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.gpu.device, &self.config);
        self.depth_texture = DepthTexture::new(&self.gpu.device, width, height);
    }

    /// Runs one frame: controller update, drawable acquisition, one
    /// forward pass encoded by the scene, submit, present.
    ///
    /// A lost or outdated surface reconfigures and skips the frame; other
    /// surface errors are returned to the caller.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        controller: &mut dyn SceneController,
        input: &SceneInput,
        delta_time: f32,
    ) -> Result<(), RenderError> {
        controller.update(scene, input, delta_time);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.gpu.device, &self.config);
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.transient.reset();

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut ctx = RenderCtx {
                pass,
                queue: &self.gpu.queue,
                transient: &mut self.transient,
            };
            scene.render(&mut ctx, &mut self.frame_bindings, delta_time)?;
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
