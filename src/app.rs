//! Application shell: window, event loop and input forwarding
//!
//! Thin winit glue around the rendering core. Mouse press/drag/release is
//! forwarded into the controller's touch hooks, resizes reach the camera
//! and surface, and each redraw runs one frame. All engine behavior lives
//! below this layer.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::gfx::camera::free_camera::Camera;
use crate::gfx::rendering::renderer::Renderer;
use crate::gfx::scene::scene::{Scene, SceneController, SceneInput};

pub struct FirthApp {
    event_loop: Option<EventLoop<()>>,
    state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Option<Scene>,
    controller: Box<dyn SceneController>,
    input: SceneInput,
    last_frame: Option<Instant>,
    cursor: (f32, f32),
    touching: bool,
}

impl FirthApp {
    /// Creates an application around the given scene content.
    pub fn new(controller: Box<dyn SceneController>) -> Self {
        let _ = env_logger::try_init();
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            state: AppState {
                window: None,
                renderer: None,
                scene: None,
                controller,
                input: SceneInput::default(),
                last_frame: None,
                cursor: (0.0, 0.0),
                touching: false,
            },
        }
    }

    /// Runs the event loop until the window closes (consumes self).
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.state)
            .context("event loop terminated abnormally")?;
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("firth")
                    .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
            )
            .expect("Failed to create window");
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let mut renderer = pollster::block_on(Renderer::new(window.clone(), width, height));

        let camera = Camera::new(45.0, width as f32, height as f32, 0.1, 1000.0);
        let mut scene = Scene::new(camera);

        // setup failures are broken deployments, not runtime conditions
        self.controller
            .setup(&mut scene, &mut renderer.gpu)
            .expect("Scene setup failed");

        self.scene = Some(scene);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        ..
                    },
                ..
            } => {
                if matches!(key_code, winit::keyboard::KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                scene.resize(width as f32, height as f32);
                renderer.resize(width, height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if self.touching {
                    self.controller
                        .touch_moved(scene, self.cursor.0, self.cursor.1);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.touching = true;
                    self.controller
                        .touch_began(scene, self.cursor.0, self.cursor.1);
                }
                ElementState::Released => {
                    self.touching = false;
                    self.controller
                        .touch_ended(scene, self.cursor.0, self.cursor.1);
                }
            },
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = self
                    .last_frame
                    .map(|last| (now - last).as_secs_f32())
                    .unwrap_or(1.0 / 60.0);
                self.last_frame = Some(now);

                if let Err(error) =
                    renderer.render_frame(scene, self.controller.as_mut(), &self.input, delta_time)
                {
                    log::error!("frame dropped: {error}");
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
