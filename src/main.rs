use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use room_viewer::cli::Cli;
use room_viewer::coordinator::{Coordinator, InputCommand};
use room_viewer::options::ViewerOptions;
use room_viewer::orbit::{OrbitControls, ORBIT_TARGET};
use room_viewer::renderer::Renderer;

/// Cursor travel below this counts as a click, above it as an orbit drag.
const CLICK_SLOP_PX: f32 = 4.0;

struct App {
    cli: Cli,
    options: ViewerOptions,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    coordinator: Option<Coordinator>,
    cursor: Vec2,
    press_origin: Option<Vec2>,
}

impl App {
    fn new(cli: Cli, options: ViewerOptions) -> Self {
        Self {
            cli,
            options,
            window: None,
            renderer: None,
            coordinator: None,
            cursor: Vec2::ZERO,
            press_origin: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(&self.options.window.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.options.window.width,
                    self.options.window.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                eprintln!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match pollster::block_on(Renderer::new(window.clone(), self.cli.no_ui))
        {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let mut coordinator = Coordinator::new(Vec2::new(size.width as f32, size.height as f32));
        coordinator.camera.fov_y = self.options.camera.fov_degrees.to_radians();
        coordinator.camera.near = self.options.camera.near;
        coordinator.camera.far = self.options.camera.far;
        coordinator.orbit = OrbitControls::new(
            ORBIT_TARGET,
            self.options.controls.damping,
            self.options.controls.min_distance,
            self.options.controls.max_distance,
        );
        coordinator.load_props(&self.options.assets_dir);
        renderer.upload_scene(&coordinator.scene);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.coordinator = Some(coordinator);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        let Some(coordinator) = &mut self.coordinator else {
            return;
        };

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyR),
                        ..
                    },
                ..
            } => coordinator.push_command(InputCommand::Reset),
            WindowEvent::Resized(size) => {
                coordinator.set_viewport(size.width, size.height);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let next = Vec2::new(position.x as f32, position.y as f32);
                let delta = next - self.cursor;
                self.cursor = next;
                coordinator.orbit.pointer_delta(delta.x, delta.y);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.press_origin = Some(self.cursor);
                    coordinator.orbit.set_dragging(true);
                }
                ElementState::Released => {
                    coordinator.orbit.set_dragging(false);
                    if let Some(origin) = self.press_origin.take() {
                        if origin.distance(self.cursor) <= CLICK_SLOP_PX {
                            coordinator.push_command(InputCommand::Click(self.cursor));
                        }
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * 0.05,
                };
                coordinator.orbit.scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                coordinator.update();
                if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
                    if let Err(e) = renderer.render(window, coordinator) {
                        eprintln!("Render error: {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut options = match &cli.options {
        Some(path) => ViewerOptions::load(path)?,
        None => ViewerOptions::default(),
    };
    if let Some(assets) = &cli.assets {
        options.assets_dir = assets.clone();
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, options);

    event_loop.run_app(&mut app)?;

    Ok(())
}
