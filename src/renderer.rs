use anyhow::{anyhow, Result};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use glam::{Mat4, Vec3};

use crate::coordinator::{Coordinator, InputCommand};
use crate::scene::{Material, Node, NodeKind, Scene};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MAX_POINT_LIGHTS: usize = 16;

/// Per-draw uniforms live in one buffer at 256-byte steps.
const MODEL_UNIFORM_STRIDE: u64 = 256;

/// Sky tint behind the room.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.43,
    g: 0.71,
    b: 0.82,
    a: 1.0,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PointLightUniform {
    /// xyz position, w falloff range (0 = no falloff)
    position: [f32; 4],
    /// rgb color, w intensity
    color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    directional_direction: [f32; 4],
    directional_color: [f32; 4],
    point_count: [u32; 4],
    points: [PointLightUniform; MAX_POINT_LIGHTS],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
    /// rgb base color, w opacity
    color: [f32; 4],
    /// metallic, roughness, unlit flag, pad
    params: [f32; 4],
}

/// One uploaded mesh. Scene geometry is static after load, so draws
/// pair these with fresh transforms rebuilt from the same traversal
/// order every frame.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Collected per-frame draw state for one mesh node.
struct DrawItem {
    model: Mat4,
    material: Material,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_capacity: u64,
    model_bind_group_layout: wgpu::BindGroupLayout,
    model_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    no_ui: bool,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, no_ui: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| anyhow!("no suitable graphics adapter"))?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &surface_config);
        let depth_view = Self::create_depth_texture(&device, size);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ModelUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let model_capacity = 64 * MODEL_UNIFORM_STRIDE;
        let model_buffer = Self::create_model_buffer(&device, model_capacity);
        let model_bind_group = Self::create_model_bind_group(
            &device,
            &model_bind_group_layout,
            &model_buffer,
        );

        let pipeline = Self::create_pipeline(
            &device,
            surface_config.format,
            &frame_bind_group_layout,
            &model_bind_group_layout,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            size,
            depth_view,
            pipeline,
            frame_buffer,
            frame_bind_group,
            model_buffer,
            model_capacity,
            model_bind_group_layout,
            model_bind_group,
            meshes: Vec::new(),
            egui_renderer,
            egui_state,
            egui_ctx,
            no_ui,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_model_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniforms"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_model_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Room Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("room.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Room Pipeline Layout"),
            bind_group_layouts: &[frame_layout, model_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Room Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Planes double as both wall faces, so no culling
                cull_mode: None,
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
        })
    }

    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.size = size;
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = Self::create_depth_texture(&self.device, size);
    }

    /// Uploads every mesh in the scene as flat-shaded triangle soup.
    /// Call once after all props are loaded; transforms stay CPU-side
    /// and are re-read each frame in the same traversal order.
    pub fn upload_scene(&mut self, scene: &Scene) {
        self.meshes.clear();
        for node in scene.nodes() {
            self.upload_node(node);
        }
        log::info!("uploaded {} meshes", self.meshes.len());
    }

    fn upload_node(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Mesh(mesh) => {
                let mut vertices = Vec::with_capacity(mesh.indices.len());
                for [v0, v1, v2] in mesh.triangles() {
                    let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
                    for v in [v0, v1, v2] {
                        vertices.push(Vertex {
                            position: v.to_array(),
                            normal: normal.to_array(),
                        });
                    }
                }
                let vertex_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&node.name),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                self.meshes.push(GpuMesh {
                    vertex_buffer,
                    vertex_count: vertices.len() as u32,
                });
            }
            NodeKind::Group(children) => {
                for child in children {
                    self.upload_node(child);
                }
            }
            NodeKind::Other => {}
        }
    }

    fn collect_draws(node: &Node, parent: Mat4, out: &mut Vec<DrawItem>) {
        let world = parent * node.transform.matrix();
        match &node.kind {
            NodeKind::Mesh(mesh) => out.push(DrawItem {
                model: world,
                material: mesh.material.clone(),
            }),
            NodeKind::Group(children) => {
                for child in children {
                    Self::collect_draws(child, world, out);
                }
            }
            NodeKind::Other => {}
        }
    }

    fn frame_uniform(coordinator: &Coordinator) -> FrameUniform {
        let lights = &coordinator.lights;
        let mut points = [PointLightUniform {
            position: [0.0; 4],
            color: [0.0; 4],
        }; MAX_POINT_LIGHTS];

        let mut count = 0;
        let ceiling = lights.ceiling();
        for light in std::iter::once(&ceiling).chain(lights.triangle_lights()) {
            if count == MAX_POINT_LIGHTS {
                break;
            }
            let p = light.position;
            points[count] = PointLightUniform {
                position: [p.x, p.y, p.z, light.range],
                color: [light.color[0], light.color[1], light.color[2], light.intensity],
            };
            count += 1;
        }

        let direction = (Vec3::ZERO - lights.directional_position).normalize_or_zero();
        FrameUniform {
            view_proj: coordinator.camera.view_projection().to_cols_array_2d(),
            camera_position: coordinator.camera.position.extend(1.0).to_array(),
            ambient: [
                lights.ambient_color[0],
                lights.ambient_color[1],
                lights.ambient_color[2],
                lights.ambient_intensity,
            ],
            directional_direction: direction.extend(0.0).to_array(),
            directional_color: [
                lights.directional_color[0],
                lights.directional_color[1],
                lights.directional_color[2],
                lights.directional_intensity,
            ],
            point_count: [count as u32, 0, 0, 0],
            points,
        }
    }

    /// Forwards window events to egui; returns true when consumed.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        if self.no_ui {
            return false;
        }
        self.egui_state.on_window_event(window, event).consumed
    }

    pub fn render(
        &mut self,
        window: &Window,
        coordinator: &mut Coordinator,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = Self::frame_uniform(coordinator);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame]));

        let mut draws = Vec::with_capacity(self.meshes.len());
        let root = coordinator.scene.root_matrix();
        for node in coordinator.scene.nodes() {
            Self::collect_draws(node, root, &mut draws);
        }
        debug_assert_eq!(draws.len(), self.meshes.len());

        let needed = draws.len() as u64 * MODEL_UNIFORM_STRIDE;
        if needed > self.model_capacity {
            self.model_capacity = needed.next_power_of_two();
            self.model_buffer = Self::create_model_buffer(&self.device, self.model_capacity);
            self.model_bind_group = Self::create_model_bind_group(
                &self.device,
                &self.model_bind_group_layout,
                &self.model_buffer,
            );
        }
        let mut model_data = vec![0u8; needed as usize];
        for (i, draw) in draws.iter().enumerate() {
            let uniform = ModelUniform {
                model: draw.model.to_cols_array_2d(),
                color: [
                    draw.material.base_color[0],
                    draw.material.base_color[1],
                    draw.material.base_color[2],
                    draw.material.opacity,
                ],
                params: [
                    draw.material.metallic,
                    draw.material.roughness,
                    if draw.material.unlit { 1.0 } else { 0.0 },
                    0.0,
                ],
            };
            let offset = i * MODEL_UNIFORM_STRIDE as usize;
            model_data[offset..offset + std::mem::size_of::<ModelUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        if !model_data.is_empty() {
            self.queue.write_buffer(&self.model_buffer, 0, &model_data);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Room Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, mesh) in self.meshes.iter().enumerate() {
                let offset = (i as u64 * MODEL_UNIFORM_STRIDE) as u32;
                render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.draw(0..mesh.vertex_count, 0..1);
            }
        }

        if !self.no_ui {
            self.draw_ui(window, coordinator, &mut encoder, &view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Overlay pass: just the reset button, shown once the camera has
    /// left the default pose.
    fn draw_ui(
        &mut self,
        window: &Window,
        coordinator: &mut Coordinator,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);
        let show_reset = coordinator.show_reset();
        let mut reset_clicked = false;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_reset {
                egui::Area::new(egui::Id::new("reset-view"))
                    .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-20.0, -20.0))
                    .show(ctx, |ui| {
                        if ui.button("Reset View").clicked() {
                            reset_clicked = true;
                        }
                    });
            }
        });

        if reset_clicked {
            coordinator.push_command(InputCommand::Reset);
        }

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
