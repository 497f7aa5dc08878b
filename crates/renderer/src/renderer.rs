//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::{Camera, CameraUniform, Fog},
    error::RenderError,
    mesh::{Mesh, StarBuffer},
    pipeline::{
        create_atmosphere_pipeline,
        create_camera_bind_group_layout,
        create_mountain_pipeline,
        create_nebula_pipeline,
        create_object_bind_group_layout,
        create_star_pipeline,
    },
    post::{BloomSettings, PostChain},
    scene::{Material, ObjectId, Scene, SceneGeometry, SceneObject},
    texture::Texture,
};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Construction-time renderer options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererSettings {
    pub vsync: bool,
    pub bloom: BloomSettings,
    /// Tone mapping exposure applied before the ACES curve.
    pub exposure: f32,
    pub fog: Fog,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            bloom: BloomSettings::default(),
            exposure: 0.5,
            fog: Fog::default(),
        }
    }
}

enum GpuGeometry {
    Mesh(Mesh),
    Stars(StarBuffer),
}

/// GPU resources of one uploaded scene object.
struct GpuObject {
    geometry: GpuGeometry,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuObject {
    fn destroy(&self) {
        match &self.geometry {
            GpuGeometry::Mesh(mesh) => mesh.destroy(),
            GpuGeometry::Stars(stars) => stars.destroy(),
        }
        self.uniform_buffer.destroy();
    }
}

/// Everything tied to the presentation surface. Dropped by `dispose_surface`.
struct Output {
    surface: wgpu::Surface<'static>,
    depth_texture: Texture,
    scene_color: Texture,
    post: PostChain,
}

/// Main renderer state.
pub struct Renderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    output: Option<Output>,

    // Pipelines
    star_pipeline: wgpu::RenderPipeline,
    nebula_pipeline: wgpu::RenderPipeline,
    mountain_pipeline: wgpu::RenderPipeline,
    atmosphere_pipeline: wgpu::RenderPipeline,

    // Bind groups and layouts
    object_bind_group_layout: wgpu::BindGroupLayout,
    camera_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_uniform: CameraUniform,
    fog: Fog,

    objects: HashMap<ObjectId, GpuObject>,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, settings: RendererSettings) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        // Prefer Mailbox (low-latency vsync) if available; otherwise AutoVsync.
        let present_mode = if settings.vsync {
            surface_caps
                .present_modes
                .iter()
                .find(|m| matches!(m, wgpu::PresentMode::Mailbox))
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Create camera uniform buffer
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Create bind group layouts
        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let object_bind_group_layout = create_object_bind_group_layout(&device);

        // Create camera bind group
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let star_pipeline = create_star_pipeline(&device, &camera_bind_group_layout, &object_bind_group_layout);
        let nebula_pipeline = create_nebula_pipeline(&device, &camera_bind_group_layout, &object_bind_group_layout);
        let mountain_pipeline =
            create_mountain_pipeline(&device, &camera_bind_group_layout, &object_bind_group_layout);
        let atmosphere_pipeline =
            create_atmosphere_pipeline(&device, &camera_bind_group_layout, &object_bind_group_layout);

        let depth_texture = Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");
        let scene_color =
            Texture::create_render_target(&device, config.width, config.height, Texture::HDR_FORMAT, "Scene Color");
        let post = PostChain::new(
            &device,
            surface_format,
            config.width,
            config.height,
            settings.bloom,
            settings.exposure,
        );

        Ok(Self {
            device,
            queue,
            config,
            size,
            window,
            output: Some(Output {
                surface,
                depth_texture,
                scene_color,
                post,
            }),
            star_pipeline,
            nebula_pipeline,
            mountain_pipeline,
            atmosphere_pipeline,
            object_bind_group_layout,
            camera_bind_group,
            camera_buffer,
            camera_uniform,
            fog: settings.fog,
            objects: HashMap::new(),
        })
    }

    /// Create the GPU resources for a scene object.
    pub fn upload(&mut self, object: &SceneObject) -> Result<(), RenderError> {
        if self.objects.contains_key(&object.id) {
            return Err(RenderError::DuplicateObject(object.id));
        }

        let geometry = match &object.geometry {
            SceneGeometry::Surface(data) => GpuGeometry::Mesh(data.upload(&self.device, &object.name)),
            SceneGeometry::Stars(stars) => GpuGeometry::Stars(StarBuffer::new(&self.device, &object.name, stars)),
        };
        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Uniform", object.name)),
            contents: bytemuck::cast_slice(&[object.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", object.name)),
            layout: &self.object_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::debug!("Uploaded {} ({:?})", object.name, object.id);
        self.objects.insert(
            object.id,
            GpuObject {
                geometry,
                uniform_buffer,
                bind_group,
            },
        );
        Ok(())
    }

    /// Release the GPU resources of one object.
    pub fn dispose_object(&mut self, id: ObjectId) -> Result<(), RenderError> {
        let gpu = self.objects.remove(&id).ok_or(RenderError::UnknownObject(id))?;
        gpu.destroy();
        Ok(())
    }

    /// Release the render targets and the presentation surface.
    pub fn dispose_surface(&mut self) -> Result<(), RenderError> {
        let output = self.output.take().ok_or(RenderError::SurfaceDisposed)?;
        output.depth_texture.destroy();
        output.scene_color.destroy();
        output.post.destroy();
        drop(output.surface);
        log::info!("Render surface released");
        Ok(())
    }

    /// Handle window resize. Zero sizes and a disposed surface are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let Some(output) = self.output.as_mut() else {
            return;
        };
        self.size = winit::dpi::PhysicalSize::new(width, height);
        self.config.width = width;
        self.config.height = height;
        output.surface.configure(&self.device, &self.config);

        output.depth_texture.destroy();
        output.scene_color.destroy();
        output.depth_texture = Texture::create_depth_texture(&self.device, width, height, "Depth Texture");
        output.scene_color =
            Texture::create_render_target(&self.device, width, height, Texture::HDR_FORMAT, "Scene Color");
        output.post.resize(&self.device, &self.queue, width, height);
    }

    fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform
            .update(camera, &self.fog, self.config.width, self.config.height);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Draw the scene into the HDR target, run the post chain and present.
    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        if self.output.is_none() {
            return Err(RenderError::SurfaceDisposed);
        }
        self.update_camera(camera);

        let Some(output) = self.output.as_ref() else {
            return Err(RenderError::SurfaceDisposed);
        };
        let frame = match output.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                output.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let frame_view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let draw_list = scene.draw_list();
        for object in &draw_list {
            if let Some(gpu) = self.objects.get(&object.id) {
                self.queue
                    .write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[object.uniform()]));
            }
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output.scene_color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &output.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            for object in draw_list {
                let Some(gpu) = self.objects.get(&object.id) else {
                    continue;
                };
                let pipeline = match object.material {
                    Material::Stars { .. } => &self.star_pipeline,
                    Material::Nebula { .. } => &self.nebula_pipeline,
                    Material::Mountain => &self.mountain_pipeline,
                    Material::Atmosphere { .. } => &self.atmosphere_pipeline,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &gpu.bind_group, &[]);
                match &gpu.geometry {
                    GpuGeometry::Mesh(mesh) => {
                        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
                    }
                    GpuGeometry::Stars(stars) => {
                        pass.set_vertex_buffer(0, stars.instance_buffer.slice(..));
                        pass.draw(0..6, 0..stars.num_instances);
                    }
                }
            }
        }

        output
            .post
            .run(&self.device, &mut encoder, &output.scene_color.view, &frame_view);

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
