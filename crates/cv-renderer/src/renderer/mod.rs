//! Main renderer
//!
//! The wgpu implementation of [`SceneBackend`]. Draws the model group into
//! an offscreen color target supplied by the caller.

mod gpu_resources;
mod mesh;

use std::sync::Arc;

use cv_core::{MeshGeometry, MeshMaterial};
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::light::DirectionalLight;
use crate::scene::{ModelGroup, SceneBackend};

pub use mesh::{GpuGeometry, GpuMaterial, MaterialUniform, MeshRenderer, MeshVertex};

/// Depth attachment sized to the color target
struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = gpu_resources::create_depth_texture(device, width, height);
        Self {
            texture,
            view,
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Main renderer
pub struct Renderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    camera_buffer: wgpu::Buffer,
    light: DirectionalLight,
    light_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    mesh_renderer: MeshRenderer,
    depth: DepthTarget,
    clear_color: wgpu::Color,
    released: bool,
}

impl Renderer {
    /// Create a renderer targeting `format` at the given size
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> Self {
        let camera_uniform = Camera::new(width.max(1) as f32 / height.max(1) as f32).uniform();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let light = DirectionalLight::from_config(&config.lighting);
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[light.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_layout = gpu_resources::create_scene_bind_group_layout(&device);
        let scene_bind_group = gpu_resources::create_scene_bind_group(
            &device,
            &scene_layout,
            &camera_buffer,
            &light_buffer,
        );

        let mesh_renderer = MeshRenderer::new(&device, format, &scene_layout);
        let depth = DepthTarget::new(&device, width, height);

        tracing::info!("Renderer created: {:?} {}x{}", format, width, height);

        Self {
            device,
            queue,
            camera_buffer,
            light,
            light_buffer,
            scene_bind_group,
            mesh_renderer,
            depth,
            clear_color: clear_color(config.clear_color),
            released: false,
        }
    }

    /// Current target size
    pub fn size(&self) -> (u32, u32) {
        (self.depth.width, self.depth.height)
    }

    /// Apply light and background settings
    pub fn apply_config(&mut self, config: &RendererConfig) {
        self.light.apply_config(&config.lighting);
        self.clear_color = clear_color(config.clear_color);
    }

    /// Draw the model into `view`
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        camera: &Camera,
        model: &ModelGroup<Renderer>,
    ) {
        if self.released {
            return;
        }

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.uniform()]),
        );
        self.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[self.light.uniform()]),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for mesh in model.iter() {
            self.mesh_renderer.draw(
                &mut render_pass,
                &self.scene_bind_group,
                &mesh.geometry,
                &mesh.material,
            );
        }
    }
}

fn clear_color([r, g, b, a]: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}

impl SceneBackend for Renderer {
    type Geometry = GpuGeometry;
    type Material = GpuMaterial;

    fn create_geometry(&mut self, geometry: &MeshGeometry) -> GpuGeometry {
        self.mesh_renderer.create_geometry(&self.device, geometry)
    }

    fn create_material(&mut self, material: &MeshMaterial) -> GpuMaterial {
        self.mesh_renderer.create_material(&self.device, material)
    }

    fn dispose_geometry(&mut self, geometry: GpuGeometry) {
        geometry.vertex_buffer.destroy();
        geometry.index_buffer.destroy();
    }

    fn dispose_material(&mut self, material: GpuMaterial) {
        material.buffer.destroy();
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if self.released || (width, height) == self.size() {
            return;
        }
        self.depth.texture.destroy();
        self.depth = DepthTarget::new(&self.device, width, height);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.camera_buffer.destroy();
        self.light_buffer.destroy();
        self.depth.texture.destroy();
        self.released = true;
        tracing::debug!("Renderer released");
    }
}
