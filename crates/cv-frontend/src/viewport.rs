//! Viewport rendering state

use std::sync::Arc;

use cv_renderer::{Camera, Renderer, RendererConfig, SceneAdapter};
use parking_lot::Mutex;

/// Initial render target size, replaced on the first layout pass
const INITIAL_SIZE: (u32, u32) = (800, 600);

/// Render texture for viewport
struct RenderTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    egui_texture_id: egui::TextureId,
    width: u32,
    height: u32,
}

/// Viewport rendering state
pub struct ViewportState {
    pub adapter: SceneAdapter<Renderer>,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    render_texture: Option<RenderTexture>,
}

impl ViewportState {
    /// Create a new viewport state
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Self {
        let (width, height) = INITIAL_SIZE;
        let renderer = Renderer::new(
            device.clone(),
            queue.clone(),
            format,
            width,
            height,
            config,
        );
        let camera = Camera::with_config(width as f32 / height as f32, &config.camera);

        Self {
            adapter: SceneAdapter::new(renderer, camera, true),
            device,
            queue,
            format,
            render_texture: None,
        }
    }

    /// Ensure the render texture matches the requested size
    pub fn ensure_texture(
        &mut self,
        width: u32,
        height: u32,
        egui_renderer: &mut egui_wgpu::Renderer,
    ) -> egui::TextureId {
        let width = width.max(1);
        let height = height.max(1);

        if let Some(rt) = &self.render_texture
            && rt.width == width
            && rt.height == height
        {
            return rt.egui_texture_id;
        }

        // Free old texture if exists
        if let Some(old) = self.render_texture.take() {
            egui_renderer.free_texture(&old.egui_texture_id);
            old.texture.destroy();
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Viewport Render Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let egui_texture_id =
            egui_renderer.register_native_texture(&self.device, &view, wgpu::FilterMode::Linear);

        // Camera aspect and depth target follow the texture
        self.adapter.resize(width, height);

        self.render_texture = Some(RenderTexture {
            texture,
            view,
            egui_texture_id,
            width,
            height,
        });
        egui_texture_id
    }

    /// Render the 3D scene to the texture
    pub fn render(&mut self) {
        let Some(rt) = &self.render_texture else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Render Encoder"),
            });

        let drawn = self.adapter.render_frame(|ctx| {
            ctx.backend
                .render(&mut encoder, &rt.view, &ctx.camera, &ctx.model);
        });

        if drawn.is_some() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    /// Apply renderer settings to the live scene
    pub fn apply_config(&mut self, config: &RendererConfig) {
        if let Some(ctx) = self.adapter.context_mut() {
            ctx.backend.apply_config(config);
            ctx.camera.apply_config(&config.camera);
        }
    }
}

pub type SharedViewportState = Arc<Mutex<ViewportState>>;
