//! Lit, flat-color mesh pipeline

use bytemuck::{Pod, Zeroable};
use cv_core::{IndexFormat, MeshGeometry, MeshMaterial};
use wgpu::util::DeviceExt;

use crate::DEPTH_FORMAT;

use super::gpu_resources;

/// Vertex for mesh rendering
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    /// Vertex position in model space.
    pub position: [f32; 3],
    /// Vertex normal (may be zero for unreferenced vertices).
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Vertex attribute descriptors for the shader.
    pub const ATTRIBUTES: &'static [wgpu::VertexAttribute] = &[
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: std::mem::size_of::<[f32; 3]>() as u64,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
    ];

    /// Returns the vertex buffer layout for this vertex type.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRIBUTES,
        }
    }

    /// Interleave positions and normals.
    pub fn interleave(geometry: &MeshGeometry) -> Vec<Self> {
        geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .map(|(&position, &normal)| Self { position, normal })
            .collect()
    }
}

/// Material uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color (RGBA).
    pub color: [f32; 4],
    /// x: double-sided flag, rest padding.
    pub flags: [u32; 4],
}

impl From<&MeshMaterial> for MaterialUniform {
    fn from(material: &MeshMaterial) -> Self {
        let [r, g, b] = material.color;
        Self {
            color: [r, g, b, 1.0],
            flags: [material.double_sided as u32, 0, 0, 0],
        }
    }
}

/// GPU geometry for one mesh
pub struct GpuGeometry {
    /// Interleaved vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices.
    pub index_count: u32,
    /// Width of the index elements.
    pub index_format: wgpu::IndexFormat,
}

/// GPU material for one mesh
pub struct GpuMaterial {
    /// Material uniform buffer.
    pub buffer: wgpu::Buffer,
    /// Bind group for group 1.
    pub bind_group: wgpu::BindGroup,
}

fn wgpu_index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::U16 => wgpu::IndexFormat::Uint16,
        IndexFormat::U32 => wgpu::IndexFormat::Uint32,
    }
}

/// Mesh pipeline and per-mesh resource factory
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    material_bind_group_layout: wgpu::BindGroupLayout,
}

impl MeshRenderer {
    /// Creates the mesh pipeline.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        scene_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let material_bind_group_layout = gpu_resources::create_material_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[scene_bind_group_layout, &material_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None, // Materials are double-sided
                ..Default::default()
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

        Self {
            pipeline,
            material_bind_group_layout,
        }
    }

    /// Upload geometry to vertex and index buffers.
    pub fn create_geometry(&self, device: &wgpu::Device, geometry: &MeshGeometry) -> GpuGeometry {
        let vertices = MeshVertex::interleave(geometry);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: geometry.indices.as_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        GpuGeometry {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            index_format: wgpu_index_format(geometry.indices.format()),
        }
    }

    /// Create the uniform and bind group for a material.
    pub fn create_material(&self, device: &wgpu::Device, material: &MeshMaterial) -> GpuMaterial {
        let uniform = MaterialUniform::from(material);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Material Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Material Bind Group"),
            layout: &self.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        GpuMaterial { buffer, bind_group }
    }

    /// Draw one mesh.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        scene_bind_group: &wgpu::BindGroup,
        geometry: &GpuGeometry,
        material: &GpuMaterial,
    ) {
        if geometry.index_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, scene_bind_group, &[]);
        render_pass.set_bind_group(1, &material.bind_group, &[]);
        render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        render_pass.set_index_buffer(geometry.index_buffer.slice(..), geometry.index_format);
        render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use cv_core::{IndexBuffer, MeshMaterial};

    use super::*;

    #[test]
    fn test_interleave_pairs_positions_with_normals() {
        let geometry = MeshGeometry {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: IndexBuffer::new(&[0, 1, 2], 3),
            bounds: Default::default(),
        };
        let vertices = MeshVertex::interleave(&geometry);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
    }

    #[test]
    fn test_material_uniform_flags() {
        let material = MeshMaterial::from_record_color(Some(&[255.0, 0.0, 0.0]));
        let uniform = MaterialUniform::from(&material);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.flags[0], 1);
    }

    #[test]
    fn test_index_format_mapping() {
        assert_eq!(wgpu_index_format(IndexFormat::U16), wgpu::IndexFormat::Uint16);
        assert_eq!(wgpu_index_format(IndexFormat::U32), wgpu::IndexFormat::Uint32);
    }
}
