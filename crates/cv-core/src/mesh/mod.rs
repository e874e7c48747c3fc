//! Mesh materialization
//!
//! Turns the kernel's per-sub-mesh records into validated, GPU-ready
//! geometry and flat-color materials. Invalid records are skipped with a
//! warning; one bad sub-mesh never aborts the rest of the import.

mod normals;

use glam::Vec3;

use crate::bounds::BoundingBox;
use crate::import::{ImportResult, MeshRecord};

pub use normals::{compute_vertex_normals, triangle_normal};

/// Material color used when a record carries no usable color
pub const DEFAULT_MESH_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Largest vertex count addressable with 16-bit indices
pub const MAX_U16_VERTICES: usize = u16::MAX as usize;

/// Index element width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    /// Narrowest width that can address `vertex_count` vertices
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > MAX_U16_VERTICES {
            IndexFormat::U32
        } else {
            IndexFormat::U16
        }
    }
}

/// Triangle indices stored at the chosen width
#[derive(Debug, Clone, PartialEq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    /// Pack `indices` at the width required by `vertex_count`
    ///
    /// Every index must already be known to be `< vertex_count`.
    pub fn new(indices: &[u32], vertex_count: usize) -> Self {
        match IndexFormat::for_vertex_count(vertex_count) {
            IndexFormat::U16 => IndexBuffer::U16(indices.iter().map(|&i| i as u16).collect()),
            IndexFormat::U32 => IndexBuffer::U32(indices.to_vec()),
        }
    }

    pub fn format(&self) -> IndexFormat {
        match self {
            IndexBuffer::U16(_) => IndexFormat::U16,
            IndexBuffer::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Validated vertex data of one sub-mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: IndexBuffer,
    pub bounds: BoundingBox,
}

impl MeshGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Flat, untextured surface material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    /// Linear RGB in the unit interval
    pub color: [f32; 3],
    /// Render both faces; imported shells have no reliable winding
    pub double_sided: bool,
}

impl MeshMaterial {
    /// Material for a record color
    ///
    /// Three finite channels in `0..=255` are scaled to the unit interval.
    /// Anything else falls back to [`DEFAULT_MESH_COLOR`].
    pub fn from_record_color(color: Option<&[f64]>) -> Self {
        let color = match color {
            None => DEFAULT_MESH_COLOR,
            Some(&[r, g, b]) if [r, g, b].iter().all(|c| (0.0..=255.0).contains(c)) => {
                [r, g, b].map(|c| (c / 255.0) as f32)
            }
            Some(channels) => {
                tracing::warn!("Unusable mesh color {:?}, using default", channels);
                DEFAULT_MESH_COLOR
            }
        };
        Self {
            color,
            double_sided: true,
        }
    }
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self::from_record_color(None)
    }
}

/// Why a record produced no mesh
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("missing position array")]
    MissingPosition,
    #[error("missing index array")]
    MissingIndex,
    #[error("position array length {0} is not a multiple of 3")]
    MalformedPosition(usize),
    #[error("index array length {0} is not a multiple of 3")]
    MalformedIndex(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// A record that was skipped during materialization
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMesh {
    /// Position of the record in the import result
    pub index: usize,
    pub name: Option<String>,
    pub reason: SkipReason,
}

/// A renderable geometry/material pair
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedMesh {
    pub name: String,
    pub geometry: MeshGeometry,
    pub material: MeshMaterial,
}

/// Everything produced from one import result
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    pub meshes: Vec<MaterializedMesh>,
    pub skipped: Vec<SkippedMesh>,
}

impl Materialized {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.triangle_count()).sum()
    }
}

/// Validate one record and build its geometry and material
pub fn materialize_record(record: &MeshRecord) -> Result<(MeshGeometry, MeshMaterial), SkipReason> {
    if let Some(error) = &record.malformed {
        return Err(SkipReason::Malformed(error.clone()));
    }
    let flat_positions = record.positions().ok_or(SkipReason::MissingPosition)?;
    let indices = record.indices().ok_or(SkipReason::MissingIndex)?;

    if flat_positions.len() % 3 != 0 {
        return Err(SkipReason::MalformedPosition(flat_positions.len()));
    }
    if indices.len() % 3 != 0 {
        return Err(SkipReason::MalformedIndex(indices.len()));
    }

    let positions: &[[f32; 3]] = bytemuck::cast_slice(flat_positions);
    let vertex_count = positions.len();

    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(SkipReason::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    let normals = match record.normals() {
        Some(flat) if flat.len() == flat_positions.len() => {
            bytemuck::cast_slice::<f32, [f32; 3]>(flat).to_vec()
        }
        Some(flat) => {
            tracing::debug!(
                "Normal array length {} does not match {} positions, recomputing",
                flat.len(),
                flat_positions.len()
            );
            compute_vertex_normals(positions, indices)
        }
        None => compute_vertex_normals(positions, indices),
    };

    let bounds = BoundingBox::from_points(positions.iter().map(|&p| Vec3::from(p)));

    let geometry = MeshGeometry {
        positions: positions.to_vec(),
        normals,
        indices: IndexBuffer::new(indices, vertex_count),
        bounds,
    };

    Ok((geometry, MeshMaterial::from_record_color(record.color.as_deref())))
}

/// Materialize every valid record of a successful import
pub fn materialize(result: &ImportResult) -> Materialized {
    let mut out = Materialized::default();

    for (i, record) in result.meshes.iter().enumerate() {
        match materialize_record(record) {
            Ok((geometry, material)) => {
                let name = record
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| format!("mesh_{}", i));
                tracing::debug!(
                    "Materialized '{}': {} vertices, {} triangles, {:?} indices",
                    name,
                    geometry.vertex_count(),
                    geometry.triangle_count(),
                    geometry.indices.format()
                );
                out.meshes.push(MaterializedMesh {
                    name,
                    geometry,
                    material,
                });
            }
            Err(reason) => {
                tracing::warn!(
                    "Skipping mesh {} ({}): {}",
                    i,
                    record.name.as_deref().unwrap_or("unnamed"),
                    reason
                );
                out.skipped.push(SkippedMesh {
                    index: i,
                    name: record.name.clone(),
                    reason,
                });
            }
        }
    }

    out
}
