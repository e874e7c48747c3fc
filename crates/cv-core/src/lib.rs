//! CAD Viewer core
//!
//! Everything that does not need a GPU: the data model returned by the
//! external CAD kernel, import dispatch, conversion of sub-mesh records into
//! renderable geometry, and bounding-box math.

pub mod bounds;
pub mod import;
pub mod mesh;

pub use bounds::BoundingBox;
#[cfg(not(target_arch = "wasm32"))]
pub use import::CommandImporter;
pub use import::{
    BufferAttribute, CadFormat, CadImporter, DeflectionType, ImportError, ImportResult,
    ImporterError, LinearUnit, MeshAttributes, MeshRecord, TessellationParams, import_bytes,
};
pub use mesh::{
    DEFAULT_MESH_COLOR, IndexBuffer, IndexFormat, Materialized, MaterializedMesh, MeshGeometry,
    MeshMaterial, SkipReason, SkippedMesh, compute_vertex_normals, materialize, materialize_record,
};
