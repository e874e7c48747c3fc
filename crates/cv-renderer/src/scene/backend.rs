//! GPU resource seam

use cv_core::{MeshGeometry, MeshMaterial};

/// Creates and releases the GPU objects behind renderable meshes.
///
/// Every handle returned by `create_*` is handed back to the matching
/// `dispose_*` exactly once, when the mesh stops being displayed. After
/// [`SceneBackend::release`] no other method is called.
pub trait SceneBackend {
    /// GPU-side geometry handle
    type Geometry;
    /// GPU-side material handle
    type Material;

    /// Upload vertex and index data
    fn create_geometry(&mut self, geometry: &MeshGeometry) -> Self::Geometry;

    /// Create the material for one mesh
    fn create_material(&mut self, material: &MeshMaterial) -> Self::Material;

    /// Release a geometry handle
    fn dispose_geometry(&mut self, geometry: Self::Geometry);

    /// Release a material handle
    fn dispose_material(&mut self, material: Self::Material);

    /// Resize render targets
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Release everything the backend itself owns
    fn release(&mut self);
}
