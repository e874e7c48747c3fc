//! Displayed mesh collection.

use cv_core::{BoundingBox, MaterializedMesh};
use uuid::Uuid;

use super::SceneBackend;

/// A mesh on display, owning its backend handles.
pub struct RenderableMesh<B: SceneBackend> {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Backend geometry handle.
    pub geometry: B::Geometry,
    /// Backend material handle.
    pub material: B::Material,
    /// Bounds in model space.
    pub bounds: BoundingBox,
    /// Number of triangles.
    pub triangle_count: usize,
}

/// Meshes of the current model, in import order.
pub struct ModelGroup<B: SceneBackend> {
    meshes: Vec<RenderableMesh<B>>,
}

impl<B: SceneBackend> Default for ModelGroup<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SceneBackend> ModelGroup<B> {
    /// Create an empty group.
    pub fn new() -> Self {
        Self { meshes: Vec::new() }
    }

    /// Upload a materialized mesh and add it to the group.
    ///
    /// Returns the mesh's UUID for reference.
    pub fn add(&mut self, backend: &mut B, mesh: &MaterializedMesh) -> Uuid {
        let id = Uuid::new_v4();
        let geometry = backend.create_geometry(&mesh.geometry);
        let material = backend.create_material(&mesh.material);

        self.meshes.push(RenderableMesh {
            id,
            name: mesh.name.clone(),
            geometry,
            material,
            bounds: mesh.geometry.bounds,
            triangle_count: mesh.geometry.triangle_count(),
        });
        id
    }

    /// Remove every mesh, releasing its geometry and material.
    ///
    /// Returns how many meshes were removed; an empty group is left alone.
    pub fn clear(&mut self, backend: &mut B) -> usize {
        if self.meshes.is_empty() {
            return 0;
        }

        let count = self.meshes.len();
        for mesh in self.meshes.drain(..) {
            backend.dispose_geometry(mesh.geometry);
            backend.dispose_material(mesh.material);
        }
        tracing::debug!("ModelGroup cleared {} meshes", count);
        count
    }

    /// Get the number of meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Check if there are any meshes.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Get an iterator over all meshes.
    pub fn iter(&self) -> impl Iterator<Item = &RenderableMesh<B>> {
        self.meshes.iter()
    }

    /// Union of every mesh's bounds, `None` when nothing has extent.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::union_all(self.meshes.iter().map(|m| &m.bounds))
    }

    /// Total triangles on display.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count).sum()
    }
}
