//! Scene management
//!
//! - [`SceneBackend`] - Creates and releases the GPU objects behind meshes
//! - [`ModelGroup`] - The set of meshes currently on display

mod backend;
mod model_group;

pub use backend::SceneBackend;
pub use model_group::{ModelGroup, RenderableMesh};
