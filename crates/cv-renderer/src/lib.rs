//! CAD Viewer Renderer
//!
//! Scene management and WGPU rendering for imported CAD models.
//!
//! # Architecture
//!
//! - [`adapter::SceneAdapter`] - Owns the render context and drives the
//!   import -> materialize -> fit pipeline
//! - [`scene::SceneBackend`] - GPU seam creating and releasing geometry and
//!   material handles
//! - [`scene::ModelGroup`] - The meshes currently on display
//! - [`renderer::Renderer`] - The wgpu implementation of the backend
//!
//! # Module Structure
//!
//! ```text
//! cv-renderer/
//! ├── adapter.rs       # Scene adapter and render context
//! ├── scene/           # Backend trait and model group
//! ├── renderer/        # wgpu renderer, mesh pipeline, GPU resources
//! ├── camera.rs        # Perspective camera and model framing
//! ├── controls.rs      # Orbit controls
//! ├── light.rs         # Directional + ambient light
//! └── config.rs        # Serializable renderer settings
//! ```

pub mod adapter;
pub mod camera;
pub mod config;
pub mod controls;
pub mod light;
pub mod renderer;
pub mod scene;

pub use adapter::{FrameLoop, RenderContext, SceneAdapter, SceneSummary, ViewerError};
pub use camera::{Camera, CameraFit, CameraUniform, DEFAULT_CAMERA_POSITION};
pub use config::{CameraConfig, LightingConfig, RendererConfig};
pub use controls::OrbitControls;
pub use light::{DirectionalLight, LightUniform};
pub use renderer::{GpuGeometry, GpuMaterial, Renderer};
pub use scene::{ModelGroup, RenderableMesh, SceneBackend};

/// Depth buffer format shared by every pipeline
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
