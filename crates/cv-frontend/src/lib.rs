//! CAD Viewer Frontend
//!
//! egui-based application that imports STEP/IGES/BREP files through an
//! external CAD kernel and displays the tessellated result.

pub mod actions;
pub mod app;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod importer_wasm;
pub mod jobs;
pub mod state;
pub mod viewport;

// Re-exports for convenience
pub use app::CadViewerApp;
pub use config::{AppConfig, ConfigManager, SharedConfig};
pub use state::{AppAction, AppState, SharedAppState};
