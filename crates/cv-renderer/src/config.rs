//! Renderer configuration structures
//!
//! Serializable settings for the camera, lights and background, embedded in
//! the application's configuration file.

use serde::{Deserialize, Serialize};

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100000.0,
        }
    }
}

/// Lighting configuration (one directional light plus ambient)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Direction the light travels
    pub direction: [f32; 3],
    /// Light color (RGB)
    pub color: [f32; 3],
    /// Light intensity
    pub intensity: f32,
    /// Ambient light color (RGB)
    pub ambient_color: [f32; 3],
    /// Ambient light strength
    pub ambient_strength: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: [-0.5, -1.0, -0.75],
            color: [1.0, 1.0, 1.0],
            intensity: 0.8,
            ambient_color: [1.0, 1.0, 1.0],
            ambient_strength: 0.5,
        }
    }
}

/// Complete renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Camera settings
    pub camera: CameraConfig,
    /// Light settings
    pub lighting: LightingConfig,
    /// Background color (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            clear_color: [0.94, 0.94, 0.94, 1.0],
        }
    }
}
