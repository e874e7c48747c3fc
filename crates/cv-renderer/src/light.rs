//! Directional light with ambient term

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::LightingConfig;

/// Light uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// Direction towards the light (xyz), w unused.
    pub direction: [f32; 4],
    /// Light color premultiplied by intensity (rgb), w unused.
    pub color: [f32; 4],
    /// Ambient color premultiplied by strength (rgb), w unused.
    pub ambient: [f32; 4],
}

/// A single directional light plus uniform ambient light
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Direction the light travels (normalized)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Ambient color
    pub ambient_color: Vec3,
    /// Ambient strength
    pub ambient_strength: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}

impl DirectionalLight {
    /// Create a light from configuration
    pub fn from_config(config: &LightingConfig) -> Self {
        let mut light = Self {
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: 1.0,
            ambient_color: Vec3::ONE,
            ambient_strength: 0.5,
        };
        light.apply_config(config);
        light
    }

    /// Apply lighting configuration
    pub fn apply_config(&mut self, config: &LightingConfig) {
        self.set_direction(Vec3::from_array(config.direction));
        self.color = Vec3::from_array(config.color);
        self.intensity = config.intensity;
        self.ambient_color = Vec3::from_array(config.ambient_color);
        self.ambient_strength = config.ambient_strength;
    }

    /// Set light direction; a zero vector keeps the current direction
    pub fn set_direction(&mut self, direction: Vec3) {
        let direction = direction.normalize_or_zero();
        if direction != Vec3::ZERO {
            self.direction = direction;
        }
    }

    /// Get light uniform data
    pub fn uniform(&self) -> LightUniform {
        let to_light = -self.direction;
        let color = self.color * self.intensity;
        let ambient = self.ambient_color * self.ambient_strength;
        LightUniform {
            direction: [to_light.x, to_light.y, to_light.z, 0.0],
            color: [color.x, color.y, color.z, 1.0],
            ambient: [ambient.x, ambient.y, ambient.z, 1.0],
        }
    }
}
