//! Perspective camera and model framing

use bytemuck::{Pod, Zeroable};
use cv_core::BoundingBox;
use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Camera position used when there is nothing to frame.
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::splat(5.0);

/// Fit distance for a box with no extent, which would otherwise put the eye
/// on the target.
pub const MIN_FIT_DISTANCE: f32 = 1.0;

/// Camera uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// View matrix.
    pub view: [[f32; 4]; 4],
    /// Projection matrix.
    pub proj: [[f32; 4]; 4],
    /// Eye position (w = 1).
    pub eye: [f32; 4],
}

/// Result of framing a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Center of the framed box.
    pub center: Vec3,
    /// Full extents of the framed box.
    pub size: Vec3,
    /// Distance from the center along the view offset.
    pub distance: f32,
}

impl CameraFit {
    /// Distance that fits `bounds` into a vertical `fov` (radians).
    ///
    /// Wide viewports (`aspect > 1`) scale the distance by the aspect ratio so
    /// the model also fits horizontally.
    pub fn compute(bounds: &BoundingBox, fov: f32, aspect: f32) -> Self {
        let center = bounds.center();
        let size = bounds.size();
        let max_dim = bounds.max_dimension();

        let mut distance = if max_dim <= f32::EPSILON {
            MIN_FIT_DISTANCE
        } else {
            (max_dim / 2.0 / (fov / 2.0).tan()).abs()
        };
        if aspect > 1.0 {
            distance *= aspect;
        }

        Self {
            center,
            size,
            distance,
        }
    }

    /// Camera position: up and back from the center.
    pub fn eye(&self) -> Vec3 {
        self.center + Vec3::new(0.0, 0.5 * self.distance, self.distance)
    }
}

/// Perspective camera (Y up)
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera at the default pose
    pub fn new(aspect: f32) -> Self {
        Self::with_config(aspect, &CameraConfig::default())
    }

    /// Create a camera from configuration
    pub fn with_config(aspect: f32, config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: DEFAULT_CAMERA_POSITION,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100000.0,
        };
        camera.apply_config(config);
        camera
    }

    /// Apply fov and clipping planes from configuration
    pub fn apply_config(&mut self, config: &CameraConfig) {
        self.set_fov_degrees(config.fov_degrees);
        self.set_near(config.near);
        self.set_far(config.far);
    }

    /// Update aspect ratio from a viewport size
    pub fn update_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Set field of view in degrees
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov = fov_degrees.clamp(10.0, 120.0).to_radians();
    }

    /// Set near clipping plane
    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(0.001);
    }

    /// Set far clipping plane
    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + 1.0);
    }

    /// Return to the default pose: (5, 5, 5) looking at the origin
    pub fn reset(&mut self) {
        self.position = DEFAULT_CAMERA_POSITION;
        self.target = Vec3::ZERO;
    }

    /// Frame `bounds`, or reset to the default pose when there is nothing to
    /// frame. Returns the fit when one was computed.
    pub fn fit_to_bounds(&mut self, bounds: Option<&BoundingBox>) -> Option<CameraFit> {
        let Some(bounds) = bounds.filter(|b| b.is_valid()) else {
            self.reset();
            return None;
        };

        let fit = CameraFit::compute(bounds, self.fov, self.aspect);
        self.position = fit.eye();
        self.target = fit.center;

        tracing::debug!(
            "Camera fit: center={:?} size={:?} distance={}",
            fit.center,
            fit.size,
            fit.distance
        );

        Some(fit)
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get camera uniform data
    pub fn uniform(&self) -> CameraUniform {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        let view_proj = proj * view;

        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            eye: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }
}
