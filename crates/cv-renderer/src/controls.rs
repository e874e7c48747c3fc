//! Orbit-style camera interaction
//!
//! The controller keeps its own spherical coordinates around a target. After
//! anything else moves the camera (such as framing a new model) it must be
//! resynchronized with [`OrbitControls::sync_from_camera`] or the next drag
//! would snap the camera back around the stale target.

use glam::Vec3;

use crate::camera::Camera;

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Rotates, pans and zooms a [`Camera`] around a pivot point
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Pivot point
    pub target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Fraction of the distance moved per pixel of pan
    pub pan_speed: f32,
    /// Fraction of the distance per scroll unit
    pub zoom_speed: f32,
}

impl OrbitControls {
    /// Create controls matching the camera's current pose
    pub fn new(camera: &Camera) -> Self {
        let mut controls = Self {
            target: camera.target,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            rotate_speed: 0.01,
            pan_speed: 0.002,
            zoom_speed: 0.1,
        };
        controls.sync_from_camera(camera);
        controls
    }

    /// Current distance from the target
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Move the pivot without moving the camera
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Re-derive the orbit state from the camera position around `target`
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        let offset = camera.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        self.distance = distance;
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.yaw = offset.x.atan2(offset.z);
    }

    /// Orbit around the target by a drag delta in pixels
    pub fn rotate(&mut self, camera: &mut Camera, delta_x: f32, delta_y: f32) {
        self.yaw -= delta_x * self.rotate_speed;
        self.pitch = (self.pitch + delta_y * self.rotate_speed).clamp(-MAX_PITCH, MAX_PITCH);
        self.apply(camera);
    }

    /// Pan the target in the view plane by a drag delta in pixels
    pub fn pan(&mut self, camera: &mut Camera, delta_x: f32, delta_y: f32) {
        let forward = (self.target - camera.position).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let scale = self.distance * self.pan_speed;
        self.target += right * (-delta_x * scale) + up * (delta_y * scale);
        self.apply(camera);
    }

    /// Zoom towards the target; positive `delta` moves closer
    pub fn zoom(&mut self, camera: &mut Camera, delta: f32) {
        let factor = (1.0 - delta * self.zoom_speed).clamp(0.5, 1.5);
        self.distance = (self.distance * factor).max(1e-4);
        self.apply(camera);
    }

    fn apply(&self, camera: &mut Camera) {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.distance;
        camera.position = self.target + offset;
        camera.target = self.target;
    }
}
