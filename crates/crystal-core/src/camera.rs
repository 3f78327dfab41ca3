//! Orbit camera shared with the web frontend.
//!
//! The camera keeps an explicit eye and target and rotates the eye about the
//! target. Nothing here touches platform APIs.

use crate::constants::*;
use crate::geometry::Bounds;
use glam::{Mat4, Vec3};

/// Right-handed perspective camera orbiting a target point.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(40.0, 20.0, 40.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

// Keeps the orbit away from the poles where look_at degenerates.
const MAX_PITCH: f32 = 1.5;
const MIN_DISTANCE: f32 = 0.5;

impl OrbitCamera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// Frame `bounds` from the standard three-quarter view.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds) {
        let center = bounds.center();
        let dist = (bounds.max_dim() / 2.0) / (self.fovy_radians / 2.0).tan() * CAMERA_FIT_MARGIN;
        let dir = Vec3::from(CAMERA_FIT_DIR).normalize();
        self.target = center;
        self.eye = center + dir * dist.max(MIN_DISTANCE);
    }

    /// Shift eye and target together along y.
    pub fn pan_vertical(&mut self, dy: f32) {
        self.eye.y += dy;
        self.target.y += dy;
    }

    /// Rotate the eye about the target by yaw (around up) and pitch.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.eye - self.target;
        let radius = offset.length().max(MIN_DISTANCE);
        let current_yaw = offset.x.atan2(offset.z);
        let current_pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let new_yaw = current_yaw + yaw;
        let new_pitch = (current_pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
        let (sy, cy) = new_yaw.sin_cos();
        let (sp, cp) = new_pitch.sin_cos();
        self.eye = self.target + Vec3::new(sy * cp, sp, cy * cp) * radius;
    }

    /// Scale the eye distance; factors below 1 move closer.
    pub fn dolly(&mut self, factor: f32) {
        let offset = self.eye - self.target;
        let len = offset.length();
        if len <= f32::EPSILON || !factor.is_finite() {
            return;
        }
        let new_len = (len * factor).clamp(MIN_DISTANCE, self.zfar * 0.5);
        self.eye = self.target + offset / len * new_len;
    }
}
