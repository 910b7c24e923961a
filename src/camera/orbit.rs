//! Orbit interaction primitive
//!
//! Spherical coordinate camera around a pivot point, driven by pointer drag,
//! scroll wheel and optional auto-rotation.

use bevy::math::Vec3;

use crate::config::camera::*;

/// Orbit camera state for spherical coordinate camera control
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians), clamped to avoid gimbal lock
    pub pitch: f32,
    /// Distance from the camera to the pivot
    pub distance: f32,
    /// The point the camera orbits around
    pub pivot: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Whether update() drives the camera at all
    pub enabled: bool,
    pub auto_rotate: bool,
    /// Radians per second
    pub auto_rotate_speed: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        let mut orbit = Self {
            yaw: 0.0,
            pitch: 0.4,
            distance: 6.5,
            pivot: Vec3::from_array(HOME_PIVOT),
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
            enabled: true,
            auto_rotate: false,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
        };
        orbit.sync_from(Vec3::from_array(HOME_POSITION), orbit.pivot);
        orbit
    }
}

impl OrbitControls {
    /// Camera position for the current spherical coordinates
    pub fn position(&self) -> Vec3 {
        // yaw: rotation around Y axis
        // pitch: rotation around X axis (elevation)
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.pivot + Vec3::new(x, y, z)
    }

    /// Re-derive spherical coordinates from an externally set pose
    pub fn sync_from(&mut self, position: Vec3, pivot: Vec3) {
        self.pivot = pivot;
        let offset = position - pivot;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            self.distance = self.min_distance;
            return;
        }
        self.distance = distance;
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.yaw = offset.x.atan2(offset.z);
    }

    pub fn set_bounds(&mut self, min_distance: f32, max_distance: f32) {
        self.min_distance = min_distance.min(max_distance);
        self.max_distance = max_distance.max(min_distance);
        self.clamp_distance();
    }

    pub fn clamp_distance(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Pointer drag in screen pixels
    pub fn drag(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw -= delta_x * ROTATION_SPEED;
        self.pitch -= delta_y * ROTATION_SPEED;

        // Clamp pitch to prevent camera flipping
        self.pitch = self.pitch.clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Scroll wheel, positive moves closer
    pub fn scroll(&mut self, delta: f32) {
        self.distance -= delta * ZOOM_SPEED;
        self.clamp_distance();
    }

    /// Advance auto-rotation and return the resulting position
    pub fn update(&mut self, dt: f32) -> Vec3 {
        if self.auto_rotate {
            self.yaw += self.auto_rotate_speed * dt;
        }
        self.clamp_distance();
        self.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_then_position_reproduces_pose() {
        let mut orbit = OrbitControls::default();
        let pivot = Vec3::new(1.0, 0.0, -2.0);
        let position = Vec3::new(4.0, 3.0, 2.0);
        orbit.sync_from(position, pivot);
        assert!(orbit.position().distance(position) < 1e-4);
    }

    #[test]
    fn scroll_respects_bounds() {
        let mut orbit = OrbitControls::default();
        orbit.scroll(1_000.0);
        assert_eq!(orbit.distance, MIN_DISTANCE);
        orbit.scroll(-1_000.0);
        assert_eq!(orbit.distance, MAX_DISTANCE);
    }

    #[test]
    fn drag_clamps_pitch() {
        let mut orbit = OrbitControls::default();
        orbit.drag(0.0, -100_000.0);
        assert_eq!(orbit.pitch, MAX_PITCH);
    }

    #[test]
    fn auto_rotate_advances_yaw_only_when_enabled() {
        let mut orbit = OrbitControls::default();
        let yaw = orbit.yaw;
        orbit.update(1.0);
        assert_eq!(orbit.yaw, yaw);
        orbit.auto_rotate = true;
        orbit.update(1.0);
        assert!((orbit.yaw - yaw - orbit.auto_rotate_speed).abs() < 1e-6);
    }
}
