//! Orbit camera controls around the origin with damped rotation.
//!
//! Drag input accumulates into a pending spherical delta. Each
//! [`update`](OrbitControls::update) applies `damping` of the pending delta
//! and keeps the rest, decayed by `(1 - damping)`, for later frames. The sum
//! of all applied steps equals the input, so a drag always ends where it
//! would without damping; it just gets there gradually.

use glam::Vec2;
use glam::Vec3;
use globe_config::CameraConfig;
use globe_input::MouseState;

use crate::Camera;

/// Keeps the polar angle off the poles, where the look-at basis degenerates.
const POLAR_EPSILON: f32 = 1e-3;

/// Pending deltas below this are dropped.
const REST_THRESHOLD: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Angle around +Y, measured from +Z toward +X.
    azimuth: f32,
    /// Angle down from +Y.
    polar: f32,
    distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    damping: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitControls {
    /// Controls starting from the configured distance on the +Z axis.
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut controls = Self {
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            distance: config.distance,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            damping: config.damping.clamp(f32::EPSILON, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        };
        controls.distance = controls.clamp_distance(controls.distance);
        controls
    }

    /// Queue a rotation from a drag of `delta` pixels. Dragging right spins
    /// the globe right, so the camera moves left.
    pub fn rotate(&mut self, delta: Vec2) {
        self.pending_azimuth -= delta.x * self.rotate_speed;
        self.pending_polar -= delta.y * self.rotate_speed;
    }

    /// Zoom by `lines` wheel lines. Positive zooms in. Applied immediately.
    pub fn zoom(&mut self, lines: f32) {
        if lines == 0.0 {
            return;
        }
        let factor = (1.0 - self.zoom_speed).powf(lines);
        self.distance = self.clamp_distance(self.distance * factor);
    }

    /// Feed one frame of mouse state: left-drag rotates, the wheel zooms.
    pub fn handle_input(&mut self, mouse: &MouseState) {
        let drag = mouse.drag_delta();
        if drag != Vec2::ZERO {
            self.rotate(drag);
        }
        self.zoom(mouse.scroll());
    }

    /// Apply one damped step and write the camera position and rotation.
    pub fn update(&mut self, camera: &mut Camera) {
        self.azimuth += self.pending_azimuth * self.damping;
        self.polar = (self.polar + self.pending_polar * self.damping)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);

        let decay = 1.0 - self.damping;
        self.pending_azimuth *= decay;
        self.pending_polar *= decay;
        if self.pending_azimuth.abs() < REST_THRESHOLD {
            self.pending_azimuth = 0.0;
        }
        if self.pending_polar.abs() < REST_THRESHOLD {
            self.pending_polar = 0.0;
        }

        camera.position = self.eye();
        camera.look_at(Vec3::ZERO);
    }

    /// Camera position for the current angles and distance.
    pub fn eye(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        Vec3::new(sin_polar * sin_az, cos_polar, sin_polar * cos_az) * self.distance
    }

    /// True while a previous drag is still being played out.
    pub fn is_moving(&self) -> bool {
        self.pending_azimuth != 0.0 || self.pending_polar != 0.0
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{ElementState, MouseButton, MouseScrollDelta};

    fn setup() -> (OrbitControls, Camera) {
        let config = CameraConfig::default();
        (
            OrbitControls::from_config(&config),
            Camera::from_config(&config, 1.0),
        )
    }

    #[test]
    fn test_update_at_rest_keeps_startup_view() {
        let (mut controls, mut camera) = setup();
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!(!controls.is_moving());
    }

    #[test]
    fn test_damping_applies_fraction_then_decays() {
        let (mut controls, mut camera) = setup();
        controls.rotate(Vec2::new(-100.0, 0.0));
        let total = 100.0 * CameraConfig::default().rotate_speed;

        controls.update(&mut camera);
        let first = controls.azimuth();
        assert!((first - total * 0.03).abs() < 1e-6);

        controls.update(&mut camera);
        let second = controls.azimuth() - first;
        assert!((second - total * 0.03 * 0.97).abs() < 1e-6);
        assert!(second < first);
    }

    #[test]
    fn test_damped_motion_converges_to_full_input() {
        let (mut controls, mut camera) = setup();
        controls.rotate(Vec2::new(-50.0, 0.0));
        for _ in 0..2000 {
            controls.update(&mut camera);
        }
        let expected = 50.0 * CameraConfig::default().rotate_speed;
        assert!((controls.azimuth() - expected).abs() < 1e-3);
        assert!(!controls.is_moving());
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_clamped_off_poles() {
        let (mut controls, mut camera) = setup();
        controls.rotate(Vec2::new(0.0, 1.0e6));
        for _ in 0..50 {
            controls.update(&mut camera);
        }
        assert!(controls.polar() >= POLAR_EPSILON);
        assert!(camera.position.y > 2.99);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn test_zoom_clamped_to_distance_range() {
        let (mut controls, _) = setup();
        controls.zoom(1000.0);
        assert_eq!(controls.distance(), 1.2);
        controls.zoom(-1000.0);
        assert_eq!(controls.distance(), 20.0);
    }

    #[test]
    fn test_handle_input_requires_left_drag() {
        let (mut controls, _) = setup();
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(0.0, 0.0);
        mouse.on_cursor_moved(30.0, 0.0);
        controls.handle_input(&mouse);
        assert!(!controls.is_moving());

        mouse.clear_transients();
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(60.0, 0.0);
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        controls.handle_input(&mouse);
        assert!(controls.is_moving());
        assert!(controls.distance() < 3.0);
    }
}
