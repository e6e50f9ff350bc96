//! Perspective camera producing reverse-Z view and projection matrices.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};
use globe_config::CameraConfig;

/// Camera uniform data matching the WGSL `CameraUniform` struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// World-space eye position; `w` is unused.
    pub position: [f32; 4],
}

/// A perspective camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Build the startup camera: on the +Z axis at `config.distance`,
    /// looking at the origin.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, config.distance),
            rotation: Quat::IDENTITY,
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        };
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Rotate to face `target` with world +Y as up.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            return;
        };
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Projection with reverse-Z: near maps to 1.0, far maps to 0.0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Update the aspect ratio after a resize. Zero height is ignored.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            view: self.view_matrix().to_cols_array_2d(),
            proj: self.projection_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn camera() -> Camera {
        Camera::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_startup_camera_looks_at_origin() {
        let camera = camera();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.fov_y - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_look_at_from_side() {
        let mut camera = camera();
        camera.position = Vec3::new(5.0, 0.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((camera.up() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = camera();
        let proj = camera.projection_matrix();

        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-4);
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = camera();
        let clip = camera.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-6);
        assert!((clip.y / clip.w).abs() < 1e-6);
    }

    #[test]
    fn test_set_aspect_ratio_ignores_zero_height() {
        let mut camera = camera();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(800.0, 0.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_basis_orthonormal() {
        let mut camera = camera();
        camera.position = Vec3::new(1.0, 2.0, 2.0);
        camera.look_at(Vec3::ZERO);
        let (f, u, r) = (camera.forward(), camera.up(), camera.right());
        for v in [f, u, r] {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
        assert!(f.dot(u).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5);
        assert!(u.dot(r).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_carries_position() {
        let camera = camera();
        let uniform = camera.to_uniform();
        assert_eq!(uniform.position, [0.0, 0.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 208);
    }
}
