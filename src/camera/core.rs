use glam::{Mat4, Vec3};

/// Perspective camera defined by eye position, target, and projection
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the camera matrices.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of projection times the rotation-only view, mapping clip
    /// coordinates to skybox directions.
    pub sky_inv_view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Padding for GPU alignment.
    pub(crate) _pad: f32,
}

impl Camera {
    /// View matrix.
    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection matrix. `perspective_rh` already uses the [0,1] depth
    /// range (wgpu convention).
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Inverse view-projection with the translation stripped, so the
    /// skybox stays at infinity.
    #[must_use]
    pub fn sky_inverse(&self) -> Mat4 {
        let mut rotation = self.view();
        rotation.w_axis = glam::Vec4::W;
        (self.projection() * rotation).inverse()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity matrices.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sky_inv_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            _pad: 0.0,
        }
    }

    /// Update uniform fields from the given camera's current state.
    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.sky_inv_view_proj = camera.sky_inverse().to_cols_array_2d();
        self.position = camera.eye.to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 20.0, 30.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    #[test]
    fn target_projects_to_screen_center() {
        let clip = camera().build_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn sky_direction_ignores_eye_position() {
        let a = camera();
        let mut b = a;
        b.eye += Vec3::new(100.0, 0.0, 0.0);
        b.target += Vec3::new(100.0, 0.0, 0.0);
        let center = glam::Vec4::new(0.0, 0.0, 1.0, 1.0);
        let da = a.sky_inverse() * center;
        let db = b.sky_inverse() * center;
        let da = (da.truncate() / da.w).normalize();
        let db = (db.truncate() / db.w).normalize();
        assert!((da - db).length() < 1e-4);
        let forward = (a.target - a.eye).normalize();
        assert!(da.dot(forward) > 0.999);
    }
}
