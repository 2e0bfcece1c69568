use glam::{Mat4, Vec3};

/// Perspective camera looking from `position` towards `target`.
///
/// The field of view is vertical and stored in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 25.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    /// Update the aspect ratio from a surface size. Zero heights are clamped.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 10.0, 25.0));
        assert_eq!(cam.fov_degrees, 75.0);
        assert_eq!((cam.near, cam.far), (0.1, 500.0));
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = PerspectiveCamera::default();
        cam.set_viewport(1280, 720);
        assert!((cam.aspect - 1280.0 / 720.0).abs() < 1e-6);
        cam.set_viewport(100, 0);
        assert_eq!(cam.aspect, 100.0);
    }

    #[test]
    fn forward_points_at_target() {
        let cam = PerspectiveCamera::default();
        let fwd = cam.forward();
        assert!(fwd.z < 0.0);
        assert!(fwd.y < 0.0);
        assert!((fwd.length() - 1.0).abs() < 1e-5);
        assert!(cam.right().x > 0.0);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = PerspectiveCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
    }
}
