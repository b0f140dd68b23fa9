use glam::{Mat4, Vec3};

/// The scene is viewed from a fixed street-level vantage point looking
/// up toward the skyline; there is no user camera control.
pub struct SceneCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl SceneCamera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 4.0, 5.0),
            target: Vec3::new(0.0, 10.0, -20.0),
            fov_y_radians: 75.0f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Billboard basis vectors for camera-facing quads.
    pub fn right(&self) -> Vec3 {
        Vec3::Y.cross(self.forward()).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.forward().cross(self.right()).normalize()
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let projection = Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far);
        projection * view
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::SceneCamera;

    #[test]
    fn billboard_basis_is_orthonormal() {
        let camera = SceneCamera::new();
        let f = camera.forward();
        let r = camera.right();
        let u = camera.up();

        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((u.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5);
        assert!(f.dot(u).abs() < 1e-5);
        assert!(r.dot(u).abs() < 1e-5);
    }

    #[test]
    fn view_projection_is_finite() {
        let camera = SceneCamera::new();
        let vp = camera.view_projection(16.0 / 9.0);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
