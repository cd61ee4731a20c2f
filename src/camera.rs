use glam::{Mat4, Vec2, Vec3};

use crate::math::Ray;

pub const DEFAULT_FOV_Y: f32 = 45.0_f32.to_radians();

/// Perspective camera. Position and aim are mutated by the orbit controls
/// and the transition controller; projection parameters only change on
/// window resize.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, look_at: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self {
            position,
            look_at,
            fov_y,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World-space ray from the camera through a normalized device
    /// coordinate on the projection plane.
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let far_point = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far_point - self.position)
    }
}
