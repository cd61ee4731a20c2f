use glam::Vec3;

use crate::camera::Camera;

pub const ORBIT_TARGET: Vec3 = Vec3::new(0.0, 2.0, 0.0);
pub const ORBIT_DAMPING: f32 = 0.05;
pub const MIN_DISTANCE: f32 = 3.0;
pub const MAX_DISTANCE: f32 = 14.0;

const ROTATE_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.25;
// Keep the polar angle off the poles so the up vector stays valid
const MIN_POLAR: f32 = 0.1;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.1;

/// Damped orbit controls around a fixed look target.
///
/// Pointer input accumulates into angular velocities that decay by the
/// damping factor each frame. While `enabled` is false input is ignored,
/// but `update` still runs so leftover velocity bleeds off and the camera
/// stays aimed at the target. The transition controller owns the camera
/// position whenever the controls are disabled.
#[derive(Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    damping: f32,
    min_distance: f32,
    max_distance: f32,
    yaw_velocity: f32,
    polar_velocity: f32,
    zoom_velocity: f32,
    dragging: bool,
}

impl OrbitControls {
    pub fn new(target: Vec3, damping: f32, min_distance: f32, max_distance: f32) -> Self {
        Self {
            target,
            enabled: true,
            damping,
            min_distance,
            max_distance,
            yaw_velocity: 0.0,
            polar_velocity: 0.0,
            zoom_velocity: 0.0,
            dragging: false,
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Cursor movement in pixels while the primary button is held.
    pub fn pointer_delta(&mut self, dx: f32, dy: f32) {
        if !self.enabled || !self.dragging {
            return;
        }
        self.yaw_velocity -= dx * ROTATE_SENSITIVITY;
        self.polar_velocity -= dy * ROTATE_SENSITIVITY;
    }

    /// Scroll input in lines; positive zooms in.
    pub fn scroll(&mut self, delta: f32) {
        if !self.enabled {
            return;
        }
        self.zoom_velocity -= delta * ZOOM_SENSITIVITY;
    }

    /// Per-frame refresh: applies damped input while enabled, decays the
    /// pending velocities, and re-aims the camera at the orbit target.
    pub fn update(&mut self, camera: &mut Camera) {
        if self.enabled {
            let offset = camera.position - self.target;
            let radius = offset.length().max(1e-4);
            let mut yaw = offset.x.atan2(offset.z);
            let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

            yaw += self.yaw_velocity;
            polar = (polar + self.polar_velocity).clamp(MIN_POLAR, MAX_POLAR);
            let radius = (radius + self.zoom_velocity).clamp(self.min_distance, self.max_distance);

            camera.position = self.target
                + Vec3::new(
                    radius * polar.sin() * yaw.sin(),
                    radius * polar.cos(),
                    radius * polar.sin() * yaw.cos(),
                );
        }

        self.yaw_velocity *= 1.0 - self.damping;
        self.polar_velocity *= 1.0 - self.damping;
        self.zoom_velocity *= 1.0 - self.damping;

        camera.look_at = self.target;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(ORBIT_TARGET, ORBIT_DAMPING, MIN_DISTANCE, MAX_DISTANCE)
    }
}
