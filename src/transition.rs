use glam::Vec3;

use crate::camera::Camera;
use crate::orbit::OrbitControls;
use crate::scene::Scene;

/// Fraction of the remaining distance covered per update call. Applied per
/// tick, not per second; the original tuning assumes a 60 Hz loop.
pub const LERP_FACTOR: f32 = 0.02;
/// Camera and scene are considered arrived below this distance to goal.
pub const CONVERGENCE_EPSILON: f32 = 0.01;
/// The reset control shows once the camera strays this far from default.
pub const RESET_VISIBLE_THRESHOLD: f32 = 0.1;
/// Vertical camera bounds, held in every state.
pub const MIN_CAMERA_Y: f32 = 1.2;
pub const MAX_CAMERA_Y: f32 = 7.0;

/// A camera position together with the scene-root pose that frames it.
/// Inspection fly-tos move the scene as much as the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPose {
    pub camera: Vec3,
    pub scene: Vec3,
    pub scene_rotation: Vec3,
}

impl ViewPose {
    pub const fn new(camera: Vec3, scene: Vec3, scene_rotation: Vec3) -> Self {
        Self { camera, scene, scene_rotation }
    }
}

/// The resting view of the room.
pub const DEFAULT_POSE: ViewPose = ViewPose::new(
    Vec3::new(0.0, 6.0, 8.5),
    Vec3::ZERO,
    Vec3::new(0.0, 1.3, 0.0),
);

/// Smoothly steers the camera and scene root toward a goal pose.
///
/// Two states: idle (free orbit, nothing to do) and transitioning
/// (fixed-fraction lerp toward the goal each tick, orbit disabled). A new
/// goal always replaces the previous one; interpolation continues from
/// wherever the pose currently is. Free orbit only comes back when a
/// transition converges on the default pose.
#[derive(Debug)]
pub struct TransitionController {
    default_pose: ViewPose,
    target: ViewPose,
    transitioning: bool,
    show_reset: bool,
}

impl TransitionController {
    pub fn new(default_pose: ViewPose) -> Self {
        Self {
            default_pose,
            target: default_pose,
            transitioning: false,
            show_reset: false,
        }
    }

    /// Snaps the camera and scene to the default pose without animating.
    pub fn apply_default(&self, camera: &mut Camera, scene: &mut Scene) {
        camera.position = self.default_pose.camera;
        scene.position = self.default_pose.scene;
        scene.rotation = self.default_pose.scene_rotation;
    }

    pub fn default_pose(&self) -> ViewPose {
        self.default_pose
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// True once the camera sits away from the default position. Computed
    /// every update, independent of the transition state.
    pub fn show_reset(&self) -> bool {
        self.show_reset
    }

    /// Starts (or redirects) a transition. The newest goal wins; a goal the
    /// pose has already converged on leaves the controller idle.
    pub fn set_target(
        &mut self,
        pose: ViewPose,
        camera: &Camera,
        scene: &Scene,
        orbit: &mut OrbitControls,
    ) {
        self.target = pose;
        orbit.enabled = false;

        if self.converged(camera, scene) {
            self.transitioning = false;
            if self.target.camera == self.default_pose.camera {
                orbit.enabled = true;
            }
        } else {
            self.transitioning = true;
        }
    }

    /// Flies back to the default pose; free orbit returns on arrival.
    pub fn reset(&mut self, camera: &Camera, scene: &Scene, orbit: &mut OrbitControls) {
        self.set_target(self.default_pose, camera, scene, orbit);
    }

    /// Per-frame advance: lerp while transitioning, refresh the reset
    /// signal, detect convergence, clamp camera height, then refresh the
    /// orbit controls so damped motion stays smooth.
    pub fn update(&mut self, camera: &mut Camera, scene: &mut Scene, orbit: &mut OrbitControls) {
        if self.transitioning {
            camera.position = camera.position.lerp(self.target.camera, LERP_FACTOR);
            scene.position = scene.position.lerp(self.target.scene, LERP_FACTOR);
            scene.rotation += (self.target.scene_rotation - scene.rotation) * LERP_FACTOR;
        }

        self.show_reset =
            camera.position.distance(self.default_pose.camera) > RESET_VISIBLE_THRESHOLD;

        if self.transitioning && self.converged(camera, scene) {
            self.transitioning = false;
            if self.target.camera == self.default_pose.camera {
                orbit.enabled = true;
            }
        }

        camera.position.y = camera.position.y.clamp(MIN_CAMERA_Y, MAX_CAMERA_Y);
        orbit.update(camera);
    }

    fn converged(&self, camera: &Camera, scene: &Scene) -> bool {
        camera.position.distance(self.target.camera) < CONVERGENCE_EPSILON
            && scene.position.distance(self.target.scene) < CONVERGENCE_EPSILON
    }
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(DEFAULT_POSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FOV_Y;
    use crate::orbit::ORBIT_TARGET;

    fn setup() -> (TransitionController, Camera, Scene, OrbitControls) {
        let controller = TransitionController::default();
        let mut camera = Camera::new(Vec3::ZERO, ORBIT_TARGET, DEFAULT_FOV_Y, 1.0);
        let mut scene = Scene::new();
        controller.apply_default(&mut camera, &mut scene);
        (controller, camera, scene, OrbitControls::default())
    }

    fn laptop_pose() -> ViewPose {
        ViewPose::new(
            Vec3::new(0.09, 1.69, 5.92),
            Vec3::new(0.3, -2.0, 5.9),
            Vec3::new(0.4, 0.2, 0.0),
        )
    }

    #[test]
    fn test_set_target_starts_transition_and_disables_orbit() {
        let (mut controller, camera, scene, mut orbit) = setup();
        controller.set_target(laptop_pose(), &camera, &scene, &mut orbit);
        assert!(controller.is_transitioning());
        assert!(!orbit.enabled);
    }

    #[test]
    fn test_distance_to_goal_shrinks_every_tick() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        let goal = laptop_pose();
        controller.set_target(goal, &camera, &scene, &mut orbit);

        let mut last = camera.position.distance(goal.camera);
        for _ in 0..100 {
            controller.update(&mut camera, &mut scene, &mut orbit);
            let distance = camera.position.distance(goal.camera);
            assert!(distance < last, "distance must strictly decrease: {} -> {}", last, distance);
            last = distance;
        }
    }

    #[test]
    fn test_converges_within_expected_tick_count() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        let goal = laptop_pose();
        controller.set_target(goal, &camera, &scene, &mut orbit);

        // log(d0/eps) / -log(1 - factor) ticks, with slack; convergence
        // waits on whichever of camera and scene starts farther out
        let d0 = camera
            .position
            .distance(goal.camera)
            .max(scene.position.distance(goal.scene));
        let bound = ((d0 / CONVERGENCE_EPSILON).ln() / -(1.0 - LERP_FACTOR).ln()).ceil() as usize + 5;

        let mut ticks = 0;
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
            ticks += 1;
            assert!(ticks <= bound, "no convergence after {} ticks (bound {})", ticks, bound);
        }
        assert!(camera.position.distance(goal.camera) < CONVERGENCE_EPSILON);
    }

    #[test]
    fn test_camera_height_clamped_even_for_out_of_bounds_goal() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        let goal = ViewPose::new(Vec3::new(0.0, 20.0, 5.0), Vec3::ZERO, Vec3::ZERO);
        controller.set_target(goal, &camera, &scene, &mut orbit);

        for _ in 0..500 {
            controller.update(&mut camera, &mut scene, &mut orbit);
            assert!(camera.position.y >= MIN_CAMERA_Y - 1e-6);
            assert!(camera.position.y <= MAX_CAMERA_Y + 1e-6);
        }
    }

    #[test]
    fn test_retarget_while_idle_with_same_goal_stays_idle() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        let goal = laptop_pose();
        controller.set_target(goal, &camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }

        let arrived = camera.position;
        controller.set_target(goal, &camera, &scene, &mut orbit);
        assert!(!controller.is_transitioning(), "re-targeting the converged goal must stay idle");
        assert_eq!(camera.position, arrived);
    }

    #[test]
    fn test_midflight_retarget_continues_from_current_position() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        controller.set_target(laptop_pose(), &camera, &scene, &mut orbit);
        for _ in 0..10 {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }

        let midway = camera.position;
        let second = ViewPose::new(
            Vec3::new(-1.4, 1.69, 6.9),
            Vec3::new(-0.5, -2.4, 8.3),
            Vec3::new(0.2, -0.2, 0.03),
        );
        controller.set_target(second, &camera, &scene, &mut orbit);
        controller.update(&mut camera, &mut scene, &mut orbit);

        let expected = midway.lerp(second.camera, LERP_FACTOR);
        // Next tick heads for the new goal from the midway point, with only
        // the Y clamp applied on top
        assert!((camera.position.x - expected.x).abs() < 1e-5);
        assert!((camera.position.z - expected.z).abs() < 1e-5);
    }

    #[test]
    fn test_reset_reenables_orbit_on_arrival() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        controller.set_target(laptop_pose(), &camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }
        assert!(!orbit.enabled, "inspection pose keeps orbit disabled");

        controller.reset(&camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }
        assert!(orbit.enabled, "default pose re-enables orbit");
    }

    #[test]
    fn test_show_reset_stays_true_at_non_default_pose() {
        let (mut controller, mut camera, mut scene, mut orbit) = setup();
        controller.set_target(laptop_pose(), &camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }

        assert!(controller.show_reset());
        // Still true on idle updates after convergence
        for _ in 0..5 {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }
        assert!(controller.show_reset());
    }
}
