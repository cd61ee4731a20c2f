use glam::Vec3;
use room_viewer::camera::{Camera, DEFAULT_FOV_Y};
use room_viewer::orbit::OrbitControls;
use room_viewer::scene::Scene;
use room_viewer::transition::{
    TransitionController, ViewPose, CONVERGENCE_EPSILON, DEFAULT_POSE, LERP_FACTOR, MAX_CAMERA_Y,
    MIN_CAMERA_Y,
};

fn rig() -> (TransitionController, Camera, Scene, OrbitControls) {
    let mut camera = Camera::new(
        DEFAULT_POSE.camera,
        Vec3::new(0.0, 2.0, 0.0),
        DEFAULT_FOV_Y,
        16.0 / 9.0,
    );
    let mut scene = Scene::new();
    let controller = TransitionController::new(DEFAULT_POSE);
    controller.apply_default(&mut camera, &mut scene);
    (controller, camera, scene, OrbitControls::default())
}

fn goal() -> ViewPose {
    ViewPose::new(
        Vec3::new(0.09, 1.69, 5.92),
        Vec3::new(0.3, -2.0, 5.9),
        Vec3::new(0.4, 0.2, 0.0),
    )
}

#[cfg(test)]
mod convergence_tests {
    use super::*;

    #[test]
    fn test_distance_strictly_decreases_until_convergence() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        controller.set_target(goal(), &camera, &scene, &mut orbit);

        let mut previous = camera.position.distance(goal().camera);
        for _ in 0..10_000 {
            controller.update(&mut camera, &mut scene, &mut orbit);
            if !controller.is_transitioning() {
                break;
            }
            let distance = camera.position.distance(goal().camera);
            assert!(
                distance < previous,
                "distance should shrink every tick: {} >= {}",
                distance,
                previous
            );
            previous = distance;
        }
        assert!(!controller.is_transitioning(), "should converge");
    }

    #[test]
    fn test_converges_within_logarithmic_tick_bound() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        let goal = goal();
        controller.set_target(goal, &camera, &scene, &mut orbit);

        // Convergence waits on whichever of camera and scene starts
        // farther from its goal
        let d0 = camera
            .position
            .distance(goal.camera)
            .max(scene.position.distance(goal.scene));
        let bound =
            ((d0 / CONVERGENCE_EPSILON).ln() / -(1.0 - LERP_FACTOR).ln()).ceil() as usize + 5;

        let mut ticks = 0;
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
            ticks += 1;
            assert!(ticks <= bound, "did not converge within {} ticks", bound);
        }
        assert!(camera.position.distance(goal.camera) <= CONVERGENCE_EPSILON);
    }
}

#[cfg(test)]
mod bounds_tests {
    use super::*;

    #[test]
    fn test_camera_y_clamped_for_goal_above_ceiling() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        let high = ViewPose::new(Vec3::new(0.0, 20.0, 5.0), Vec3::ZERO, Vec3::ZERO);
        controller.set_target(high, &camera, &scene, &mut orbit);

        for _ in 0..2_000 {
            controller.update(&mut camera, &mut scene, &mut orbit);
            assert!(
                camera.position.y <= MAX_CAMERA_Y,
                "camera rose to {}",
                camera.position.y
            );
        }
    }

    #[test]
    fn test_camera_y_clamped_for_goal_below_floor() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        let low = ViewPose::new(Vec3::new(0.0, -3.0, 5.0), Vec3::ZERO, Vec3::ZERO);
        controller.set_target(low, &camera, &scene, &mut orbit);

        for _ in 0..2_000 {
            controller.update(&mut camera, &mut scene, &mut orbit);
            assert!(
                camera.position.y >= MIN_CAMERA_Y,
                "camera sank to {}",
                camera.position.y
            );
        }
    }
}

#[cfg(test)]
mod retarget_tests {
    use super::*;

    #[test]
    fn test_retargeting_current_goal_while_idle_is_a_no_op() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        controller.set_target(goal(), &camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }

        let settled = camera.position;
        controller.set_target(goal(), &camera, &scene, &mut orbit);
        assert!(!controller.is_transitioning(), "should stay idle");
        controller.update(&mut camera, &mut scene, &mut orbit);
        assert_eq!(camera.position, settled, "position should not move");
    }

    #[test]
    fn test_midflight_retarget_continues_from_current_position() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        controller.set_target(goal(), &camera, &scene, &mut orbit);
        for _ in 0..30 {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }

        let midway = camera.position;
        let second = ViewPose::new(Vec3::new(-1.4, 1.69, 6.9), Vec3::ZERO, Vec3::ZERO);
        controller.set_target(second, &camera, &scene, &mut orbit);
        assert!(controller.is_transitioning());

        controller.update(&mut camera, &mut scene, &mut orbit);
        // One lerp step from the midway point toward the new goal
        let expected = midway + (second.camera - midway) * LERP_FACTOR;
        assert!(
            camera.position.distance(expected) < 1e-4,
            "expected {:?}, got {:?}",
            expected,
            camera.position
        );
    }
}

#[cfg(test)]
mod orbit_gate_tests {
    use super::*;

    #[test]
    fn test_reaching_default_goal_reenables_orbit() {
        let (mut controller, mut camera, mut scene, mut orbit) = rig();
        controller.set_target(goal(), &camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }
        assert!(!orbit.enabled, "orbit stays locked at a non-default goal");

        controller.reset(&camera, &scene, &mut orbit);
        while controller.is_transitioning() {
            controller.update(&mut camera, &mut scene, &mut orbit);
        }
        assert!(orbit.enabled, "orbit returns at the default pose");
    }
}
