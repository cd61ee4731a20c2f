//! Central viewer state. Owns the scene, camera, controls and physics,
//! and turns queued input commands into fly-tos, toggles and releases.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::camera::{Camera, DEFAULT_FOV_Y};
use crate::loaders;
use crate::math::Ray;
use crate::orbit::OrbitControls;
use crate::physics::PropBody;
use crate::picking::Picker;
use crate::scene::lights::LightRig;
use crate::scene::room::{self, Room, PROP_PLACEMENTS};
use crate::scene::{NodeId, Scene, Transform};
use crate::transition::{TransitionController, ViewPose, DEFAULT_POSE};

/// Close-up on the laptop keyboard.
pub const LAPTOP_POSE: ViewPose = ViewPose::new(
    Vec3::new(0.09, 1.69, 5.92),
    Vec3::new(0.3, -2.0, 5.9),
    Vec3::new(0.4, 0.2, 0.0),
);

/// Close-up on the monitor.
pub const MONITOR_POSE: ViewPose = ViewPose::new(
    Vec3::new(-1.4, 1.69, 6.9),
    Vec3::new(-0.5, -2.4, 8.3),
    Vec3::new(0.2, -0.2, 0.03),
);

/// Starting pose of the bottle's physics body, offset from its mesh.
const BOTTLE_BODY_POSITION: Vec3 = Vec3::new(2.3, 2.92, -2.5);
const BOTTLE_HALF_EXTENTS: Vec3 = Vec3::splat(0.2);

/// Queued pointer input, one entry per event. Commands accumulate
/// between frames and are drained in order at the start of each update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// Pointer click at a pixel position.
    Click(Vec2),
    /// Reset-view request (button or key).
    Reset,
}

/// Interactive prop handles. A `None` target never matches a click;
/// a model that failed to load simply leaves its slot empty.
#[derive(Debug, Default)]
pub struct PropTargets {
    pub laptop: Option<NodeId>,
    pub monitor: Option<NodeId>,
    pub switch: Option<NodeId>,
    pub cat: Option<NodeId>,
    pub bottle: Option<NodeId>,
}

pub struct Coordinator {
    pub camera: Camera,
    pub scene: Scene,
    pub orbit: OrbitControls,
    pub transition: TransitionController,
    pub picker: Picker,
    pub lights: LightRig,
    pub room: Room,
    pub targets: PropTargets,
    pub body: Option<PropBody>,
    commands: VecDeque<InputCommand>,
    viewport: Vec2,
}

impl Coordinator {
    pub fn new(viewport: Vec2) -> Self {
        let mut scene = Scene::new();
        let mut lights = LightRig::new();
        let room = room::build(&mut scene, &mut lights);

        let mut camera = Camera::new(
            DEFAULT_POSE.camera,
            Vec3::new(0.0, 2.0, 0.0),
            DEFAULT_FOV_Y,
            viewport.x / viewport.y,
        );
        let transition = TransitionController::new(DEFAULT_POSE);
        transition.apply_default(&mut camera, &mut scene);

        Self {
            camera,
            scene,
            orbit: OrbitControls::default(),
            transition,
            picker: Picker::new(),
            lights,
            room,
            targets: PropTargets::default(),
            body: None,
            commands: VecDeque::new(),
            viewport,
        }
    }

    /// Loads the furniture models from `assets_dir` and wires up the
    /// interactive ones. A model that fails to load is logged and
    /// skipped; the rest of the room keeps working without it.
    pub fn load_props(&mut self, assets_dir: &Path) {
        for placement in PROP_PLACEMENTS {
            let path = assets_dir.join(format!("{}.glb", placement.model));
            let mut node = match loaders::load_prop(&path, placement.model) {
                Ok(node) => node,
                Err(err) => {
                    log::warn!("skipping {}: {err:#}", placement.model);
                    continue;
                }
            };
            node.transform =
                Transform::new(placement.position, placement.rotation, placement.scale);
            // Loaded models keep their base colors but lose translucency
            // and metalness, as the original viewer forced on import
            node.visit_materials(&mut |material| {
                material.opacity = 1.0;
                material.metallic = 0.0;
                material.roughness = 0.0;
            });
            let id = self.scene.add(node);

            match placement.model {
                "laptop" => self.targets.laptop = Some(id),
                "monitor" => self.targets.monitor = Some(id),
                "switch" => self.targets.switch = Some(id),
                "cat" => self.targets.cat = Some(id),
                "bottle" => {
                    self.targets.bottle = Some(id);
                    self.body = Some(PropBody::new(BOTTLE_BODY_POSITION, BOTTLE_HALF_EXTENTS));
                }
                _ => {}
            }
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
        self.camera.set_aspect(width, height);
    }

    pub fn push_command(&mut self, command: InputCommand) {
        self.commands.push_back(command);
    }

    pub fn show_reset(&self) -> bool {
        self.transition.show_reset()
    }

    /// One frame: drain input, advance the camera transition and orbit,
    /// pulse the ceiling light, then step physics and mirror the bottle
    /// body into its scene node.
    pub fn update(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            match command {
                InputCommand::Click(position) => self.handle_click(position),
                InputCommand::Reset => {
                    self.transition
                        .reset(&self.camera, &self.scene, &mut self.orbit)
                }
            }
        }

        self.transition
            .update(&mut self.camera, &mut self.scene, &mut self.orbit);
        self.lights.pulse();

        if let Some(body) = &mut self.body {
            body.step();
            if let Some(id) = self.targets.bottle {
                let node = self.scene.node_mut(id);
                node.transform.position = body.position;
                node.transform.rotation = body.rotation;
            }
        }
    }

    /// Click dispatch. Every target is tested against the same ray, so
    /// one click can hit several props at once; only the laptop/monitor
    /// pair is exclusive, with the laptop winning overlaps.
    fn handle_click(&mut self, position: Vec2) {
        self.picker.update_pointer(position, self.viewport);
        let ray = self.picker.ray_from_camera(&self.camera);

        let laptop_hit = self.target_hit(&ray, self.targets.laptop);
        let monitor_hit = self.target_hit(&ray, self.targets.monitor);
        if laptop_hit || monitor_hit {
            let pose = if laptop_hit { LAPTOP_POSE } else { MONITOR_POSE };
            self.transition
                .set_target(pose, &self.camera, &self.scene, &mut self.orbit);
        }

        if self.target_hit(&ray, self.targets.switch) {
            self.lights.toggle_ceiling();
            if let Some(id) = self.targets.switch {
                self.scene.node_mut(id).transform.rotation.x += PI;
            }
        }

        if self.target_hit(&ray, self.targets.cat) {
            if let Some(id) = self.targets.cat {
                self.scene.node_mut(id).transform.rotation.y += PI;
            }
        }

        if self.target_hit(&ray, self.targets.bottle) {
            if let Some(body) = &mut self.body {
                if body.release() {
                    log::info!("bottle released");
                }
            }
        }

        let struck: Vec<usize> = self
            .room
            .triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| {
                !self
                    .picker
                    .intersect(&ray, &self.scene, tri.node, true)
                    .is_empty()
            })
            .map(|(i, _)| i)
            .collect();
        for i in struck {
            self.room.triangles[i].cycle(&mut self.scene, &mut self.lights);
        }
    }

    fn target_hit(&self, ray: &Ray, target: Option<NodeId>) -> bool {
        target.is_some_and(|id| {
            !self
                .picker
                .intersect(ray, &self.scene, id, true)
                .is_empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{plane_mesh, Material, Node};
    use crate::transition::RESET_VISIBLE_THRESHOLD;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    /// Plants a unit plane directly in front of the default camera so a
    /// center-screen click is guaranteed to hit it.
    fn plant_target(coordinator: &mut Coordinator) -> NodeId {
        let camera = &coordinator.camera;
        let forward = (camera.look_at - camera.position).normalize();
        let world = camera.position + forward * 2.0;
        // Scene root carries the default rotation, so place the probe in
        // root-local coordinates
        let local = coordinator.scene.root_matrix().inverse().transform_point3(world);
        coordinator.scene.add(Node::mesh(
            "probe",
            Transform::from_position(local),
            plane_mesh(4.0, 4.0, Material::standard([1.0; 3])),
        ))
    }

    fn center_click() -> InputCommand {
        InputCommand::Click(VIEWPORT / 2.0)
    }

    #[test]
    fn test_new_applies_default_pose() {
        let coordinator = Coordinator::new(VIEWPORT);
        assert_eq!(coordinator.camera.position, DEFAULT_POSE.camera);
        assert_eq!(coordinator.scene.position, DEFAULT_POSE.scene);
        assert!(!coordinator.transition.is_transitioning());
    }

    #[test]
    fn test_click_on_missing_targets_is_harmless() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        coordinator.push_command(center_click());
        coordinator.update();
        assert!(!coordinator.transition.is_transitioning());
    }

    #[test]
    fn test_laptop_click_starts_fly_to() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        coordinator.targets.laptop = Some(plant_target(&mut coordinator));

        coordinator.push_command(center_click());
        coordinator.update();

        assert!(coordinator.transition.is_transitioning());
        assert!(!coordinator.orbit.enabled);
    }

    #[test]
    fn test_laptop_wins_over_monitor() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        let probe = plant_target(&mut coordinator);
        coordinator.targets.laptop = Some(probe);
        coordinator.targets.monitor = Some(probe);

        coordinator.push_command(center_click());
        coordinator.update();

        let mut camera = coordinator.camera.position;
        for _ in 0..5_000 {
            coordinator.update();
            camera = coordinator.camera.position;
        }
        assert!(camera.distance(LAPTOP_POSE.camera) < 0.05);
    }

    #[test]
    fn test_switch_click_toggles_light_and_flips_switch() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        let probe = plant_target(&mut coordinator);
        coordinator.targets.switch = Some(probe);
        assert!(coordinator.lights.ceiling_on());

        coordinator.push_command(center_click());
        coordinator.update();

        assert!(!coordinator.lights.ceiling_on());
        let rotation = coordinator.scene.node(probe).transform.rotation;
        assert!((rotation.x - PI).abs() < 1e-6);
        // The switch click alone must not start a camera move
        assert!(!coordinator.transition.is_transitioning());
    }

    #[test]
    fn test_cat_click_spins_the_cat() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        let probe = plant_target(&mut coordinator);
        coordinator.targets.cat = Some(probe);

        coordinator.push_command(center_click());
        coordinator.update();
        coordinator.push_command(center_click());
        coordinator.update();

        let rotation = coordinator.scene.node(probe).transform.rotation;
        assert!((rotation.y - 2.0 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_bottle_release_happens_once() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        let probe = plant_target(&mut coordinator);
        coordinator.targets.bottle = Some(probe);
        coordinator.body = Some(PropBody::new(BOTTLE_BODY_POSITION, BOTTLE_HALF_EXTENTS));

        coordinator.push_command(center_click());
        coordinator.update();
        let after_first = coordinator.body.as_ref().unwrap().position;
        assert_ne!(after_first, BOTTLE_BODY_POSITION, "body should be falling");

        // Second click must not relaunch it
        coordinator.push_command(center_click());
        for _ in 0..600 {
            coordinator.update();
        }
        let settled = coordinator.body.as_ref().unwrap().position;
        assert!(settled.y < 1.0, "body should have fallen, y = {}", settled.y);
    }

    #[test]
    fn test_reset_command_flies_home_and_reenables_orbit() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        coordinator.targets.laptop = Some(plant_target(&mut coordinator));
        coordinator.push_command(center_click());
        coordinator.update();
        for _ in 0..200 {
            coordinator.update();
        }
        assert!(coordinator.show_reset());

        coordinator.push_command(InputCommand::Reset);
        for _ in 0..5_000 {
            coordinator.update();
        }
        assert!(!coordinator.transition.is_transitioning());
        assert!(coordinator.orbit.enabled);
        assert!(
            coordinator.camera.position.distance(DEFAULT_POSE.camera)
                < RESET_VISIBLE_THRESHOLD
        );
        assert!(!coordinator.show_reset());
    }

    #[test]
    fn test_commands_drain_in_order() {
        let mut coordinator = Coordinator::new(VIEWPORT);
        coordinator.targets.laptop = Some(plant_target(&mut coordinator));

        // Click then reset in the same frame: reset wins
        coordinator.push_command(center_click());
        coordinator.push_command(InputCommand::Reset);
        coordinator.update();
        for _ in 0..5_000 {
            coordinator.update();
        }
        assert!(coordinator.camera.position.distance(DEFAULT_POSE.camera) < 0.05);
        assert!(coordinator.orbit.enabled);
    }
}
