//! Static room assembly. Builds the floor, walls, screen planes and the
//! neon wall triangles, and carries the placement table for the loaded
//! furniture props.

use std::f32::consts::PI;

use glam::Vec3;

use crate::math::rgb_from_hex;
use crate::scene::lights::LightRig;
use crate::scene::{plane_mesh, triangle_mesh, Material, Node, NodeId, Scene, Transform};

/// Neon tint cycle; the final grey doubles as the off state.
pub const NEON_PALETTE: [u32; 5] = [0xFF3F3F, 0x3FFF3F, 0x3F3FFF, 0xFFFF3F, 0x808080];

/// Palette slot that renders unlit grey and douses the glow light.
pub const NEON_OFF_INDEX: usize = NEON_PALETTE.len() - 1;

/// A clickable wall triangle together with its glow light slot.
#[derive(Debug)]
pub struct NeonTriangle {
    pub node: NodeId,
    pub light_slot: usize,
    pub color_index: usize,
}

impl NeonTriangle {
    /// Advances to the next palette entry, retinting the mesh and its
    /// light. The grey entry leaves the light off.
    pub fn cycle(&mut self, scene: &mut Scene, lights: &mut LightRig) {
        self.color_index = (self.color_index + 1) % NEON_PALETTE.len();
        let color = rgb_from_hex(NEON_PALETTE[self.color_index]);
        scene
            .node_mut(self.node)
            .visit_materials(&mut |material| material.base_color = color);
        lights.set_triangle_light(self.light_slot, color, self.color_index != NEON_OFF_INDEX);
    }
}

/// Handles to the built room fixtures.
#[derive(Debug)]
pub struct Room {
    pub triangles: Vec<NeonTriangle>,
}

/// Where a furniture model goes once loaded.
#[derive(Debug, Clone, Copy)]
pub struct PropPlacement {
    /// Model file stem under the assets directory.
    pub model: &'static str,
    pub scale: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Furniture layout. Interactive props are looked up by model stem
/// after loading; the rest is set dressing.
pub const PROP_PLACEMENTS: &[PropPlacement] = &[
    PropPlacement {
        model: "flower",
        scale: Vec3::new(2.0, 2.0, 2.0),
        position: Vec3::new(2.0, 2.73, -4.0),
        rotation: Vec3::ZERO,
    },
    PropPlacement {
        model: "desk",
        scale: Vec3::new(2.5, 2.5, 2.5),
        position: Vec3::new(0.0, 0.0, -3.6),
        rotation: Vec3::new(0.0, -PI / 2.0, 0.0),
    },
    PropPlacement {
        model: "laptop",
        scale: Vec3::ONE,
        position: Vec3::new(0.4, 2.34, -3.2),
        rotation: Vec3::new(0.0, -1.8, 0.0),
    },
    PropPlacement {
        model: "monitor",
        scale: Vec3::new(2.5, 2.2, 2.2),
        position: Vec3::new(-1.3, 2.78, -4.1),
        rotation: Vec3::new(0.0, 0.1, 0.0),
    },
    PropPlacement {
        model: "chair",
        scale: Vec3::new(5.5, 5.5, 5.5),
        position: Vec3::new(0.7, 0.10, -2.2),
        rotation: Vec3::ZERO,
    },
    PropPlacement {
        model: "switch",
        scale: Vec3::ONE,
        position: Vec3::new(4.80, 3.14, -1.2),
        rotation: Vec3::new(PI, PI, 0.0),
    },
    PropPlacement {
        model: "cat",
        scale: Vec3::new(0.3, 0.3, 0.3),
        position: Vec3::new(-0.2, 1.414, -1.3),
        rotation: Vec3::new(0.0, PI / 2.0, 0.0),
    },
    PropPlacement {
        model: "bed",
        scale: Vec3::new(4.0, 4.0, 4.0),
        position: Vec3::new(-0.4, 0.10, 6.5),
        rotation: Vec3::new(0.0, PI * 1.5, 0.0),
    },
    PropPlacement {
        model: "wardrobe",
        scale: Vec3::new(1.4, 1.4, 1.4),
        position: Vec3::new(2.7, 0.20, 4.4),
        rotation: Vec3::new(0.0, PI, 0.0),
    },
    PropPlacement {
        model: "doorway",
        scale: Vec3::new(4.5, 4.5, 4.5),
        position: Vec3::new(4.8, 0.10, -0.7),
        rotation: Vec3::new(0.0, PI / 2.0, 0.0),
    },
    PropPlacement {
        model: "nintendo",
        scale: Vec3::new(1.3, 1.3, 1.3),
        position: Vec3::new(-1.1, 2.38, -3.1),
        rotation: Vec3::new(PI / 2.0, 0.0, 0.2),
    },
    PropPlacement {
        model: "flower2",
        scale: Vec3::ONE,
        position: Vec3::new(-3.9, 1.1, -3.5),
        rotation: Vec3::ZERO,
    },
    PropPlacement {
        model: "bottle",
        scale: Vec3::new(0.4, 0.4, 0.4),
        position: Vec3::new(1.7, 2.92, -2.5),
        rotation: Vec3::ZERO,
    },
];

const WALL_COLOR: [f32; 3] = [0.92, 0.91, 0.88];
const FLOOR_COLOR: [f32; 3] = [0.55, 0.42, 0.28];

/// Builds the static shell and fixtures into the scene. Furniture is
/// added separately once its models finish loading.
pub fn build(scene: &mut Scene, lights: &mut LightRig) -> Room {
    let mut floor_material = Material::standard(FLOOR_COLOR);
    floor_material.roughness = 0.4;
    scene.add(Node::mesh(
        "floor",
        Transform::new(Vec3::ZERO, Vec3::new(-PI / 2.0, 0.0, 0.0), Vec3::ONE),
        plane_mesh(10.0, 10.0, floor_material),
    ));

    let wall = |name: &str, position: Vec3, rotation: Vec3| {
        Node::mesh(
            name,
            Transform::new(position, rotation, Vec3::ONE),
            plane_mesh(10.0, 7.5, Material::standard(WALL_COLOR)),
        )
    };
    scene.add(wall("wall_back", Vec3::new(0.0, 3.75, -5.0), Vec3::ZERO));
    scene.add(wall(
        "wall_left",
        Vec3::new(-5.0, 3.75, 0.0),
        Vec3::new(0.0, PI / 2.0, 0.0),
    ));
    scene.add(wall(
        "wall_right",
        Vec3::new(5.0, 3.75, 0.0),
        Vec3::new(0.0, -PI / 2.0, 0.0),
    ));
    scene.add(wall(
        "wall_front",
        Vec3::new(0.0, 3.75, 5.0),
        Vec3::new(0.0, PI, 0.0),
    ));
    scene.add(Node::mesh(
        "ceiling",
        Transform::new(Vec3::new(0.0, 7.5, 0.0), Vec3::new(PI / 2.0, 0.0, 0.0), Vec3::ONE),
        plane_mesh(10.0, 10.0, Material::standard(WALL_COLOR)),
    ));

    // Flat stand-ins for the monitor and laptop display panels
    scene.add(Node::mesh(
        "monitor_screen",
        Transform::new(
            Vec3::new(-1.29, 3.32, -4.05),
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::ONE,
        ),
        plane_mesh(2.17, 1.05, Material::unlit([0.1, 0.12, 0.15])),
    ));
    scene.add(Node::mesh(
        "laptop_screen",
        Transform::new(
            Vec3::new(0.57, 2.84, -3.811),
            Vec3::new(-0.08, -0.23, -0.015),
            Vec3::ONE,
        ),
        plane_mesh(1.325, 0.849, Material::unlit([0.05, 0.25, 0.1])),
    ));

    let triangles = build_triangles(scene, lights);
    Room { triangles }
}

fn build_triangles(scene: &mut Scene, lights: &mut LightRig) -> Vec<NeonTriangle> {
    let half = Vec3::splat(0.5);
    let flipped = Vec3::new(0.0, 0.0, PI);
    let placements: [(Vec3, Vec3); 8] = [
        (Vec3::new(3.0, 3.0, -4.95), Vec3::ZERO),
        (Vec3::new(3.5, 4.01, -4.95), Vec3::ZERO),
        (Vec3::new(4.02, 3.01, -4.95), Vec3::ZERO),
        (Vec3::new(3.51, 3.0, -4.95), flipped),
        (Vec3::new(2.99, 4.01, -4.95), flipped),
        (Vec3::new(2.48, 4.01, -4.95), Vec3::ZERO),
        (Vec3::new(2.48, 3.0, -4.95), flipped),
        (Vec3::new(1.97, 3.0, -4.95), Vec3::ZERO),
    ];

    let color = rgb_from_hex(NEON_PALETTE[0]);
    placements
        .iter()
        .enumerate()
        .map(|(i, &(position, rotation))| {
            let node = scene.add(Node::mesh(
                format!("triangle_{i}"),
                Transform::new(position, rotation, half),
                triangle_mesh(Material::unlit(color)),
            ));
            let light_slot = lights.add_triangle_light(position, color);
            NeonTriangle {
                node,
                light_slot,
                color_index: 0,
            }
        })
        .collect()
}
