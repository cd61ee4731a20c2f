use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::math::{intersect_aabb, intersect_triangle, Ray};
use crate::scene::{Mesh, Node, NodeId, NodeKind, Scene};

/// One ray/mesh intersection, reported in world space.
#[derive(Debug, Clone)]
pub struct Hit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    /// Name of the struck mesh node (a descendant when recursive).
    pub node_name: String,
}

/// Converts pointer clicks into world-space rays and tests them against
/// scene nodes, one registered target at a time. What a hit means is the
/// coordinator's business; the picker only reports geometry.
#[derive(Debug, Default)]
pub struct Picker {
    pointer: Vec2,
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a pixel position to normalized device coordinates and stores
    /// it. Screen Y grows downward, device Y upward, hence the flip.
    pub fn update_pointer(&mut self, position: Vec2, viewport: Vec2) -> Vec2 {
        self.pointer = Vec2::new(
            (position.x / viewport.x) * 2.0 - 1.0,
            -(position.y / viewport.y) * 2.0 + 1.0,
        );
        self.pointer
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Ray from the camera through the stored pointer position.
    pub fn ray_from_camera(&self, camera: &Camera) -> Ray {
        camera.screen_ray(self.pointer)
    }

    /// Tests one target node against the ray. Hits come back sorted by
    /// ascending distance; `recursive` folds descendant geometry of group
    /// nodes into the same sequence. An empty result is a normal miss.
    pub fn intersect(&self, ray: &Ray, scene: &Scene, target: NodeId, recursive: bool) -> Vec<Hit> {
        let mut hits = Vec::new();
        intersect_node(ray, scene.node(target), scene.root_matrix(), recursive, &mut hits);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn intersect_node(ray: &Ray, node: &Node, parent: Mat4, recursive: bool, hits: &mut Vec<Hit>) {
    let world = parent * node.transform.matrix();
    match &node.kind {
        NodeKind::Mesh(mesh) => intersect_mesh(ray, mesh, &world, &node.name, hits),
        NodeKind::Group(children) => {
            if recursive {
                for child in children {
                    intersect_node(ray, child, world, recursive, hits);
                }
            }
        }
        NodeKind::Other => {}
    }
}

fn intersect_mesh(ray: &Ray, mesh: &Mesh, world: &Mat4, name: &str, hits: &mut Vec<Hit>) {
    // Bounding-box reject before walking triangles
    let bounds = mesh.bounds();
    let mut world_bounds = crate::math::Aabb::empty();
    for corner in [
        Vec3::new(bounds.min.x, bounds.min.y, bounds.min.z),
        Vec3::new(bounds.max.x, bounds.min.y, bounds.min.z),
        Vec3::new(bounds.min.x, bounds.max.y, bounds.min.z),
        Vec3::new(bounds.min.x, bounds.min.y, bounds.max.z),
        Vec3::new(bounds.max.x, bounds.max.y, bounds.min.z),
        Vec3::new(bounds.max.x, bounds.min.y, bounds.max.z),
        Vec3::new(bounds.min.x, bounds.max.y, bounds.max.z),
        Vec3::new(bounds.max.x, bounds.max.y, bounds.max.z),
    ] {
        world_bounds.grow(world.transform_point3(corner));
    }
    if intersect_aabb(ray, world_bounds.min, world_bounds.max).is_none() {
        return;
    }

    for [v0, v1, v2] in mesh.triangles() {
        let w0 = world.transform_point3(v0);
        let w1 = world.transform_point3(v1);
        let w2 = world.transform_point3(v2);
        if let Some(hit) = intersect_triangle(ray, w0, w1, w2) {
            hits.push(Hit {
                distance: hit.t,
                point: ray.at(hit.t),
                normal: hit.normal,
                node_name: name.to_string(),
            });
        }
    }
}
