pub mod lights;
pub mod room;

use glam::{EulerRot, Mat4, Vec3};

use crate::math::Aabb;

/// Handle to a top-level scene node. Interactive targets hold these; the
/// scene owns the nodes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Position, XYZ Euler rotation, and scale of a node or the scene root.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
            * Mat4::from_scale(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub base_color: [f32; 3],
    pub opacity: f32,
    pub metallic: f32,
    pub roughness: f32,
    /// Skips lighting in the shader (screen planes, neon triangles).
    pub unlit: bool,
}

impl Material {
    pub fn standard(base_color: [f32; 3]) -> Self {
        Self {
            base_color,
            opacity: 1.0,
            metallic: 0.2,
            roughness: 0.8,
            unlit: false,
        }
    }

    pub fn unlit(base_color: [f32; 3]) -> Self {
        Self {
            base_color,
            opacity: 1.0,
            metallic: 0.0,
            roughness: 1.0,
            unlit: true,
        }
    }
}

/// Triangle mesh in node-local coordinates.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>, material: Material) -> Self {
        Self { vertices, indices, material }
    }

    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for &vertex in &self.vertices {
            aabb.grow(vertex);
        }
        aabb
    }

    /// Local-space triangles, one vertex triple per index triple.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }
}

/// Closed set of node kinds. Traversals match on this instead of
/// downcasting, so every consumer handles the whole set.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Mesh(Mesh),
    Group(Vec<Node>),
    /// Non-geometry nodes (light anchors, empties). Never hit-testable.
    Other,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn mesh(name: impl Into<String>, transform: Transform, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Mesh(mesh),
        }
    }

    pub fn group(name: impl Into<String>, transform: Transform, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Group(children),
        }
    }

    /// Visits every material-bearing descendant, including this node.
    pub fn visit_materials(&mut self, visit: &mut impl FnMut(&mut Material)) {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => visit(&mut mesh.material),
            NodeKind::Group(children) => {
                for child in children {
                    child.visit_materials(visit);
                }
            }
            NodeKind::Other => {}
        }
    }
}

/// The room: a flat list of top-level nodes under one root transform.
/// The root position/rotation pair is what the transition controller
/// animates for inspection fly-tos.
#[derive(Debug, Default)]
pub struct Scene {
    pub position: Vec3,
    pub rotation: Vec3,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// Rectangle in the local XY plane facing +Z, centered on the origin.
pub fn plane_mesh(width: f32, height: f32, material: Material) -> Mesh {
    let hw = width * 0.5;
    let hh = height * 0.5;
    Mesh::new(
        vec![
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
        material,
    )
}

/// Axis-aligned box centered on the origin.
pub fn box_mesh(size: Vec3, material: Material) -> Mesh {
    let h = size * 0.5;
    let corners = [
        Vec3::new(-h.x, -h.y, -h.z),
        Vec3::new(h.x, -h.y, -h.z),
        Vec3::new(h.x, h.y, -h.z),
        Vec3::new(-h.x, h.y, -h.z),
        Vec3::new(-h.x, -h.y, h.z),
        Vec3::new(h.x, -h.y, h.z),
        Vec3::new(h.x, h.y, h.z),
        Vec3::new(-h.x, h.y, h.z),
    ];
    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6, 4, 6, 7, // +z
        1, 0, 3, 1, 3, 2, // -z
        5, 1, 2, 5, 2, 6, // +x
        0, 4, 7, 0, 7, 3, // -x
        7, 6, 2, 7, 2, 3, // +y
        0, 1, 5, 0, 5, 4, // -y
    ];
    Mesh::new(corners.to_vec(), indices, material)
}

/// Unit wall-art triangle: apex up, base from (-1,-1) to (1,-1).
pub fn triangle_mesh(material: Material) -> Mesh {
    Mesh::new(
        vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        ],
        vec![0, 1, 2],
        material,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_returns_sequential_ids() {
        let mut scene = Scene::new();
        let a = scene.add(Node::mesh("a", Transform::default(), triangle_mesh(Material::unlit([1.0, 0.0, 0.0]))));
        let b = scene.add(Node::mesh("b", Transform::default(), triangle_mesh(Material::unlit([1.0, 0.0, 0.0]))));
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(scene.node(b).name, "b");
    }

    #[test]
    fn test_visit_materials_reaches_nested_meshes() {
        let leaf = Node::mesh("leaf", Transform::default(), triangle_mesh(Material::standard([0.5; 3])));
        let inner = Node::group("inner", Transform::default(), vec![leaf]);
        let mut root = Node::group(
            "root",
            Transform::default(),
            vec![
                inner,
                Node::mesh("sibling", Transform::default(), triangle_mesh(Material::standard([0.5; 3]))),
                Node {
                    name: "empty".to_string(),
                    transform: Transform::default(),
                    kind: NodeKind::Other,
                },
            ],
        );

        let mut count = 0;
        root.visit_materials(&mut |material| {
            material.metallic = 0.0;
            count += 1;
        });
        assert_eq!(count, 2, "both meshes visited, Other skipped");
    }

    #[test]
    fn test_transform_matrix_translates() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let point = transform.matrix().transform_point3(Vec3::ZERO);
        assert!((point - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_scene_root_matrix_applies_rotation() {
        let mut scene = Scene::new();
        scene.rotation = Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let rotated = scene.root_matrix().transform_point3(Vec3::Z);
        // Yaw of pi/2 carries +z onto +x
        assert!((rotated - Vec3::X).length() < 1e-5, "got {:?}", rotated);
    }

    #[test]
    fn test_plane_mesh_bounds() {
        let mesh = plane_mesh(10.0, 7.5, Material::standard([1.0; 3]));
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-5.0, -3.75, 0.0));
        assert_eq!(bounds.max, Vec3::new(5.0, 3.75, 0.0));
    }

    #[test]
    fn test_box_mesh_triangle_count() {
        let mesh = box_mesh(Vec3::ONE, Material::standard([1.0; 3]));
        assert_eq!(mesh.triangles().count(), 12);
    }
}
