use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::path::Path;

use crate::scene::{Material, Mesh, Node, NodeKind, Transform};

/// Loads a glTF model as a group node of meshes, with node transforms
/// baked into the vertex data so the group can be placed as one unit.
pub fn load_prop(path: impl AsRef<Path>, name: &str) -> Result<Node> {
    let path = path.as_ref();
    log::info!("loading model {path:?}");

    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("failed to load glTF file {path:?}"))?;

    let mut children = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            collect_node(&node, &buffers, &Mat4::IDENTITY, name, &mut children)?;
        }
    }

    if children.is_empty() {
        log::warn!("no geometry in {path:?}");
    }

    Ok(Node {
        name: name.to_string(),
        transform: Transform::default(),
        kind: NodeKind::Group(children),
    })
}

fn collect_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    prop_name: &str,
    out: &mut Vec<Node>,
) -> Result<()> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global = *parent_transform * local;

    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, buffers, &global, prop_name, out)?;
    }

    for child in node.children() {
        collect_node(&child, buffers, &global, prop_name, out)?;
    }

    Ok(())
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    prop_name: &str,
    out: &mut Vec<Node>,
) -> Result<()> {
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions = reader
            .read_positions()
            .context("mesh primitive has no positions")?;
        let vertices: Vec<Vec3> = positions
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();
        if vertices.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            // Unindexed primitives are already a flat triangle list
            None => (0..vertices.len() as u32).collect(),
        };
        if indices.len() < 3 {
            continue;
        }

        out.push(Node::mesh(
            format!(
                "{prop_name}/{}",
                mesh.name().unwrap_or("primitive"),
            ),
            Transform::default(),
            Mesh::new(vertices, indices, convert_material(&primitive.material())),
        ));
    }

    Ok(())
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let base = pbr.base_color_factor();
    let mut converted = Material::standard([base[0], base[1], base[2]]);
    converted.opacity = base[3].clamp(0.0, 1.0);
    converted.metallic = pbr.metallic_factor();
    converted.roughness = pbr.roughness_factor();
    converted
}
