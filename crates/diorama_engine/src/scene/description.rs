//! Serializable scene descriptions
//!
//! A [`SceneDescription`] is the on-disk form of a world: named textures,
//! materials and meshes, reusable node definitions, and the root node tree.
//! It loads through the [`Config`] trait (RON or TOML by extension) and turns
//! into a live [`World`] with [`SceneDescription::build_world`].
//!
//! Definitions are built once as detached hierarchies. Every node that names a
//! definition with `instance_of` receives a deep copy of it; the instance's
//! own name (when non-empty), transform and material then override the copy's
//! root. Definitions may instance definitions listed before them.

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::math::{utils, Transform, Vec2, Vec3, Vec4};
use crate::physics::collision::CollisionPrimitive;
use super::{
    Component, ComponentId, Material, MaterialId, Mesh, MeshId, RenderOrder, RenderPrimitive,
    SceneError, Texture, TextureId, World,
};

/// Texture metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureDesc {
    /// Lookup name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Material definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDesc {
    /// Lookup name
    pub name: String,
    /// RGBA base color
    pub color: [f32; 4],
    /// Draw in the blended pass
    pub transparent: bool,
    /// Texture name
    pub texture: Option<String>,
    /// Texture coordinate scale
    pub texture_scale: [f32; 2],
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: [1.0, 1.0, 1.0, 1.0],
            transparent: false,
            texture: None,
            texture_scale: [1.0, 1.0],
        }
    }
}

/// Mesh definition: one triangle list used for drawing and, optionally,
/// for collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDesc {
    /// Lookup name
    pub name: String,
    /// Model-space vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices, three per triangle
    pub indices: Vec<u32>,
    /// Authored material of the render primitive
    pub material: Option<String>,
    /// Whether the triangles take part in collision queries
    pub collide: bool,
}

impl Default for MeshDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            material: None,
            collide: true,
        }
    }
}

/// Axis-angle rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationDesc {
    /// Angle in degrees
    pub degrees: f32,
    /// Rotation axis (any length)
    pub axis: [f32; 3],
}

/// Local transform, composed as translate * rotate * scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDesc {
    /// Offset from the parent origin
    pub translate: [f32; 3],
    /// Optional rotation
    pub rotate: Option<RotationDesc>,
    /// Per-axis scale
    pub scale: [f32; 3],
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            translate: [0.0; 3],
            rotate: None,
            scale: [1.0; 3],
        }
    }
}

impl TransformDesc {
    /// Build the matrix transform
    pub fn to_transform(&self) -> Transform {
        let mut transform = Transform::translate(Vec3::from(self.translate));
        if let Some(rotation) = self.rotate {
            transform *= Transform::rotate(
                utils::deg_to_rad(rotation.degrees),
                Vec3::from(rotation.axis),
            );
        }
        transform * Transform::scale(Vec3::from(self.scale))
    }
}

/// One node of the described tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDesc {
    /// Node name; for instances an empty name keeps the definition's
    pub name: String,
    /// Local transform
    pub transform: TransformDesc,
    /// Mesh name
    pub mesh: Option<String>,
    /// Material override name
    pub material: Option<String>,
    /// Definition to copy this node from
    pub instance_of: Option<String>,
    /// Child nodes, in draw and query order
    pub children: Vec<NodeDesc>,
}

/// Complete scene file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Scene title
    pub name: String,
    /// Texture table
    pub textures: Vec<TextureDesc>,
    /// Material table
    pub materials: Vec<MaterialDesc>,
    /// Mesh table
    pub meshes: Vec<MeshDesc>,
    /// Reusable node trees, referenced by `instance_of`
    pub definitions: Vec<NodeDesc>,
    /// The scene tree
    pub root: NodeDesc,
}

impl Config for SceneDescription {}

// Name -> handle tables built while loading.
#[derive(Default)]
struct Lookup {
    textures: HashMap<String, TextureId>,
    materials: HashMap<String, MaterialId>,
    meshes: HashMap<String, MeshId>,
    definitions: HashMap<String, ComponentId>,
}

impl Lookup {
    fn material(&self, name: &str) -> Result<MaterialId, SceneError> {
        self.materials
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownMaterial(name.to_owned()))
    }

    fn mesh(&self, name: &str) -> Result<MeshId, SceneError> {
        self.meshes
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownMesh(name.to_owned()))
    }
}

impl SceneDescription {
    /// Build a world whose root is the described tree
    ///
    /// Fails on the first unresolved or repeated name, or out-of-range index.
    pub fn build_world(&self) -> Result<World, SceneError> {
        let mut world = World::new();
        let mut lookup = Lookup::default();

        for texture in &self.textures {
            claim_name(&lookup.textures, "texture", &texture.name)?;
            let id = world.add_texture(Texture {
                name: texture.name.clone(),
                width: texture.width,
                height: texture.height,
            });
            lookup.textures.insert(texture.name.clone(), id);
        }

        for desc in &self.materials {
            claim_name(&lookup.materials, "material", &desc.name)?;
            let mut material = Material {
                color: Vec4::from(desc.color),
                texture_scale: Vec2::from(desc.texture_scale),
                ..Material::default()
            };
            if desc.transparent {
                material.order = RenderOrder::Transparent;
            }
            if let Some(name) = &desc.texture {
                let texture = lookup
                    .textures
                    .get(name)
                    .copied()
                    .ok_or_else(|| SceneError::UnknownTexture(name.clone()))?;
                material.texture = Some(texture);
            }
            let id = world.add_material(material);
            lookup.materials.insert(desc.name.clone(), id);
        }

        for desc in &self.meshes {
            claim_name(&lookup.meshes, "mesh", &desc.name)?;
            let mesh = build_mesh(desc, &lookup)?;
            let id = world.add_mesh(mesh);
            lookup.meshes.insert(desc.name.clone(), id);
        }

        for desc in &self.definitions {
            claim_name(&lookup.definitions, "definition", &desc.name)?;
            let id = build_node(&mut world, desc, &lookup)?;
            lookup.definitions.insert(desc.name.clone(), id);
        }

        let root = build_node(&mut world, &self.root, &lookup)?;
        world.set_root(Some(root))?;

        // Definitions only exist to be copied.
        for id in lookup.definitions.into_values() {
            world.destroy_hierarchy(id)?;
        }

        info!(
            "Built scene '{}': {} components, {} meshes, {} materials",
            self.name,
            world.component_count(),
            self.meshes.len(),
            self.materials.len()
        );
        Ok(world)
    }
}

// Scene tables are keyed by name; a second entry would shadow the first.
fn claim_name<V>(table: &HashMap<String, V>, kind: &'static str, name: &str) -> Result<(), SceneError> {
    if table.contains_key(name) {
        return Err(SceneError::DuplicateName {
            kind,
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn build_mesh(desc: &MeshDesc, lookup: &Lookup) -> Result<Mesh, SceneError> {
    let vertices: Vec<Vec3> = desc.vertices.iter().copied().map(Vec3::from).collect();
    let primitive = CollisionPrimitive::new(vertices, desc.indices.clone());
    if let Some(index) = primitive.first_invalid_index() {
        return Err(SceneError::InvalidIndex {
            mesh: desc.name.clone(),
            index,
            vertex_count: primitive.vertices.len(),
        });
    }

    let material = desc
        .material
        .as_deref()
        .map(|name| lookup.material(name))
        .transpose()?;
    let render = RenderPrimitive {
        index_count: u32::try_from(desc.indices.len()).unwrap_or(u32::MAX),
        material,
    };

    debug!(
        "Loaded mesh '{}' ({} triangles, collide: {})",
        desc.name,
        primitive.triangle_count(),
        desc.collide
    );
    Ok(Mesh {
        render: vec![render],
        collision: if desc.collide { vec![primitive] } else { Vec::new() },
    })
}

fn build_node(world: &mut World, desc: &NodeDesc, lookup: &Lookup) -> Result<ComponentId, SceneError> {
    let id = match &desc.instance_of {
        Some(definition) => {
            let source = lookup
                .definitions
                .get(definition)
                .copied()
                .ok_or_else(|| SceneError::UnknownDefinition(definition.clone()))?;
            let id = world.clone_hierarchy(source)?;
            if !desc.name.is_empty() {
                world.rename(id, desc.name.as_str())?;
            }
            id
        }
        None => world.create_component(Component::new(desc.name.as_str())),
    };

    let mesh = desc.mesh.as_deref().map(|name| lookup.mesh(name)).transpose()?;
    let material = desc
        .material
        .as_deref()
        .map(|name| lookup.material(name))
        .transpose()?;

    let node = world.component_mut(id).ok_or(SceneError::UnknownComponent(id))?;
    *node.local_mut() = desc.transform.to_transform();
    if mesh.is_some() {
        node.mesh = mesh;
    }
    // otherwise keep the definition's material
    if material.is_some() {
        node.material = material;
    }

    for child in &desc.children {
        let child_id = build_node(world, child, lookup)?;
        world.set_parent(child_id, Some(id))?;
    }
    Ok(id)
}
