//! Scene nodes
//!
//! A [`Component`] is one node of the scene tree. Nodes live in the arena of a
//! [`World`](super::World) and refer to each other through [`ComponentId`]
//! keys: children are owned (listed) by their parent, the parent link is a
//! plain non-owning key.

use crate::foundation::math::Transform;
use super::resources::{MaterialId, MeshId};

slotmap::new_key_type! {
    /// Stable handle to a component inside its world's arena
    pub struct ComponentId;
}

/// A node in the scene tree
///
/// Structural links (parent, children, world membership) are private and only
/// change through [`World`](super::World) operations, which keep both ends of
/// every link and the name index consistent.
#[derive(Debug)]
pub struct Component {
    name: String,
    /// Render and collision geometry, `None` for pure grouping nodes
    pub mesh: Option<MeshId>,
    /// Overrides the material of this node's primitives and descendants
    pub material: Option<MaterialId>,
    local: Transform,

    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    in_world: bool,
}

impl Component {
    /// New detached component with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            material: None,
            local: Transform::identity(),
            parent: None,
            children: Vec::new(),
            in_world: false,
        }
    }

    /// Builder pattern: attach a mesh
    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Builder pattern: set a material override
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Builder pattern: set the local transform
    pub fn with_local(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    /// Node name, used by [`World::find_components`](super::World::find_components)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent
    pub fn local(&self) -> &Transform {
        &self.local
    }

    /// Mutable transform relative to the parent
    pub fn local_mut(&mut self) -> &mut Transform {
        &mut self.local
    }

    /// Parent key, `None` for roots and detached nodes
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[ComponentId] {
        &self.children
    }

    /// Whether the node is reachable from its world's root
    pub fn in_world(&self) -> bool {
        self.in_world
    }

    /// Copy of the node's own fields without any hierarchy
    ///
    /// Name, mesh, material and local transform are copied; the copy has no
    /// parent, no children and no world membership.
    pub fn detached_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            mesh: self.mesh,
            material: self.material,
            local: self.local,
            parent: None,
            children: Vec::new(),
            in_world: false,
        }
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(super) fn set_parent_link(&mut self, parent: Option<ComponentId>) {
        self.parent = parent;
    }

    pub(super) fn push_child(&mut self, child: ComponentId) {
        self.children.push(child);
    }

    /// Order-preserving removal; returns whether `child` was listed
    pub(super) fn remove_child(&mut self, child: ComponentId) -> bool {
        match self.children.iter().position(|c| *c == child) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    pub(super) fn set_in_world(&mut self, in_world: bool) {
        self.in_world = in_world;
    }
}
