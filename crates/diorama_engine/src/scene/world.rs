//! World: owner of the scene tree and its shared resources
//!
//! The world holds every component in a slot-map arena, the current root, a
//! name index over the components reachable from that root, and the mesh,
//! material and texture tables components point into.
//!
//! Membership (whether a component is reachable from the root) is never
//! updated as a hidden side effect. Every structural operation ends with an
//! explicit sync step ([`World::add_hierarchy`] / [`World::remove_hierarchy`]
//! on the moved subtree), and [`World::resync`] rebuilds everything from the
//! root in one pass.

use std::collections::HashMap;

use log::{debug, trace};
use slotmap::SlotMap;

use crate::foundation::math::Transform;
use super::component::{Component, ComponentId};
use super::resources::{Material, MaterialId, Mesh, MeshId, Texture, TextureId};
use super::SceneError;

/// Scene tree plus shared resources
#[derive(Debug, Default)]
pub struct World {
    components: SlotMap<ComponentId, Component>,
    root: Option<ComponentId>,
    // name -> components currently in the world with that name
    names: HashMap<String, Vec<ComponentId>>,

    meshes: SlotMap<MeshId, Mesh>,
    materials: SlotMap<MaterialId, Material>,
    textures: SlotMap<TextureId, Texture>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Take ownership of a mesh
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.insert(mesh)
    }

    /// Look up a mesh
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id)
    }

    /// Take ownership of a material
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    /// Look up a material
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Take ownership of a texture
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.insert(texture)
    }

    /// Look up a texture
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Insert a detached component into the arena
    pub fn create_component(&mut self, component: Component) -> ComponentId {
        // only detached copies enter the arena; links are made by set_parent
        self.components.insert(component.detached_copy())
    }

    /// Look up a component
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Mutable access to a component's transform, mesh and material
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// Whether `id` names a live component
    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Number of live components, attached or not
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Current root
    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    /// Parent of `id`
    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.components.get(id).and_then(Component::parent)
    }

    /// Children of `id` in insertion order (empty for unknown ids)
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        match self.components.get(id) {
            Some(component) => component.children(),
            None => &[],
        }
    }

    /// Whether `ancestor` lies strictly above `node`
    pub fn is_ancestor(&self, ancestor: ComponentId, node: ComponentId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Root-to-node composition of local transforms
    pub fn world_transform(&self, id: ComponentId) -> Option<Transform> {
        let mut node = self.components.get(id)?;
        let mut transform = *node.local();
        while let Some(parent) = node.parent() {
            node = self.components.get(parent)?;
            transform = *node.local() * transform;
        }
        Some(transform)
    }

    /// Depth-first (pre-order) list of `id` and its descendants
    pub fn subtree(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.components.get(current) {
                order.push(current);
                stack.extend(node.children().iter().rev().copied());
            }
        }
        order
    }

    /// Rename a component, keeping the name index current
    pub fn rename(&mut self, id: ComponentId, name: impl Into<String>) -> Result<(), SceneError> {
        let name = name.into();
        let in_world = self.get(id)?.in_world();
        if in_world {
            self.unindex(id);
        }
        self.get_mut(id)?.set_name(name);
        if in_world {
            self.index(id);
        }
        Ok(())
    }

    /// Move `child` under `parent` (or detach it with `None`)
    ///
    /// A no-op when `parent` already is the parent. Otherwise `child` is
    /// removed from its old parent's list (order preserved), appended to the
    /// new parent's list, and its whole subtree takes on the new parent's
    /// world membership.
    ///
    /// Fails without changing anything for unknown ids, for a `parent` inside
    /// `child`'s own subtree, and for the current root.
    pub fn set_parent(
        &mut self,
        child: ComponentId,
        parent: Option<ComponentId>,
    ) -> Result<(), SceneError> {
        let old_parent = self.get(child)?.parent();
        if let Some(p) = parent {
            self.get(p)?;
        }
        if old_parent == parent {
            return Ok(());
        }
        if let Some(p) = parent {
            if p == child || self.is_ancestor(child, p) {
                return Err(SceneError::Cycle { child, parent: p });
            }
            if self.root == Some(child) {
                return Err(SceneError::RootHasParent(child));
            }
        }

        self.unlink(child);
        if let Some(p) = parent {
            self.link(p, child);
        }
        debug!("reparented component '{}'", self.components[child].name());

        self.sync_membership(child);
        Ok(())
    }

    /// Hand the tree rooted at `root` to the world
    ///
    /// The previous root's subtree leaves the world (it stays in the arena,
    /// detached, and its id is returned) before the new root is accepted. A
    /// new root that still has a parent is detached from it first.
    pub fn set_root(
        &mut self,
        root: Option<ComponentId>,
    ) -> Result<Option<ComponentId>, SceneError> {
        if self.root == root {
            return Ok(None);
        }
        if let Some(id) = root {
            self.get(id)?;
        }

        let previous = self.root.take();
        if let Some(old) = previous {
            self.remove_hierarchy(old);
        }

        if let Some(id) = root {
            self.unlink(id);
            self.root = Some(id);
            self.add_hierarchy(id);
            debug!("world root set to '{}'", self.components[id].name());
        }
        Ok(previous)
    }

    /// Deep copy of the subtree at `id`
    ///
    /// Every node gets a new id; names, local transforms and mesh/material
    /// handles are shared with the source. The copy is detached and outside
    /// the world until the caller attaches it.
    pub fn clone_hierarchy(&mut self, id: ComponentId) -> Result<ComponentId, SceneError> {
        let source = self.get(id)?;
        let copy = source.detached_copy();
        let children = source.children().to_vec();

        let copy_id = self.components.insert(copy);
        for child in children {
            let child_copy = self.clone_hierarchy(child)?;
            self.link(copy_id, child_copy);
        }
        Ok(copy_id)
    }

    /// Unlink and free the subtree at `id`
    pub fn destroy_hierarchy(&mut self, id: ComponentId) -> Result<(), SceneError> {
        let in_world = self.get(id)?.in_world();
        if in_world {
            self.remove_hierarchy(id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.unlink(id);

        for node in self.subtree(id) {
            self.components.remove(node);
        }
        debug!("destroyed hierarchy, {} components remain", self.components.len());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Membership and name index
    // ------------------------------------------------------------------

    /// Register `id` and its descendants as members of this world
    ///
    /// Depth-first; nodes already registered are left as they are.
    pub fn add_hierarchy(&mut self, id: ComponentId) {
        for node in self.subtree(id) {
            if !self.components[node].in_world() {
                self.components[node].set_in_world(true);
                self.index(node);
                trace!("add component '{}'", self.components[node].name());
            }
        }
    }

    /// Unregister `id` and its descendants from this world
    pub fn remove_hierarchy(&mut self, id: ComponentId) {
        for node in self.subtree(id) {
            if self.components[node].in_world() {
                self.components[node].set_in_world(false);
                self.unindex(node);
                trace!("remove component '{}'", self.components[node].name());
            }
        }
    }

    /// Rebuild every membership flag and the name index from the root
    pub fn resync(&mut self) {
        self.names.clear();
        for component in self.components.values_mut() {
            component.set_in_world(false);
        }
        if let Some(root) = self.root {
            self.add_hierarchy(root);
        }
        debug!("resynced world: {} named entries", self.names.len());
    }

    /// Call `f` for every live component named exactly `name`
    ///
    /// Returns whether anything matched.
    pub fn find_components<F>(&self, name: &str, mut f: F) -> bool
    where
        F: FnMut(ComponentId, &Component),
    {
        let Some(ids) = self.names.get(name) else {
            return false;
        };
        let mut found = false;
        for &id in ids {
            if let Some(component) = self.components.get(id) {
                found = true;
                f(id, component);
            }
        }
        found
    }

    /// First live component named exactly `name`
    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name)?.first().copied()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn get(&self, id: ComponentId) -> Result<&Component, SceneError> {
        self.components.get(id).ok_or(SceneError::UnknownComponent(id))
    }

    fn get_mut(&mut self, id: ComponentId) -> Result<&mut Component, SceneError> {
        self.components.get_mut(id).ok_or(SceneError::UnknownComponent(id))
    }

    fn link(&mut self, parent: ComponentId, child: ComponentId) {
        self.components[child].set_parent_link(Some(parent));
        self.components[parent].push_child(child);
    }

    fn unlink(&mut self, child: ComponentId) {
        if let Some(old) = self.components[child].parent() {
            if let Some(old_parent) = self.components.get_mut(old) {
                old_parent.remove_child(child);
            }
            self.components[child].set_parent_link(None);
        }
    }

    // Post-mutation step: make the moved subtree match its new parent.
    fn sync_membership(&mut self, id: ComponentId) {
        let should_be_member = match self.components[id].parent() {
            Some(parent) => self.components[parent].in_world(),
            None => self.root == Some(id),
        };
        if should_be_member != self.components[id].in_world() {
            if should_be_member {
                self.add_hierarchy(id);
            } else {
                self.remove_hierarchy(id);
            }
        }
    }

    fn index(&mut self, id: ComponentId) {
        let name = self.components[id].name().to_owned();
        self.names.entry(name).or_default().push(id);
    }

    fn unindex(&mut self, id: ComponentId) {
        let name = self.components[id].name();
        if let Some(ids) = self.names.get_mut(name) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.names.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn node(world: &mut World, name: &str) -> ComponentId {
        world.create_component(Component::new(name))
    }

    fn count_named(world: &World, name: &str) -> usize {
        let mut count = 0;
        world.find_components(name, |_, _| count += 1);
        count
    }

    #[test]
    fn test_set_parent_moves_between_child_lists() {
        let mut world = World::new();
        let a = node(&mut world, "a");
        let b = node(&mut world, "b");
        let child = node(&mut world, "child");

        world.set_parent(child, Some(a)).unwrap();
        assert_eq!(world.children(a), &[child]);

        world.set_parent(child, Some(b)).unwrap();
        assert!(world.children(a).is_empty());
        assert_eq!(world.children(b), &[child]);
        assert_eq!(world.parent(child), Some(b));

        // same parent again is a no-op, no duplicate entry
        world.set_parent(child, Some(b)).unwrap();
        assert_eq!(world.children(b), &[child]);

        world.set_parent(child, None).unwrap();
        assert!(world.children(b).is_empty());
        assert_eq!(world.parent(child), None);
    }

    #[test]
    fn test_removal_keeps_sibling_order() {
        let mut world = World::new();
        let parent = node(&mut world, "p");
        let kids: Vec<_> = (0..4).map(|i| node(&mut world, &format!("k{i}"))).collect();
        for &k in &kids {
            world.set_parent(k, Some(parent)).unwrap();
        }

        world.set_parent(kids[1], None).unwrap();
        assert_eq!(world.children(parent), &[kids[0], kids[2], kids[3]]);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut world = World::new();
        let top = node(&mut world, "top");
        let mid = node(&mut world, "mid");
        let leaf = node(&mut world, "leaf");
        world.set_parent(mid, Some(top)).unwrap();
        world.set_parent(leaf, Some(mid)).unwrap();

        assert_eq!(
            world.set_parent(top, Some(leaf)),
            Err(SceneError::Cycle { child: top, parent: leaf })
        );
        assert_eq!(
            world.set_parent(mid, Some(mid)),
            Err(SceneError::Cycle { child: mid, parent: mid })
        );
        // unchanged
        assert_eq!(world.parent(top), None);
        assert_eq!(world.children(top), &[mid]);
    }

    #[test]
    fn test_membership_follows_the_moved_subtree() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        world.set_root(Some(root)).unwrap();

        let branch = node(&mut world, "branch");
        let leaf = node(&mut world, "leaf");
        world.set_parent(leaf, Some(branch)).unwrap();
        assert!(!world.component(leaf).unwrap().in_world());
        assert_eq!(world.find_component("leaf"), None);

        world.set_parent(branch, Some(root)).unwrap();
        assert!(world.component(branch).unwrap().in_world());
        assert!(world.component(leaf).unwrap().in_world());
        assert_eq!(world.find_component("leaf"), Some(leaf));

        world.set_parent(branch, None).unwrap();
        assert!(!world.component(branch).unwrap().in_world());
        assert!(!world.component(leaf).unwrap().in_world());
        assert!(!world.find_components("leaf", |_, _| {}));
    }

    #[test]
    fn test_set_root_releases_previous_tree() {
        let mut world = World::new();
        let first = node(&mut world, "first");
        let first_child = node(&mut world, "shared");
        world.set_parent(first_child, Some(first)).unwrap();
        world.set_root(Some(first)).unwrap();
        assert_eq!(count_named(&world, "shared"), 1);

        let second = node(&mut world, "second");
        let previous = world.set_root(Some(second)).unwrap();
        assert_eq!(previous, Some(first));
        assert_eq!(world.root(), Some(second));
        assert!(!world.component(first).unwrap().in_world());
        assert!(!world.component(first_child).unwrap().in_world());
        assert_eq!(count_named(&world, "shared"), 0);

        assert_eq!(world.set_root(Some(second)).unwrap(), None);
        assert_eq!(world.set_root(None).unwrap(), Some(second));
        assert!(!world.component(second).unwrap().in_world());
    }

    #[test]
    fn test_root_cannot_be_parented() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        let other = node(&mut world, "other");
        world.set_root(Some(root)).unwrap();

        assert_eq!(world.set_parent(root, Some(other)), Err(SceneError::RootHasParent(root)));
        assert_eq!(world.set_parent(root, None), Ok(()));
    }

    #[test]
    fn test_promoting_a_descendant_to_root_detaches_it() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        let inner = node(&mut world, "inner");
        world.set_parent(inner, Some(root)).unwrap();
        world.set_root(Some(root)).unwrap();

        world.set_root(Some(inner)).unwrap();
        assert_eq!(world.parent(inner), None);
        assert!(world.children(root).is_empty());
        assert!(world.component(inner).unwrap().in_world());
        assert!(!world.component(root).unwrap().in_world());
    }

    #[test]
    fn test_find_components_matches_exact_names() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        world.set_root(Some(root)).unwrap();
        for _ in 0..3 {
            let chair = node(&mut world, "chair");
            world.set_parent(chair, Some(root)).unwrap();
        }
        let table = node(&mut world, "table");
        world.set_parent(table, Some(root)).unwrap();

        assert_eq!(count_named(&world, "chair"), 3);
        assert_eq!(count_named(&world, "cha*"), 0);
        assert_eq!(world.find_component("table"), Some(table));
    }

    #[test]
    fn test_rename_updates_index() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        world.set_root(Some(root)).unwrap();
        let lamp = node(&mut world, "lamp");
        world.set_parent(lamp, Some(root)).unwrap();

        world.rename(lamp, "floor lamp").unwrap();
        assert_eq!(world.find_component("lamp"), None);
        assert_eq!(world.find_component("floor lamp"), Some(lamp));
        assert_eq!(world.component(lamp).unwrap().name(), "floor lamp");
    }

    #[test]
    fn test_clone_hierarchy_is_deep_and_independent() {
        let mut world = World::new();
        let mesh = world.add_mesh(Mesh::default());
        let material = world.add_material(Material::default());

        let top = world.create_component(
            Component::new("top")
                .with_mesh(mesh)
                .with_local(Transform::translate(Vec3::new(1.0, 0.0, 0.0))),
        );
        let mid = world.create_component(Component::new("mid").with_material(material));
        let leaf = world.create_component(
            Component::new("leaf").with_local(Transform::scale(Vec3::new(2.0, 2.0, 2.0))),
        );
        world.set_parent(mid, Some(top)).unwrap();
        world.set_parent(leaf, Some(mid)).unwrap();
        world.set_root(Some(top)).unwrap();

        let before = world.component_count();
        let copy = world.clone_hierarchy(top).unwrap();
        assert_eq!(world.component_count(), before + 3);

        let copy_nodes = world.subtree(copy);
        let source_nodes = world.subtree(top);
        assert_eq!(copy_nodes.len(), 3);
        for (c, s) in copy_nodes.iter().zip(&source_nodes) {
            assert_ne!(c, s);
            let (c, s) = (world.component(*c).unwrap(), world.component(*s).unwrap());
            assert_eq!(c.name(), s.name());
            assert_eq!(c.local(), s.local());
            assert_eq!(c.mesh, s.mesh);
            assert_eq!(c.material, s.material);
        }

        let copy_root = world.component(copy).unwrap();
        assert!(copy_root.parent().is_none());
        assert!(!copy_root.in_world());

        // mutate the copy only
        *world.component_mut(copy).unwrap().local_mut() = Transform::translate(Vec3::new(9.0, 0.0, 0.0));
        assert_relative_eq!(
            world.component(top).unwrap().local().position(),
            Vec3::new(1.0, 0.0, 0.0)
        );

        // independently parentable
        let copy_mid = world.children(copy)[0];
        world.set_parent(copy_mid, Some(top)).unwrap();
        assert_eq!(world.children(top).len(), 2);
        assert_eq!(world.children(mid), &[leaf]);
    }

    #[test]
    fn test_destroy_hierarchy_frees_subtree() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        let branch = node(&mut world, "branch");
        let leaf = node(&mut world, "leaf");
        world.set_parent(branch, Some(root)).unwrap();
        world.set_parent(leaf, Some(branch)).unwrap();
        world.set_root(Some(root)).unwrap();

        world.destroy_hierarchy(branch).unwrap();
        assert!(!world.contains(branch));
        assert!(!world.contains(leaf));
        assert!(world.children(root).is_empty());
        assert_eq!(world.find_component("leaf"), None);

        world.destroy_hierarchy(root).unwrap();
        assert_eq!(world.root(), None);
        assert_eq!(world.component_count(), 0);
        assert_eq!(world.destroy_hierarchy(root), Err(SceneError::UnknownComponent(root)));
    }

    #[test]
    fn test_world_transform_composes_root_first() {
        let mut world = World::new();
        let outer = world.create_component(
            Component::new("outer").with_local(Transform::scale(Vec3::new(2.0, 2.0, 2.0))),
        );
        let inner = world.create_component(
            Component::new("inner").with_local(Transform::translate(Vec3::new(1.0, 0.0, 0.0))),
        );
        world.set_parent(inner, Some(outer)).unwrap();

        let t = world.world_transform(inner).unwrap();
        assert_relative_eq!(t.transform_point(Vec3::zeros()), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_resync_rebuilds_index_after_manual_registration() {
        let mut world = World::new();
        let root = node(&mut world, "root");
        world.set_root(Some(root)).unwrap();
        let stray = node(&mut world, "stray");

        // low-level registration of an unreachable node
        world.add_hierarchy(stray);
        assert_eq!(world.find_component("stray"), Some(stray));

        world.resync();
        assert_eq!(world.find_component("stray"), None);
        assert!(!world.component(stray).unwrap().in_world());
        assert_eq!(world.find_component("root"), Some(root));
    }
}
