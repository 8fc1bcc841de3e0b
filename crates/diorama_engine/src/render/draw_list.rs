//! Draw list generation
//!
//! Walks the world the way the renderer does and produces one [`DrawCall`]
//! per render primitive, carrying everything a GPU backend needs to submit
//! it: the effective material, model and normal matrices, winding flags and
//! a sort key. No GPU state is touched here.
//!
//! ## Sort key layout
//!
//! ```text
//! bits 30-31  render order (opaque before transparent)
//! bits 14-29  depth, transparent calls only (far first)
//! bits  9-13  program (untextured / textured)
//! bits  0-8   material hash
//! ```

use bitflags::bitflags;
use log::{trace, warn};
use slotmap::Key;

use crate::foundation::math::{Mat3, Mat4, Transform};
use crate::scene::{ComponentId, Material, MaterialId, RenderOrder, World};

bitflags! {
    /// Per-call render state switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawFlags: u8 {
        /// Model matrix mirrors geometry; front faces wind clockwise
        const REVERSED = 1 << 0;
        /// Material was inherited; apply its texture coordinate scale
        const TEXTURE_SCALE = 1 << 1;
    }
}

/// One render primitive ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Ordering key, see module docs
    pub sort_key: u32,
    /// Component whose mesh is drawn
    pub component: ComponentId,
    /// Index into the mesh's render primitives
    pub primitive: usize,
    /// Effective material, `None` for the default material
    pub material: Option<MaterialId>,
    /// Root-to-node transform
    pub model: Mat4,
    /// Inverse-transpose of the model's linear part
    pub normal: Mat3,
    /// Winding and texture switches
    pub flags: DrawFlags,
}

/// Collect and sort the draw calls for one frame
///
/// `camera` is the camera's world transform and `projection` maps eye space
/// to clip space. A component's material applies to every primitive below it
/// that has no material of its own; the nearest ancestor wins. Calls come back
/// in ascending sort key order.
pub fn collect_draw_calls(world: &World, camera: &Transform, projection: &Mat4) -> Vec<DrawCall> {
    let mut calls = Vec::new();
    let Some(root) = world.root() else {
        return calls;
    };
    let Some(view) = camera.try_inverse() else {
        warn!("Camera transform is singular, nothing drawn");
        return calls;
    };
    let view_projection = projection * view.matrix();

    let mut walk = DrawWalk {
        world,
        view_projection,
        default_material: Material::default(),
        calls: &mut calls,
    };
    walk.visit(root, &Transform::identity(), None);

    calls.sort_by_key(|call| call.sort_key);
    trace!("collected {} draw calls", calls.len());
    calls
}

struct DrawWalk<'a> {
    world: &'a World,
    view_projection: Mat4,
    default_material: Material,
    calls: &'a mut Vec<DrawCall>,
}

impl DrawWalk<'_> {
    fn visit(&mut self, id: ComponentId, parent_model: &Transform, inherited: Option<MaterialId>) {
        let world = self.world;
        let Some(node) = world.component(id) else {
            return;
        };
        let inherited = node.material.or(inherited);
        let model = parent_model * node.local();

        if let Some(mesh) = node.mesh.and_then(|m| world.mesh(m)) {
            if !mesh.render.is_empty() {
                let Some(normal) = model.normal_matrix() else {
                    warn!("Skipping '{}' in draw list: singular model matrix", node.name());
                    return;
                };
                let mut base_flags = DrawFlags::empty();
                if model.determinant() < 0.0 {
                    base_flags |= DrawFlags::REVERSED;
                }

                for (index, primitive) in mesh.render.iter().enumerate() {
                    let mut flags = base_flags;
                    if primitive.material.is_none() {
                        flags |= DrawFlags::TEXTURE_SCALE;
                    }
                    let material = primitive.material.or(inherited);
                    let sort_key = self.sort_key(material, &model);
                    self.calls.push(DrawCall {
                        sort_key,
                        component: id,
                        primitive: index,
                        material,
                        model: *model.matrix(),
                        normal,
                        flags,
                    });
                }
            }
        }

        for &child in node.children() {
            self.visit(child, &model, inherited);
        }
    }

    fn sort_key(&self, material_id: Option<MaterialId>, model: &Transform) -> u32 {
        let material = material_id
            .and_then(|id| self.world.material(id))
            .unwrap_or(&self.default_material);

        let mut key = (material.order as u32) << 30;
        if material.order == RenderOrder::Transparent {
            key |= u32::from(self.depth_bits(model)) << 14;
        }
        key |= program_bits(material) << 9;
        key |= material_id.map_or(0, material_hash);
        key
    }

    // Smaller for farther origins, so ascending keys draw blended geometry back to front.
    fn depth_bits(&self, model: &Transform) -> u16 {
        let clip = (self.view_projection * model.matrix()).column(3).into_owned();
        let depth = clip.z / clip.w;
        if depth.is_nan() || depth.abs() >= 1.0 {
            return u16::MAX;
        }
        ((-depth + 1.0) / 2.0 * 65536.0) as u16
    }
}

fn program_bits(material: &Material) -> u32 {
    u32::from(material.texture.is_some()) & 0x1F
}

fn material_hash(id: MaterialId) -> u32 {
    let bits = id.data().as_ffi();
    ((bits ^ (bits >> 9) ^ (bits >> 32)) & 0x1FF) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::scene::{Component, Mesh, RenderPrimitive};
    use approx::assert_relative_eq;

    fn mesh_with(world: &mut World, materials: &[Option<MaterialId>]) -> crate::scene::MeshId {
        world.add_mesh(Mesh {
            render: materials
                .iter()
                .map(|&material| RenderPrimitive { index_count: 6, material })
                .collect(),
            collision: Vec::new(),
        })
    }

    fn projection() -> Mat4 {
        Mat4::perspective(1.0, 1.0, 0.1, 100.0) * Mat4::blender_axis_remap()
    }

    #[test]
    fn test_children_inherit_nearest_material() {
        let mut world = World::new();
        let red = world.add_material(Material::colored(1.0, 0.0, 0.0));
        let blue = world.add_material(Material::colored(0.0, 0.0, 1.0));
        let own = world.add_material(Material::colored(0.0, 1.0, 0.0));
        let plain = mesh_with(&mut world, &[None]);
        let authored = mesh_with(&mut world, &[Some(own)]);

        let root = world.create_component(Component::new("root").with_material(red));
        let a = world.create_component(Component::new("a").with_mesh(plain));
        let b = world.create_component(Component::new("b").with_material(blue));
        let c = world.create_component(Component::new("c").with_mesh(plain));
        let d = world.create_component(Component::new("d").with_mesh(authored));
        world.set_parent(a, Some(root)).unwrap();
        world.set_parent(b, Some(root)).unwrap();
        world.set_parent(c, Some(b)).unwrap();
        world.set_parent(d, Some(b)).unwrap();
        world.set_root(Some(root)).unwrap();

        let calls = collect_draw_calls(&world, &Transform::identity(), &projection());
        let material_of = |id| calls.iter().find(|c| c.component == id).unwrap().material;
        assert_eq!(material_of(a), Some(red));
        assert_eq!(material_of(c), Some(blue));
        assert_eq!(material_of(d), Some(own));

        let flags_of = |id| calls.iter().find(|c| c.component == id).unwrap().flags;
        assert!(flags_of(c).contains(DrawFlags::TEXTURE_SCALE));
        assert!(!flags_of(d).contains(DrawFlags::TEXTURE_SCALE));
    }

    #[test]
    fn test_no_material_anywhere_uses_default() {
        let mut world = World::new();
        let mesh = mesh_with(&mut world, &[None, None]);
        let root = world.create_component(Component::new("root").with_mesh(mesh));
        world.set_root(Some(root)).unwrap();

        let calls = collect_draw_calls(&world, &Transform::identity(), &projection());
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.material.is_none()));
    }

    #[test]
    fn test_mirrored_model_is_reversed() {
        let mut world = World::new();
        let mesh = mesh_with(&mut world, &[None]);
        let root = world.create_component(Component::new("root"));
        let mirrored = world.create_component(
            Component::new("mirrored")
                .with_mesh(mesh)
                .with_local(Transform::scale(Vec3::new(-1.0, 2.0, 1.0))),
        );
        let normal = world.create_component(Component::new("normal").with_mesh(mesh));
        world.set_parent(mirrored, Some(root)).unwrap();
        world.set_parent(normal, Some(root)).unwrap();
        world.set_root(Some(root)).unwrap();

        let calls = collect_draw_calls(&world, &Transform::identity(), &projection());
        let call = calls.iter().find(|c| c.component == mirrored).unwrap();
        assert!(call.flags.contains(DrawFlags::REVERSED));
        assert_relative_eq!(call.normal, Mat3::new(-1.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0));

        let call = calls.iter().find(|c| c.component == normal).unwrap();
        assert!(!call.flags.contains(DrawFlags::REVERSED));
    }

    #[test]
    fn test_opaque_sorts_before_transparent_far_first() {
        let mut world = World::new();
        let glass = world.add_material(Material::default().with_transparency(0.5));
        let stone = world.add_material(Material::colored(0.5, 0.5, 0.5));
        let glass_mesh = mesh_with(&mut world, &[Some(glass)]);
        let stone_mesh = mesh_with(&mut world, &[Some(stone)]);

        let root = world.create_component(Component::new("root"));
        let near_glass = world.create_component(
            Component::new("near glass")
                .with_mesh(glass_mesh)
                .with_local(Transform::translate(Vec3::new(0.0, 5.0, 0.0))),
        );
        let far_glass = world.create_component(
            Component::new("far glass")
                .with_mesh(glass_mesh)
                .with_local(Transform::translate(Vec3::new(0.0, 50.0, 0.0))),
        );
        let wall = world.create_component(
            Component::new("wall")
                .with_mesh(stone_mesh)
                .with_local(Transform::translate(Vec3::new(0.0, 80.0, 0.0))),
        );
        for id in [near_glass, far_glass, wall] {
            world.set_parent(id, Some(root)).unwrap();
        }
        world.set_root(Some(root)).unwrap();

        // camera at the origin looking down +Y
        let calls = collect_draw_calls(&world, &Transform::identity(), &projection());
        let order: Vec<_> = calls.iter().map(|c| c.component).collect();
        assert_eq!(order, vec![wall, far_glass, near_glass]);
    }

    #[test]
    fn test_transparent_behind_camera_gets_max_depth() {
        let mut world = World::new();
        let glass = world.add_material(Material::default().with_transparency(0.5));
        let mesh = mesh_with(&mut world, &[Some(glass)]);
        let root = world.create_component(
            Component::new("behind")
                .with_mesh(mesh)
                .with_local(Transform::translate(Vec3::new(0.0, -10.0, 0.0))),
        );
        world.set_root(Some(root)).unwrap();

        let calls = collect_draw_calls(&world, &Transform::identity(), &projection());
        assert_eq!((calls[0].sort_key >> 14) & 0xFFFF, 0xFFFF);
        assert_eq!(calls[0].sort_key >> 30, 1);
    }
}
