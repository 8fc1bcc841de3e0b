//! Nearest-hit ray casting
//!
//! The ray is carried down the tree instead of the geometry: at each node the
//! parent-frame ray is mapped through the inverse of the node's local
//! transform and tested against the node's triangles in model space. The
//! winning hit is mapped back up one frame per level on the way out.
//!
//! Scaled frames change distances, so the closest-so-far bound is kept in
//! root units. Each level knows how many root units one of its own units is
//! worth along the ray (`root_per_local`).

use log::warn;

use crate::foundation::math::{Transform, Vec3};
use crate::scene::{ComponentId, World};
use super::primitives::Ray;
use super::CollisionInfo;

// Hit expressed in the frame of whoever receives it.
struct LocalHit {
    component: ComponentId,
    point: Vec3,
    normal: Vec3,
}

struct RayCast<'w> {
    world: &'w World,
    // closest accepted distance so far, root units
    bound: f32,
}

/// Nearest front-facing triangle hit along a ray
///
/// `origin` and `direction` are in world (root parent) space; `direction`
/// need not be unit length. Returns `None` when nothing is hit, when the
/// world has no root, or when `direction` is zero. Back faces, grazing rays
/// and hits behind the origin are ignored. Of two hits at exactly the same
/// distance the one visited later wins (a node's own triangles are visited
/// before its children, children in order).
pub fn raycast(world: &World, origin: Vec3, direction: Vec3) -> Option<CollisionInfo> {
    let root = world.root()?;
    let length = direction.magnitude();
    if !(length > 0.0 && length.is_finite()) {
        return None;
    }

    let mut cast = RayCast {
        world,
        bound: f32::INFINITY,
    };
    let hit = cast.visit(root, &Ray { origin, direction: direction / length }, 1.0)?;

    Some(CollisionInfo {
        component: hit.component,
        point: hit.point,
        normal: hit.normal.normalize(),
    })
}

impl RayCast<'_> {
    /// Search the subtree at `id` with `ray` given in its parent frame
    ///
    /// `root_per_parent` converts parent-frame distances to root units.
    /// The result, if any, is in the parent frame.
    fn visit(&mut self, id: ComponentId, ray: &Ray, root_per_parent: f32) -> Option<LocalHit> {
        let world = self.world;
        let node = world.component(id)?;
        let local = node.local();
        let Some(inverse) = local.try_inverse() else {
            warn!("Skipping '{}' in raycast: singular local transform", node.name());
            return None;
        };

        let stretched = inverse.transform_vector(ray.direction);
        let stretch = stretched.magnitude();
        if !(stretch > 0.0) {
            return None;
        }
        let local_ray = Ray {
            origin: inverse.transform_point(ray.origin),
            direction: stretched / stretch,
        };
        let root_per_local = root_per_parent / stretch;

        let mut best = None;

        if let Some(mesh) = node.mesh.and_then(|m| world.mesh(m)) {
            for triangle in mesh.collision.iter().flat_map(|p| p.triangles()) {
                let local_bound = self.bound / root_per_local;
                if let Some(hit) = triangle.intersect_ray(&local_ray, local_bound * local_bound) {
                    self.bound = hit.t * root_per_local;
                    best = Some(LocalHit {
                        component: id,
                        point: hit.point,
                        normal: hit.normal,
                    });
                }
            }
        }

        // Every accepted hit tightened the bound, so the last one is nearest.
        for &child in node.children() {
            if let Some(hit) = self.visit(child, &local_ray, root_per_local) {
                best = Some(hit);
            }
        }

        best.map(|hit| to_parent(local, &inverse, hit))
    }
}

fn to_parent(local: &Transform, inverse: &Transform, hit: LocalHit) -> LocalHit {
    LocalHit {
        component: hit.component,
        point: local.transform_point(hit.point),
        normal: inverse.linear().transpose() * hit.normal,
    }
}
