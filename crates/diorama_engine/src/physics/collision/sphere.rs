//! Sphere overlap query
//!
//! Unlike the ray cast, the sphere stays in world space and the geometry is
//! brought to it: the walk accumulates each node's world transform and moves
//! every triangle into world space before the closest-point test.

use log::{trace, warn};

use crate::foundation::math::{Transform, Vec3};
use crate::scene::{ComponentId, World};
use super::primitives::BoundingSphere;
use super::CollisionInfo;

/// Every triangle within `radius` of `center`
///
/// One [`CollisionInfo`] per touching triangle: the closest point on the
/// triangle and its unit plane normal. Touching the surface counts, so a zero
/// radius reports the triangles `center` lies on, and a negative radius
/// touches nothing. Hits come in traversal order (a node's own triangles,
/// then its children in order).
///
/// Normals face out of the authored front side even under mirroring
/// transforms, matching [`raycast`](fn@super::raycast).
pub fn sphere_collision(world: &World, center: Vec3, radius: f32) -> Vec<CollisionInfo> {
    let mut hits = Vec::new();
    if radius < 0.0 {
        return hits;
    }
    if let Some(root) = world.root() {
        let sphere = BoundingSphere::new(center, radius);
        collide(world, root, &Transform::identity(), &sphere, &mut hits);
    }
    trace!("sphere at {:?} r={} touched {} triangles", center, radius, hits.len());
    hits
}

fn collide(
    world: &World,
    id: ComponentId,
    parent_to_world: &Transform,
    sphere: &BoundingSphere,
    hits: &mut Vec<CollisionInfo>,
) {
    let Some(node) = world.component(id) else {
        return;
    };
    if node.local().try_inverse().is_none() {
        warn!("Skipping '{}' in sphere query: singular local transform", node.name());
        return;
    }
    let to_world = parent_to_world * node.local();
    // mirroring flips the winding, and with it the cross-product normal
    let facing = if to_world.determinant() < 0.0 { -1.0 } else { 1.0 };

    if let Some(mesh) = node.mesh.and_then(|m| world.mesh(m)) {
        for triangle in mesh.collision.iter().flat_map(|p| p.triangles()) {
            let Some((point, normal)) = triangle.transformed(&to_world).closest_point(sphere.center) else {
                continue;
            };
            if sphere.contains(point) {
                hits.push(CollisionInfo {
                    component: id,
                    point,
                    normal: normal * facing,
                });
            }
        }
    }

    for &child in node.children() {
        collide(world, child, &to_world, sphere, hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::CollisionPrimitive;
    use crate::scene::{Component, Mesh};
    use approx::assert_relative_eq;

    fn wall_world(local: Transform) -> World {
        let mut world = World::new();
        // single triangle in the XZ plane facing +Y
        let mesh = world.add_mesh(Mesh::from_collision(vec![CollisionPrimitive::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 4.0),
                Vec3::new(4.0, 0.0, 0.0),
            ],
            vec![0, 1, 2],
        )]));
        let wall = world.create_component(Component::new("wall").with_mesh(mesh).with_local(local));
        world.set_root(Some(wall)).unwrap();
        world
    }

    #[test]
    fn test_hit_reports_world_space_contact() {
        let world = wall_world(Transform::translate(Vec3::new(0.0, 10.0, 0.0)));
        let hits = sphere_collision(&world, Vec3::new(1.0, 8.5, 1.0), 2.0);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point, Vec3::new(1.0, 10.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(hits[0].normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_miss_just_outside_radius() {
        let world = wall_world(Transform::identity());
        assert!(sphere_collision(&world, Vec3::new(1.0, -2.01, 1.0), 2.0).is_empty());
        assert_eq!(sphere_collision(&world, Vec3::new(1.0, -2.0, 1.0), 2.0).len(), 1);
    }

    #[test]
    fn test_edge_contact_uses_clamped_point() {
        let world = wall_world(Transform::identity());
        // beside the A-B edge (x = 0), level with the plane
        let hits = sphere_collision(&world, Vec3::new(-1.0, 0.0, 2.0), 1.5);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_negative_radius_touches_nothing() {
        let world = wall_world(Transform::identity());
        assert!(sphere_collision(&world, Vec3::new(1.0, -1.0, 1.0), -2.0).is_empty());
        assert_eq!(sphere_collision(&world, Vec3::new(1.0, -1.0, 1.0), 2.0).len(), 1);
    }

    #[test]
    fn test_mirrored_node_normal_faces_front_side() {
        // mirroring X reverses the winding but the front side still faces +Y
        let world = wall_world(Transform::scale(Vec3::new(-1.0, 1.0, 1.0)));
        let hits = sphere_collision(&world, Vec3::new(-1.0, 1.0, 1.0), 2.0);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_scaled_node_normal_is_unit() {
        let world = wall_world(Transform::scale(Vec3::new(3.0, 3.0, 3.0)));
        let hits = sphere_collision(&world, Vec3::new(2.0, -1.0, 2.0), 1.0);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].normal.magnitude(), 1.0, epsilon = 1e-6);
    }
}
