//! Collision queries against the scene graph
//!
//! Collision geometry is stored in model space on each mesh and brought into
//! the query frame on demand while the tree is walked. There is no broad
//! phase: every query visits every node below the root.
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, query spheres, triangles and their predicates
//! - [`mesh`] - Model-space triangle soups
//! - [`raycast`] - Nearest front-face hit along a ray
//! - [`sphere`] - Every triangle touching a sphere
//!
//! Both queries take `&World`, so the tree cannot change while one runs.

pub mod mesh;
pub mod primitives;
mod raycast;
mod sphere;

use crate::foundation::math::Vec3;
use crate::scene::ComponentId;

pub use mesh::CollisionPrimitive;
pub use primitives::{BoundingSphere, Ray, Triangle, TriangleHit, FRONT_FACE_EPSILON};
pub use raycast::raycast;
pub use sphere::sphere_collision;

/// A contact between a query and one triangle, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Component whose mesh owns the triangle
    pub component: ComponentId,
    /// Contact point
    pub point: Vec3,
    /// Unit surface normal at the contact
    pub normal: Vec3,
}
