//! Physics module for collision queries
//!
//! Static collision only: ray casts and sphere overlap tests against the
//! triangle meshes of a [`World`](crate::scene::World). Movement code decides
//! what to do with the contacts.

pub mod collision;

pub use collision::{
    raycast,
    sphere_collision,
    BoundingSphere,
    CollisionInfo,
    CollisionPrimitive,
    Ray,
    Triangle,
};
