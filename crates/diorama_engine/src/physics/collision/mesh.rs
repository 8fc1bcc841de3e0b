//! Collision triangle soups
//!
//! Collision geometry is stored in model space (the owning component's local
//! frame) and brought into the query frame on demand during each test.

use crate::foundation::math::Vec3;
use super::primitives::Triangle;

/// A triangle soup stored in MODEL SPACE
///
/// `indices` is read with stride 3. A trailing partial triangle is ignored
/// and triangles referencing missing vertices are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionPrimitive {
    /// Vertex positions in local coordinates
    pub vertices: Vec<Vec3>,
    /// Triangle vertex indices, three per triangle
    pub indices: Vec<u32>,
}

impl CollisionPrimitive {
    /// Creates a primitive from MODEL SPACE vertices and indices
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of complete index triples
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// First index that does not name a vertex, if any
    pub fn first_invalid_index(&self) -> Option<u32> {
        let vertex_count = self.vertices.len();
        self.indices
            .iter()
            .copied()
            .find(|&index| index as usize >= vertex_count)
    }

    /// Iterate triangles in model space
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(move |chunk| {
            let v0 = *self.vertices.get(chunk[0] as usize)?;
            let v1 = *self.vertices.get(chunk[1] as usize)?;
            let v2 = *self.vertices.get(chunk[2] as usize)?;
            Some(Triangle::new(v0, v1, v2))
        })
    }
}
