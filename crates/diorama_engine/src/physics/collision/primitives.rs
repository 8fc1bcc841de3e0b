//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays, query spheres and triangles together with the two
//! per-triangle predicates the scene queries are built from: the front-face
//! ray/plane test and the sphere closest-point test.

use crate::foundation::math::{Transform, Vec3};

/// Rays whose direction is within this of the plane (or facing away from
/// the front side) never hit a triangle.
pub const FRONT_FACE_EPSILON: f32 = 1e-6;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray (unit length for triangle tests)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, normalizing `direction`
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A sphere used as a collision query volume
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether `point` lies inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// How far `point` sits inside the surface (0.0 if outside)
    pub fn penetration_depth(&self, point: Vec3) -> f32 {
        (self.radius - (point - self.center).magnitude()).max(0.0)
    }
}

/// Where a ray met a triangle, in the triangle's frame
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the (unit) ray direction
    pub t: f32,
    /// Intersection point
    pub point: Vec3,
    /// Unit plane normal
    pub normal: Vec3,
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex (A)
    pub v0: Vec3,
    /// Second vertex (B)
    pub v1: Vec3,
    /// Third vertex (C)
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Map all three vertices through an affine transform
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            v0: transform.transform_point(self.v0),
            v1: transform.transform_point(self.v1),
            v2: transform.transform_point(self.v2),
        }
    }

    /// Non-unit face normal `(B - A) x (C - A)`
    pub fn cross(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit face normal (right-hand rule), `None` for zero-area triangles
    pub fn plane_normal(&self) -> Option<Vec3> {
        let cross = self.cross();
        if cross == Vec3::zeros() {
            return None;
        }
        Some(cross.normalize())
    }

    /// Signed double areas of QBC, AQC and ABQ measured along `normal`
    ///
    /// A point in the triangle's plane is inside (boundary included) when
    /// all three are non-negative.
    pub fn edge_areas(&self, q: Vec3, normal: Vec3) -> [f32; 3] {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        [
            (c - b).cross(&(q - b)).dot(&normal),
            (a - c).cross(&(q - c)).dot(&normal),
            (b - a).cross(&(q - a)).dot(&normal),
        ]
    }

    /// Front-face ray intersection
    ///
    /// Rejects degenerate triangles, back faces and grazing rays, hits behind
    /// the origin (`t <= 0`) and hits with `t * t > max_t_sq`. Points on an
    /// edge count as inside. `ray.direction` must be unit length.
    pub fn intersect_ray(&self, ray: &Ray, max_t_sq: f32) -> Option<TriangleHit> {
        let normal = self.plane_normal()?;
        let plane_k = normal.dot(&self.v0);

        let n_dot_d = normal.dot(&ray.direction);
        if n_dot_d > -FRONT_FACE_EPSILON {
            return None;
        }
        let t = (plane_k - normal.dot(&ray.origin)) / n_dot_d;
        if t <= 0.0 || t * t > max_t_sq {
            return None;
        }

        let point = ray.point_at(t);
        if self.edge_areas(point, normal).iter().any(|&area| area < 0.0) {
            return None;
        }

        Some(TriangleHit { t, point, normal })
    }

    /// Closest point on the triangle to `point`, plus the unit plane normal
    ///
    /// The point is projected onto the plane; if the projection falls outside
    /// it is clamped onto the first violated edge in the order BC, CA, AB.
    /// `None` for zero-area triangles.
    pub fn closest_point(&self, point: Vec3) -> Option<(Vec3, Vec3)> {
        let normal = self.plane_normal()?;
        let projected = point - normal * normal.dot(&(point - self.v0));

        let [qbc, aqc, abq] = self.edge_areas(projected, normal);
        let closest = if qbc < 0.0 {
            clamp_to_segment(projected, self.v1, self.v2)
        } else if aqc < 0.0 {
            clamp_to_segment(projected, self.v2, self.v0)
        } else if abq < 0.0 {
            clamp_to_segment(projected, self.v0, self.v1)
        } else {
            projected
        };

        Some((closest, normal))
    }
}

fn clamp_to_segment(point: Vec3, start: Vec3, end: Vec3) -> Vec3 {
    let edge = end - start;
    let length_sq = edge.magnitude_squared();
    if length_sq == 0.0 {
        return start;
    }
    let t = (edge.dot(&(point - start)) / length_sq).clamp(0.0, 1.0);
    start + edge * t
}
