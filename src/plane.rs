//! Half-space planes in Hessian normal form.
//!
//! A point `p` lies on the kept side of a plane when
//! `normal · p + distance >= 0`, which is the convention the host renderer
//! uses for its per-fragment clipping test.

use crate::float_types::{EPSILON, Real};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal, pointing into the kept half-space
    pub normal: Vector3<Real>,
    /// Signed distance of the origin to the plane along `normal`
    pub distance: Real,
}

impl Plane {
    pub const fn new(normal: Vector3<Real>, distance: Real) -> Self {
        Plane { normal, distance }
    }

    /// Plane through `point` with the given normal (normalized here).
    pub fn from_point_normal(point: &Point3<Real>, normal: &Vector3<Real>) -> Self {
        let normal = normal.normalize();
        let distance = -normal.dot(&point.coords);
        Plane { normal, distance }
    }

    /// Signed distance of `point`, positive on the kept side.
    pub fn point_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) + self.distance
    }

    /// Flips the kept half-space in place.
    pub fn negate(&mut self) {
        self.normal = -self.normal;
        self.distance = -self.distance;
    }

    pub fn negated(&self) -> Self {
        Plane {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Re-expresses the plane in the frame that `transform` maps points into.
    ///
    /// A point `p` on `self` ends up with `transform * p` on the result.
    /// Returns `None` for singular transforms or when the transformed
    /// normal collapses.
    pub fn transform(&self, transform: &Matrix4<Real>) -> Option<Plane> {
        let inverse_transpose = transform.try_inverse()?.transpose();
        let hessian = Vector4::new(self.normal.x, self.normal.y, self.normal.z, self.distance);
        let transformed = inverse_transpose * hessian;

        let normal = transformed.xyz();
        let magnitude = normal.norm();
        if !magnitude.is_finite() || magnitude * magnitude < EPSILON {
            return None;
        }
        Some(Plane {
            normal: normal / magnitude,
            distance: transformed.w / magnitude,
        })
    }
}

/// Vertical plane containing `point1` and `point2`.
///
/// The normal is `normalize(p1 × (p2 − p1))`, i.e. it points to the left of
/// the segment seen from above, following the right-hand rule about the
/// geocentric up of `point1`. `negate` flips it.
pub fn plane_from_two_points(point1: &Point3<Real>, point2: &Point3<Real>, negate: bool) -> Plane {
    let p1p2 = point2 - point1;
    let cross = point1.coords.cross(&p1p2);
    let mut normal = if cross.norm_squared() < EPSILON {
        Vector3::z()
    } else {
        cross.normalize()
    };
    if negate {
        normal = -normal;
    }
    Plane::from_point_normal(point1, &normal)
}
