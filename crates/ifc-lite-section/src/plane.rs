// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane, bounding box and triangle primitives

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Clipping plane in Hessian normal form
///
/// Points on the plane satisfy `normal . p + constant == 0`. The signed
/// distance of a point is positive on the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vector3<f64>,
    /// Negated distance from the origin along the normal
    pub constant: f64,
}

impl Plane {
    /// Create a plane from a normal and constant
    ///
    /// The normal is normalized; the constant is scaled with it so the plane
    /// stays in place.
    pub fn new(normal: Vector3<f64>, constant: f64) -> Self {
        let len = normal.norm();
        if len > 0.0 {
            Self {
                normal: normal / len,
                constant: constant / len,
            }
        } else {
            Self { normal, constant }
        }
    }

    /// Create a plane through `point` with the given normal
    pub fn from_normal_and_point(normal: Vector3<f64>, point: Point3<f64>) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: -point.coords.dot(&normal),
        }
    }

    /// Signed distance from point to plane
    /// Positive = in front, Negative = behind
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.constant
    }

    /// Point on the plane closest to the origin
    pub fn coplanar_point(&self) -> Point3<f64> {
        Point3::from(self.normal * -self.constant)
    }

    /// Same plane with the normal flipped
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            constant: -self.constant,
        }
    }

    /// Map the plane through an affine transform
    ///
    /// The normal goes through the inverse-transpose of the linear part,
    /// the constant is recomputed from a transformed coplanar point.
    /// Returns `None` if the linear part is singular.
    pub fn apply_matrix(&self, matrix: &Matrix4<f64>) -> Option<Plane> {
        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear.try_inverse()?.transpose();

        let reference = matrix.transform_point(&self.coplanar_point());
        let normal = (normal_matrix * self.normal).try_normalize(f64::EPSILON)?;

        Some(Plane {
            normal,
            constant: -reference.coords.dot(&normal),
        })
    }

    /// Check whether the plane passes through a box
    pub fn intersects_box(&self, bounds: &Aabb) -> bool {
        bounds.intersects_plane(self)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from its corners
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Inverted box that any `grow` call replaces
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True if no point has been added
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extend to contain `point`
    #[inline]
    pub fn grow(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest box containing both
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Box center
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Check whether `plane` passes through this box
    ///
    /// Projects the box onto the plane normal and tests whether the plane
    /// offset lies within the projected interval (touching counts).
    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        if self.is_empty() {
            return false;
        }

        let mut lo = 0.0;
        let mut hi = 0.0;
        for axis in 0..3 {
            let n = plane.normal[axis];
            if n > 0.0 {
                lo += n * self.min[axis];
                hi += n * self.max[axis];
            } else {
                lo += n * self.max[axis];
                hi += n * self.min[axis];
            }
        }

        lo <= -plane.constant && hi >= -plane.constant
    }
}

/// Triangle definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { a, b, c }
    }

    /// Create a triangle from f32 mesh corners
    pub fn from_corners(corners: [[f32; 3]; 3]) -> Self {
        let p = |v: [f32; 3]| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64);
        Self::new(p(corners[0]), p(corners[1]), p(corners[2]))
    }

    /// Bounding box of the three corners
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::new(self.a, self.a);
        bounds.grow(&self.b);
        bounds.grow(&self.c);
        bounds
    }
}

/// Build an f64 matrix from a column-major f32 array
pub fn matrix_from_column_major(m: &[f32; 16]) -> Matrix4<f64> {
    Matrix4::from_column_slice(&m.map(f64::from))
}
