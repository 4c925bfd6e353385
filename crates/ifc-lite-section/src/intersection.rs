// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane vs triangle edge intersection
//!
//! Crossing convention: every vertex is classified as *above* the plane
//! (signed distance `> 0`) or *not above* (`<= 0`). An edge crosses the plane
//! when its endpoints fall in different classes. A vertex lying exactly on the
//! plane therefore registers only on edges whose other endpoint is strictly
//! above, so a finite triangle always yields 0 or 2 crossings and a triangle
//! lying in the plane yields none.
//!
//! A triangle with a non-finite signed distance (NaN or infinite coordinates)
//! is degenerate: its crossings are still reported but never form a segment.

use crate::plane::{Plane, Triangle};
use nalgebra::Point3;

/// Crossing points of a plane with a triangle's edges
///
/// Points are stored in edge order: a-b, b-c, c-a.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCrossings {
    points: [Point3<f64>; 3],
    count: usize,
    degenerate: bool,
}

impl EdgeCrossings {
    fn new(degenerate: bool) -> Self {
        Self {
            points: [Point3::origin(); 3],
            count: 0,
            degenerate,
        }
    }

    #[inline]
    fn push(&mut self, point: Point3<f64>) {
        self.points[self.count] = point;
        self.count += 1;
    }

    /// Number of crossed edges (0..=3)
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// True when the crossings form one segment
    #[inline]
    pub fn is_segment(&self) -> bool {
        self.count == 2 && !self.degenerate
    }

    /// True when a vertex had a non-finite distance to the plane
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Crossing points in edge order
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points[..self.count]
    }

    /// The segment, if exactly two edges were crossed
    pub fn segment(&self) -> Option<[Point3<f64>; 2]> {
        self.is_segment().then(|| [self.points[0], self.points[1]])
    }
}

/// Intersect the segment `start..end` with a plane
///
/// Returns the crossing point, or `None` when both endpoints are on the
/// same side (see the module docs for how on-plane endpoints are classified).
#[inline]
pub fn segment_intersection(
    plane: &Plane,
    start: &Point3<f64>,
    end: &Point3<f64>,
) -> Option<Point3<f64>> {
    crossing(
        start,
        end,
        plane.signed_distance(start),
        plane.signed_distance(end),
    )
}

#[inline]
fn crossing(a: &Point3<f64>, b: &Point3<f64>, da: f64, db: f64) -> Option<Point3<f64>> {
    if (da > 0.0) == (db > 0.0) {
        return None;
    }
    // Classes differ so da != db
    let t = da / (da - db);
    Some(a + (b - a) * t)
}

/// Find where `plane` crosses each edge of `triangle`
pub fn intersect_triangle(plane: &Plane, triangle: &Triangle) -> EdgeCrossings {
    let da = plane.signed_distance(&triangle.a);
    let db = plane.signed_distance(&triangle.b);
    let dc = plane.signed_distance(&triangle.c);

    let degenerate = !(da.is_finite() && db.is_finite() && dc.is_finite());
    let mut crossings = EdgeCrossings::new(degenerate);
    for (p, q, dp, dq) in [
        (&triangle.a, &triangle.b, da, db),
        (&triangle.b, &triangle.c, db, dc),
        (&triangle.c, &triangle.a, dc, da),
    ] {
        if let Some(point) = crossing(p, q, dp, dq) {
            crossings.push(point);
        }
    }
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn ground() -> Plane {
        Plane::new(Vector3::y(), 0.0)
    }

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::new(a.into(), b.into(), c.into())
    }

    #[test]
    fn test_crossing_triangle_yields_segment() {
        let t = tri([0.0, 1.0, 0.0], [0.0, -1.0, 0.0], [1.0, -1.0, 0.0]);
        let crossings = intersect_triangle(&ground(), &t);

        assert_eq!(crossings.count(), 2);
        let [p, q] = crossings.segment().unwrap();
        assert_eq!(p, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(q, Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_triangle_above_plane() {
        let t = tri([0.0, 1.0, 0.0], [1.0, 2.0, 0.0], [1.0, 1.0, 0.0]);
        let crossings = intersect_triangle(&ground(), &t);
        assert_eq!(crossings.count(), 0);
        assert!(crossings.points().is_empty());
        assert!(crossings.segment().is_none());
    }

    #[test]
    fn test_triangle_in_plane_has_no_crossings() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        assert_eq!(intersect_triangle(&ground(), &t).count(), 0);
    }

    #[test]
    fn test_vertex_on_plane_other_sides_split() {
        // a on the plane, b above, c below
        let t = tri([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, -1.0, 0.0]);
        let crossings = intersect_triangle(&ground(), &t);
        let [p, q] = crossings.segment().unwrap();
        assert_eq!(p, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(q, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_vertex_touching_from_below_is_ignored() {
        // a on the plane, b and c below
        let t = tri([0.0, 0.0, 0.0], [1.0, -1.0, 0.0], [-1.0, -1.0, 0.0]);
        assert_eq!(intersect_triangle(&ground(), &t).count(), 0);
    }

    #[test]
    fn test_edge_on_plane_with_apex_above() {
        // a-b lies in the plane, c above: a and b both count as "not above"
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let crossings = intersect_triangle(&ground(), &t);
        let [p, q] = crossings.segment().unwrap();
        assert_eq!(p, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(q, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_nan_vertex_is_degenerate() {
        let t = tri([0.0, f64::NAN, 0.0], [0.0, 1.0, 0.0], [0.0, -1.0, 0.0]);
        let crossings = intersect_triangle(&ground(), &t);
        assert!(crossings.is_degenerate());
        assert_eq!(crossings.count(), 2);
        assert!(!crossings.is_segment());
        assert!(crossings.segment().is_none());
    }

    #[test]
    fn test_infinite_vertex_is_degenerate() {
        let t = tri([0.0, f64::INFINITY, 0.0], [1.0, -1.0, 0.0], [0.0, -1.0, 0.0]);
        let crossings = intersect_triangle(&ground(), &t);
        assert!(crossings.is_degenerate());
        assert!(crossings.segment().is_none());
        assert!(!intersect_triangle(&ground(), &tri([0.0, 1.0, 0.0], [0.0, -1.0, 0.0], [1.0, -1.0, 0.0])).is_degenerate());
    }

    #[test]
    fn test_points_lie_on_their_edges() {
        let plane = Plane::from_normal_and_point(
            Vector3::new(0.3, 1.0, -0.2),
            Point3::new(0.1, 0.2, 0.3),
        );
        let triangles = [
            tri([-1.0, -1.0, 0.0], [2.0, 1.5, 1.0], [0.5, 2.0, -1.0]),
            tri([0.0, -3.0, 2.0], [1.0, 3.0, 0.0], [-2.0, 0.5, 0.5]),
            tri([5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.0, 5.0]),
        ];

        for t in &triangles {
            let crossings = intersect_triangle(&plane, t);
            assert!(crossings.count() <= 3);
            for p in crossings.points() {
                assert_relative_eq!(plane.signed_distance(p), 0.0, epsilon = 1e-9);
                let on_some_edge = [(t.a, t.b), (t.b, t.c), (t.c, t.a)].iter().any(|(s, e)| {
                    let along = (e - s).norm();
                    ((p - s).norm() + (e - p).norm() - along).abs() < 1e-9
                });
                assert!(on_some_edge);
            }
        }
    }

    #[test]
    fn test_segment_intersection_endpoints() {
        let plane = ground();
        let hit = segment_intersection(&plane, &Point3::new(0.0, -2.0, 0.0), &Point3::new(0.0, 2.0, 4.0));
        assert_eq!(hit, Some(Point3::new(0.0, 0.0, 2.0)));
        assert!(segment_intersection(&plane, &Point3::new(0.0, 1.0, 0.0), &Point3::new(0.0, 2.0, 0.0)).is_none());
    }
}
