// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding volume hierarchy over a subset mesh
//!
//! The section pass only needs one query: walk every node whose box passes a
//! caller test and hand each surviving triangle to a callback. That query is
//! the [`SpatialIndex`] seam; [`MeshBvh`] is the built-in implementation.

use crate::plane::{Aabb, Triangle};
use ifc_lite_model::MeshData;
use std::sync::Arc;

/// Callbacks driven by [`SpatialIndex::shapecast`]
pub trait TriangleVisitor {
    /// Return `false` to skip the subtree bounded by `bounds`
    fn intersects_bounds(&mut self, bounds: &Aabb) -> bool;

    /// Called once per triangle in every leaf that was not pruned
    fn visit_triangle(&mut self, triangle: &Triangle);
}

/// Spatial index over the triangles of one mesh
pub trait SpatialIndex: Send + Sync {
    /// Traverse the index, pruning with `visitor.intersects_bounds`
    fn shapecast(&self, visitor: &mut dyn TriangleVisitor);

    /// Number of indexed triangles
    fn triangle_count(&self) -> usize;

    /// Bounds of all indexed triangles, `None` when empty
    fn bounds(&self) -> Option<Aabb>;
}

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bbox: Aabb,
    left: u32,
    right: u32,
    start: u32,
    count: u32,
}

impl BvhNode {
    const fn leaf(bbox: Aabb, start: u32, count: u32) -> Self {
        Self {
            bbox,
            left: u32::MAX,
            right: u32::MAX,
            start,
            count,
        }
    }

    const fn inner(bbox: Aabb, left: u32, right: u32) -> Self {
        Self {
            bbox,
            left,
            right,
            start: 0,
            count: 0,
        }
    }

    const fn is_leaf(&self) -> bool {
        self.count != 0
    }
}

/// Median-split BVH over mesh triangles
///
/// Leaves hold triangle indices into the shared mesh; corners are read back
/// from the mesh during traversal.
#[derive(Debug, Clone, Default)]
pub struct MeshBvh {
    nodes: Vec<BvhNode>,
    /// Indices of the valid mesh triangles, reordered during the build
    prim_indices: Vec<u32>,
    mesh: Arc<MeshData>,
}

impl MeshBvh {
    /// Leaf size used for section subsets
    pub const DEFAULT_MAX_LEAF_TRIS: usize = 3;

    /// Build over an indexed mesh
    ///
    /// Triangles referencing missing vertices are skipped.
    pub fn build(mesh: Arc<MeshData>, max_leaf_tris: usize) -> Self {
        let triangle_count = mesh.triangle_count();
        let mut bboxes = vec![Aabb::empty(); triangle_count];
        let mut prim_indices = Vec::with_capacity(triangle_count);
        for (i, bbox) in bboxes.iter_mut().enumerate() {
            if let Some(corners) = mesh.triangle(i) {
                *bbox = Triangle::from_corners(corners).bounds();
                prim_indices.push(i as u32);
            }
        }

        let skipped = triangle_count - prim_indices.len();
        if skipped > 0 {
            log::debug!("[Bvh] Skipped {} triangles with invalid indices", skipped);
        }

        let mut bvh = Self {
            nodes: Vec::new(),
            prim_indices,
            mesh,
        };
        let count = bvh.prim_indices.len();
        if count > 0 {
            bvh.nodes.reserve(count.saturating_mul(2));
            bvh.build_node(&bboxes, 0, count, max_leaf_tris.clamp(1, 256));
        }
        bvh
    }

    /// Build from loose triangles
    pub fn from_triangles(triangles: &[Triangle], max_leaf_tris: usize) -> Self {
        let mut mesh = MeshData::with_capacity(triangles.len() * 3, triangles.len() * 3);
        for (i, t) in triangles.iter().enumerate() {
            for p in [t.a, t.b, t.c] {
                mesh.positions.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
            }
            let base = (i * 3) as u32;
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        Self::build(Arc::new(mesh), max_leaf_tris)
    }

    /// Mesh the index reads its triangles from
    pub fn mesh(&self) -> &Arc<MeshData> {
        &self.mesh
    }

    fn build_node(&mut self, bboxes: &[Aabb], start: usize, end: usize, leaf_size: usize) -> u32 {
        let node_index = self.nodes.len() as u32;
        let bbox = self.range_bbox(bboxes, start, end);
        self.nodes.push(BvhNode::leaf(bbox, 0, 0));

        let count = end - start;
        if count <= leaf_size {
            self.nodes[node_index as usize] = BvhNode::leaf(bbox, start as u32, count as u32);
            return node_index;
        }

        let axis = self.choose_split_axis(bboxes, start, end);
        let mid = start + count / 2;
        self.prim_indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
            let ca = bboxes[*a as usize].center()[axis];
            let cb = bboxes[*b as usize].center()[axis];
            ca.total_cmp(&cb)
        });

        let left = self.build_node(bboxes, start, mid, leaf_size);
        let right = self.build_node(bboxes, mid, end, leaf_size);
        self.nodes[node_index as usize] = BvhNode::inner(bbox, left, right);
        node_index
    }

    fn range_bbox(&self, bboxes: &[Aabb], start: usize, end: usize) -> Aabb {
        self.prim_indices[start..end]
            .iter()
            .fold(Aabb::empty(), |acc, &idx| acc.union(&bboxes[idx as usize]))
    }

    /// Axis with the largest centroid extent
    fn choose_split_axis(&self, bboxes: &[Aabb], start: usize, end: usize) -> usize {
        let mut extent = Aabb::empty();
        for &idx in &self.prim_indices[start..end] {
            extent.grow(&bboxes[idx as usize].center());
        }
        let size = extent.max - extent.min;

        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Node count (for diagnostics)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl SpatialIndex for MeshBvh {
    fn shapecast(&self, visitor: &mut dyn TriangleVisitor) {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = vec![0u32];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx as usize];
            if !visitor.intersects_bounds(&node.bbox) {
                continue;
            }

            if node.is_leaf() {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &prim in &self.prim_indices[start..end] {
                    if let Some(corners) = self.mesh.triangle(prim as usize) {
                        visitor.visit_triangle(&Triangle::from_corners(corners));
                    }
                }
                continue;
            }

            // Right first so the left subtree is visited first
            stack.push(node.right);
            stack.push(node.left);
        }
    }

    fn triangle_count(&self) -> usize {
        self.prim_indices.len()
    }

    fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|root| root.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;
    use nalgebra::{Point3, Vector3};

    /// Strip of unit triangles marching along +x
    fn strip(n: usize) -> Vec<Triangle> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                Triangle::new(
                    Point3::new(x, 0.0, 0.0),
                    Point3::new(x + 1.0, 0.0, 0.0),
                    Point3::new(x, 1.0, 0.0),
                )
            })
            .collect()
    }

    struct PlaneCounter {
        plane: Plane,
        boxes: usize,
        triangles: Vec<Triangle>,
    }

    impl TriangleVisitor for PlaneCounter {
        fn intersects_bounds(&mut self, bounds: &Aabb) -> bool {
            self.boxes += 1;
            self.plane.intersects_box(bounds)
        }

        fn visit_triangle(&mut self, triangle: &Triangle) {
            self.triangles.push(*triangle);
        }
    }

    #[test]
    fn test_empty_mesh_visits_nothing() {
        let bvh = MeshBvh::build(Arc::default(), 3);
        let mut visitor = PlaneCounter {
            plane: Plane::new(Vector3::x(), 0.0),
            boxes: 0,
            triangles: Vec::new(),
        };
        bvh.shapecast(&mut visitor);
        assert_eq!(visitor.boxes, 0);
        assert!(visitor.triangles.is_empty());
        assert!(bvh.bounds().is_none());
    }

    #[test]
    fn test_leaves_respect_max_size() {
        let bvh = MeshBvh::from_triangles(&strip(10), 3);
        assert_eq!(bvh.triangle_count(), 10);
        for node in &bvh.nodes {
            assert!(!node.is_leaf() || node.count <= 3);
        }
        let leaf_total: u32 = bvh.nodes.iter().filter(|n| n.is_leaf()).map(|n| n.count).sum();
        assert_eq!(leaf_total, 10);
    }

    #[test]
    fn test_plane_prunes_far_triangles() {
        let bvh = MeshBvh::from_triangles(&strip(64), 3);
        // x = 10.5 only touches triangle 10 (and the bounds of 9 and 11 do not reach it)
        let mut visitor = PlaneCounter {
            plane: Plane::new(Vector3::x(), -10.5),
            boxes: 0,
            triangles: Vec::new(),
        };
        bvh.shapecast(&mut visitor);

        assert!(visitor.triangles.len() < 64);
        assert!(visitor
            .triangles
            .iter()
            .any(|t| t.a == Point3::new(10.0, 0.0, 0.0)));
        assert!(visitor.boxes < bvh.node_count());
    }

    #[test]
    fn test_accepting_visitor_sees_every_triangle() {
        struct All(usize);
        impl TriangleVisitor for All {
            fn intersects_bounds(&mut self, _bounds: &Aabb) -> bool {
                true
            }
            fn visit_triangle(&mut self, _triangle: &Triangle) {
                self.0 += 1;
            }
        }

        let bvh = MeshBvh::from_triangles(&strip(33), 1);
        let mut all = All(0);
        bvh.shapecast(&mut all);
        assert_eq!(all.0, 33);
    }

    #[test]
    fn test_build_skips_bad_indices() {
        let mesh = MeshData {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: Vec::new(),
            indices: vec![0, 1, 2, 0, 1, 9],
        };
        let bvh = MeshBvh::build(Arc::new(mesh), 3);
        assert_eq!(bvh.triangle_count(), 1);
        let bounds = bvh.bounds().unwrap();
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_shares_subset_mesh() {
        let mesh = Arc::new(MeshData {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
        });
        let bvh = MeshBvh::build(Arc::clone(&mesh), 3);
        assert!(Arc::ptr_eq(bvh.mesh(), &mesh));
        assert_eq!(Arc::strong_count(&mesh), 2);

        let mut visitor = PlaneCounter {
            plane: Plane::new(Vector3::x(), -0.5),
            boxes: 0,
            triangles: Vec::new(),
        };
        bvh.shapecast(&mut visitor);
        assert_eq!(visitor.triangles, [Triangle::from_corners([[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])]);
    }
}
