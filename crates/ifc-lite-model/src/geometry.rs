// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element geometry and geometry subsets

use crate::MeshData;
use nalgebra::Matrix4;
use std::sync::Arc;

/// Column-major 4x4 identity matrix
pub const IDENTITY_TRANSFORM: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Entity geometry with mesh, color, and transform
#[derive(Clone, Debug)]
pub struct EntityGeometry {
    /// Processed mesh data (shared via Arc)
    pub mesh: Arc<MeshData>,
    /// RGBA color [r, g, b, a] where values are 0.0-1.0
    pub color: [f32; 4],
    /// 4x4 transformation matrix (column-major order)
    pub transform: [f32; 16],
}

impl EntityGeometry {
    /// Create new entity geometry
    pub fn new(mesh: Arc<MeshData>, color: [f32; 4], transform: [f32; 16]) -> Self {
        Self {
            mesh,
            color,
            transform,
        }
    }

    /// Create geometry with identity transform
    pub fn with_identity_transform(mesh: Arc<MeshData>, color: [f32; 4]) -> Self {
        Self::new(mesh, color, IDENTITY_TRANSFORM)
    }

    /// Check if geometry is empty
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Element transform as a matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        matrix_from_column_major(&self.transform)
    }
}

impl Default for EntityGeometry {
    fn default() -> Self {
        Self {
            mesh: Arc::new(MeshData::default()),
            color: [0.8, 0.8, 0.8, 1.0], // Light gray default
            transform: IDENTITY_TRANSFORM,
        }
    }
}

/// Filtered slice of a model's geometry
///
/// Holds the merged triangles of the selected elements, expressed in the
/// subset's local space, together with the subset's world transform.
#[derive(Clone, Debug)]
pub struct GeometrySubset {
    /// Caller-chosen key (style name for section edges)
    pub custom_id: String,
    /// Merged mesh of all selected elements
    pub mesh: Arc<MeshData>,
    /// Local-to-world transform (column-major order)
    pub transform: [f32; 16],
}

impl GeometrySubset {
    /// Create a subset from a merged mesh
    pub fn new(custom_id: impl Into<String>, mesh: MeshData, transform: [f32; 16]) -> Self {
        Self {
            custom_id: custom_id.into(),
            mesh: Arc::new(mesh),
            transform,
        }
    }

    /// Create an empty subset (no elements matched)
    pub fn empty(custom_id: impl Into<String>) -> Self {
        Self::new(custom_id, MeshData::new(), IDENTITY_TRANSFORM)
    }

    /// Check if subset holds no triangles
    pub fn is_empty(&self) -> bool {
        self.mesh.triangle_count() == 0
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Matrix from a column-major 4x4 array
#[inline]
pub fn matrix_from_column_major(m: &[f32; 16]) -> Matrix4<f32> {
    Matrix4::from_column_slice(m)
}
