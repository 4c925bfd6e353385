// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory element store
//!
//! Holds the processed geometry of a loaded model keyed by entity ID, with a
//! type index for category lookups. Implements [`ElementIndex`] and
//! [`SubsetBuilder`] so geometry consumers can run without a parser or
//! viewer behind them.

use crate::geometry::{matrix_from_column_major, IDENTITY_TRANSFORM};
use crate::{
    ElementIndex, EntityGeometry, EntityId, GeometrySubset, IfcType, MeshData, ModelError,
    ModelId, Result, SubsetBuilder,
};
use nalgebra::{Matrix3, Point3, Vector3};
use rustc_hash::FxHashMap;

/// One stored element
#[derive(Clone, Debug)]
struct StoredElement {
    ifc_type: IfcType,
    geometry: Option<EntityGeometry>,
}

/// In-memory model: elements, their types and geometry
#[derive(Clone, Debug)]
pub struct ElementStore {
    model_id: ModelId,
    /// Model-to-world transform applied to every subset (column-major)
    transform: [f32; 16],
    elements: FxHashMap<EntityId, StoredElement>,
    /// Type -> entity IDs index, in insertion order
    type_index: FxHashMap<IfcType, Vec<EntityId>>,
}

impl ElementStore {
    /// Create an empty store for a model
    pub fn new(model_id: ModelId) -> Self {
        Self {
            model_id,
            transform: IDENTITY_TRANSFORM,
            elements: FxHashMap::default(),
            type_index: FxHashMap::default(),
        }
    }

    /// Set the model-to-world transform
    pub fn with_transform(mut self, transform: [f32; 16]) -> Self {
        self.transform = transform;
        self
    }

    /// Model-to-world transform
    pub fn transform(&self) -> &[f32; 16] {
        &self.transform
    }

    /// Add an element with geometry
    ///
    /// Re-inserting an existing ID replaces its type and geometry.
    pub fn insert(&mut self, id: EntityId, ifc_type: IfcType, geometry: EntityGeometry) {
        self.insert_element(id, ifc_type, Some(geometry));
    }

    /// Add an element that carries no geometry (spaces, storeys, ...)
    pub fn insert_without_geometry(&mut self, id: EntityId, ifc_type: IfcType) {
        self.insert_element(id, ifc_type, None);
    }

    fn insert_element(&mut self, id: EntityId, ifc_type: IfcType, geometry: Option<EntityGeometry>) {
        if let Some(previous) = self.elements.remove(&id) {
            if let Some(ids) = self.type_index.get_mut(&previous.ifc_type) {
                ids.retain(|existing| *existing != id);
            }
        }
        self.type_index.entry(ifc_type.clone()).or_default().push(id);
        self.elements.insert(id, StoredElement { ifc_type, geometry });
    }

    /// Type of an element
    pub fn ifc_type(&self, id: EntityId) -> Option<&IfcType> {
        self.elements.get(&id).map(|e| &e.ifc_type)
    }

    /// Geometry of an element
    pub fn geometry(&self, id: EntityId) -> Option<&EntityGeometry> {
        self.elements.get(&id).and_then(|e| e.geometry.as_ref())
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementIndex for ElementStore {
    fn model_id(&self) -> ModelId {
        self.model_id
    }

    fn elements_of_type(&self, ifc_type: &IfcType) -> Vec<EntityId> {
        self.type_index.get(ifc_type).cloned().unwrap_or_default()
    }
}

impl SubsetBuilder for ElementStore {
    fn create_subset(&self, custom_id: &str, ids: &[EntityId]) -> Result<GeometrySubset> {
        let mut merged = MeshData::new();

        for &id in ids {
            let element = self
                .elements
                .get(&id)
                .ok_or(ModelError::EntityNotFound(id))?;

            // Elements without geometry contribute nothing
            let Some(geometry) = element.geometry.as_ref() else {
                continue;
            };
            append_transformed(&mut merged, &geometry.mesh, &geometry.transform)
                .map_err(|msg| ModelError::subset(custom_id, format!("{id}: {msg}")))?;
        }

        Ok(GeometrySubset::new(custom_id, merged, self.transform))
    }
}

/// Append `mesh` to `target`, baking the element transform into positions
/// and normals
fn append_transformed(
    target: &mut MeshData,
    mesh: &MeshData,
    transform: &[f32; 16],
) -> std::result::Result<(), String> {
    let vertex_count = mesh.vertex_count();
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(format!("index {bad} out of range ({vertex_count} vertices)"));
    }

    let matrix = matrix_from_column_major(transform);
    let linear: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    // Normals go through the inverse-transpose; a singular transform keeps the linear part
    let normal_matrix = linear.try_inverse().map(|m| m.transpose()).unwrap_or(linear);

    let offset = target.vertex_count() as u32;
    for p in mesh.positions.chunks_exact(3) {
        let q = matrix.transform_point(&Point3::new(p[0], p[1], p[2]));
        target.positions.extend_from_slice(&[q.x, q.y, q.z]);
    }
    if mesh.normals.len() == mesh.positions.len() {
        for n in mesh.normals.chunks_exact(3) {
            let normal = (normal_matrix * Vector3::new(n[0], n[1], n[2]))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            target
                .normals
                .extend_from_slice(&[normal.x, normal.y, normal.z]);
        }
    } else {
        // Keep normals aligned with positions
        target
            .normals
            .resize(target.positions.len(), 0.0);
    }
    target
        .indices
        .extend(mesh.indices.iter().map(|i| i + offset));
    Ok(())
}
