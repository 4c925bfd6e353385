// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator traits
//!
//! These traits describe what geometry consumers (such as the section edge
//! generator) need from a loaded model, independent of the parser or viewer
//! backing it.

use crate::{EntityId, GeometrySubset, IfcType, ModelId, Result};

/// Lookup of element identifiers by IFC type
///
/// # Example
///
/// ```ignore
/// use ifc_lite_model::{ElementIndex, IfcType};
///
/// let walls = model.elements_of_type(&IfcType::IfcWall);
/// println!("{} has {} walls", model.model_id(), walls.len());
/// ```
pub trait ElementIndex: Send + Sync {
    /// Identifier of the model this index belongs to
    fn model_id(&self) -> ModelId;

    /// All elements whose type is exactly `ifc_type`
    ///
    /// Subtypes are not included: `IfcWall` does not return
    /// `IfcWallStandardCase` elements.
    fn elements_of_type(&self, ifc_type: &IfcType) -> Vec<EntityId>;

    /// All elements whose type is one of `types`, grouped in `types` order
    fn elements_of_types(&self, types: &[IfcType]) -> Vec<EntityId> {
        types
            .iter()
            .flat_map(|t| self.elements_of_type(t))
            .collect()
    }
}

/// Builder of geometry subsets
///
/// A subset is a merged, renderable slice of a model's geometry containing
/// only the requested elements.
pub trait SubsetBuilder: Send + Sync {
    /// Create (or replace) the subset keyed by `custom_id`
    ///
    /// # Arguments
    /// * `custom_id` - Key of the subset; creating the same key again replaces it
    /// * `ids` - Elements to include; an empty list yields an empty subset
    ///
    /// # Returns
    /// The merged subset, or an error if it could not be assembled
    fn create_subset(&self, custom_id: &str, ids: &[EntityId]) -> Result<GeometrySubset>;
}
