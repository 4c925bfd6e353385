// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Model - Shared types and collaborator traits
//!
//! This crate provides the abstractions geometry consumers use to talk to a
//! loaded IFC model without depending on a specific parser or viewer.
//!
//! # Architecture
//!
//! - [`ElementIndex`] - Lookup of element IDs by IFC type
//! - [`SubsetBuilder`] - Merged geometry subsets for a list of elements
//! - [`ElementStore`] - In-memory model implementing both traits
//!
//! # Example
//!
//! ```ignore
//! use ifc_lite_model::{ElementIndex, ElementStore, IfcType, ModelId, SubsetBuilder};
//!
//! let store: ElementStore = load_elements(ModelId(0));
//! let walls = store.elements_of_types(&[IfcType::IfcWall, IfcType::IfcWallStandardCase]);
//! let subset = store.create_subset("walls", &walls)?;
//! println!("{} triangles", subset.triangle_count());
//! ```

pub mod error;
pub mod geometry;
pub mod store;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use geometry::*;
pub use store::*;
pub use traits::*;
pub use types::*;
