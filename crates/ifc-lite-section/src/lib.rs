// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Lite Section Edges
//!
//! Generates the line segments where a clipping plane cuts through the
//! triangle meshes of an IFC model, so a section view can outline cut
//! walls, slabs and openings.
//!
//! ## Overview
//!
//! - **Intersection**: Plane vs triangle edge crossings
//! - **Edge Buffer**: Fixed-capacity vertex buffer rewritten every pass
//! - **Styles**: Category filters with their own subset, BVH and stroke
//! - **Coordinator**: Recomputes every style's lines when the plane moves
//!
//! ## Architecture
//!
//! The crate talks to the model only through traits:
//!
//! - `ElementIndex` / `SubsetBuilder`: from ifc-lite-model, element lookup and subsets
//! - [`SectionModel`]: a model the coordinator can section
//! - [`SpatialIndex`]: triangle index with a pruning traversal ([`MeshBvh`] built in)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_lite_section::{ClippedEdges, EdgeConfig, Plane, Vector3};
//!
//! let mut edges = ClippedEdges::new(EdgeConfig::default())?;
//!
//! // Horizontal cut at 1.2m
//! let plane = Plane::new(Vector3::z(), -1.2);
//! let report = edges.update(&plane, &store);
//!
//! for style in edges.styles() {
//!     println!("{}: {:?}", style.name(), style.lines().draw_range());
//! }
//! ```

pub mod bvh;
pub mod config;
pub mod coordinator;
pub mod edge_buffer;
pub mod error;
pub mod intersection;
pub mod plane;
pub mod section;
pub mod style;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use bvh::{MeshBvh, SpatialIndex, TriangleVisitor};
pub use config::EdgeConfig;
pub use coordinator::{
    ClippedEdges, PassStats, SectionModel, SectionPass, StyleFailure, StyleOutcome, UpdateReport,
};
pub use edge_buffer::EdgeBuffer;
pub use error::{Error, Result};
pub use intersection::{intersect_triangle, segment_intersection, EdgeCrossings};
pub use plane::{matrix_from_column_major, Aabb, Plane, Triangle};
pub use section::{SectionAxis, SectionPlane};
pub use style::{EdgeLines, EdgeStyle, SceneNodeId, StrokeStyle, StyleRegistry, StyleSpec};
