// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared between the model and section crates
//!
//! Identifiers, the IFC element type enumeration used for category filters,
//! and flattened mesh data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw IFC entity ID (e.g., #123 becomes EntityId(123))
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Identifier of a loaded model
///
/// The viewer can hold several models; styles and subsets are bound to one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {}", self.0)
    }
}

impl From<u32> for ModelId {
    fn from(id: u32) -> Self {
        ModelId(id)
    }
}

/// IFC entity type enumeration
///
/// Covers the spatial structure and the building elements that carry
/// geometry. Unknown types are captured with their original string
/// representation.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfcType {
    // ========================================================================
    // Spatial Structure
    // ========================================================================
    IfcProject,
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,
    IfcSpace,

    // ========================================================================
    // Building Elements
    // ========================================================================
    IfcWall,
    IfcWallStandardCase,
    IfcCurtainWall,
    IfcSlab,
    IfcRoof,
    IfcBeam,
    IfcColumn,
    IfcDoor,
    IfcWindow,
    IfcStair,
    IfcStairFlight,
    IfcRamp,
    IfcRampFlight,
    IfcRailing,
    IfcCovering,
    IfcPlate,
    IfcMember,
    IfcFooting,
    IfcPile,
    IfcBuildingElementProxy,

    // ========================================================================
    // Furnishing and Distribution
    // ========================================================================
    IfcFurnishingElement,
    IfcFurniture,
    IfcDistributionElement,
    IfcFlowTerminal,
    IfcFlowSegment,
    IfcFlowFitting,

    // ========================================================================
    // Openings
    // ========================================================================
    IfcOpeningElement,

    /// Unknown type with original name
    Unknown(String),
}

impl FromStr for IfcType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(IfcType::parse(s))
    }
}

impl IfcType {
    /// Parse type name from an IFC string (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "IFCPROJECT" => IfcType::IfcProject,
            "IFCSITE" => IfcType::IfcSite,
            "IFCBUILDING" => IfcType::IfcBuilding,
            "IFCBUILDINGSTOREY" => IfcType::IfcBuildingStorey,
            "IFCSPACE" => IfcType::IfcSpace,

            "IFCWALL" => IfcType::IfcWall,
            "IFCWALLSTANDARDCASE" => IfcType::IfcWallStandardCase,
            "IFCCURTAINWALL" => IfcType::IfcCurtainWall,
            "IFCSLAB" => IfcType::IfcSlab,
            "IFCROOF" => IfcType::IfcRoof,
            "IFCBEAM" => IfcType::IfcBeam,
            "IFCCOLUMN" => IfcType::IfcColumn,
            "IFCDOOR" => IfcType::IfcDoor,
            "IFCWINDOW" => IfcType::IfcWindow,
            "IFCSTAIR" => IfcType::IfcStair,
            "IFCSTAIRFLIGHT" => IfcType::IfcStairFlight,
            "IFCRAMP" => IfcType::IfcRamp,
            "IFCRAMPFLIGHT" => IfcType::IfcRampFlight,
            "IFCRAILING" => IfcType::IfcRailing,
            "IFCCOVERING" => IfcType::IfcCovering,
            "IFCPLATE" => IfcType::IfcPlate,
            "IFCMEMBER" => IfcType::IfcMember,
            "IFCFOOTING" => IfcType::IfcFooting,
            "IFCPILE" => IfcType::IfcPile,
            "IFCBUILDINGELEMENTPROXY" => IfcType::IfcBuildingElementProxy,

            "IFCFURNISHINGELEMENT" => IfcType::IfcFurnishingElement,
            "IFCFURNITURE" => IfcType::IfcFurniture,
            "IFCDISTRIBUTIONELEMENT" => IfcType::IfcDistributionElement,
            "IFCFLOWTERMINAL" => IfcType::IfcFlowTerminal,
            "IFCFLOWSEGMENT" => IfcType::IfcFlowSegment,
            "IFCFLOWFITTING" => IfcType::IfcFlowFitting,

            "IFCOPENINGELEMENT" => IfcType::IfcOpeningElement,

            // Unknown
            _ => IfcType::Unknown(s.to_string()),
        }
    }

    /// Get the type name as it appears in a STEP file
    pub fn name(&self) -> &str {
        match self {
            IfcType::Unknown(s) => s,
            IfcType::IfcProject => "IFCPROJECT",
            IfcType::IfcSite => "IFCSITE",
            IfcType::IfcBuilding => "IFCBUILDING",
            IfcType::IfcBuildingStorey => "IFCBUILDINGSTOREY",
            IfcType::IfcSpace => "IFCSPACE",
            IfcType::IfcWall => "IFCWALL",
            IfcType::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            IfcType::IfcCurtainWall => "IFCCURTAINWALL",
            IfcType::IfcSlab => "IFCSLAB",
            IfcType::IfcRoof => "IFCROOF",
            IfcType::IfcBeam => "IFCBEAM",
            IfcType::IfcColumn => "IFCCOLUMN",
            IfcType::IfcDoor => "IFCDOOR",
            IfcType::IfcWindow => "IFCWINDOW",
            IfcType::IfcStair => "IFCSTAIR",
            IfcType::IfcStairFlight => "IFCSTAIRFLIGHT",
            IfcType::IfcRamp => "IFCRAMP",
            IfcType::IfcRampFlight => "IFCRAMPFLIGHT",
            IfcType::IfcRailing => "IFCRAILING",
            IfcType::IfcCovering => "IFCCOVERING",
            IfcType::IfcPlate => "IFCPLATE",
            IfcType::IfcMember => "IFCMEMBER",
            IfcType::IfcFooting => "IFCFOOTING",
            IfcType::IfcPile => "IFCPILE",
            IfcType::IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
            IfcType::IfcFurnishingElement => "IFCFURNISHINGELEMENT",
            IfcType::IfcFurniture => "IFCFURNITURE",
            IfcType::IfcDistributionElement => "IFCDISTRIBUTIONELEMENT",
            IfcType::IfcFlowTerminal => "IFCFLOWTERMINAL",
            IfcType::IfcFlowSegment => "IFCFLOWSEGMENT",
            IfcType::IfcFlowFitting => "IFCFLOWFITTING",
            IfcType::IfcOpeningElement => "IFCOPENINGELEMENT",
        }
    }

    /// Check if this type represents a building element with potential geometry
    pub fn has_geometry(&self) -> bool {
        !self.is_spatial() && !matches!(self, IfcType::Unknown(_))
    }

    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcType::IfcProject
                | IfcType::IfcSite
                | IfcType::IfcBuilding
                | IfcType::IfcBuildingStorey
                | IfcType::IfcSpace
        )
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// GPU-ready mesh data
///
/// Contains flattened vertex data suitable for GPU rendering.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions as flattened [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals as flattened [nx, ny, nz, nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mesh with pre-allocated capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `index`, if in range
    #[inline]
    pub fn position(&self, index: usize) -> Option<[f32; 3]> {
        let base = index * 3;
        self.positions
            .get(base..base + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Corner positions of triangle `index`, if all of its indices are valid
    pub fn triangle(&self, index: usize) -> Option<[[f32; 3]; 3]> {
        let base = index * 3;
        let tri = self.indices.get(base..base + 3)?;
        Some([
            self.position(tri[0] as usize)?,
            self.position(tri[1] as usize)?,
            self.position(tri[2] as usize)?,
        ])
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &MeshData) {
        let vertex_offset = self.vertex_count() as u32;

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|i| i + vertex_offset));
    }
}
