// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section edge configuration

use crate::bvh::MeshBvh;
use crate::error::{Error, Result};
use crate::style::StyleSpec;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Tunables for section edge generation
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides:
///
/// ```ignore
/// let config = EdgeConfig::from_json(r#"{ "max_segments": 250000 }"#)?;
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Segments each style's buffer can hold per pass
    pub max_segments: usize,
    /// Distance the lines are pushed along the plane normal
    pub line_offset: f64,
    /// Triangles per BVH leaf
    pub max_leaf_tris: usize,
    /// Styles registered on the first update of a model
    pub default_styles: Vec<StyleSpec>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            max_segments: 100_000,
            line_offset: 0.0001,
            max_leaf_tris: MeshBvh::DEFAULT_MAX_LEAF_TRIS,
            default_styles: vec![StyleSpec::thick(), StyleSpec::thin()],
        }
    }
}

impl EdgeConfig {
    /// Upper bound on `max_segments` (240 MB of f32 positions per style)
    pub const MAX_SEGMENTS: usize = 10_000_000;

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EdgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Vertex capacity of each style's edge buffer
    pub fn buffer_capacity(&self) -> usize {
        self.max_segments.saturating_mul(2)
    }

    /// Check value ranges and default style names
    pub fn validate(&self) -> Result<()> {
        if !(1..=Self::MAX_SEGMENTS).contains(&self.max_segments) {
            return Err(Error::config(format!(
                "max_segments must be within 1..={}, got {}",
                Self::MAX_SEGMENTS,
                self.max_segments
            )));
        }
        if !(1..=256).contains(&self.max_leaf_tris) {
            return Err(Error::config(format!(
                "max_leaf_tris must be within 1..=256, got {}",
                self.max_leaf_tris
            )));
        }
        if !self.line_offset.is_finite() {
            return Err(Error::config("line_offset must be finite"));
        }

        let mut names = FxHashSet::default();
        for style in &self.default_styles {
            if style.name.is_empty() {
                return Err(Error::config("style names must not be empty"));
            }
            if !names.insert(style.name.as_str()) {
                return Err(Error::config(format!("duplicate style '{}'", style.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_model::IfcType;

    #[test]
    fn test_defaults() {
        let config = EdgeConfig::default();
        assert_eq!(config.buffer_capacity(), 200_000);
        assert_eq!(config.max_leaf_tris, 3);
        let names: Vec<_> = config.default_styles.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["thick", "thin"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EdgeConfig::from_json(r#"{ "max_segments": 10 }"#).unwrap();
        assert_eq!(config.buffer_capacity(), 20);
        assert_eq!(config.line_offset, 0.0001);
        assert_eq!(config.default_styles.len(), 2);
    }

    #[test]
    fn test_json_styles() {
        let json = r#"{
            "default_styles": [
                { "name": "cut", "categories": ["IFC_COLUMN", "IFC_BEAM"],
                  "stroke": { "color": [1.0, 0.0, 0.0, 1.0], "line_width": 0.002 } },
                { "name": "hair", "categories": ["IFC_RAILING"] }
            ]
        }"#;
        let config = EdgeConfig::from_json(json).unwrap();
        assert_eq!(config.default_styles[0].categories, [IfcType::IfcColumn, IfcType::IfcBeam]);
        assert_eq!(config.default_styles[1].stroke.line_width, 0.001);
    }

    #[test]
    fn test_round_trip_json() {
        let config = EdgeConfig::default();
        let back = EdgeConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(EdgeConfig::from_json(r#"{ "max_segments": 0 }"#).is_err());
        assert!(EdgeConfig::from_json(r#"{ "max_leaf_tris": 0 }"#).is_err());
        assert!(EdgeConfig::from_json("not json").is_err());

        let mut config = EdgeConfig::default();
        config.default_styles.push(StyleSpec::thick());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_max_segments_upper_bound() {
        let huge = EdgeConfig::from_json(r#"{ "max_segments": 18446744073709551615 }"#);
        assert!(matches!(huge, Err(Error::Config(_))));

        let mut config = EdgeConfig {
            max_segments: EdgeConfig::MAX_SEGMENTS,
            ..EdgeConfig::default()
        };
        assert!(config.validate().is_ok());
        config.max_segments += 1;
        assert!(config.validate().is_err());

        config.max_segments = usize::MAX;
        assert_eq!(config.buffer_capacity(), usize::MAX);
    }
}
