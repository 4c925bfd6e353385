// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer section plane state
//!
//! Axis-aligned section controlled by a normalized position within the
//! scene bounds. Serializes to the same shape the viewer persists.

use crate::plane::{Aabb, Plane};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Section plane axis
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionAxis {
    X,
    #[default]
    Y,
    Z,
}

impl SectionAxis {
    /// Get plane normal vector
    pub fn normal(&self, flipped: bool) -> Vector3<f64> {
        let base = Vector3::ith(self.index(), 1.0);
        if flipped {
            -base
        } else {
            base
        }
    }

    /// Parse from string (case-insensitive), `None` for anything but x, y or z
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "x" => Some(SectionAxis::X),
            "y" => Some(SectionAxis::Y),
            "z" => Some(SectionAxis::Z),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionAxis::X => "x",
            SectionAxis::Y => "y",
            SectionAxis::Z => "z",
        }
    }

    fn index(&self) -> usize {
        match self {
            SectionAxis::X => 0,
            SectionAxis::Y => 1,
            SectionAxis::Z => 2,
        }
    }
}

/// Section plane state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionPlane {
    /// Whether section plane is enabled
    pub enabled: bool,
    /// Section axis
    pub axis: SectionAxis,
    /// Position along axis (0.0 to 1.0 of scene bounds)
    pub position: f64,
    /// Whether plane normal is flipped
    pub flipped: bool,
}

impl Default for SectionPlane {
    fn default() -> Self {
        Self {
            enabled: false,
            axis: SectionAxis::Y,
            position: 0.5,
            flipped: false,
        }
    }
}

impl SectionPlane {
    /// Set axis
    pub fn set_axis(&mut self, axis: SectionAxis) {
        self.axis = axis;
    }

    /// Set position (0.0 to 1.0)
    pub fn set_position(&mut self, position: f64) {
        self.position = position.clamp(0.0, 1.0);
    }

    /// Toggle flip
    pub fn toggle_flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Toggle enabled
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// World plane for the given scene bounds
    pub fn plane_for_bounds(&self, bounds: &Aabb) -> Plane {
        let axis = self.axis.index();
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        let mut point = Point3::origin();
        point[axis] = lo + (hi - lo) * self.position;
        Plane::from_normal_and_point(self.axis.normal(self.flipped), point)
    }
}
