// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clipped edge coordinator
//!
//! On every plane change [`ClippedEdges::update`] regenerates the section
//! lines of each registered style:
//!
//! 1. Registers the default styles if the model has none yet
//! 2. Moves the world plane into each subset's local space
//! 3. Walks the subset BVH, pruning nodes the plane misses
//! 4. Streams two-point crossings into the style's [`EdgeBuffer`]
//! 5. Publishes the draw range and normal offset on the style's [`EdgeLines`]
//!
//! Failures are scoped to a style and collected in the [`UpdateReport`].

use crate::bvh::TriangleVisitor;
use crate::config::EdgeConfig;
use crate::edge_buffer::EdgeBuffer;
use crate::error::{Error, Result};
use crate::intersection::intersect_triangle;
use crate::plane::{Aabb, Plane, Triangle};
use crate::section::SectionPlane;
use crate::style::{EdgeStyle, SceneNodeId, StyleRegistry, StyleSpec};
use ifc_lite_model::{ElementIndex, ElementStore, SubsetBuilder};

/// A loaded model the coordinator can section
pub trait SectionModel: ElementIndex + SubsetBuilder {
    /// Scene node the section lines are parented under
    fn scene_node(&self) -> SceneNodeId {
        SceneNodeId::from(self.model_id())
    }
}

impl SectionModel for ElementStore {}

/// Counters of one section pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Triangles in BVH leaves the plane reached
    pub triangles_tested: usize,
    /// Segments written to the buffer
    pub segments: usize,
    /// Segments lost because the buffer was full
    pub dropped_segments: usize,
    /// Triangles with non-finite vertices or an odd crossing count
    pub rejected_triangles: usize,
}

/// Visitor that writes plane/triangle segments into an edge buffer
///
/// The plane must be in the same space as the visited triangles. Only
/// crossings that form a full segment are kept; anything else written for a
/// triangle is retracted before the next one.
pub struct SectionPass<'a> {
    plane: Plane,
    buffer: &'a mut EdgeBuffer,
    stats: PassStats,
}

impl<'a> SectionPass<'a> {
    pub fn new(plane: Plane, buffer: &'a mut EdgeBuffer) -> Self {
        Self {
            plane,
            buffer,
            stats: PassStats::default(),
        }
    }

    /// Finish the pass and return its counters
    pub fn finish(self) -> PassStats {
        self.stats
    }
}

impl TriangleVisitor for SectionPass<'_> {
    #[inline]
    fn intersects_bounds(&mut self, bounds: &Aabb) -> bool {
        self.plane.intersects_box(bounds)
    }

    fn visit_triangle(&mut self, triangle: &Triangle) {
        self.stats.triangles_tested += 1;

        let crossings = intersect_triangle(&self.plane, triangle);
        if crossings.count() == 0 && !crossings.is_degenerate() {
            return;
        }

        let mut written = 0;
        for point in crossings.points() {
            if self.buffer.append(point) {
                written += 1;
            }
        }

        if !crossings.is_segment() {
            self.buffer.retract(written);
            self.stats.rejected_triangles += 1;
        } else if written < 2 {
            // Never leave half a segment behind
            self.buffer.retract(written);
            self.stats.dropped_segments += 1;
        } else {
            self.stats.segments += 1;
        }
    }
}

/// Result of one style's pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleOutcome {
    pub style: String,
    pub triangles_tested: usize,
    pub segments: usize,
    pub dropped_segments: usize,
}

impl StyleOutcome {
    /// True when the buffer could not hold every segment
    pub fn overflowed(&self) -> bool {
        self.dropped_segments > 0
    }
}

/// A style that produced no lines this update
#[derive(Debug)]
pub struct StyleFailure {
    pub style: String,
    pub error: Error,
}

/// Per-style results of [`ClippedEdges::update`]
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Styles that ran, in registration order
    pub outcomes: Vec<StyleOutcome>,
    /// Styles that failed to register or to run
    pub failures: Vec<StyleFailure>,
}

impl UpdateReport {
    /// No failures and no overflow
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.outcomes.iter().any(StyleOutcome::overflowed)
    }

    pub fn outcome(&self, style: &str) -> Option<&StyleOutcome> {
        self.outcomes.iter().find(|o| o.style == style)
    }

    pub fn failure(&self, style: &str) -> Option<&StyleFailure> {
        self.failures.iter().find(|f| f.style == style)
    }

    /// Segments written across all styles
    pub fn total_segments(&self) -> usize {
        self.outcomes.iter().map(|o| o.segments).sum()
    }

    /// Turn the first failure into an error
    pub fn into_result(mut self) -> Result<Vec<StyleOutcome>> {
        if self.failures.is_empty() {
            Ok(self.outcomes)
        } else {
            Err(self.failures.swap_remove(0).error)
        }
    }
}

/// Section edge generator for one viewer
#[derive(Debug, Default)]
pub struct ClippedEdges {
    config: EdgeConfig,
    registry: StyleRegistry,
}

impl ClippedEdges {
    /// Create a generator with a validated configuration
    pub fn new(config: EdgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: StyleRegistry::new(),
        })
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Registered styles in registration order
    pub fn styles(&self) -> impl Iterator<Item = &EdgeStyle> {
        self.registry.iter()
    }

    pub fn style(&self, name: &str) -> Option<&EdgeStyle> {
        self.registry.get(name)
    }

    /// Register a custom style for `model`
    ///
    /// Registering while no style exists suppresses the default styles.
    pub fn ensure_style<M>(&mut self, model: &M, spec: &StyleSpec) -> Result<&mut EdgeStyle>
    where
        M: SectionModel + ?Sized,
    {
        self.registry.ensure_style(model, spec, &self.config)
    }

    /// Drop every style (model unloaded)
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Regenerate section lines for `plane` (world space)
    pub fn update<M>(&mut self, plane: &Plane, model: &M) -> UpdateReport
    where
        M: SectionModel + ?Sized,
    {
        let mut report = UpdateReport::default();

        self.registry.bind_model(model.model_id());
        if self.registry.is_empty() {
            for spec in &self.config.default_styles {
                if let Err(error) = self.registry.ensure_style(model, spec, &self.config) {
                    log::warn!("[Edges] Skipping style '{}': {}", spec.name, error);
                    report.failures.push(StyleFailure {
                        style: spec.name.clone(),
                        error,
                    });
                }
            }
        }

        let node = model.scene_node();
        for style in self.registry.iter_mut() {
            match draw_edges(style, plane, node, &self.config) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    log::warn!("[Edges] Style '{}' not drawn: {}", style.name(), error);
                    report.failures.push(StyleFailure {
                        style: style.name().to_string(),
                        error,
                    });
                }
            }
        }

        log::trace!(
            "[Edges] Update: {} segments over {} styles",
            report.total_segments(),
            report.outcomes.len()
        );
        report
    }

    /// Regenerate lines for a viewer section plane over the given scene bounds
    ///
    /// Returns `None` without touching any style while the section is disabled.
    pub fn update_section<M>(
        &mut self,
        section: &SectionPlane,
        bounds: &Aabb,
        model: &M,
    ) -> Option<UpdateReport>
    where
        M: SectionModel + ?Sized,
    {
        if !section.enabled {
            return None;
        }
        let plane = section.plane_for_bounds(bounds);
        Some(self.update(&plane, model))
    }
}

fn draw_edges(
    style: &mut EdgeStyle,
    plane: &Plane,
    node: SceneNodeId,
    config: &EdgeConfig,
) -> Result<StyleOutcome> {
    let local = style
        .world_transform()
        .try_inverse()
        .and_then(|inverse| plane.apply_matrix(&inverse));

    let (index, buffer, lines) = style.pass_parts();
    buffer.reset();
    let Some(local) = local else {
        lines.set_draw_range(0..0);
        return Err(Error::singular_transform(style.name()));
    };

    let mut pass = SectionPass::new(local, buffer);
    index.shapecast(&mut pass);
    let stats = pass.finish();

    lines.set_draw_range(buffer.valid_range());
    lines.set_offset(plane.normal * config.line_offset);
    if lines.attach(node) {
        log::debug!("[Edges] Attached lines to scene node {}", node.0);
    }

    if stats.dropped_segments > 0 {
        log::warn!(
            "[Edges] Buffer full: dropped {} of {} segments (capacity {} vertices)",
            stats.dropped_segments,
            stats.segments + stats.dropped_segments,
            buffer.capacity()
        );
    }
    if stats.rejected_triangles > 0 {
        log::debug!(
            "[Edges] Ignored {} degenerate triangles",
            stats.rejected_triangles
        );
    }

    Ok(StyleOutcome {
        style: style.name().to_string(),
        triangles_tested: stats.triangles_tested,
        segments: stats.segments,
        dropped_segments: stats.dropped_segments,
    })
}
