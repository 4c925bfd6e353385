// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge styles and the per-model style registry
//!
//! A style groups IFC categories that share one stroke appearance. Each
//! registered style owns a geometry subset of the matching elements, a
//! spatial index over it, the reusable [`EdgeBuffer`] and the [`EdgeLines`]
//! render object the renderer draws.

use crate::bvh::{MeshBvh, SpatialIndex};
use crate::config::EdgeConfig;
use crate::edge_buffer::EdgeBuffer;
use crate::error::{Error, Result};
use crate::plane::matrix_from_column_major;
use ifc_lite_model::{ElementIndex, GeometrySubset, IfcType, ModelId, SubsetBuilder};
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Stroke appearance of section lines
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// RGBA color [r, g, b, a] where values are 0.0-1.0
    pub color: [f32; 4],
    /// Line width in screen-relative units
    pub line_width: f32,
}

impl StrokeStyle {
    /// Create a stroke
    pub fn new(color: [f32; 4], line_width: f32) -> Self {
        Self { color, line_width }
    }

    /// Create an opaque stroke from a 0xRRGGBB color
    pub fn from_hex(rgb: u32, line_width: f32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::new([channel(16), channel(8), channel(0), 1.0], line_width)
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], 0.001)
    }
}

/// Definition of a style: name, category filter and stroke
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Unique key
    pub name: String,
    /// IFC types the style applies to
    pub categories: Vec<IfcType>,
    #[serde(default)]
    pub stroke: StrokeStyle,
}

impl StyleSpec {
    /// Create a style definition
    pub fn new(name: impl Into<String>, categories: Vec<IfcType>, stroke: StrokeStyle) -> Self {
        Self {
            name: name.into(),
            categories,
            stroke,
        }
    }

    /// Heavy black lines for walls and slabs
    pub fn thick() -> Self {
        Self::new(
            "thick",
            vec![
                IfcType::IfcWallStandardCase,
                IfcType::IfcWall,
                IfcType::IfcSlab,
            ],
            StrokeStyle::from_hex(0x000000, 0.0015),
        )
    }

    /// Light gray lines for openings and secondary members
    pub fn thin() -> Self {
        Self::new(
            "thin",
            vec![
                IfcType::IfcWindow,
                IfcType::IfcPlate,
                IfcType::IfcMember,
                IfcType::IfcDoor,
            ],
            StrokeStyle::from_hex(0x333333, 0.001),
        )
    }
}

/// Handle of a node in the viewer's scene graph
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct SceneNodeId(pub u32);

impl From<ModelId> for SceneNodeId {
    fn from(id: ModelId) -> Self {
        SceneNodeId(id.0)
    }
}

/// Render object for one style's section lines
#[derive(Clone, Debug)]
pub struct EdgeLines {
    stroke: StrokeStyle,
    /// Vertex range of the edge buffer to draw
    draw_range: Range<usize>,
    /// Translation applied when drawing (along the plane normal)
    offset: Vector3<f64>,
    parent: Option<SceneNodeId>,
}

impl EdgeLines {
    /// Lines draw after opaque geometry and fills
    pub const RENDER_ORDER: i32 = 3;
    /// Depth bias pulling the lines towards the camera
    pub const POLYGON_OFFSET_FACTOR: f32 = -2.0;
    pub const POLYGON_OFFSET_UNITS: f32 = 1.0;

    /// Create an unattached, empty line object
    pub fn new(stroke: StrokeStyle) -> Self {
        Self {
            stroke,
            draw_range: 0..0,
            offset: Vector3::zeros(),
            parent: None,
        }
    }

    pub fn stroke(&self) -> &StrokeStyle {
        &self.stroke
    }

    pub fn draw_range(&self) -> Range<usize> {
        self.draw_range.clone()
    }

    pub fn set_draw_range(&mut self, range: Range<usize>) {
        self.draw_range = range;
    }

    pub fn offset(&self) -> Vector3<f64> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vector3<f64>) {
        self.offset = offset;
    }

    /// Scene node the lines are parented under
    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    /// Parent the lines under `node`
    ///
    /// Returns `true` if the parent changed.
    pub fn attach(&mut self, node: SceneNodeId) -> bool {
        if self.parent == Some(node) {
            return false;
        }
        self.parent = Some(node);
        true
    }

    /// Remove the lines from the scene
    pub fn detach(&mut self) {
        self.parent = None;
    }
}

/// A registered style with its subset, index and line buffers
pub struct EdgeStyle {
    name: String,
    model_id: ModelId,
    categories: Vec<IfcType>,
    subset: GeometrySubset,
    /// Subset local-to-world transform
    world: Matrix4<f64>,
    index: Box<dyn SpatialIndex>,
    buffer: EdgeBuffer,
    lines: EdgeLines,
}

impl EdgeStyle {
    fn build<M>(model: &M, spec: &StyleSpec, config: &EdgeConfig) -> Result<Self>
    where
        M: ElementIndex + SubsetBuilder + ?Sized,
    {
        let ids = model.elements_of_types(&spec.categories);
        let subset = model
            .create_subset(&spec.name, &ids)
            .map_err(|err| Error::subset_creation(&spec.name, err))?;

        let index = MeshBvh::build(Arc::clone(&subset.mesh), config.max_leaf_tris);
        log::debug!(
            "[Edges] Style '{}': {} elements, {} triangles, {} BVH nodes",
            spec.name,
            ids.len(),
            index.triangle_count(),
            index.node_count()
        );

        Ok(Self {
            name: spec.name.clone(),
            model_id: model.model_id(),
            categories: spec.categories.clone(),
            world: matrix_from_column_major(&subset.transform),
            subset,
            index: Box::new(index),
            buffer: EdgeBuffer::new(config.buffer_capacity()),
            lines: EdgeLines::new(spec.stroke.clone()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_id(&self) -> ModelId {
        self.model_id
    }

    pub fn categories(&self) -> &[IfcType] {
        &self.categories
    }

    pub fn subset(&self) -> &GeometrySubset {
        &self.subset
    }

    /// Subset local-to-world transform
    pub fn world_transform(&self) -> &Matrix4<f64> {
        &self.world
    }

    pub fn index(&self) -> &dyn SpatialIndex {
        self.index.as_ref()
    }

    /// Replace the spatial index (e.g. with one built by the viewer)
    pub fn set_index(&mut self, index: Box<dyn SpatialIndex>) {
        self.index = index;
    }

    pub fn buffer(&self) -> &EdgeBuffer {
        &self.buffer
    }

    pub fn lines(&self) -> &EdgeLines {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut EdgeLines {
        &mut self.lines
    }

    /// Section segments of the last pass, in subset local coordinates
    pub fn segments(&self) -> impl Iterator<Item = [Point3<f32>; 2]> + '_ {
        self.buffer.segments()
    }

    /// Split borrows used by a section pass
    pub(crate) fn pass_parts(&mut self) -> (&dyn SpatialIndex, &mut EdgeBuffer, &mut EdgeLines) {
        (self.index.as_ref(), &mut self.buffer, &mut self.lines)
    }
}

impl fmt::Debug for EdgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeStyle")
            .field("name", &self.name)
            .field("model_id", &self.model_id)
            .field("categories", &self.categories)
            .field("triangles", &self.index.triangle_count())
            .field("vertices", &self.buffer.len())
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

/// Styles registered for the current model, in registration order
#[derive(Debug, Default)]
pub struct StyleRegistry {
    model_id: Option<ModelId>,
    styles: Vec<EdgeStyle>,
    by_name: FxHashMap<String, usize>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style named `spec.name`, building it on first use
    ///
    /// Styles belong to one model: asking on behalf of another model clears
    /// the registry first. A category filter that matches nothing yields a
    /// style with an empty subset. If the subset cannot be built nothing is
    /// registered.
    pub fn ensure_style<M>(
        &mut self,
        model: &M,
        spec: &StyleSpec,
        config: &EdgeConfig,
    ) -> Result<&mut EdgeStyle>
    where
        M: ElementIndex + SubsetBuilder + ?Sized,
    {
        self.bind_model(model.model_id());

        if let Some(&index) = self.by_name.get(&spec.name) {
            return Ok(&mut self.styles[index]);
        }

        let style = EdgeStyle::build(model, spec, config)?;
        let index = self.styles.len();
        self.by_name.insert(spec.name.clone(), index);
        self.styles.push(style);
        Ok(&mut self.styles[index])
    }

    /// Bind the registry to `model_id`, dropping styles of any other model
    pub fn bind_model(&mut self, model_id: ModelId) {
        if self.model_id == Some(model_id) {
            return;
        }
        if !self.styles.is_empty() {
            log::info!(
                "[Edges] Model changed to {}, dropping {} styles",
                model_id,
                self.styles.len()
            );
        }
        self.clear();
        self.model_id = Some(model_id);
    }

    /// Drop every style
    pub fn clear(&mut self) {
        self.styles.clear();
        self.by_name.clear();
        self.model_id = None;
    }

    /// Model the registered styles belong to
    pub fn model_id(&self) -> Option<ModelId> {
        self.model_id
    }

    pub fn get(&self, name: &str) -> Option<&EdgeStyle> {
        self.by_name.get(name).map(|&i| &self.styles[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut EdgeStyle> {
        self.by_name.get(name).map(|&i| &mut self.styles[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Styles in registration order
    pub fn iter(&self) -> impl Iterator<Item = &EdgeStyle> {
        self.styles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EdgeStyle> {
        self.styles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_model::{
        ElementStore, EntityGeometry, EntityId, MeshData, ModelError, IDENTITY_TRANSFORM,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn wall_mesh() -> Arc<MeshData> {
        Arc::new(MeshData {
            positions: vec![0.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
        })
    }

    fn store(model: u32) -> ElementStore {
        let mut store = ElementStore::new(ModelId(model));
        store.insert(
            EntityId(1),
            IfcType::IfcWall,
            EntityGeometry::with_identity_transform(wall_mesh(), [1.0; 4]),
        );
        store.insert(
            EntityId(2),
            IfcType::IfcDoor,
            EntityGeometry::with_identity_transform(wall_mesh(), [1.0; 4]),
        );
        store
    }

    /// Counts subset builds and optionally fails them
    struct CountingModel {
        inner: ElementStore,
        builds: AtomicUsize,
        fail: bool,
    }

    impl ElementIndex for CountingModel {
        fn model_id(&self) -> ModelId {
            self.inner.model_id()
        }
        fn elements_of_type(&self, ifc_type: &IfcType) -> Vec<EntityId> {
            self.inner.elements_of_type(ifc_type)
        }
    }

    impl SubsetBuilder for CountingModel {
        fn create_subset(
            &self,
            custom_id: &str,
            ids: &[EntityId],
        ) -> ifc_lite_model::Result<GeometrySubset> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ModelError::subset(custom_id, "no geometry"));
            }
            self.inner.create_subset(custom_id, ids)
        }
    }

    #[test]
    fn test_stroke_from_hex() {
        let stroke = StrokeStyle::from_hex(0x333333, 0.001);
        assert!((stroke.color[0] - 0.2).abs() < 1e-6);
        assert_eq!(stroke.color[3], 1.0);
        assert_eq!(StrokeStyle::from_hex(0xff0000, 1.0).color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_ensure_style_is_idempotent() {
        let model = CountingModel {
            inner: store(0),
            builds: AtomicUsize::new(0),
            fail: false,
        };
        let config = EdgeConfig::default();
        let mut registry = StyleRegistry::new();

        let first: *const EdgeStyle = registry.ensure_style(&model, &StyleSpec::thick(), &config).unwrap();
        let second: *const EdgeStyle = registry.ensure_style(&model, &StyleSpec::thick(), &config).unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(model.builds.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order_is_kept() {
        let config = EdgeConfig::default();
        let mut registry = StyleRegistry::new();
        let model = store(0);
        for name in ["c", "a", "b"] {
            let spec = StyleSpec::new(name, vec![IfcType::IfcWall], StrokeStyle::default());
            registry.ensure_style(&model, &spec, &config).unwrap();
        }
        let names: Vec<_> = registry.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_filter_matching_nothing_gives_empty_subset() {
        let config = EdgeConfig::default();
        let mut registry = StyleRegistry::new();
        let spec = StyleSpec::new("roofs", vec![IfcType::IfcRoof], StrokeStyle::default());

        let style = registry.ensure_style(&store(0), &spec, &config).unwrap();
        assert!(style.subset().is_empty());
        assert_eq!(style.index().triangle_count(), 0);
        assert_eq!(style.buffer().capacity(), config.buffer_capacity());
    }

    #[test]
    fn test_subset_failure_registers_nothing() {
        let model = CountingModel {
            inner: store(0),
            builds: AtomicUsize::new(0),
            fail: true,
        };
        let mut registry = StyleRegistry::new();
        let err = registry
            .ensure_style(&model, &StyleSpec::thin(), &EdgeConfig::default())
            .unwrap_err();

        assert!(matches!(err, Error::SubsetCreation { ref style, .. } if style == "thin"));
        assert!(registry.is_empty());
        assert!(!registry.contains("thin"));
    }

    #[test]
    fn test_other_model_clears_registry() {
        let config = EdgeConfig::default();
        let mut registry = StyleRegistry::new();
        registry.ensure_style(&store(0), &StyleSpec::thick(), &config).unwrap();
        registry.ensure_style(&store(0), &StyleSpec::thin(), &config).unwrap();
        assert_eq!(registry.len(), 2);

        registry.ensure_style(&store(7), &StyleSpec::thin(), &config).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.model_id(), Some(ModelId(7)));
        assert_eq!(registry.get("thin").unwrap().model_id(), ModelId(7));
        assert!(registry.get("thick").is_none());
    }

    #[test]
    fn test_clear() {
        let mut registry = StyleRegistry::new();
        registry
            .ensure_style(&store(0), &StyleSpec::thick(), &EdgeConfig::default())
            .unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.model_id(), None);
    }

    #[test]
    fn test_world_transform_from_subset() {
        let mut translated = IDENTITY_TRANSFORM;
        translated[13] = 2.0;
        let model = store(0).with_transform(translated);
        let mut registry = StyleRegistry::new();
        let style = registry
            .ensure_style(&model, &StyleSpec::thick(), &EdgeConfig::default())
            .unwrap();
        assert_eq!(style.world_transform()[(1, 3)], 2.0);
    }

    #[test]
    fn test_index_shares_subset_mesh() {
        let mut registry = StyleRegistry::new();
        let style = registry
            .ensure_style(&store(0), &StyleSpec::thick(), &EdgeConfig::default())
            .unwrap();
        // Held by the subset and by the BVH, no copy
        assert_eq!(Arc::strong_count(&style.subset().mesh), 2);
        assert_eq!(style.index().triangle_count(), 1);
    }

    #[test]
    fn test_lines_attach_once() {
        let mut lines = EdgeLines::new(StrokeStyle::default());
        assert!(lines.attach(SceneNodeId(1)));
        assert!(!lines.attach(SceneNodeId(1)));
        assert!(lines.attach(SceneNodeId(2)));
        lines.detach();
        assert_eq!(lines.parent(), None);
    }
}
