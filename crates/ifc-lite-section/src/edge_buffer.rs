// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-capacity vertex buffer for section line segments
//!
//! The buffer is allocated once and rewritten on every clipping pass. Only the
//! prefix `0..cursor` holds data for the current pass; consecutive vertex
//! pairs form line segments.

use nalgebra::Point3;
use std::ops::Range;

/// Reusable line-segment vertex buffer
#[derive(Debug, Clone)]
pub struct EdgeBuffer {
    /// Flattened [x, y, z, ...] storage for `capacity` vertices
    positions: Vec<f32>,
    capacity: usize,
    cursor: usize,
    /// Appends refused since the last reset
    dropped: usize,
}

impl EdgeBuffer {
    /// Allocate a buffer holding up to `capacity` vertices
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![0.0; capacity.saturating_mul(3)],
            capacity,
            cursor: 0,
            dropped: 0,
        }
    }

    /// Zero the storage and rewind the cursor
    pub fn reset(&mut self) {
        self.positions.fill(0.0);
        self.cursor = 0;
        self.dropped = 0;
    }

    /// Write one vertex at the cursor
    ///
    /// Returns `false` without writing when the buffer is full.
    #[inline]
    pub fn append(&mut self, point: &Point3<f64>) -> bool {
        if self.cursor >= self.capacity {
            self.dropped += 1;
            return false;
        }
        let base = self.cursor * 3;
        self.positions[base] = point.x as f32;
        self.positions[base + 1] = point.y as f32;
        self.positions[base + 2] = point.z as f32;
        self.cursor += 1;
        true
    }

    /// Discard the last `n` written vertices
    #[inline]
    pub fn retract(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    /// Vertex range holding data for the current pass
    #[inline]
    pub fn valid_range(&self) -> Range<usize> {
        0..self.cursor
    }

    /// Flattened positions of the valid range
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.cursor * 3]
    }

    /// Vertex at `index`, if inside the valid range
    pub fn vertex(&self, index: usize) -> Option<Point3<f32>> {
        if index >= self.cursor {
            return None;
        }
        let p = &self.positions[index * 3..index * 3 + 3];
        Some(Point3::new(p[0], p[1], p[2]))
    }

    /// Line segments in the valid range
    pub fn segments(&self) -> impl Iterator<Item = [Point3<f32>; 2]> + '_ {
        self.positions().chunks_exact(6).map(|s| {
            [
                Point3::new(s[0], s[1], s[2]),
                Point3::new(s[3], s[4], s[5]),
            ]
        })
    }

    /// Vertices written this pass
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// True when nothing was written this pass
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Maximum vertex count
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Vertices that can still be written this pass
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    /// Appends refused since the last reset
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whole backing storage, including stale data past the cursor
    pub fn raw(&self) -> &[f32] {
        &self.positions
    }
}
