// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Immutable triangle mesh input.

use crate::error::{Result, SdfError};

/// An indexed triangle mesh with its axis-aligned bounding box.
///
/// Construction validates every triangle index, so downstream stages can
/// index vertices without bounds churn. The mesh is borrowed read-only by
/// the whole pipeline.
#[derive(Debug, Clone)]
pub struct TriMesh {
    /// Vertex positions in world coordinates.
    pub vertices: Vec<[f32; 3]>,
    /// Vertex index triples, counter-clockwise when viewed from outside.
    pub triangles: Vec<[u32; 3]>,
    /// Componentwise minimum over all vertices.
    pub min_box: [f32; 3],
    /// Componentwise maximum over all vertices.
    pub max_box: [f32; 3],
}

impl TriMesh {
    /// Build a mesh from vertices and triangle indices.
    ///
    /// # Errors
    /// Returns an error if there are no triangles or any index is out of
    /// range.
    pub fn new(vertices: Vec<[f32; 3]>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(SdfError::EmptyMesh);
        }
        for (t, tri) in triangles.iter().enumerate() {
            for &idx in tri {
                if idx as usize >= vertices.len() {
                    return Err(SdfError::TriangleIndexOutOfRange {
                        triangle: t,
                        index: idx,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        let mut min_box = [f32::INFINITY; 3];
        let mut max_box = [f32::NEG_INFINITY; 3];
        for v in &vertices {
            for d in 0..3 {
                min_box[d] = min_box[d].min(v[d]);
                max_box[d] = max_box[d].max(v[d]);
            }
        }
        Ok(TriMesh {
            vertices,
            triangles,
            min_box,
            max_box,
        })
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// The three corner positions of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> ([f32; 3], [f32; 3], [f32; 3]) {
        let [p, q, r] = self.triangles[t];
        (
            self.vertices[p as usize],
            self.vertices[q as usize],
            self.vertices[r as usize],
        )
    }

    /// Translate every vertex by `offset`, keeping the box in sync.
    pub fn translated(&self, offset: [f32; 3]) -> TriMesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| [v[0] + offset[0], v[1] + offset[1], v[2] + offset[2]])
            .collect();
        // Box recomputed rather than shifted so it stays exactly consistent
        // with the rounded vertex positions.
        TriMesh::new(vertices, self.triangles.clone())
            .unwrap_or_else(|_| unreachable!("translation preserves validity"))
    }
}
