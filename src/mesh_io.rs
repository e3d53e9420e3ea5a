// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Mesh loading: Wavefront OBJ and STL (binary and ASCII).
//!
//! OBJ faces may be triangles or larger polygons; polygons are
//! fan-triangulated. STL format detection is by the record-count size check,
//! falling back to ASCII for files that begin with `solid`. STL vertices are
//! kept per-facet (duplicates preserved), as the format provides no sharing.

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SdfError};
use crate::mesh::TriMesh;

fn parse_err(path: &Path, reason: String) -> SdfError {
    SdfError::MeshParse {
        path: path.display().to_string(),
        reason,
    }
}

/// Load a triangle mesh from a Wavefront OBJ file.
///
/// Supports `v` and `f` records; `f` entries may use the `v/vt/vn` index
/// syntax, from which only the vertex index is taken. Indices are 1-based.
/// Texture coordinates, normals, and all other record types are ignored.
pub fn load_obj(path: &Path) -> Result<TriMesh> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut triangles: Vec<[u32; 3]> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut v = [0.0f32; 3];
                for coord in &mut v {
                    *coord = tokens
                        .next()
                        .and_then(|t| t.parse::<f32>().ok())
                        .ok_or_else(|| {
                            parse_err(path, format!("bad vertex on line {}", lineno + 1))
                        })?;
                }
                vertices.push(v);
            }
            Some("f") => {
                let mut indices: Vec<u32> = Vec::new();
                for token in tokens {
                    // "7", "7/1", and "7/1/3" all name vertex 7.
                    let vertex_field = token.split('/').next().unwrap_or("");
                    let idx: i64 = vertex_field.parse().map_err(|_| {
                        parse_err(path, format!("bad face index on line {}", lineno + 1))
                    })?;
                    if idx < 1 || idx as usize > vertices.len() {
                        return Err(parse_err(
                            path,
                            format!("face index {} out of range on line {}", idx, lineno + 1),
                        ));
                    }
                    indices.push((idx - 1) as u32);
                }
                if indices.len() < 3 {
                    return Err(parse_err(
                        path,
                        format!("face with {} vertices on line {}", indices.len(), lineno + 1),
                    ));
                }
                // Fan triangulation covers quads and larger polygons.
                for t in 1..indices.len() - 1 {
                    triangles.push([indices[0], indices[t], indices[t + 1]]);
                }
            }
            _ => {} // comments, normals, groups, materials
        }
    }

    TriMesh::new(vertices, triangles)
}

/// Load a triangle mesh from an STL file, auto-detecting binary vs ASCII.
pub fn load_stl(path: &Path) -> Result<TriMesh> {
    let bytes = std::fs::read(path)?;

    // A well-formed binary STL is exactly 84 + 50 * count bytes. The check
    // beats sniffing for "solid", which some binary exporters also emit.
    if bytes.len() >= 84 {
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        if bytes.len() == 84 + 50 * count {
            return load_stl_binary(path, &bytes, count);
        }
    }
    if bytes.starts_with(b"solid") {
        return load_stl_ascii(path, &bytes);
    }
    Err(parse_err(
        path,
        "neither a valid binary nor ASCII STL file".to_string(),
    ))
}

fn load_stl_binary(path: &Path, bytes: &[u8], count: usize) -> Result<TriMesh> {
    let mut vertices = Vec::with_capacity(count * 3);
    let mut triangles = Vec::with_capacity(count);
    let f32_at = |offset: usize| {
        f32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    };
    for t in 0..count {
        // 50-byte record: normal (skipped), three corners, attribute count.
        let base = 84 + 50 * t + 12;
        for corner in 0..3 {
            let o = base + 12 * corner;
            vertices.push([f32_at(o), f32_at(o + 4), f32_at(o + 8)]);
        }
        let v = (3 * t) as u32;
        triangles.push([v, v + 1, v + 2]);
    }
    if triangles.is_empty() {
        return Err(parse_err(path, "binary STL contains no triangles".to_string()));
    }
    TriMesh::new(vertices, triangles)
}

fn load_stl_ascii(path: &Path, bytes: &[u8]) -> Result<TriMesh> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| parse_err(path, "ASCII STL is not valid UTF-8".to_string()))?;

    let mut vertices: Vec<[f32; 3]> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("vertex") {
            let mut v = [0.0f32; 3];
            for coord in &mut v {
                *coord = tokens
                    .next()
                    .and_then(|t| t.parse::<f32>().ok())
                    .ok_or_else(|| {
                        parse_err(path, format!("bad vertex on line {}", lineno + 1))
                    })?;
            }
            vertices.push(v);
        }
    }
    if vertices.is_empty() || vertices.len() % 3 != 0 {
        return Err(parse_err(
            path,
            format!(
                "ASCII STL has {} vertices (expected a positive multiple of 3)",
                vertices.len()
            ),
        ));
    }
    let triangles = (0..vertices.len() as u32 / 3)
        .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
        .collect();
    TriMesh::new(vertices, triangles)
}

/// Load a mesh, choosing the loader from the file extension
/// (case-insensitive).
pub fn load_mesh(path: &Path) -> Result<TriMesh> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("obj") => load_obj(path),
        Some(ext) if ext.eq_ignore_ascii_case("stl") => load_stl(path),
        Some(ext) => Err(SdfError::UnsupportedFileFormat(ext.to_string())),
        None => Err(SdfError::UnsupportedFileFormat("(no extension)".to_string())),
    }
}
