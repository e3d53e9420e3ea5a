// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur during level-set setup, I/O, or execution.
#[derive(Debug)]
pub enum SdfError {
    /// Grid shape is invalid (a dimension is zero).
    InvalidGridShape {
        /// The axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// The size provided.
        size: usize,
    },
    /// Grid spacing is not positive and finite.
    InvalidGridSpacing(f32),
    /// The mesh has no triangles.
    EmptyMesh,
    /// A triangle references a vertex that does not exist.
    TriangleIndexOutOfRange {
        /// The offending triangle.
        triangle: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// The number of vertices in the mesh.
        vertex_count: usize,
    },
    /// The accelerator backend was requested but no device is available.
    AcceleratorUnavailable,
    /// A computed distance became NaN or negative before sign correction.
    /// This indicates a bug in the pipeline, not a user error.
    DistanceInvariant {
        /// The flat cell index of the invalid value.
        index: usize,
        /// The invalid value.
        value: f32,
    },
    /// Unsupported file format (unrecognized extension).
    UnsupportedFileFormat(String),
    /// A mesh file could not be parsed.
    MeshParse {
        /// The file being parsed.
        path: String,
        /// Explanation of the failure.
        reason: String,
    },
    /// An SDF file header is malformed.
    InvalidSdfHeader(String),
    /// Accelerator execution failed after dispatch.
    AcceleratorExecution(String),
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for SdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdfError::InvalidGridShape { axis, size } => {
                write!(
                    f,
                    "invalid grid shape: axis {} has size {} (must be >= 1)",
                    axis, size
                )
            }
            SdfError::InvalidGridSpacing(dx) => {
                write!(
                    f,
                    "invalid grid spacing: {} (must be positive and finite)",
                    dx
                )
            }
            SdfError::EmptyMesh => write!(f, "mesh has no triangles"),
            SdfError::TriangleIndexOutOfRange {
                triangle,
                index,
                vertex_count,
            } => {
                write!(
                    f,
                    "triangle {} references vertex {} but the mesh has {} vertices",
                    triangle, index, vertex_count
                )
            }
            SdfError::AcceleratorUnavailable => {
                write!(f, "accelerator backend requested but no device is available")
            }
            SdfError::DistanceInvariant { index, value } => {
                write!(
                    f,
                    "unsigned distance at cell {} is {} (must be finite and non-negative); \
                     this is a bug",
                    index, value
                )
            }
            SdfError::UnsupportedFileFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            SdfError::MeshParse { path, reason } => {
                write!(f, "failed to parse mesh file {}: {}", path, reason)
            }
            SdfError::InvalidSdfHeader(reason) => {
                write!(f, "invalid SDF file header: {}", reason)
            }
            SdfError::AcceleratorExecution(reason) => {
                write!(f, "accelerator execution failed: {}", reason)
            }
            SdfError::IoError(e) => write!(f, "I/O error: {}", e),
            SdfError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SdfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SdfError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SdfError {
    fn from(e: std::io::Error) -> Self {
        SdfError::IoError(e)
    }
}

/// Convenience type alias for Results with SdfError.
pub type Result<T> = std::result::Result<T, SdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_grid_shape() {
        let e = SdfError::InvalidGridShape { axis: 2, size: 0 };
        assert_eq!(
            e.to_string(),
            "invalid grid shape: axis 2 has size 0 (must be >= 1)"
        );
    }

    #[test]
    fn display_invalid_grid_spacing() {
        let e = SdfError::InvalidGridSpacing(-0.5);
        assert_eq!(
            e.to_string(),
            "invalid grid spacing: -0.5 (must be positive and finite)"
        );
    }

    #[test]
    fn display_triangle_index() {
        let e = SdfError::TriangleIndexOutOfRange {
            triangle: 3,
            index: 17,
            vertex_count: 8,
        };
        assert_eq!(
            e.to_string(),
            "triangle 3 references vertex 17 but the mesh has 8 vertices"
        );
    }

    #[test]
    fn display_accelerator_unavailable() {
        let e = SdfError::AcceleratorUnavailable;
        assert!(e.to_string().contains("no device"));
    }

    #[test]
    fn display_distance_invariant() {
        let e = SdfError::DistanceInvariant {
            index: 42,
            value: f32::NAN,
        };
        assert!(e.to_string().contains("cell 42"));
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = SdfError::IoError(io_err);
        assert!(e.to_string().contains("file not found"));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let e: SdfError = io_err.into();
        assert!(matches!(e, SdfError::IoError(_)));
    }

    #[test]
    fn display_mesh_parse() {
        let e = SdfError::MeshParse {
            path: "a.obj".to_string(),
            reason: "bad face line".to_string(),
        };
        assert!(e.to_string().contains("a.obj"));
        assert!(e.to_string().contains("bad face line"));
    }
}
