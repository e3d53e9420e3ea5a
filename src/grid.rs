// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Dense 3D grid storage and the immutable grid description.
//!
//! Cells are flattened as `i + nx * (j + ny * k)`, so the `i` axis varies
//! fastest and an `(j, k)` column is a contiguous run of `nx` values.

use crate::error::{Result, SdfError};

/// Immutable description of a regular 3D sampling grid.
///
/// Cell `(i, j, k)` is sampled at the world point `origin + dx * (i, j, k)`;
/// `origin` is the center of cell `(0, 0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// World position of cell (0, 0, 0).
    pub origin: [f32; 3],
    /// Uniform cell edge length.
    pub dx: f32,
    /// Cell count along x.
    pub nx: usize,
    /// Cell count along y.
    pub ny: usize,
    /// Cell count along z.
    pub nz: usize,
}

impl GridSpec {
    /// Create a grid description.
    ///
    /// # Errors
    /// Returns an error if `dx` is not positive and finite or any dimension
    /// is zero.
    pub fn new(origin: [f32; 3], dx: f32, nx: usize, ny: usize, nz: usize) -> Result<Self> {
        if !dx.is_finite() || dx <= 0.0 {
            return Err(SdfError::InvalidGridSpacing(dx));
        }
        for (axis, &size) in [nx, ny, nz].iter().enumerate() {
            if size == 0 {
                return Err(SdfError::InvalidGridShape { axis, size });
            }
        }
        Ok(GridSpec {
            origin,
            dx,
            nx,
            ny,
            nz,
        })
    }

    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Largest dimension, used to size the Jacobi iteration count.
    pub fn max_extent(&self) -> usize {
        self.nx.max(self.ny).max(self.nz)
    }

    /// World position of the center of cell `(i, j, k)`.
    pub fn cell_center(&self, i: usize, j: usize, k: usize) -> [f32; 3] {
        [
            self.origin[0] + self.dx * i as f32,
            self.origin[1] + self.dx * j as f32,
            self.origin[2] + self.dx * k as f32,
        ]
    }

    /// Initial sentinel distance, larger than any distance inside the grid.
    pub fn upper_bound(&self) -> f32 {
        (self.nx + self.ny + self.nz) as f32 * self.dx
    }
}

/// Owned dense 3D array with `i + nx * (j + ny * k)` flat indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    nx: usize,
    ny: usize,
    nz: usize,
    data: Vec<T>,
}

impl<T: Copy> Grid3<T> {
    /// Allocate a grid with every cell set to `value`.
    pub fn filled(nx: usize, ny: usize, nz: usize, value: T) -> Self {
        Grid3 {
            nx,
            ny,
            nz,
            data: vec![value; nx * ny * nz],
        }
    }

    /// Build a grid from an existing flat vector in `i + nx*(j + ny*k)` order.
    ///
    /// # Errors
    /// Returns an error if the vector length does not match the shape.
    pub fn from_vec(nx: usize, ny: usize, nz: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != nx * ny * nz {
            return Err(SdfError::Other(format!(
                "grid data length {} does not match shape {}x{}x{}",
                data.len(),
                nx,
                ny,
                nz
            )));
        }
        Ok(Grid3 { nx, ny, nz, data })
    }

    /// Grid shape as `(nx, ny, nz)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of cell `(i, j, k)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny && k < self.nz);
        i + self.nx * (j + self.ny * k)
    }

    /// Value at cell `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> T {
        self.data[self.index(i, j, k)]
    }

    /// Overwrite cell `(i, j, k)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        let idx = self.index(i, j, k);
        self.data[idx] = value;
    }

    /// Flat read-only view.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Flat mutable view.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the grid and return its flat storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}
