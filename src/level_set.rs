// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Backend dispatch and the top-level level-set pipeline.

use rayon::prelude::*;

use crate::accel;
use crate::error::{Result, SdfError};
use crate::grid::{Grid3, GridSpec};
use crate::mesh::TriMesh;
use crate::narrow_band;
use crate::sweep;

/// Which executor computes stages 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Use the accelerator when a device is present, otherwise the CPU.
    #[default]
    Auto,
    /// Multi-threaded CPU fast sweeping.
    Cpu,
    /// Data-parallel device execution (Jacobi Eikonal iteration).
    Accelerator,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Auto => write!(f, "auto"),
            Backend::Cpu => write!(f, "cpu"),
            Backend::Accelerator => write!(f, "accelerator"),
        }
    }
}

/// A computed signed distance field.
pub struct LevelSet {
    /// Signed distances, negative inside the mesh.
    pub phi: Grid3<f32>,
    /// The backend that actually ran (never `Auto`).
    pub backend: Backend,
}

/// Builder for a level-set computation.
///
/// Mirrors the call signature of the plain [`make_level_set3`] entry point
/// while letting options default independently.
pub struct LevelSetSolver<'a> {
    mesh: &'a TriMesh,
    spec: &'a GridSpec,
    exact_band: u32,
    backend: Backend,
    num_threads: usize,
}

impl<'a> LevelSetSolver<'a> {
    /// Create a solver over a mesh and grid description.
    pub fn new(mesh: &'a TriMesh, spec: &'a GridSpec) -> Self {
        LevelSetSolver {
            mesh,
            spec,
            exact_band: 1,
            backend: Backend::Auto,
            num_threads: 0,
        }
    }

    /// Width in cells of the exact-distance band around each triangle
    /// (builder method). Default is 1.
    pub fn with_exact_band(mut self, exact_band: u32) -> Self {
        self.exact_band = exact_band;
        self
    }

    /// Select the backend (builder method). Default is [`Backend::Auto`].
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the number of CPU worker threads (builder method).
    /// `0` means hardware concurrency. Ignored by the accelerator path.
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Run the pipeline and return the signed distance field.
    ///
    /// # Errors
    /// Returns an error for invalid inputs, an unavailable accelerator, or
    /// an internal distance invariant violation.
    pub fn solve(&self) -> Result<LevelSet> {
        // The mesh is validated at construction; re-check here so meshes
        // assembled by hand fail fast instead of panicking mid-pipeline.
        if self.mesh.triangles.is_empty() {
            return Err(SdfError::EmptyMesh);
        }
        for (t, tri) in self.mesh.triangles.iter().enumerate() {
            for &idx in tri {
                if idx as usize >= self.mesh.vertices.len() {
                    return Err(SdfError::TriangleIndexOutOfRange {
                        triangle: t,
                        index: idx,
                        vertex_count: self.mesh.vertices.len(),
                    });
                }
            }
        }

        let backend = match self.backend {
            Backend::Auto => {
                if accel::is_accelerator_available() {
                    Backend::Accelerator
                } else {
                    Backend::Cpu
                }
            }
            chosen => chosen,
        };

        let phi = match backend {
            Backend::Cpu => self.solve_cpu()?,
            Backend::Accelerator => accel::compute_level_set(self.mesh, self.spec, self.exact_band)?,
            Backend::Auto => unreachable!("auto resolved above"),
        };
        Ok(LevelSet { phi, backend })
    }

    fn solve_cpu(&self) -> Result<Grid3<f32>> {
        let num_threads = if self.num_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.num_threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| SdfError::Other(e.to_string()))?;

        let band = narrow_band::compute(self.mesh, self.spec, self.exact_band, &pool);
        let mut phi = band.phi;
        let mut closest_tri = band.closest_tri;
        sweep::propagate(self.mesh, self.spec, &mut phi, &mut closest_tri, &pool);
        drop(closest_tri);

        check_unsigned_distances(&phi)?;
        apply_sign(&mut phi, &band.crossings, &pool);
        Ok(phi)
    }
}

/// Compute a signed distance field on a regular grid.
///
/// This is the plain-function form of [`LevelSetSolver`]; see the module
/// docs for the pipeline stages. `num_threads = 0` selects hardware
/// concurrency on the CPU path.
///
/// # Errors
/// `BadInputs` conditions (empty mesh, out-of-range indices; invalid grids
/// are rejected when the [`GridSpec`] is built), an unavailable accelerator,
/// or an internal invariant violation.
pub fn make_level_set3(
    mesh: &TriMesh,
    spec: &GridSpec,
    exact_band: u32,
    backend: Backend,
    num_threads: usize,
) -> Result<LevelSet> {
    LevelSetSolver::new(mesh, spec)
        .with_exact_band(exact_band)
        .with_backend(backend)
        .with_threads(num_threads)
        .solve()
}

/// Reject NaN or negative unsigned distances before sign correction.
fn check_unsigned_distances(phi: &Grid3<f32>) -> Result<()> {
    for (index, &value) in phi.as_slice().iter().enumerate() {
        if !(value >= 0.0) || !value.is_finite() {
            return Err(SdfError::DistanceInvariant { index, value });
        }
    }
    Ok(())
}

/// Flip the sign of interior cells using ray-crossing parity (stage 4).
///
/// Every `(j, k)` column is a contiguous `nx`-cell run, scanned serially in
/// `i` while columns run in parallel. A cell is inside when the prefix sum
/// of crossings up to and including its own bucket is odd.
pub(crate) fn apply_sign(phi: &mut Grid3<f32>, crossings: &Grid3<i32>, pool: &rayon::ThreadPool) {
    let (nx, _, _) = phi.shape();
    pool.install(|| {
        phi.as_mut_slice()
            .par_chunks_mut(nx)
            .zip(crossings.as_slice().par_chunks(nx))
            .for_each(|(phi_line, xc_line)| {
                let mut parity = 0i32;
                for (value, &count) in phi_line.iter_mut().zip(xc_line) {
                    parity += count;
                    if parity % 2 == 1 {
                        *value = -*value;
                    }
                }
            });
    });
}
