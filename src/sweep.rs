// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Gauss-Seidel fast sweeping for the CPU backend (stage 3).
//!
//! Each pass performs eight sweeps, one per `(±i, ±j, ±k)` direction. A cell
//! inspects the seven already-visited neighbors for that direction; when a
//! neighbor carries a witness triangle, the exact distance from the cell
//! center to that triangle is recomputed and min-merged. Distances stay
//! exact point-to-triangle values throughout, which gives monotone
//! convergence after the 16 sweeps.
//!
//! Within one sweep, cells on the anti-diagonal level `s = u + v + w` of the
//! sweep-oriented coordinates depend only on cells at levels `< s`, so each
//! level is processed in parallel. The schedule visits every cell exactly as
//! the serial sweep order would, making the output independent of the thread
//! count. Shared distance and witness storage uses relaxed atomics in bit
//! form; level boundaries are synchronized by the pool's joins.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use rayon::prelude::*;

use crate::geometry::point_triangle_distance;
use crate::grid::{Grid3, GridSpec};
use crate::mesh::TriMesh;
use crate::narrow_band::NO_TRIANGLE;

/// Sweep directions, each `+` sweep followed directly by its mirror.
const SWEEP_DIRECTIONS: [(i32, i32, i32); 8] = [
    (1, 1, 1),
    (-1, -1, -1),
    (1, 1, -1),
    (-1, -1, 1),
    (1, -1, 1),
    (-1, 1, -1),
    (1, -1, -1),
    (-1, 1, 1),
];

/// Number of full 8-direction passes.
pub const SWEEP_PASSES: usize = 2;

/// Map a sweep-oriented coordinate back to a grid index.
#[inline]
fn unorient(dir: i32, u: usize, n: usize) -> usize {
    if dir > 0 {
        u
    } else {
        n - 1 - u
    }
}

struct SweepState<'a> {
    mesh: &'a TriMesh,
    spec: &'a GridSpec,
    phi_bits: Vec<AtomicU32>,
    closest_tri: Vec<AtomicI32>,
}

impl SweepState<'_> {
    #[inline]
    fn flat(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.spec.nx * (j + self.spec.ny * k)
    }

    /// Re-evaluate the cell at `cell` against the witness triangle of the
    /// neighbor at `(i1, j1, k1)`.
    #[inline]
    fn check_neighbour(&self, gx: [f32; 3], cell: usize, i1: usize, j1: usize, k1: usize) {
        let t = self.closest_tri[self.flat(i1, j1, k1)].load(Ordering::Relaxed);
        if t == NO_TRIANGLE {
            return;
        }
        let (p, q, r) = self.mesh.triangle(t as usize);
        let d = point_triangle_distance(gx, p, q, r);
        if d < f32::from_bits(self.phi_bits[cell].load(Ordering::Relaxed)) {
            self.phi_bits[cell].store(d.to_bits(), Ordering::Relaxed);
            self.closest_tri[cell].store(t, Ordering::Relaxed);
        }
    }

    fn visit_cell(&self, di: i32, dj: i32, dk: i32, u: usize, v: usize, w: usize) {
        let (nx, ny, nz) = (self.spec.nx, self.spec.ny, self.spec.nz);
        let i = unorient(di, u, nx);
        let j = unorient(dj, v, ny);
        let k = unorient(dk, w, nz);
        let im = unorient(di, u - 1, nx);
        let jm = unorient(dj, v - 1, ny);
        let km = unorient(dk, w - 1, nz);
        let gx = self.spec.cell_center(i, j, k);
        let cell = self.flat(i, j, k);
        self.check_neighbour(gx, cell, im, j, k);
        self.check_neighbour(gx, cell, i, jm, k);
        self.check_neighbour(gx, cell, im, jm, k);
        self.check_neighbour(gx, cell, i, j, km);
        self.check_neighbour(gx, cell, im, j, km);
        self.check_neighbour(gx, cell, i, jm, km);
        self.check_neighbour(gx, cell, im, jm, km);
    }

    /// One sweep: wavefront over levels `s = u + v + w` with `u, v, w >= 1`.
    fn sweep(&self, di: i32, dj: i32, dk: i32) {
        let (nx, ny, nz) = (self.spec.nx, self.spec.ny, self.spec.nz);
        if nx < 2 || ny < 2 || nz < 2 {
            // No cell has a full set of upwind neighbors; nothing to sweep.
            return;
        }
        let (umax, vmax, wmax) = (nx - 1, ny - 1, nz - 1);
        for s in 3..=(umax + vmax + wmax) {
            let v_lo = 1.max(s.saturating_sub(umax + wmax));
            let v_hi = vmax.min(s - 2);
            if v_lo > v_hi {
                continue;
            }
            (v_lo..=v_hi).into_par_iter().for_each(|v| {
                let w_lo = 1.max((s - v).saturating_sub(umax));
                let w_hi = wmax.min(s - v - 1);
                for w in w_lo..=w_hi {
                    let u = s - v - w;
                    self.visit_cell(di, dj, dk, u, v, w);
                }
            });
        }
    }
}

/// Propagate narrow-band distances to the full grid.
///
/// `phi` and `closest_tri` are the narrow-band outputs and are updated in
/// place. Runs `SWEEP_PASSES` passes of eight directional sweeps on `pool`.
pub fn propagate(
    mesh: &TriMesh,
    spec: &GridSpec,
    phi: &mut Grid3<f32>,
    closest_tri: &mut Grid3<i32>,
    pool: &rayon::ThreadPool,
) {
    let state = SweepState {
        mesh,
        spec,
        phi_bits: phi
            .as_slice()
            .iter()
            .map(|v| AtomicU32::new(v.to_bits()))
            .collect(),
        closest_tri: closest_tri
            .as_slice()
            .iter()
            .map(|&t| AtomicI32::new(t))
            .collect(),
    };
    pool.install(|| {
        for _ in 0..SWEEP_PASSES {
            for &(di, dj, dk) in &SWEEP_DIRECTIONS {
                state.sweep(di, dj, dk);
            }
        }
    });
    for (dst, src) in phi.as_mut_slice().iter_mut().zip(&state.phi_bits) {
        *dst = f32::from_bits(src.load(Ordering::Relaxed));
    }
    for (dst, src) in closest_tri.as_mut_slice().iter_mut().zip(&state.closest_tri) {
        *dst = src.load(Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrow_band;

    fn pool(threads: usize) -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
    }

    fn run(mesh: &TriMesh, spec: &GridSpec, threads: usize) -> (Grid3<f32>, Grid3<i32>) {
        let pool = pool(threads);
        let band = narrow_band::compute(mesh, spec, 1, &pool);
        let mut phi = band.phi;
        let mut closest = band.closest_tri;
        propagate(mesh, spec, &mut phi, &mut closest, &pool);
        (phi, closest)
    }

    #[test]
    fn single_triangle_converges_to_exact_distance() {
        // With one triangle every propagated witness is that triangle, so the
        // sweep must reproduce the exact distance field everywhere.
        let mesh = TriMesh::new(
            vec![[2.0, 2.0, 2.0], [3.0, 2.0, 2.0], [2.0, 3.0, 2.0]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let spec = GridSpec::new([0.0; 3], 0.5, 12, 12, 12).unwrap();
        let (phi, closest) = run(&mesh, &spec, 2);
        let (p, q, r) = mesh.triangle(0);
        for k in 0..12 {
            for j in 0..12 {
                for i in 0..12 {
                    let expect = point_triangle_distance(spec.cell_center(i, j, k), p, q, r);
                    assert_eq!(
                        phi.get(i, j, k),
                        expect,
                        "cell ({},{},{})",
                        i,
                        j,
                        k
                    );
                    assert_eq!(closest.get(i, j, k), 0);
                }
            }
        }
    }

    #[test]
    fn adjacent_cells_satisfy_lipschitz_bound() {
        let mesh = TriMesh::new(
            vec![[1.1, 1.1, 1.1], [4.9, 1.3, 1.2], [2.0, 4.7, 4.8]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let spec = GridSpec::new([0.0; 3], 0.5, 12, 12, 12).unwrap();
        let (phi, _) = run(&mesh, &spec, 2);
        let tol = spec.dx + 1e-5;
        for k in 0..12 {
            for j in 0..12 {
                for i in 0..11 {
                    assert!((phi.get(i, j, k) - phi.get(i + 1, j, k)).abs() <= tol);
                }
            }
        }
        for k in 0..12 {
            for j in 0..11 {
                for i in 0..12 {
                    assert!((phi.get(i, j, k) - phi.get(i, j + 1, k)).abs() <= tol);
                }
            }
        }
        for k in 0..11 {
            for j in 0..12 {
                for i in 0..12 {
                    assert!((phi.get(i, j, k) - phi.get(i, j, k + 1)).abs() <= tol);
                }
            }
        }
    }

    #[test]
    fn thread_count_does_not_change_result() {
        let mesh = TriMesh::new(
            vec![[1.0, 1.0, 1.0], [4.0, 1.5, 1.0], [1.5, 4.0, 3.5]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let spec = GridSpec::new([0.0; 3], 0.5, 11, 10, 9).unwrap();
        let (phi1, tri1) = run(&mesh, &spec, 1);
        let (phi8, tri8) = run(&mesh, &spec, 8);
        assert_eq!(phi1.as_slice(), phi8.as_slice());
        assert_eq!(tri1.as_slice(), tri8.as_slice());
    }

    #[test]
    fn degenerate_grid_dimension_is_harmless() {
        let mesh = TriMesh::new(
            vec![[0.2, 0.2, 0.1], [1.8, 0.2, 0.1], [0.2, 1.8, 0.1]],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let spec = GridSpec::new([0.0; 3], 1.0, 3, 3, 1).unwrap();
        let (phi, _) = run(&mesh, &spec, 4);
        for &v in phi.as_slice() {
            assert!(v.is_finite() && v >= 0.0);
        }
    }
}
