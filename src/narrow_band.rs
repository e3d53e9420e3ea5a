// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Narrow-band exact distances and ray-crossing counts (stage 2).
//!
//! Triangles are distributed over a rayon pool; every worker accumulates
//! into a private shard holding a full copy of the three grids, and shards
//! are merged by a per-cell lexicographic minimum on `(distance, triangle)`
//! plus a per-cell crossing-count sum. Both merge operations are exact and
//! commutative, so the result is bit-identical for every thread count and
//! split structure.

use rayon::prelude::*;

use crate::geometry::{point_in_triangle_2d, point_triangle_distance};
use crate::grid::{Grid3, GridSpec};
use crate::mesh::TriMesh;

/// Sentinel for "no witness triangle recorded".
pub const NO_TRIANGLE: i32 = -1;

/// Output of the narrow-band pass.
pub struct NarrowBand {
    /// Unsigned distances; exact near the surface, sentinel elsewhere.
    pub phi: Grid3<f32>,
    /// Witness triangle per cell, `NO_TRIANGLE` where untouched.
    pub closest_tri: Grid3<i32>,
    /// Ray-crossing counts along `+i` lines, bucketed at `ceil(fi)`.
    pub crossings: Grid3<i32>,
}

/// `true` when `(d_new, t_new)` should replace `(d_old, t_old)`.
///
/// Ties on distance resolve to the smaller triangle index so the merged
/// result does not depend on processing order.
#[inline]
pub(crate) fn closer(d_new: f32, t_new: i32, d_old: f32, t_old: i32) -> bool {
    d_new < d_old || (d_new == d_old && t_old != NO_TRIANGLE && t_new < t_old)
}

struct Shard {
    phi: Vec<f32>,
    closest_tri: Vec<i32>,
    crossings: Vec<i32>,
}

impl Shard {
    fn new(spec: &GridSpec) -> Self {
        let n = spec.num_cells();
        Shard {
            phi: vec![spec.upper_bound(); n],
            closest_tri: vec![NO_TRIANGLE; n],
            crossings: vec![0; n],
        }
    }

    fn merge(mut self, other: Shard) -> Shard {
        for c in 0..self.phi.len() {
            if closer(
                other.phi[c],
                other.closest_tri[c],
                self.phi[c],
                self.closest_tri[c],
            ) {
                self.phi[c] = other.phi[c];
                self.closest_tri[c] = other.closest_tri[c];
            }
            self.crossings[c] += other.crossings[c];
        }
        self
    }

    fn scan_triangle(&mut self, mesh: &TriMesh, spec: &GridSpec, exact_band: u32, t: usize) {
        let (p, q, r) = mesh.triangle(t);
        let (nx, ny, nz) = (spec.nx, spec.ny, spec.nz);
        let dx = spec.dx as f64;
        let origin = [
            spec.origin[0] as f64,
            spec.origin[1] as f64,
            spec.origin[2] as f64,
        ];
        // Triangle corners in grid coordinates.
        let f = |v: [f32; 3], d: usize| (v[d] as f64 - origin[d]) / dx;
        let (fip, fjp, fkp) = (f(p, 0), f(p, 1), f(p, 2));
        let (fiq, fjq, fkq) = (f(q, 0), f(q, 1), f(q, 2));
        let (fir, fjr, fkr) = (f(r, 0), f(r, 1), f(r, 2));

        let band = exact_band as i64;
        let lo = |a: f64, b: f64, c: f64, n: usize| {
            (a.min(b).min(c).floor() as i64 - band).clamp(0, n as i64 - 1) as usize
        };
        let hi = |a: f64, b: f64, c: f64, n: usize| {
            (a.max(b).max(c).ceil() as i64 + band).clamp(0, n as i64 - 1) as usize
        };

        // Exact distances in the expanded bounding box.
        let (i0, i1) = (lo(fip, fiq, fir, nx), hi(fip, fiq, fir, nx));
        let (j0, j1) = (lo(fjp, fjq, fjr, ny), hi(fjp, fjq, fjr, ny));
        let (k0, k1) = (lo(fkp, fkq, fkr, nz), hi(fkp, fkq, fkr, nz));
        for k in k0..=k1 {
            for j in j0..=j1 {
                for i in i0..=i1 {
                    let gx = spec.cell_center(i, j, k);
                    let d = point_triangle_distance(gx, p, q, r);
                    let c = i + nx * (j + ny * k);
                    if closer(d, t as i32, self.phi[c], self.closest_tri[c]) {
                        self.phi[c] = d;
                        self.closest_tri[c] = t as i32;
                    }
                }
            }
        }

        // Crossings of +i grid lines with this triangle. The box uses
        // ceil(min)/floor(max) and may be empty; clamped columns outside the
        // projected triangle fail the 2D test and contribute nothing.
        let j0 = (fjp.min(fjq).min(fjr).ceil() as i64).clamp(0, ny as i64 - 1) as usize;
        let j1 = (fjp.max(fjq).max(fjr).floor() as i64).clamp(0, ny as i64 - 1) as usize;
        let k0 = (fkp.min(fkq).min(fkr).ceil() as i64).clamp(0, nz as i64 - 1) as usize;
        let k1 = (fkp.max(fkq).max(fkr).floor() as i64).clamp(0, nz as i64 - 1) as usize;
        for k in k0..=k1 {
            for j in j0..=j1 {
                if let Some((a, b, c)) =
                    point_in_triangle_2d(j as f64, k as f64, fjp, fkp, fjq, fkq, fjr, fkr)
                {
                    let fi = a * fip + b * fiq + c * fir;
                    // The crossing lies in the half-open interval
                    // (i_interval - 1, i_interval].
                    let i_interval = fi.ceil() as i64;
                    if i_interval < 0 {
                        // Fold crossings beyond the -i face into bucket 0.
                        self.crossings[nx * (j + ny * k)] += 1;
                    } else if (i_interval as usize) < nx {
                        self.crossings[i_interval as usize + nx * (j + ny * k)] += 1;
                    }
                }
            }
        }
    }
}

/// Run the narrow-band pass over every triangle on the given pool.
pub fn compute(
    mesh: &TriMesh,
    spec: &GridSpec,
    exact_band: u32,
    pool: &rayon::ThreadPool,
) -> NarrowBand {
    let shard = pool.install(|| {
        (0..mesh.num_triangles())
            .into_par_iter()
            .fold(
                || Shard::new(spec),
                |mut shard, t| {
                    shard.scan_triangle(mesh, spec, exact_band, t);
                    shard
                },
            )
            .reduce(|| Shard::new(spec), Shard::merge)
    });
    let (nx, ny, nz) = (spec.nx, spec.ny, spec.nz);
    NarrowBand {
        phi: Grid3::from_vec(nx, ny, nz, shard.phi)
            .unwrap_or_else(|_| unreachable!("shard shape matches the grid")),
        closest_tri: Grid3::from_vec(nx, ny, nz, shard.closest_tri)
            .unwrap_or_else(|_| unreachable!("shard shape matches the grid")),
        crossings: Grid3::from_vec(nx, ny, nz, shard.crossings)
            .unwrap_or_else(|_| unreachable!("shard shape matches the grid")),
    }
}
