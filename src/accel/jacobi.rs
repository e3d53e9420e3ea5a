// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Scalar form of the Jacobi Eikonal cell update.
//!
//! This is the reference for the `jacobi.wgsl` kernel: the shader evaluates
//! exactly this formula per cell. Keeping the scalar form in Rust lets the
//! update be unit-tested without a device and lets device results be checked
//! against it.

/// Sentinel for a missing neighbor. Large enough to lose every comparison,
/// small enough that its square stays finite in `f32`.
pub const FAR: f32 = 1e18;

/// One discretized Eikonal update from the three axis-minimum neighbor
/// values (`FAR` where an axis has no in-range neighbor).
///
/// Candidates are accumulated incrementally: the 1-D candidate `m0 + dx`,
/// the 2-D candidate when its discriminant is non-negative, and the 3-D
/// candidate likewise. The result never rises above `current`.
pub fn jacobi_update(current: f32, axis_minima: [f32; 3], dx: f32) -> f32 {
    let mut m = axis_minima;
    if m[0] > m[1] {
        m.swap(0, 1);
    }
    if m[1] > m[2] {
        m.swap(1, 2);
    }
    if m[0] > m[1] {
        m.swap(0, 1);
    }

    let mut u = m[0] + dx;
    let d2 = 2.0 * dx * dx - (m[1] - m[0]) * (m[1] - m[0]);
    if d2 >= 0.0 {
        u = u.min(0.5 * (m[0] + m[1] + d2.sqrt()));
    }
    let s = m[0] + m[1] + m[2];
    let d3 = s * s - 3.0 * (m[0] * m[0] + m[1] * m[1] + m[2] * m[2] - dx * dx);
    if d3 >= 0.0 {
        u = u.min((s + d3.sqrt()) / 3.0);
    }
    current.min(u)
}
