// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Pure geometric primitives used by the narrow-band pass and the CPU sweep.
//!
//! Distances are computed in `f32` on coordinate differences, so uniformly
//! translating every input leaves the results unchanged. The 2D orientation
//! predicates run in `f64` and break exact-zero ties deterministically, so a
//! grid line crossing a shared triangle edge is counted exactly once.

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn norm(a: [f32; 3]) -> f32 {
    dot(a, a).sqrt()
}

/// Distance from point `p` to the segment `[a, b]`.
///
/// The projection parameter is clamped to `[0, 1]`. Segments shorter than
/// `1e-15` collapse to the point `a`.
pub fn point_segment_distance(p: [f32; 3], a: [f32; 3], b: [f32; 3]) -> f32 {
    let e = sub(b, a);
    let w = sub(p, a);
    let m2 = dot(e, e);
    if m2 < 1e-30 {
        return norm(w);
    }
    let mut t = dot(w, e) / m2;
    if t < 0.0 {
        t = 0.0;
    } else if t > 1.0 {
        t = 1.0;
    }
    norm([w[0] - t * e[0], w[1] - t * e[1], w[2] - t * e[2]])
}

/// Distance from point `p` to the triangle `(a, b, c)`.
///
/// Solves the 2x2 barycentric system for the projection of `p` onto the
/// triangle plane. If the projection lies inside, the distance to the
/// weighted point is returned; otherwise the largest non-negative weight
/// selects which two edges can contain the closest point.
pub fn point_triangle_distance(p: [f32; 3], a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f32 {
    let ac = sub(a, c);
    let bc = sub(b, c);
    let pc = sub(p, c);
    let m_ac = dot(ac, ac);
    let m_bc = dot(bc, bc);
    let d = dot(ac, bc);
    let invdet = 1.0 / (m_ac * m_bc - d * d).max(1e-30);
    let da = dot(ac, pc);
    let db = dot(bc, pc);
    // Barycentric weights of a, b, c for the projected point.
    let wa = invdet * (m_bc * da - d * db);
    let wb = invdet * (m_ac * db - d * da);
    let wc = 1.0 - wa - wb;
    if wa >= 0.0 && wb >= 0.0 && wc >= 0.0 {
        // wa*a + wb*b + wc*c - p, expressed through the edge vectors so the
        // subtraction happens before any large coordinates are combined.
        norm([
            wa * ac[0] + wb * bc[0] - pc[0],
            wa * ac[1] + wb * bc[1] - pc[1],
            wa * ac[2] + wb * bc[2] - pc[2],
        ])
    } else if wa > 0.0 {
        // Closest point cannot lie on edge b-c.
        point_segment_distance(p, a, b).min(point_segment_distance(p, a, c))
    } else if wb > 0.0 {
        // Closest point cannot lie on edge a-c.
        point_segment_distance(p, a, b).min(point_segment_distance(p, b, c))
    } else {
        // wc must be positive: closest point cannot lie on edge a-b.
        point_segment_distance(p, a, c).min(point_segment_distance(p, b, c))
    }
}

/// Robust orientation of the 2D triangle `(0, (x1,y1), (x2,y2))`.
///
/// Returns the sign (`1`, `-1`, or `0`) together with twice the signed area.
/// When the area is exactly zero the sign is decided by comparing `y` then
/// `x`, and is zero only when the two points coincide.
pub fn orient2d(x1: f64, y1: f64, x2: f64, y2: f64) -> (i32, f64) {
    let twice_signed_area = y1 * x2 - x1 * y2;
    let sign = if twice_signed_area > 0.0 {
        1
    } else if twice_signed_area < 0.0 {
        -1
    } else if y2 > y1 {
        1
    } else if y2 < y1 {
        -1
    } else if x1 > x2 {
        1
    } else if x1 < x2 {
        -1
    } else {
        0 // the two points coincide
    };
    (sign, twice_signed_area)
}

/// 2D point-in-triangle test with barycentric output.
///
/// Tests whether `(x0, y0)` lies in the triangle `((x1,y1), (x2,y2),
/// (x3,y3))` using three orientation predicates after translating the
/// vertices so the query point is the origin. Returns the normalized
/// barycentric coordinates on a hit, `None` otherwise (including the fully
/// degenerate case where the areas sum to zero).
#[allow(clippy::too_many_arguments)]
pub fn point_in_triangle_2d(
    x0: f64,
    y0: f64,
    mut x1: f64,
    mut y1: f64,
    mut x2: f64,
    mut y2: f64,
    mut x3: f64,
    mut y3: f64,
) -> Option<(f64, f64, f64)> {
    x1 -= x0;
    x2 -= x0;
    x3 -= x0;
    y1 -= y0;
    y2 -= y0;
    y3 -= y0;
    let (sign_a, mut a) = orient2d(x2, y2, x3, y3);
    if sign_a == 0 {
        return None;
    }
    let (sign_b, mut b) = orient2d(x3, y3, x1, y1);
    if sign_b != sign_a {
        return None;
    }
    let (sign_c, mut c) = orient2d(x1, y1, x2, y2);
    if sign_c != sign_a {
        return None;
    }
    let sum = a + b + c;
    if sum == 0.0 {
        return None;
    }
    a /= sum;
    b /= sum;
    c /= sum;
    Some((a, b, c))
}
