// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use sdfgen::io;
use sdfgen::level_set::{make_level_set3, Backend};
use sdfgen::mesh_io;
use sdfgen::{Grid3, GridSpec, TriMesh};

/// Closed axis-aligned cube spanning `[lo, hi]^3`, outward winding.
fn cube_mesh(lo: f32, hi: f32) -> TriMesh {
    let verts = vec![
        [lo, lo, lo],
        [hi, lo, lo],
        [hi, hi, lo],
        [lo, hi, lo],
        [lo, lo, hi],
        [hi, lo, hi],
        [hi, hi, hi],
        [lo, hi, hi],
    ];
    let tris = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [2, 3, 7],
        [2, 7, 6],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    TriMesh::new(verts, tris).unwrap()
}

/// The S1 configuration: unit cube in a 32^3 grid with 2 padding cells.
fn unit_cube_spec() -> (TriMesh, GridSpec) {
    let mesh = cube_mesh(-0.5, 0.5);
    let dx = 1.0 / 28.0;
    let origin = [-0.5 - 2.0 * dx; 3];
    let spec = GridSpec::new(origin, dx, 32, 32, 32).unwrap();
    (mesh, spec)
}

fn solve_cpu(mesh: &TriMesh, spec: &GridSpec, threads: usize) -> Grid3<f32> {
    make_level_set3(mesh, spec, 1, Backend::Cpu, threads)
        .unwrap()
        .phi
}

/// Unsigned distance from a point to the surface of the cube `[lo, hi]^3`.
fn cube_surface_distance(p: [f32; 3], lo: f32, hi: f32) -> f32 {
    let mut outside = 0.0f64;
    let mut max_inside = f64::NEG_INFINITY;
    for d in 0..3 {
        let c = p[d] as f64;
        let over = (lo as f64 - c).max(c - hi as f64);
        if over > 0.0 {
            outside += over * over;
        }
        max_inside = max_inside.max(over);
    }
    if outside > 0.0 {
        (outside.sqrt()) as f32
    } else {
        (-max_inside) as f32
    }
}

/// Test 1: Sign correctness on the unit cube (S1).
/// Every cell center strictly inside the cube is negative, every center
/// strictly outside is positive, excluding a one-cell layer at the surface.
#[test]
fn unit_cube_sign_correctness() {
    let (mesh, spec) = unit_cube_spec();
    let phi = solve_cpu(&mesh, &spec, 0);
    let margin = 1.5 * spec.dx;
    let mut checked = 0;
    for k in 0..32 {
        for j in 0..32 {
            for i in 0..32 {
                let c = spec.cell_center(i, j, k);
                let inside = c.iter().all(|&x| x > -0.5 + margin && x < 0.5 - margin);
                let outside = c.iter().any(|&x| x < -0.5 - margin || x > 0.5 + margin);
                let v = phi.get(i, j, k);
                if inside {
                    assert!(v < 0.0, "cell ({},{},{}) = {} should be inside", i, j, k, v);
                    checked += 1;
                } else if outside {
                    assert!(v > 0.0, "cell ({},{},{}) = {} should be outside", i, j, k, v);
                    checked += 1;
                }
            }
        }
    }
    assert!(checked > 15_000, "layer exclusion left too few cells");
}

/// S1 point checks: the grid center sits at the cube center, the grid
/// corner two diagonal cells off the cube corner.
#[test]
fn unit_cube_known_values() {
    let (mesh, spec) = unit_cube_spec();
    let phi = solve_cpu(&mesh, &spec, 0);
    let center = phi.get(16, 16, 16);
    assert!(
        (center + 0.5).abs() <= 0.5 * spec.dx,
        "center value {} not within 0.5 dx of -0.5",
        center
    );
    let corner = phi.get(0, 0, 0);
    let expect = 2.0 * 3.0f32.sqrt() * spec.dx;
    assert!(
        (corner - expect).abs() <= spec.dx,
        "corner value {} expected about {}",
        corner,
        expect
    );
}

/// Test 2: Magnitude correctness near the surface.
/// Within the exact band the absolute value matches the analytic cube
/// distance to float rounding.
#[test]
fn unit_cube_exact_band_magnitudes() {
    let (mesh, spec) = unit_cube_spec();
    let phi = solve_cpu(&mesh, &spec, 0);
    let band = spec.dx * 3.0f32.sqrt();
    let mut checked = 0;
    for k in 0..32 {
        for j in 0..32 {
            for i in 0..32 {
                let c = spec.cell_center(i, j, k);
                let d_true = cube_surface_distance(c, -0.5, 0.5);
                if d_true < band * 0.9 {
                    let err = (phi.get(i, j, k).abs() - d_true).abs();
                    assert!(
                        err <= 2e-6,
                        "cell ({},{},{}): |phi| = {}, true = {}",
                        i,
                        j,
                        k,
                        phi.get(i, j, k).abs(),
                        d_true
                    );
                    checked += 1;
                }
            }
        }
    }
    assert!(checked > 1_000, "band too thin: {} cells", checked);
}

/// Test 3: Lipschitz bound. Axis-adjacent signed values differ by at most
/// dx plus rounding slack.
#[test]
fn unit_cube_lipschitz_bound() {
    let (mesh, spec) = unit_cube_spec();
    let phi = solve_cpu(&mesh, &spec, 0);
    let tol = spec.dx + 1e-5;
    for k in 0..32 {
        for j in 0..32 {
            for i in 0..32 {
                if i + 1 < 32 {
                    assert!((phi.get(i, j, k) - phi.get(i + 1, j, k)).abs() <= tol);
                }
                if j + 1 < 32 {
                    assert!((phi.get(i, j, k) - phi.get(i, j + 1, k)).abs() <= tol);
                }
                if k + 1 < 32 {
                    assert!((phi.get(i, j, k) - phi.get(i, j, k + 1)).abs() <= tol);
                }
            }
        }
    }
}

/// Scenario S2: tetrahedron with unit legs. The centroid is inside; the far
/// corner (1,1,1) sees the slanted face at distance 2/sqrt(3).
#[test]
fn tetrahedron_signs_and_far_distance() {
    let verts = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    let tris = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
    let mesh = TriMesh::new(verts, tris).unwrap();
    let dx = 1.4 / 63.0;
    let spec = GridSpec::new([-0.2; 3], dx, 64, 64, 64).unwrap();
    let phi = solve_cpu(&mesh, &spec, 0);

    // Cell nearest the centroid (0.25, 0.25, 0.25).
    let ci = ((0.25 + 0.2) / dx).round() as usize;
    assert!(phi.get(ci, ci, ci) < 0.0, "centroid must be inside");

    // Cell whose center is exactly (1.0, 1.0, 1.0) at index 54.
    let far = phi.get(54, 54, 54);
    let expect = 2.0 / 3.0f32.sqrt();
    assert!(
        (far - expect).abs() <= 3.0 * dx,
        "far corner {} expected about {}",
        far,
        expect
    );
}

/// Scenario S3: a degenerate zero-thickness slab (two opposite-winding
/// triangles). Values stay finite and bounded; the doubled crossings cancel
/// so no cell is classified inside.
#[test]
fn thin_slab_is_finite() {
    let verts = vec![[0.0, 0.0, 0.5], [2.0, 0.0, 0.5], [0.0, 2.0, 0.5]];
    let tris = vec![[0, 1, 2], [0, 2, 1]];
    let mesh = TriMesh::new(verts, tris).unwrap();
    let spec = GridSpec::new([-0.5; 3], 0.25, 12, 12, 12).unwrap();
    let phi = solve_cpu(&mesh, &spec, 0);
    let bound = spec.upper_bound();
    for &v in phi.as_slice() {
        assert!(v.is_finite());
        assert!(v >= 0.0, "slab encloses no volume, got {}", v);
        assert!(v <= bound);
    }
}

/// Scenario S4 and test 6: thread/slice ratios and thread-count invariance.
/// A 10^3 grid with more workers than slices matches the single-thread run
/// bit for bit, as does an oversubscribed run on the S1 cube.
#[test]
fn thread_count_invariance() {
    let mesh = cube_mesh(-0.4, 0.4);
    let spec = GridSpec::new([-0.625; 3], 0.125, 10, 10, 10).unwrap();
    let phi_1 = solve_cpu(&mesh, &spec, 1);
    let phi_24 = solve_cpu(&mesh, &spec, 24);
    assert_eq!(phi_1.as_slice(), phi_24.as_slice());

    let (mesh, spec) = unit_cube_spec();
    let hw = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let a = solve_cpu(&mesh, &spec, 1);
    let b = solve_cpu(&mesh, &spec, hw);
    let c = solve_cpu(&mesh, &spec, 2 * hw);
    assert_eq!(a.as_slice(), b.as_slice());
    assert_eq!(a.as_slice(), c.as_slice());
}

/// Scenario S5: a grid thinner than the exact band still produces a valid
/// field with no out-of-bounds access and no NaN.
#[test]
fn thin_grid_dimension() {
    let mesh = cube_mesh(-0.5, 0.5);
    let spec = GridSpec::new([-0.75, -0.75, -0.1], 0.125, 13, 13, 3).unwrap();
    let phi = solve_cpu(&mesh, &spec, 4);
    for &v in phi.as_slice() {
        assert!(!v.is_nan());
        assert!(v.abs() <= spec.upper_bound());
    }
}

/// Scenario S6: translating mesh and grid by a large exactly-representable
/// offset leaves the field unchanged, because the geometry works on
/// coordinate differences. 4096 keeps every shifted coordinate exact in
/// f32, making the comparison bitwise instead of rounding-limited.
#[test]
fn large_translation_preserves_field() {
    let dx = 1.0 / 32.0;
    let mesh_a = cube_mesh(-0.5, 0.5);
    let spec_a = GridSpec::new([-0.5 - 2.0 * dx; 3], dx, 36, 36, 36).unwrap();
    let phi_a = solve_cpu(&mesh_a, &spec_a, 0);

    let t = 4096.0;
    let mesh_b = mesh_a.translated([t, t, t]);
    let origin_b = [-0.5 - 2.0 * dx + t; 3];
    let spec_b = GridSpec::new(origin_b, dx, 36, 36, 36).unwrap();
    let phi_b = solve_cpu(&mesh_b, &spec_b, 0);

    assert_eq!(phi_a.as_slice(), phi_b.as_slice());
}

/// Test 5: triangulation invariance. The same cube loaded as OBJ triangles
/// and as OBJ quads (fan-triangulated by the loader) gives the same field.
#[test]
fn obj_quads_match_triangles() {
    let tri_obj = "\
v -0.5 -0.5 -0.5\nv 0.5 -0.5 -0.5\nv 0.5 0.5 -0.5\nv -0.5 0.5 -0.5\n\
v -0.5 -0.5 0.5\nv 0.5 -0.5 0.5\nv 0.5 0.5 0.5\nv -0.5 0.5 0.5\n\
f 1 3 2\nf 1 4 3\nf 5 6 7\nf 5 7 8\nf 1 2 6\nf 1 6 5\n\
f 3 4 8\nf 3 8 7\nf 1 5 8\nf 1 8 4\nf 2 3 7\nf 2 7 6\n";
    let quad_obj = "\
v -0.5 -0.5 -0.5\nv 0.5 -0.5 -0.5\nv 0.5 0.5 -0.5\nv -0.5 0.5 -0.5\n\
v -0.5 -0.5 0.5\nv 0.5 -0.5 0.5\nv 0.5 0.5 0.5\nv -0.5 0.5 0.5\n\
f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 3 4 8 7\nf 1 5 8 4\nf 2 3 7 6\n";

    let write = |name: &str, contents: &str| -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    };
    let tri_path = write("sdfgen_verif_tris.obj", tri_obj);
    let quad_path = write("sdfgen_verif_quads.obj", quad_obj);
    let mesh_tri = mesh_io::load_mesh(&tri_path).unwrap();
    let mesh_quad = mesh_io::load_mesh(&quad_path).unwrap();
    std::fs::remove_file(&tri_path).ok();
    std::fs::remove_file(&quad_path).ok();

    assert_eq!(mesh_quad.triangles.len(), 12);

    let dx = 1.0 / 28.0;
    let spec = GridSpec::new([-0.5 - 2.0 * dx; 3], dx, 32, 32, 32).unwrap();
    let phi_tri = solve_cpu(&mesh_tri, &spec, 0);
    let phi_quad = solve_cpu(&mesh_quad, &spec, 0);
    let tol = 1e-5 * dx;
    for (a, b) in phi_tri.as_slice().iter().zip(phi_quad.as_slice()) {
        assert!((a - b).abs() <= tol);
    }
}

/// Test 7: file round-trip. Dimensions are preserved exactly and values bit
/// for bit.
#[test]
fn sdf_file_roundtrip() {
    let (mesh, spec) = unit_cube_spec();
    let phi = solve_cpu(&mesh, &spec, 0);
    let path = std::env::temp_dir().join("sdfgen_verif_roundtrip.sdf");
    io::write_sdf(&path, &phi, spec.origin, spec.dx).unwrap();
    let (loaded, min_box, max_box) = io::read_sdf(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.shape(), (32, 32, 32));
    assert_eq!(loaded.as_slice(), phi.as_slice());
    assert_eq!(min_box, spec.origin);
    // Consumers reconstruct dx from the box extents.
    let dx_back = (max_box[0] - min_box[0]) / 32.0;
    assert!((dx_back - spec.dx).abs() < 1e-6);
}

/// Test 4: back-end agreement. Runs only where a device is present: signs
/// match on every cell and values agree within the documented tolerance.
#[test]
fn backend_agreement_when_accelerator_present() {
    if !sdfgen::is_accelerator_available() {
        return;
    }
    let (mesh, spec) = unit_cube_spec();
    let cpu = solve_cpu(&mesh, &spec, 0);
    let acc = make_level_set3(&mesh, &spec, 1, Backend::Accelerator, 0)
        .unwrap()
        .phi;
    let mut max_diff = 0.0f32;
    for (a, b) in cpu.as_slice().iter().zip(acc.as_slice()) {
        // Sign agreement away from the surface; within one cell of it the
        // two predicate precisions (f64 on CPU, f32 on device) may resolve
        // grazing crossings differently.
        if a.abs() > spec.dx {
            assert!(
                (*a >= 0.0) == (*b >= 0.0),
                "sign mismatch: cpu = {}, accel = {}",
                a,
                b
            );
        }
        max_diff = max_diff.max((a - b).abs());
    }
    assert!(
        max_diff <= 25.0 * spec.dx,
        "max backend difference {} exceeds 25 dx",
        max_diff
    );
}

/// Requesting the accelerator on a machine without one is a clean error.
#[test]
fn accelerator_request_errors_without_device() {
    if sdfgen::is_accelerator_available() {
        return;
    }
    let (mesh, spec) = unit_cube_spec();
    assert!(matches!(
        make_level_set3(&mesh, &spec, 1, Backend::Accelerator, 0),
        Err(sdfgen::SdfError::AcceleratorUnavailable)
    ));
}

/// Auto dispatch always resolves to a concrete backend and succeeds.
#[test]
fn auto_backend_resolves() {
    let (mesh, spec) = unit_cube_spec();
    let ls = make_level_set3(&mesh, &spec, 1, Backend::Auto, 0).unwrap();
    assert_ne!(ls.backend, Backend::Auto);
}
