// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use sdfgen::io;
use sdfgen::level_set::{make_level_set3, Backend};
use sdfgen::mesh_io;
use sdfgen::GridSpec;

#[derive(Parser)]
#[command(
    name = "sdfgen",
    about = "Convert closed oriented triangle meshes into grid-based signed distance fields"
)]
struct Cli {
    /// Input mesh file (.obj or .stl)
    input: PathBuf,

    /// Grid cell size; dimensions follow from the mesh bounds plus padding
    #[arg(long, conflicts_with = "grid")]
    dx: Option<f32>,

    /// Exact grid dimensions, comma-separated (e.g. 128,128,64); the cell
    /// size is fitted to the mesh and the mesh is centered in the grid
    #[arg(long)]
    grid: Option<String>,

    /// Number of padding cells around the mesh bounds (minimum 1)
    #[arg(long, default_value = "1")]
    padding: u32,

    /// Width of the exact-distance band in cells
    #[arg(long, default_value = "1")]
    exact_band: u32,

    /// Execution backend
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Number of CPU worker threads (0 = hardware concurrency)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Output file (.sdf or .npy); defaults to the input stem + ".sdf"
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Auto,
    Cpu,
    Accelerator,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Backend {
        match arg {
            BackendArg::Auto => Backend::Auto,
            BackendArg::Cpu => Backend::Cpu,
            BackendArg::Accelerator => Backend::Accelerator,
        }
    }
}

fn parse_grid_arg(s: &str) -> Result<[usize; 3]> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("invalid --grid: expected comma-separated integers")?;
    if parts.len() != 3 {
        bail!("--grid has {} components but expects 3", parts.len());
    }
    Ok([parts[0], parts[1], parts[2]])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let padding = cli.padding.max(1);

    let mesh = mesh_io::load_mesh(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    let mesh_size = [
        mesh.max_box[0] - mesh.min_box[0],
        mesh.max_box[1] - mesh.min_box[1],
        mesh.max_box[2] - mesh.min_box[2],
    ];
    println!(
        "Loaded {}: {} vertices, {} triangles",
        cli.input.display(),
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    println!(
        "  Mesh bounds: ({}, {}, {}) to ({}, {}, {})",
        mesh.min_box[0],
        mesh.min_box[1],
        mesh.min_box[2],
        mesh.max_box[0],
        mesh.max_box[1],
        mesh.max_box[2]
    );

    // Two sizing modes: a fixed cell size with the grid grown around the
    // padded bounds, or fixed dimensions with the cell size fitted and the
    // mesh centered.
    let (origin, dx, sizes) = if let Some(dx) = cli.dx {
        if !dx.is_finite() || dx <= 0.0 {
            bail!("--dx must be positive, got {}", dx);
        }
        let pad = padding as f32 * dx;
        let origin = [
            mesh.min_box[0] - pad,
            mesh.min_box[1] - pad,
            mesh.min_box[2] - pad,
        ];
        let sizes = [
            ((mesh_size[0] + 2.0 * pad) / dx) as usize,
            ((mesh_size[1] + 2.0 * pad) / dx) as usize,
            ((mesh_size[2] + 2.0 * pad) / dx) as usize,
        ];
        (origin, dx, sizes)
    } else if let Some(grid) = &cli.grid {
        let sizes = parse_grid_arg(grid)?;
        for (axis, &n) in sizes.iter().enumerate() {
            if n <= 2 * padding as usize {
                bail!(
                    "--grid axis {} has {} cells, need more than 2 * padding = {}",
                    axis,
                    n,
                    2 * padding
                );
            }
        }
        // Fit the largest per-axis spacing so every dimension fits, then
        // center the mesh in the grid.
        let dx = (0..3)
            .map(|d| mesh_size[d] / (sizes[d] - 2 * padding as usize) as f32)
            .fold(f32::MIN, f32::max);
        if !dx.is_finite() || dx <= 0.0 {
            bail!("mesh is degenerate; cannot fit a grid spacing");
        }
        let origin = [
            (mesh.min_box[0] + mesh.max_box[0]) * 0.5 - sizes[0] as f32 * dx * 0.5,
            (mesh.min_box[1] + mesh.max_box[1]) * 0.5 - sizes[1] as f32 * dx * 0.5,
            (mesh.min_box[2] + mesh.max_box[2]) * 0.5 - sizes[2] as f32 * dx * 0.5,
        ];
        (origin, dx, sizes)
    } else {
        bail!("one of --dx or --grid is required");
    };

    let spec = GridSpec::new(origin, dx, sizes[0], sizes[1], sizes[2])
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    println!(
        "  Grid: {} x {} x {} cells, dx = {}",
        spec.nx, spec.ny, spec.nz, spec.dx
    );
    println!(
        "  Accelerator: {}",
        if sdfgen::is_accelerator_available() {
            "available"
        } else {
            "not detected"
        }
    );

    let start = std::time::Instant::now();
    let level_set = make_level_set3(&mesh, &spec, cli.exact_band, cli.backend.into(), cli.threads)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    println!(
        "Computed level set on {} backend in {:.2}s",
        level_set.backend,
        start.elapsed().as_secs_f64()
    );

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("sdf"));
    let inside = io::save_grid(&output, &level_set.phi, spec.origin, spec.dx)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("Wrote {}", output.display());
    if let Some(inside) = inside {
        let total = spec.num_cells();
        println!(
            "  Inside cells: {} / {} ({:.1}%)",
            inside,
            total,
            100.0 * inside as f64 / total as f64
        );
    }
    Ok(())
}
