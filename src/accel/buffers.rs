// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Device buffer layouts and transfers for the accelerator backend.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::{Buffer, BufferUsages};

use crate::accel::context::GpuContext;
use crate::error::{Result, SdfError};
use crate::grid::GridSpec;
use crate::mesh::TriMesh;

/// Uniform parameters shared by all three kernels. 48 bytes, vec4-aligned.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuParams {
    /// Grid origin (cell (0,0,0) center); w unused.
    pub origin: [f32; 4],
    /// Grid dimensions (nx, ny, nz, 0).
    pub dims: [u32; 4],
    /// Uniform cell edge length.
    pub dx: f32,
    /// Number of triangles bound.
    pub triangle_count: u32,
    /// Exact-band width in cells.
    pub exact_band: i32,
    _pad: u32,
}

impl GpuParams {
    /// Build the uniform block for a mesh/grid pair.
    pub fn new(spec: &GridSpec, triangle_count: u32, exact_band: u32) -> Self {
        GpuParams {
            origin: [spec.origin[0], spec.origin[1], spec.origin[2], 0.0],
            dims: [spec.nx as u32, spec.ny as u32, spec.nz as u32, 0],
            dx: spec.dx,
            triangle_count,
            exact_band: exact_band as i32,
            _pad: 0,
        }
    }
}

/// One triangle with expanded corner positions, 48 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuTriangle {
    /// First corner; w unused.
    pub v0: [f32; 4],
    /// Second corner; w unused.
    pub v1: [f32; 4],
    /// Third corner; w unused.
    pub v2: [f32; 4],
}

/// All device buffers for one level-set computation.
pub struct SdfBuffers {
    /// Uniform parameter block.
    pub params: Buffer,
    /// Expanded triangle corners, read-only storage.
    pub triangles: Buffer,
    /// Distance bit patterns, ping buffer (also narrow-band target).
    pub phi_a: Buffer,
    /// Distance bit patterns, pong buffer.
    pub phi_b: Buffer,
    /// Ray-crossing counts (zero-initialized by the device).
    pub crossings: Buffer,
    /// Total cell count.
    pub num_cells: usize,
}

impl SdfBuffers {
    /// Upload the mesh and allocate the grid buffers.
    ///
    /// # Errors
    /// Returns an error when the grid or mesh exceeds the device's storage
    /// binding limit.
    pub fn allocate(
        ctx: &GpuContext,
        mesh: &TriMesh,
        spec: &GridSpec,
        exact_band: u32,
    ) -> Result<Self> {
        let num_cells = spec.num_cells();
        let cell_bytes = (num_cells * std::mem::size_of::<f32>()) as u64;
        let tri_bytes = (mesh.num_triangles() * std::mem::size_of::<GpuTriangle>()) as u64;
        let max = ctx.max_storage_buffer_size() as u64;
        if cell_bytes > max {
            return Err(SdfError::AcceleratorExecution(format!(
                "grid of {} cells needs {} bytes per buffer, device limit is {}",
                num_cells, cell_bytes, max
            )));
        }
        if tri_bytes > max {
            return Err(SdfError::AcceleratorExecution(format!(
                "mesh of {} triangles needs {} bytes, device limit is {}",
                mesh.num_triangles(),
                tri_bytes,
                max
            )));
        }

        let gpu_params = GpuParams::new(spec, mesh.num_triangles() as u32, exact_band);
        let params = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sdf_params"),
                contents: bytemuck::bytes_of(&gpu_params),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            });

        let expanded: Vec<GpuTriangle> = mesh
            .triangles
            .iter()
            .map(|tri| {
                let v0 = mesh.vertices[tri[0] as usize];
                let v1 = mesh.vertices[tri[1] as usize];
                let v2 = mesh.vertices[tri[2] as usize];
                GpuTriangle {
                    v0: [v0[0], v0[1], v0[2], 0.0],
                    v1: [v1[0], v1[1], v1[2], 0.0],
                    v2: [v2[0], v2[1], v2[2], 0.0],
                }
            })
            .collect();
        let triangles = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sdf_triangles"),
                contents: bytemuck::cast_slice(&expanded),
                usage: BufferUsages::STORAGE,
            });

        let phi_a = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sdf_phi_a"),
            size: cell_bytes,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let phi_b = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sdf_phi_b"),
            size: cell_bytes,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let crossings = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sdf_crossings"),
            size: cell_bytes,
            usage: BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        // Seed every cell with the sentinel distance before the narrow-band
        // kernel runs; crossings rely on zero initialization.
        let sentinel = spec.upper_bound().to_bits();
        ctx.queue
            .write_buffer(&phi_a, 0, bytemuck::cast_slice(&vec![sentinel; num_cells]));

        Ok(SdfBuffers {
            params,
            triangles,
            phi_a,
            phi_b,
            crossings,
            num_cells,
        })
    }

    /// Download a distance buffer's contents as `f32` values.
    pub fn download_phi(&self, ctx: &GpuContext, buffer: &Buffer) -> Result<Vec<f32>> {
        let buffer_size = buffer.size();
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sdf_staging"),
            size: buffer_size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_download"),
            });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, buffer_size);
        ctx.queue.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| SdfError::AcceleratorExecution("readback channel closed".into()))?
            .map_err(|e| SdfError::AcceleratorExecution(format!("buffer mapping failed: {e:?}")))?;

        let data = slice.get_mapped_range();
        let values: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        Ok(values)
    }
}
