// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Compute-pipeline orchestration for the accelerator backend.
//!
//! Three kernels run in sequence on one queue: the narrow-band kernel (one
//! invocation per triangle, atomic min/add commits), the Jacobi Eikonal
//! kernel (one invocation per cell, ping-pong buffers), and the parity sign
//! kernel (one invocation per `(j, k)` column). Dispatches within a pass are
//! implicitly ordered by the storage-buffer dependencies.

use tracing::{debug, info};
use wgpu::ComputePipeline;

use crate::accel::buffers::SdfBuffers;
use crate::accel::context::GpuContext;
use crate::error::{Result, SdfError};
use crate::grid::{Grid3, GridSpec};
use crate::mesh::TriMesh;

const NARROW_BAND_SHADER: &str = include_str!("shaders/narrow_band.wgsl");
const JACOBI_SHADER: &str = include_str!("shaders/jacobi.wgsl");
const SIGN_SHADER: &str = include_str!("shaders/sign.wgsl");

/// Invocations per workgroup in every kernel.
const WORKGROUP_SIZE: u32 = 64;

/// Jacobi iterations per unit of the largest grid extent. The product
/// `JACOBI_ROUNDS_PER_EXTENT * max(nx, ny, nz)` bounds how far a distance
/// front can travel; two rounds per extent covers every grid this crate
/// targets and is the knob to raise for extreme aspect ratios.
pub const JACOBI_ROUNDS_PER_EXTENT: usize = 2;

fn make_pipeline(ctx: &GpuContext, label: &str, source: &str, entry: &str) -> ComputePipeline {
    let shader = ctx
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
    ctx.device
        .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: None,
            module: &shader,
            entry_point: Some(entry),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        })
}

/// The three compiled kernels, reusable across invocations.
pub struct SdfPipelines {
    narrow_band: ComputePipeline,
    jacobi: ComputePipeline,
    sign: ComputePipeline,
}

impl SdfPipelines {
    /// Compile the kernels on the given context.
    pub fn new(ctx: &GpuContext) -> Self {
        debug!("compiling accelerator kernels");
        SdfPipelines {
            narrow_band: make_pipeline(ctx, "sdf_narrow_band", NARROW_BAND_SHADER, "narrow_band"),
            jacobi: make_pipeline(ctx, "sdf_jacobi", JACOBI_SHADER, "jacobi"),
            sign: make_pipeline(ctx, "sdf_sign", SIGN_SHADER, "sign_pass"),
        }
    }

    /// Run the full device pipeline and download the signed field.
    pub fn run(
        &self,
        ctx: &GpuContext,
        mesh: &TriMesh,
        spec: &GridSpec,
        exact_band: u32,
    ) -> Result<Grid3<f32>> {
        let buffers = SdfBuffers::allocate(ctx, mesh, spec, exact_band)?;
        let iterations = JACOBI_ROUNDS_PER_EXTENT * spec.max_extent();
        info!(
            cells = buffers.num_cells,
            triangles = mesh.num_triangles(),
            iterations,
            "computing level set on accelerator"
        );

        let bind = |pipeline: &ComputePipeline, entries: &[&wgpu::Buffer]| {
            let layout = pipeline.get_bind_group_layout(0);
            let entries: Vec<wgpu::BindGroupEntry> = entries
                .iter()
                .enumerate()
                .map(|(binding, buffer)| wgpu::BindGroupEntry {
                    binding: binding as u32,
                    resource: buffer.as_entire_binding(),
                })
                .collect();
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: None,
                layout: &layout,
                entries: &entries,
            })
        };

        let band_group = bind(
            &self.narrow_band,
            &[
                &buffers.params,
                &buffers.triangles,
                &buffers.phi_a,
                &buffers.crossings,
            ],
        );
        let jacobi_ab = bind(
            &self.jacobi,
            &[&buffers.params, &buffers.phi_a, &buffers.phi_b],
        );
        let jacobi_ba = bind(
            &self.jacobi,
            &[&buffers.params, &buffers.phi_b, &buffers.phi_a],
        );
        // The final distances sit in phi_a when the iteration count is even.
        let phi_final = if iterations % 2 == 0 {
            &buffers.phi_a
        } else {
            &buffers.phi_b
        };
        let sign_group = bind(&self.sign, &[&buffers.params, &buffers.crossings, phi_final]);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_compute"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("sdf_pipeline"),
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.narrow_band);
            pass.set_bind_group(0, &band_group, &[]);
            pass.dispatch_workgroups(
                (mesh.num_triangles() as u32).div_ceil(WORKGROUP_SIZE),
                1,
                1,
            );

            pass.set_pipeline(&self.jacobi);
            let cell_groups = (buffers.num_cells as u32).div_ceil(WORKGROUP_SIZE);
            for it in 0..iterations {
                let group = if it % 2 == 0 { &jacobi_ab } else { &jacobi_ba };
                pass.set_bind_group(0, group, &[]);
                pass.dispatch_workgroups(cell_groups, 1, 1);
            }

            pass.set_pipeline(&self.sign);
            pass.set_bind_group(0, &sign_group, &[]);
            pass.dispatch_workgroups(
                ((spec.ny * spec.nz) as u32).div_ceil(WORKGROUP_SIZE),
                1,
                1,
            );
        }
        ctx.queue.submit([encoder.finish()]);

        let values = buffers.download_phi(ctx, phi_final)?;
        for (index, &value) in values.iter().enumerate() {
            if value.is_nan() {
                return Err(SdfError::DistanceInvariant { index, value });
            }
        }
        Grid3::from_vec(spec.nx, spec.ny, spec.nz, values)
    }
}

/// Compute a signed distance field on the accelerator.
///
/// # Errors
/// [`SdfError::AcceleratorUnavailable`] when no device exists, or an
/// execution error from buffer limits or readback.
pub fn compute_level_set(mesh: &TriMesh, spec: &GridSpec, exact_band: u32) -> Result<Grid3<f32>> {
    let ctx = GpuContext::try_get()?;
    SdfPipelines::new(ctx).run(ctx, mesh, spec, exact_band)
}
