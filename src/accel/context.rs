// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Lazy global accelerator context.
//!
//! The device and queue are initialized once on first use. When no adapter
//! can be acquired the context resolves to `None` and every accelerator
//! entry point reports [`SdfError::AcceleratorUnavailable`].

use std::sync::OnceLock;

use tracing::{debug, info, warn};
use wgpu::{Device, DeviceDescriptor, Instance, Queue, RequestAdapterOptions};

use crate::error::{Result, SdfError};

static GPU_CONTEXT: OnceLock<Option<GpuContext>> = OnceLock::new();

/// Device, queue, and adapter description for the accelerator backend.
///
/// The underlying wgpu objects are thread-safe; the context is shared for
/// the lifetime of the process.
pub struct GpuContext {
    /// Device used to create buffers and pipelines.
    pub device: Device,
    /// Queue used to submit command buffers.
    pub queue: Queue,
    /// Human-readable adapter description for logs.
    pub adapter_name: String,
    /// Device limits consulted when sizing buffers.
    pub limits: wgpu::Limits,
}

impl GpuContext {
    /// Get or initialize the global context. Returns `None` when no
    /// compatible device exists.
    pub fn get() -> Option<&'static Self> {
        GPU_CONTEXT
            .get_or_init(|| match pollster::block_on(Self::try_init()) {
                Ok(ctx) => {
                    info!(adapter = %ctx.adapter_name, "accelerator context initialized");
                    Some(ctx)
                }
                Err(e) => {
                    warn!("accelerator initialization failed: {}", e);
                    None
                }
            })
            .as_ref()
    }

    /// Like [`GpuContext::get`] but surfaces the unavailable case as an
    /// error.
    pub fn try_get() -> Result<&'static Self> {
        Self::get().ok_or(SdfError::AcceleratorUnavailable)
    }

    /// Whether a device can be (or has been) acquired.
    pub fn is_available() -> bool {
        Self::get().is_some()
    }

    async fn try_init() -> Result<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or(SdfError::AcceleratorUnavailable)?;

        let adapter_info = adapter.get_info();
        debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            "accelerator adapter found"
        );

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("sdfgen"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| SdfError::AcceleratorExecution(format!("device request failed: {e}")))?;

        let limits = device.limits();
        Ok(GpuContext {
            device,
            queue,
            adapter_name: format!("{} ({:?})", adapter_info.name, adapter_info.backend),
            limits,
        })
    }

    /// Maximum size of a single storage buffer binding.
    pub fn max_storage_buffer_size(&self) -> u32 {
        self.limits.max_storage_buffer_binding_size
    }
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("adapter_name", &self.adapter_name)
            .finish_non_exhaustive()
    }
}
