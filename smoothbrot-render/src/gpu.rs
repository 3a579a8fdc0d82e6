//! WGSL compute backend.
//!
//! Runs the same transition as [`OrbitState::step`] with one shader
//! invocation per point. The device works in single precision, so results
//! agree with [`CpuBackend`](crate::CpuBackend) up to `f32` rounding.

use std::num::NonZeroU64;
use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use smoothbrot_core::{Complex, IterationParams, OrbitState};

use crate::backend::IterationBackend;
use crate::error::RenderError;

const WORKGROUP_SIZE: u32 = 64;
const MAX_WORKGROUPS_PER_DIMENSION: u32 = 65_535;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GpuParams {
    count: u32,
    iteration_cap: u32,
    escape_radius_sq: f32,
    row_stride: u32,
}

/// Mirrors `State` in `escape.wgsl` (24 bytes, 8-byte aligned).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GpuState {
    value: [f32; 2],
    derivative: [f32; 2],
    iteration_count: u32,
    _pad: u32,
}

impl From<GpuState> for OrbitState {
    fn from(s: GpuState) -> Self {
        Self {
            value: Complex::new(s.value[0] as f64, s.value[1] as f64),
            iteration_count: s.iteration_count,
            derivative: Complex::new(s.derivative[0] as f64, s.derivative[1] as f64),
        }
    }
}

/// Workgroup counts `(x, y)` and the flat index stride of one `y` row.
///
/// Point counts beyond a single dispatch dimension spill into `y`.
fn dispatch_size(count: usize) -> (u32, u32, u32) {
    let groups = (count as u32).div_ceil(WORKGROUP_SIZE).max(1);
    let x = groups.min(MAX_WORKGROUPS_PER_DIMENSION);
    let y = groups.div_ceil(x);
    (x, y, x * WORKGROUP_SIZE)
}

/// `R²` in single precision. Radii whose square overflows `f32` would make
/// every orbit look interior, so they are refused.
fn single_precision_radius_sq(params: &IterationParams) -> crate::Result<f32> {
    let radius_sq = params.escape_radius_sq() as f32;
    if radius_sq.is_finite() {
        Ok(radius_sq)
    } else {
        Err(RenderError::Gpu(format!(
            "escape radius {} is too large for single precision",
            params.escape_radius()
        )))
    }
}

fn gpu_err(context: &str, e: impl std::fmt::Display) -> RenderError {
    RenderError::Gpu(format!("{context}: {e}"))
}

pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuBackend {
    /// Acquire an adapter and compile the kernel. Fails if no adapter is present.
    pub fn new() -> crate::Result<Self> {
        pollster::block_on(Self::init())
    }

    async fn init() -> crate::Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Gpu("no compatible adapter found".to_string()))?;
        info!(adapter = %adapter.get_info().name, "Using GPU adapter");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("smoothbrot-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(|e| gpu_err("device request failed", e))?;

        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("escape-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<GpuParams>() as u64),
                    },
                    count: None,
                },
                storage(1, true),
                storage(2, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("escape-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("escape-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/escape.wgsl").into()),
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("escape-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
        })
    }
}

impl IterationBackend for GpuBackend {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn iterate(
        &self,
        points: &[Complex],
        params: &IterationParams,
    ) -> crate::Result<Vec<OrbitState>> {
        let escape_radius_sq = single_precision_radius_sq(params)?;
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let (groups_x, groups_y, row_stride) = dispatch_size(points.len());
        debug!(points = points.len(), groups_x, groups_y, "Iterating on GPU");

        let gpu_params = GpuParams {
            count: points.len() as u32,
            iteration_cap: params.iteration_cap(),
            escape_radius_sq,
            row_stride,
        };
        let gpu_points: Vec<[f32; 2]> = points
            .iter()
            .map(|c| [c.re as f32, c.im as f32])
            .collect();
        let states_size = (points.len() * std::mem::size_of::<GpuState>()) as u64;

        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("escape-params"),
                contents: bytemuck::bytes_of(&gpu_params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let points_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("escape-points"),
                contents: bytemuck::cast_slice(&gpu_points),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let states_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("escape-states"),
            size: states_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("escape-readback"),
            size: states_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("escape-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: points_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: states_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("escape-encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("escape-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&states_buffer, 0, &readback_buffer, 0, states_size);
        self.queue.submit(Some(encoder.finish()));

        let slice = readback_buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| gpu_err("readback channel closed", e))?
            .map_err(|e| gpu_err("buffer mapping failed", e))?;

        let states = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, GpuState>(&data)
                .iter()
                .map(|&s| OrbitState::from(s))
                .collect()
        };
        readback_buffer.unmap();

        Ok(states)
    }
}
