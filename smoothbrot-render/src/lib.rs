pub mod backend;
pub mod buffer;
pub mod color;
pub mod dwell;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod hsv;
pub mod orbit_field;
pub mod pipeline;

pub use backend::{available_workers, partition, BackendKind, CpuBackend, IterationBackend};
pub use buffer::ColorField;
pub use color::{brightness, colorize, distance_estimate, ChannelRange, ColorRanges};
pub use dwell::{continuous_dwell, smooth, DwellField};
pub use error::RenderError;
#[cfg(feature = "gpu")]
pub use gpu::GpuBackend;
pub use orbit_field::OrbitField;
pub use pipeline::{create_backend, render, Pipeline, RenderResult};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
