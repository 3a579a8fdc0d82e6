use thiserror::Error;

/// Errors originating from the iteration backends and the coloring pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid {channel} range [{min}, {max}] (must satisfy 0 <= min <= max <= 1)")]
    InvalidChannelRange {
        channel: &'static str,
        min: f64,
        max: f64,
    },

    #[error("invalid worker count: {0} (must be >= 1)")]
    InvalidWorkerCount(usize),

    #[error("field size mismatch: expected {expected} points, got {actual}")]
    FieldSizeMismatch { expected: usize, actual: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("gpu backend: {0}")]
    Gpu(String),

    #[error(transparent)]
    Core(#[from] smoothbrot_core::CoreError),
}
