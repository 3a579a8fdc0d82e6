pub mod complex;
pub mod error;
pub mod grid;
pub mod orbit;
pub mod params;
pub mod view;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use grid::{generate_grid, linspace, Grid};
pub use orbit::{iterate_point, OrbitState};
pub use params::IterationParams;
pub use view::View;

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
