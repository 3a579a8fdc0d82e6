use smoothbrot_core::{IterationParams, OrbitState};

use crate::error::RenderError;

/// Per-point [`OrbitState`] for a full `resolution × resolution` frame.
///
/// This is the raw output of an iteration backend, reshaped to the grid.
/// Keeping it separate from colors lets callers recolor with new channel
/// ranges without iterating again.
#[derive(Debug, Clone)]
pub struct OrbitField {
    pub resolution: usize,
    pub params: IterationParams,
    pub states: Vec<OrbitState>,
}

impl OrbitField {
    /// Wrap a flat, row-major state vector. Its length must be `resolution²`.
    pub fn new(
        resolution: usize,
        params: IterationParams,
        states: Vec<OrbitState>,
    ) -> crate::Result<Self> {
        let expected = resolution * resolution;
        if states.len() != expected {
            return Err(RenderError::FieldSizeMismatch {
                expected,
                actual: states.len(),
            });
        }
        Ok(Self {
            resolution,
            params,
            states,
        })
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> &OrbitState {
        &self.states[row * self.resolution + col]
    }

    /// Number of points carrying the iteration-cap sentinel.
    pub fn interior_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| s.is_interior(&self.params))
            .count()
    }
}
