use crate::complex::Complex;
use crate::params::IterationParams;

/// Per-point state of the escape-time recurrence.
///
/// `value` and `derivative` freeze the moment `|value|` exceeds the escape
/// radius. `iteration_count` is the index of the last active step, or the
/// iteration cap for points that never escaped (see [`OrbitState::finish`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    /// Last computed iterate `z_n`.
    pub value: Complex,
    pub iteration_count: u32,
    /// `dz_n/dc`, accumulated by the chain rule.
    pub derivative: Complex,
}

impl OrbitState {
    /// `z₀ = 0`, `dz₀/dc = 0`.
    pub const INITIAL: Self = Self {
        value: Complex::ZERO,
        iteration_count: 0,
        derivative: Complex::ZERO,
    };

    /// Advance one step of `z ↦ z² + c` as iteration `j`.
    ///
    /// Returns `false` without touching the state if the point has already
    /// escaped. The derivative is updated from the current value before the
    /// value itself moves on.
    #[inline]
    pub fn step(&mut self, c: Complex, j: u32, escape_radius_sq: f64) -> bool {
        if self.value.norm_sq() > escape_radius_sq {
            return false;
        }
        self.derivative = self.value * self.derivative * 2.0 + Complex::ONE;
        self.value = self.value.square() + c;
        self.iteration_count = j;
        true
    }

    /// Whether `|value|` lies beyond the escape radius.
    #[inline]
    pub fn has_escaped(&self, params: &IterationParams) -> bool {
        self.value.norm_sq() > params.escape_radius_sq()
    }

    /// Close out a run: points still inside the radius carry the cap as
    /// their count, the sentinel for "interior".
    #[inline]
    pub fn finish(&mut self, params: &IterationParams) {
        if !self.has_escaped(params) {
            self.iteration_count = params.iteration_cap();
        }
    }

    /// `true` if this state carries the interior sentinel.
    #[inline]
    pub fn is_interior(&self, params: &IterationParams) -> bool {
        self.iteration_count == params.iteration_cap()
    }
}

impl Default for OrbitState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Run the full recurrence for one parameter `c`.
///
/// Breaking out at the first inactive step is equivalent to continuing,
/// since an escaped state never changes again.
#[inline]
pub fn iterate_point(c: Complex, params: &IterationParams) -> OrbitState {
    let escape_radius_sq = params.escape_radius_sq();
    let mut state = OrbitState::INITIAL;
    for j in 0..params.iteration_cap() {
        if !state.step(c, j, escape_radius_sq) {
            break;
        }
    }
    state.finish(params);
    state
}
