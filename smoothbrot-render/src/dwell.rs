use rayon::prelude::*;

use smoothbrot_core::OrbitState;

use crate::orbit_field::OrbitField;

/// Moduli at or below 1 are raised to this before the iterated logarithm,
/// which is undefined or infinite there.
pub const MODULUS_FLOOR: f64 = 1.0 + 1e-10;

#[inline]
fn log2_log2(x: f64) -> f64 {
    x.log2().log2()
}

/// Continuous dwell of a single orbit:
///
/// `n + log₂(log₂|z|) − log₂(log₂ R)`
///
/// where `n` is the iteration count, `z` the frozen value and `R` the escape
/// radius. The correction measures how far past the threshold the last
/// step overshot, which removes the banding of raw counts. Radii at or
/// below 1 get the same floor as the modulus so the result stays finite.
#[inline]
pub fn continuous_dwell(state: &OrbitState, escape_radius: f64) -> f64 {
    let modulus = state.value.norm();
    let modulus = if modulus <= 1.0 { MODULUS_FLOOR } else { modulus };
    let radius = escape_radius.max(MODULUS_FLOOR);
    state.iteration_count as f64 + log2_log2(modulus) - log2_log2(radius)
}

/// One continuous dwell value per grid point, row-major.
///
/// Interior points get a value too; the orbit field's iteration cap, not the
/// dwell magnitude, is what marks them as interior.
#[derive(Debug, Clone, PartialEq)]
pub struct DwellField {
    pub resolution: usize,
    pub values: Vec<f64>,
}

impl DwellField {
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.resolution + col]
    }

    /// `|dwell|` per point, the plain grayscale field.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.values.iter().map(|d| d.abs()).collect()
    }
}

/// Smooth every orbit of a field into a [`DwellField`].
pub fn smooth(orbits: &OrbitField) -> DwellField {
    let escape_radius = orbits.params.escape_radius();
    let values = orbits
        .states
        .par_iter()
        .map(|s| continuous_dwell(s, escape_radius))
        .collect();
    DwellField {
        resolution: orbits.resolution,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoothbrot_core::{iterate_point, Complex, IterationParams};

    fn state(value: Complex, iteration_count: u32) -> OrbitState {
        OrbitState {
            value,
            iteration_count,
            derivative: Complex::ONE,
        }
    }

    #[test]
    fn overshoot_equal_to_radius_adds_nothing() {
        let d = continuous_dwell(&state(Complex::new(2.0, 0.0), 7), 2.0);
        assert!((d - 7.0).abs() < 1e-12);
    }

    #[test]
    fn squared_radius_adds_one() {
        // log2(log2(R²)) - log2(log2(R)) = log2(2) = 1
        let d = continuous_dwell(&state(Complex::new(0.0, 16.0), 3), 4.0);
        assert!((d - 4.0).abs() < 1e-12);
    }

    #[test]
    fn small_modulus_is_clamped_to_finite() {
        for v in [Complex::ZERO, Complex::new(0.3, -0.4), Complex::new(1.0, 0.0)] {
            let d = continuous_dwell(&state(v, 100), 2.0);
            assert!(d.is_finite(), "dwell for |z| <= 1 must be finite, got {d}");
            assert!(d < 100.0);
        }
    }

    #[test]
    fn sub_unit_escape_radius_stays_finite() {
        let d = continuous_dwell(&state(Complex::new(0.9, 0.0), 1), 0.5);
        assert!(d.is_finite());
    }

    #[test]
    fn smoothing_removes_integer_steps() {
        // Neighbouring exterior points get close, non-integer dwells.
        let params = IterationParams::new(100, 1000.0).unwrap();
        let a = iterate_point(Complex::new(0.50, 0.50), &params);
        let b = iterate_point(Complex::new(0.50, 0.501), &params);
        let da = continuous_dwell(&a, 1000.0);
        let db = continuous_dwell(&b, 1000.0);
        assert!(da.fract() != 0.0 && db.fract() != 0.0);
        assert!((da - db).abs() < 1.0);
    }

    #[test]
    fn field_magnitudes_are_absolute() {
        let field = DwellField {
            resolution: 1,
            values: vec![-3.5],
        };
        assert_eq!(field.magnitudes(), vec![3.5]);
        assert_eq!(field.at(0, 0), -3.5);
    }
}
