use tracing::debug;

use crate::complex::Complex;
use crate::view::View;

/// `count` evenly spaced samples over `[start, stop]`, both endpoints
/// included. A single sample is `start`.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut samples: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            // Pin the last sample so rounding in `step` can't undershoot the bound.
            samples[count - 1] = stop;
            samples
        }
    }
}

/// The sample lattice for a [`View`].
///
/// Row `i` runs along the real axis at height `imag_axis[i]`; column `j`
/// sits at `real_axis[j]`. Points are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    resolution: usize,
    real_axis: Vec<f64>,
    imag_axis: Vec<f64>,
    points: Vec<Complex>,
}

impl Grid {
    /// Build the outer-product grid `real_axis[j] + i·imag_axis[i]`.
    pub fn generate(view: &View) -> Self {
        let n = view.resolution() as usize;
        let (re_min, re_max) = view.re_bounds();
        let (im_min, im_max) = view.im_bounds();
        let real_axis = linspace(re_min, re_max, n);
        let imag_axis = linspace(im_min, im_max, n);

        let points = imag_axis
            .iter()
            .flat_map(|&im| real_axis.iter().map(move |&re| Complex::new(re, im)))
            .collect();

        debug!(resolution = n, "Generated sample grid");
        Self {
            resolution: n,
            real_axis,
            imag_axis,
            points,
        }
    }

    /// Samples per axis.
    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn real_axis(&self) -> &[f64] {
        &self.real_axis
    }

    pub fn imag_axis(&self) -> &[f64] {
        &self.imag_axis
    }

    /// All samples, flattened row-major.
    pub fn points(&self) -> &[Complex] {
        &self.points
    }

    /// The sample at `row` (imaginary index) and `col` (real index).
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Complex {
        self.points[row * self.resolution + col]
    }

    /// Consume the grid, returning `(points, real_axis, imag_axis)`.
    pub fn into_parts(self) -> (Vec<Complex>, Vec<f64>, Vec<f64>) {
        (self.points, self.real_axis, self.imag_axis)
    }
}

/// Free-function form of [`Grid::generate`] returning the grid together with
/// copies of its axes.
pub fn generate_grid(view: &View) -> (Grid, Vec<f64>, Vec<f64>) {
    let grid = Grid::generate(view);
    let re = grid.real_axis.clone();
    let im = grid.imag_axis.clone();
    (grid, re, im)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::IterationParams;

    fn view(re: (f64, f64), im: (f64, f64), resolution: u32) -> View {
        View::new(re, im, resolution, IterationParams::default()).unwrap()
    }

    #[test]
    fn linspace_includes_endpoints() {
        let s = linspace(-2.0, 1.0, 4);
        assert_eq!(s, vec![-2.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn linspace_single_and_empty() {
        assert_eq!(linspace(0.5, 9.0, 1), vec![0.5]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn linspace_last_sample_is_exact() {
        let s = linspace(-3.0, 1.5, 1000);
        assert_eq!(s.len(), 1000);
        assert_eq!(s[0], -3.0);
        assert_eq!(s[999], 1.5);
    }

    #[test]
    fn grid_is_outer_product_of_axes() {
        let (grid, re, im) = generate_grid(&view((-2.0, 1.0), (-1.5, 1.5), 7));
        assert_eq!(grid.points().len(), 49);
        for (i, &y) in im.iter().enumerate() {
            for (j, &x) in re.iter().enumerate() {
                assert_eq!(grid.at(i, j), Complex::new(x, y));
            }
        }
    }

    #[test]
    fn axes_are_strictly_increasing_and_even() {
        let grid = Grid::generate(&view((-0.75, -0.70), (0.10, 0.13), 33));
        for axis in [grid.real_axis(), grid.imag_axis()] {
            assert_eq!(axis.len(), 33);
            let step = axis[1] - axis[0];
            for pair in axis.windows(2) {
                assert!(pair[1] > pair[0]);
                assert!(((pair[1] - pair[0]) - step).abs() < 1e-12);
            }
        }
        assert_eq!(grid.real_axis()[0], -0.75);
        assert_eq!(grid.imag_axis()[32], 0.13);
    }

    #[test]
    fn single_sample_grid() {
        let grid = Grid::generate(&view((-1.0, 1.0), (2.0, 3.0), 1));
        assert_eq!(grid.points(), &[Complex::new(-1.0, 2.0)]);
    }
}
