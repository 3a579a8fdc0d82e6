use crate::error::CoreError;
use crate::params::IterationParams;

/// A rectangular region of the complex plane plus the sampling and
/// iteration settings for one render.
///
/// Views are validated on construction and immutable afterwards. Zooming or
/// panning produces a new `View` through [`View::with_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct View {
    re_min: f64,
    re_max: f64,
    im_min: f64,
    im_max: f64,
    /// Samples per axis; the grid is `resolution × resolution`.
    resolution: u32,
    #[serde(flatten)]
    params: IterationParams,
}

impl<'de> serde::Deserialize<'de> for View {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            re_min: f64,
            re_max: f64,
            im_min: f64,
            im_max: f64,
            resolution: u32,
            iteration_cap: u32,
            escape_radius: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        IterationParams::new(raw.iteration_cap, raw.escape_radius)
            .and_then(|params| {
                Self::new(
                    (raw.re_min, raw.re_max),
                    (raw.im_min, raw.im_max),
                    raw.resolution,
                    params,
                )
            })
            .map_err(serde::de::Error::custom)
    }
}

fn check_axis(axis: &'static str, (min, max): (f64, f64)) -> crate::Result<()> {
    let invalid = |reason| CoreError::InvalidBounds {
        axis,
        min,
        max,
        reason,
    };
    if !min.is_finite() || !max.is_finite() {
        return Err(invalid("bounds must be finite"));
    }
    if min >= max {
        return Err(invalid("lower bound must be below upper bound"));
    }
    Ok(())
}

impl View {
    pub const DEFAULT_RE: (f64, f64) = (-3.0, 1.5);
    pub const DEFAULT_IM: (f64, f64) = (-1.25, 1.25);
    pub const DEFAULT_RESOLUTION: u32 = 1000;

    /// Create a view from real-axis bounds, imaginary-axis bounds, samples
    /// per axis and iteration parameters.
    pub fn new(
        re: (f64, f64),
        im: (f64, f64),
        resolution: u32,
        params: IterationParams,
    ) -> crate::Result<Self> {
        check_axis("real", re)?;
        check_axis("imaginary", im)?;
        if resolution < 1 {
            return Err(CoreError::InvalidResolution(resolution));
        }
        Ok(Self {
            re_min: re.0,
            re_max: re.1,
            im_min: im.0,
            im_max: im.1,
            resolution,
            params,
        })
    }

    /// The same sampling and iteration settings over a different rectangle.
    pub fn with_bounds(&self, re: (f64, f64), im: (f64, f64)) -> crate::Result<Self> {
        Self::new(re, im, self.resolution, self.params)
    }

    /// The same rectangle sampled at a different resolution.
    pub fn with_resolution(&self, resolution: u32) -> crate::Result<Self> {
        Self::new(self.re_bounds(), self.im_bounds(), resolution, self.params)
    }

    /// The same rectangle iterated with different parameters.
    pub fn with_params(&self, params: IterationParams) -> Self {
        Self { params, ..*self }
    }

    #[inline]
    pub fn re_bounds(&self) -> (f64, f64) {
        (self.re_min, self.re_max)
    }

    #[inline]
    pub fn im_bounds(&self) -> (f64, f64) {
        (self.im_min, self.im_max)
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn params(&self) -> &IterationParams {
        &self.params
    }

    #[inline]
    pub fn iteration_cap(&self) -> u32 {
        self.params.iteration_cap()
    }

    #[inline]
    pub fn escape_radius(&self) -> f64 {
        self.params.escape_radius()
    }

    /// Number of grid samples, `resolution²`.
    pub fn point_count(&self) -> usize {
        self.resolution as usize * self.resolution as usize
    }
}

impl Default for View {
    /// Default framing of the full set: `[-3, 1.5] × [-1.25, 1.25]`,
    /// 1000 samples per axis, 100 iterations, escape radius 2.
    fn default() -> Self {
        Self {
            re_min: Self::DEFAULT_RE.0,
            re_max: Self::DEFAULT_RE.1,
            im_min: Self::DEFAULT_IM.0,
            im_max: Self::DEFAULT_IM.1,
            resolution: Self::DEFAULT_RESOLUTION,
            params: IterationParams::default(),
        }
    }
}
