use crate::error::CoreError;

/// Parameters controlling escape-time iteration.
///
/// The cached `escape_radius_sq` field is recomputed on deserialization, and
/// deserialized values go through the same validation as [`IterationParams::new`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct IterationParams {
    /// Number of steps each point is advanced before it is declared interior.
    iteration_cap: u32,

    /// Bailout radius. A point whose `|z|` exceeds this is frozen.
    escape_radius: f64,

    #[serde(skip)]
    escape_radius_sq: f64,
}

impl<'de> serde::Deserialize<'de> for IterationParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            iteration_cap: u32,
            escape_radius: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.iteration_cap, raw.escape_radius).map_err(serde::de::Error::custom)
    }
}

impl IterationParams {
    pub const DEFAULT_ITERATION_CAP: u32 = 100;
    pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

    pub fn new(iteration_cap: u32, escape_radius: f64) -> crate::Result<Self> {
        if iteration_cap < 1 {
            return Err(CoreError::InvalidIterationCap(iteration_cap));
        }
        if escape_radius <= 0.0 || !escape_radius.is_finite() {
            return Err(CoreError::InvalidEscapeRadius(escape_radius));
        }
        // The escape test compares against R², which must stay finite.
        let escape_radius_sq = escape_radius * escape_radius;
        if !escape_radius_sq.is_finite() {
            return Err(CoreError::EscapeRadiusOverflow(escape_radius));
        }
        Ok(Self {
            iteration_cap,
            escape_radius,
            escape_radius_sq,
        })
    }

    #[inline]
    pub fn iteration_cap(&self) -> u32 {
        self.iteration_cap
    }

    #[inline]
    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    /// Pre-computed squared escape radius for the inner loop.
    #[inline]
    pub fn escape_radius_sq(&self) -> f64 {
        self.escape_radius_sq
    }

    /// Return a copy with a different iteration cap.
    pub fn with_iteration_cap(self, iteration_cap: u32) -> crate::Result<Self> {
        Self::new(iteration_cap, self.escape_radius)
    }
}

impl Default for IterationParams {
    fn default() -> Self {
        Self {
            iteration_cap: Self::DEFAULT_ITERATION_CAP,
            escape_radius: Self::DEFAULT_ESCAPE_RADIUS,
            escape_radius_sq: Self::DEFAULT_ESCAPE_RADIUS * Self::DEFAULT_ESCAPE_RADIUS,
        }
    }
}
