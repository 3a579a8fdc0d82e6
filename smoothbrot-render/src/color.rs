use std::f64::consts::TAU;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use smoothbrot_core::Complex;

use crate::buffer::{ColorField, WHITE};
use crate::dwell::DwellField;
use crate::error::RenderError;
use crate::hsv::hsv_to_rgb;
use crate::orbit_field::OrbitField;

/// Dwell spread that maps to a full hue sweep.
const BIG: f64 = 1e5;
const DISTANCE_EPSILON: f64 = 1e-10;
/// Octaves below pixel size over which brightness fades to black.
const FALLOFF_OCTAVES: f64 = 8.0;
/// Points whose dwell floor reaches this fraction of the image maximum are painted white.
const INTERIOR_FRACTION: f64 = 0.65;
const HUE_CYCLES: f64 = 10.0;
const ODD_BAND_VALUE: f64 = 0.85;
const ODD_BAND_RADIUS: f64 = 0.667;
const BAND_JITTER: f64 = 1e-4;

// ---------------------------------------------------------------------------
// Channel ranges
// ---------------------------------------------------------------------------

/// Target interval `[min, max] ⊂ [0, 1]` for one normalized HSV channel.
///
/// Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct ChannelRange {
    min: f64,
    max: f64,
}

impl ChannelRange {
    pub const FULL: Self = Self { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> crate::Result<Self> {
        Self::checked("channel", min, max)
    }

    fn checked(channel: &'static str, min: f64, max: f64) -> crate::Result<Self> {
        // Written so NaN fails the test.
        if !(0.0 <= min && min <= max && max <= 1.0) {
            return Err(RenderError::InvalidChannelRange { channel, min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// `t = 0` lands exactly on `min`, `t = 1` exactly on `max`.
    #[inline]
    fn lerp(&self, t: f64) -> f64 {
        self.min * (1.0 - t) + self.max * t
    }
}

impl TryFrom<[f64; 2]> for ChannelRange {
    type Error = RenderError;

    fn try_from([min, max]: [f64; 2]) -> crate::Result<Self> {
        Self::new(min, max)
    }
}

impl From<ChannelRange> for [f64; 2] {
    fn from(r: ChannelRange) -> Self {
        [r.min, r.max]
    }
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Target ranges for the hue, saturation and value channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRanges {
    pub hue: ChannelRange,
    pub saturation: ChannelRange,
    pub value: ChannelRange,
}

impl ColorRanges {
    pub fn new(hue: (f64, f64), saturation: (f64, f64), value: (f64, f64)) -> crate::Result<Self> {
        Ok(Self {
            hue: ChannelRange::checked("hue", hue.0, hue.1)?,
            saturation: ChannelRange::checked("saturation", saturation.0, saturation.1)?,
            value: ChannelRange::checked("value", value.0, value.1)?,
        })
    }

    fn channels(&self) -> [ChannelRange; 3] {
        [self.hue, self.saturation, self.value]
    }
}

// ---------------------------------------------------------------------------
// Per-point shading
// ---------------------------------------------------------------------------

/// Distance-to-boundary estimate from the dwell and the orbit derivative:
/// `|ln(dwell²)| · |dwell| / (|dz/dc| + ε)`.
///
/// A zero dwell gives a zero distance rather than `0 · ∞`.
#[inline]
pub fn distance_estimate(dwell: f64, derivative: Complex) -> f64 {
    let dwell_sq = (dwell * dwell).max(f64::MIN_POSITIVE);
    dwell_sq.ln().abs() * dwell.abs() / (derivative.norm() + DISTANCE_EPSILON)
}

/// Brightness ramp over `dscale = log₂(distance / resolution)`.
///
/// Full brightness above pixel scale, a linear fade across the next eight
/// octaves, black below. Non-finite input is black.
#[inline]
pub fn brightness(dscale: f64) -> f64 {
    if dscale > 0.0 {
        1.0
    } else if dscale > -FALLOFF_OCTAVES {
        (FALLOFF_OCTAVES + dscale) / FALLOFF_OCTAVES
    } else {
        0.0
    }
}

#[inline]
fn is_odd(dwell_floor: f64) -> bool {
    dwell_floor.rem_euclid(2.0) == 1.0
}

/// Unnormalized `[hue, saturation, value]` for one point.
fn raw_hsv(dwell: f64, derivative: Complex, min_floor: f64, resolution: f64) -> [f64; 3] {
    let dwell_floor = dwell.floor();
    let fractional_radius = dwell - dwell_floor;
    let angle = Complex::new(dwell, 0.0).arg();

    let dscale = (distance_estimate(dwell, derivative) / resolution).log2();
    let mut value = brightness(dscale);

    // Log-scaled position in the dwell range, folded around 0.5.
    let p = (dwell_floor - min_floor).ln_1p() / BIG.ln();
    let (p, mut angle_component) = if p < 0.5 {
        let p = 1.0 - 1.5 * p;
        (p, 1.0 - p)
    } else {
        let p = 1.5 * p - 0.5;
        (p, p)
    };
    let mut radius = p.sqrt();

    angle_component += BAND_JITTER * (fractional_radius + angle / TAU);

    if is_odd(dwell_floor) {
        value *= ODD_BAND_VALUE;
        radius *= ODD_BAND_RADIUS;
    }

    [
        (HUE_CYCLES * angle_component).rem_euclid(1.0),
        radius.rem_euclid(1.0),
        value,
    ]
}

/// Map each channel affinely so its observed minimum lands on the range
/// minimum and its maximum on the range maximum. A flat channel collapses to
/// the range minimum.
fn normalize(samples: &mut [[f64; 3]], ranges: &ColorRanges) {
    for (ch, range) in ranges.channels().into_iter().enumerate() {
        let (lo, hi) = samples
            .iter()
            .map(|s| s[ch])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        let span = hi - lo;
        let flat = !(span > 0.0 && span.is_finite());
        samples.par_iter_mut().for_each(|s| {
            s[ch] = if flat {
                range.min
            } else {
                range.lerp((s[ch] - lo) / span)
            };
        });
    }
}

// ---------------------------------------------------------------------------
// Field coloring
// ---------------------------------------------------------------------------

/// Shade a whole frame.
///
/// Brightness comes from the distance estimate, hue and saturation from the
/// log-scaled dwell floor, and odd dwell bands are dimmed. Every HSV channel
/// is then normalized across the image into `ranges` before conversion to
/// RGB. Points whose dwell floor is at least 65% of the image maximum are
/// painted white.
pub fn colorize(
    dwell: &DwellField,
    orbits: &OrbitField,
    ranges: &ColorRanges,
) -> crate::Result<ColorField> {
    if dwell.resolution != orbits.resolution || dwell.values.len() != orbits.states.len() {
        return Err(RenderError::FieldSizeMismatch {
            expected: orbits.states.len(),
            actual: dwell.values.len(),
        });
    }
    let resolution = dwell.resolution;
    if dwell.values.is_empty() {
        return Ok(ColorField {
            resolution,
            pixels: Vec::new(),
        });
    }

    let (min_floor, max_floor) = dwell
        .values
        .iter()
        .map(|d| d.floor())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
            (lo.min(f), hi.max(f))
        });

    let mut hsv: Vec<[f64; 3]> = dwell
        .values
        .par_iter()
        .zip(orbits.states.par_iter())
        .map(|(&d, s)| raw_hsv(d, s.derivative, min_floor, resolution as f64))
        .collect();
    // Normalize in HSV, then convert: the ranges bound hue, saturation and
    // value, not the RGB channels.
    normalize(&mut hsv, ranges);

    let threshold = INTERIOR_FRACTION * max_floor;
    let pixels: Vec<[f64; 3]> = hsv
        .par_iter()
        .zip(dwell.values.par_iter())
        .map(|(&c, &d)| {
            if d.floor() >= threshold {
                WHITE
            } else {
                hsv_to_rgb(c)
            }
        })
        .collect();

    debug!(
        resolution,
        min_floor,
        max_floor,
        white = pixels.iter().filter(|&&p| p == WHITE).count(),
        "Colorized dwell field"
    );

    Ok(ColorField { resolution, pixels })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use smoothbrot_core::{IterationParams, OrbitState};

    fn fields(dwells: Vec<f64>, derivative: Complex) -> (DwellField, OrbitField) {
        let resolution = (dwells.len() as f64).sqrt() as usize;
        let states = vec![
            OrbitState {
                value: Complex::new(3.0, 0.0),
                iteration_count: 1,
                derivative,
            };
            dwells.len()
        ];
        let orbits = OrbitField::new(resolution, IterationParams::default(), states).unwrap();
        (
            DwellField {
                resolution,
                values: dwells,
            },
            orbits,
        )
    }

    #[test]
    fn channel_range_validation() {
        assert!(ChannelRange::new(0.0, 1.0).is_ok());
        assert!(ChannelRange::new(0.4, 0.4).is_ok());
        assert!(ChannelRange::new(0.6, 0.2).is_err());
        assert!(ChannelRange::new(-0.1, 0.5).is_err());
        assert!(ChannelRange::new(0.0, 1.5).is_err());
        assert!(ChannelRange::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn color_ranges_name_the_bad_channel() {
        let err = ColorRanges::new((0.0, 1.0), (0.9, 0.1), (0.0, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidChannelRange {
                channel: "saturation",
                ..
            }
        ));
    }

    #[test]
    fn ranges_serialize_as_pairs() {
        let ranges = ColorRanges::new((0.0, 1.0), (0.2, 0.8), (0.1, 0.9)).unwrap();
        let json = serde_json::to_value(ranges).unwrap();
        assert_eq!(json["saturation"], serde_json::json!([0.2, 0.8]));

        let partial: ColorRanges = serde_json::from_str(r#"{"value": [0.5, 1.0]}"#).unwrap();
        assert_eq!(partial.hue, ChannelRange::FULL);
        assert_eq!(partial.value.min(), 0.5);

        assert!(serde_json::from_str::<ColorRanges>(r#"{"hue": [1.0, 0.0]}"#).is_err());
    }

    #[test]
    fn distance_is_finite_at_zero_dwell_and_zero_derivative() {
        assert_eq!(distance_estimate(0.0, Complex::ONE), 0.0);
        assert!(distance_estimate(3.2, Complex::ZERO).is_finite());
    }

    #[test]
    fn brightness_ramp() {
        assert_eq!(brightness(2.5), 1.0);
        assert_eq!(brightness(0.0), 1.0);
        assert_eq!(brightness(-4.0), 0.5);
        assert_eq!(brightness(-8.0), 0.0);
        assert_eq!(brightness(-30.0), 0.0);
        assert_eq!(brightness(f64::NEG_INFINITY), 0.0);
        assert_eq!(brightness(f64::NAN), 0.0);
    }

    #[test]
    fn odd_bands_are_dimmer() {
        let d = Complex::new(1e-3, 0.0);
        let even = raw_hsv(4.5, d, 0.0, 1.0);
        let odd = raw_hsv(3.5, d, 0.0, 1.0);
        assert_eq!(even[2], 1.0);
        assert!((odd[2] - ODD_BAND_VALUE).abs() < 1e-12);
    }

    #[test]
    fn raw_channels_stay_in_unit_interval() {
        for dwell in [-12.3, 0.0, 0.4, 7.9, 250.5, 1.0e6] {
            let [h, s, v] = raw_hsv(dwell, Complex::new(0.3, 2.0), -13.0, 100.0);
            assert!((0.0..1.0).contains(&h), "hue {h}");
            assert!((0.0..1.0).contains(&s), "saturation {s}");
            assert!((0.0..=1.0).contains(&v), "value {v}");
        }
    }

    #[test]
    fn normalization_hits_range_endpoints() {
        let mut samples = vec![[0.2, 0.5, 0.0], [0.6, 0.5, 0.25], [0.4, 0.5, 1.0]];
        let ranges = ColorRanges::new((0.1, 0.9), (0.3, 0.7), (0.25, 0.75)).unwrap();
        normalize(&mut samples, &ranges);

        assert_eq!(samples[0][0], 0.1);
        assert_eq!(samples[1][0], 0.9);
        assert!((samples[2][0] - 0.5).abs() < 1e-12);

        // Saturation is flat, so it collapses onto the range minimum.
        assert!(samples.iter().all(|s| s[1] == 0.3));

        assert_eq!(samples[0][2], 0.25);
        assert_eq!(samples[2][2], 0.75);
        assert!((samples[1][2] - 0.375).abs() < 1e-12);
    }

    #[test]
    fn high_dwell_floors_are_white() {
        let (dwell, orbits) = fields(vec![0.5, 1.5, 10.2, 20.7], Complex::new(0.5, 0.0));
        // Saturation of at least 0.5 keeps every shaded pixel off white.
        let ranges = ColorRanges::new((0.0, 1.0), (0.5, 1.0), (0.0, 1.0)).unwrap();
        let colors = colorize(&dwell, &orbits, &ranges).unwrap();

        assert_eq!(colors.at(1, 1), WHITE);
        assert_ne!(colors.at(0, 0), WHITE);
        assert_ne!(colors.at(0, 1), WHITE);
        // 10 < 0.65 × 20
        assert_ne!(colors.at(1, 0), WHITE);
    }

    #[test]
    fn zero_value_range_blacks_out_exterior() {
        let (dwell, orbits) = fields(vec![0.5, 1.5, 2.5, 9.0], Complex::ONE);
        let ranges = ColorRanges::new((0.0, 1.0), (0.0, 1.0), (0.0, 0.0)).unwrap();
        let colors = colorize(&dwell, &orbits, &ranges).unwrap();
        for (i, px) in colors.pixels.iter().enumerate().take(3) {
            assert_eq!(*px, [0.0, 0.0, 0.0], "pixel {i}");
        }
        assert_eq!(colors.pixels[3], WHITE);
    }

    #[test]
    fn mismatched_fields_are_rejected() {
        let (dwell, _) = fields(vec![0.5; 4], Complex::ONE);
        let (_, orbits) = fields(vec![0.5; 9], Complex::ONE);
        assert!(matches!(
            colorize(&dwell, &orbits, &ColorRanges::default()),
            Err(RenderError::FieldSizeMismatch {
                expected: 9,
                actual: 4
            })
        ));
    }

    #[test]
    fn empty_field_is_empty_image() {
        let (dwell, orbits) = fields(Vec::new(), Complex::ONE);
        let colors = colorize(&dwell, &orbits, &ColorRanges::default()).unwrap();
        assert!(colors.pixels.is_empty());
    }
}
