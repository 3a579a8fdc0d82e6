//! Terminal rendering of a [`ColorField`] with upper-half-block characters.
//!
//! Each character cell shows two pixels: the foreground paints the upper
//! one, the background the lower one.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use smoothbrot_render::ColorField;

const UPPER_HALF: char = '\u{2580}';

/// Nearest-neighbour resample of `colors` to a `width × width` image,
/// returned top row first.
///
/// The field's row 0 is the lowest imaginary sample, so rows are flipped to
/// put positive imaginary parts at the top. `width` is capped at the field
/// resolution.
pub fn downsample(colors: &ColorField, width: usize) -> Vec<Vec<[u8; 3]>> {
    let res = colors.resolution;
    let width = width.min(res);
    if width == 0 {
        return Vec::new();
    }
    let rgb = colors.to_rgb8();

    (0..width)
        .map(|y| {
            let row = res - 1 - y * res / width;
            (0..width)
                .map(|x| rgb[row * res + x * res / width])
                .collect()
        })
        .collect()
}

#[inline]
fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// Write `colors` to `out` as `width` columns of 24-bit half blocks.
pub fn print<W: Write>(out: &mut W, colors: &ColorField, width: usize) -> io::Result<()> {
    let rows = downsample(colors, width);
    for pair in rows.chunks(2) {
        let upper = &pair[0];
        for (x, &top) in upper.iter().enumerate() {
            queue!(out, SetForegroundColor(rgb(top)))?;
            match pair.get(1) {
                Some(lower) => queue!(out, SetBackgroundColor(rgb(lower[x])))?,
                None => queue!(out, SetBackgroundColor(Color::Reset))?,
            }
            queue!(out, Print(UPPER_HALF))?;
        }
        queue!(out, ResetColor, Print("\n"))?;
    }
    out.flush()
}
