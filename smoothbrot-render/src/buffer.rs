/// The final RGB image of a render.
///
/// Channels are `f64` in `[0, 1]`, one triple per grid point, row-major.
/// Row 0 corresponds to the lowest imaginary sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorField {
    pub resolution: usize,
    pub pixels: Vec<[f64; 3]>,
}

pub const WHITE: [f64; 3] = [1.0, 1.0, 1.0];

#[inline]
fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl ColorField {
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> [f64; 3] {
        self.pixels[row * self.resolution + col]
    }

    /// `true` if every channel of every pixel is finite.
    pub fn is_finite(&self) -> bool {
        self.pixels.iter().flatten().all(|c| c.is_finite())
    }

    /// 8-bit RGBA, 4 bytes per pixel, opaque, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &[r, g, b] in &self.pixels {
            bytes.extend_from_slice(&[to_byte(r), to_byte(g), to_byte(b), 255]);
        }
        bytes
    }

    /// 8-bit RGB triples, row-major.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels
            .iter()
            .map(|&[r, g, b]| [to_byte(r), to_byte(g), to_byte(b)])
            .collect()
    }
}
