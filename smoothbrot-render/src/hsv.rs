/// Convert an HSV triple to RGB, all channels in `[0, 1]`.
///
/// Hue wraps (`1.25` is the same as `0.25`); saturation and value are
/// clamped to `[0, 1]`.
pub fn hsv_to_rgb([h, s, v]: [f64; 3]) -> [f64; 3] {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u8 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
